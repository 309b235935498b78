pub mod conversion;
pub mod scene;
pub mod types;

pub use conversion::{ConversionParams, ParamsError, SvgArtifact, download_file_name};
pub use scene::{SceneGraph, Segment, ShapeRecord};
pub use types::Point;
