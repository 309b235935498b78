pub mod channel;
pub mod convert;
pub mod engine;

pub use channel::{ChannelConfig, ChannelState, PendingConversion, WorkerChannel};
pub use convert::{
    BYTES_PER_PIXEL, Conversion, ConversionError, ConversionRequest, RasterImage, convert_raster,
};
pub use engine::{BufferHandle, EngineError, VectorizationEngine};
