pub mod document;
pub mod path;
pub mod segments;
pub mod tokens;

use thiserror::Error;

pub use document::{InvalidDocumentError, parse_svg_document};
pub use path::{MalformedPathError, build_shape};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("document: {0}")]
    Document(#[from] InvalidDocumentError),
    #[error("path #{index}: {source}")]
    Path {
        index: usize,
        #[source]
        source: MalformedPathError,
    },
}
