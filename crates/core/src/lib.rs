//! Scene reconstruction and vectorization plumbing for autosvg.
//!
//! [`parsers`] turns SVG produced by the vectorization engine into the
//! editor's [`SceneGraph`](autosvg_protocol::SceneGraph); [`worker`] moves
//! raster images through the engine off the caller's thread.

pub mod parsers;
pub mod worker;

use thiserror::Error;

pub use parsers::parse_svg_document;
pub use worker::{ConversionRequest, RasterImage, WorkerChannel};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] parsers::ParseError),
    #[error("conversion failed: {0}")]
    ConversionFailed(#[from] worker::ConversionError),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse engine output straight to the editor's JSON object schema.
pub fn svg_to_scene_json(svg: &str, pretty: bool) -> Result<String, Error> {
    let scene = parse_svg_document(svg)?;
    let json = if pretty {
        serde_json::to_string_pretty(&scene)?
    } else {
        serde_json::to_string(&scene)?
    };
    Ok(json)
}
