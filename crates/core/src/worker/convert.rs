//! One marshal → invoke → release cycle against an engine.

use autosvg_protocol::{ConversionParams, ParamsError, SceneGraph, SvgArtifact};
use thiserror::Error;

use super::channel::ChannelState;
use super::engine::{BufferHandle, EngineError, VectorizationEngine};
use crate::parsers::{ParseError, parse_svg_document};

pub const BYTES_PER_PIXEL: usize = 4;

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("{rows}x{cols} raster needs {expected} bytes, got {actual}")]
    RasterSize {
        rows: u32,
        cols: u32,
        expected: usize,
        actual: usize,
    },
    #[error("{rows}x{cols} raster is too large to address")]
    RasterTooLarge { rows: u32, cols: u32 },
    #[error("invalid parameters: {0}")]
    InvalidParams(#[from] ParamsError),
    #[error("allocating {size} bytes of engine memory failed: {source}")]
    Allocation {
        size: usize,
        #[source]
        source: EngineError,
    },
    #[error("copying pixels into engine memory failed: {0}")]
    Marshalling(#[source] EngineError),
    #[error("engine failed: {0}")]
    Engine(#[source] EngineError),
    #[error("worker stopped before replying")]
    WorkerGone,
}

/// Row-major RGBA8 pixels with a top-left origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    rows: u32,
    cols: u32,
    pixels: Vec<u8>,
}

impl RasterImage {
    pub fn new(rows: u32, cols: u32, pixels: Vec<u8>) -> Result<Self, ConversionError> {
        let expected = Self::byte_len(rows, cols)
            .ok_or(ConversionError::RasterTooLarge { rows, cols })?;
        if pixels.len() != expected {
            return Err(ConversionError::RasterSize {
                rows,
                cols,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self { rows, cols, pixels })
    }

    /// Bytes needed for a `rows` x `cols` raster, `None` on overflow.
    pub fn byte_len(rows: u32, cols: u32) -> Option<usize> {
        (rows as usize)
            .checked_mul(cols as usize)?
            .checked_mul(BYTES_PER_PIXEL)
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub raster: RasterImage,
    pub params: ConversionParams,
    /// Name of the file the raster was loaded from, used to name the artifact.
    pub source_name: Option<String>,
}

impl ConversionRequest {
    pub fn new(raster: RasterImage, params: ConversionParams) -> Self {
        Self {
            raster,
            params,
            source_name: None,
        }
    }

    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }
}

/// Engine output for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub svg: String,
    pub artifact: SvgArtifact,
}

impl Conversion {
    /// Rebuild the editable scene from the returned SVG.
    pub fn scene(&self) -> Result<SceneGraph, ParseError> {
        parse_svg_document(&self.svg)
    }
}

/// Engine memory held for the duration of one conversion. Released on drop,
/// whichever way the conversion exits.
struct EngineBuffer<'e, E: VectorizationEngine + ?Sized> {
    engine: &'e mut E,
    handle: BufferHandle,
}

impl<'e, E: VectorizationEngine + ?Sized> EngineBuffer<'e, E> {
    fn allocate(engine: &'e mut E, size: usize) -> Result<Self, ConversionError> {
        let handle = engine
            .allocate(size)
            .map_err(|source| ConversionError::Allocation { size, source })?;
        tracing::trace!(offset = handle.offset, size, "allocated engine buffer");
        Ok(Self { engine, handle })
    }

    fn copy_in(&mut self, bytes: &[u8]) -> Result<(), ConversionError> {
        self.engine
            .copy_in(self.handle, bytes)
            .map_err(ConversionError::Marshalling)
    }

    fn convert(
        &mut self,
        rows: u32,
        cols: u32,
        params: &ConversionParams,
    ) -> Result<String, ConversionError> {
        self.engine
            .convert(self.handle, rows, cols, params)
            .map_err(ConversionError::Engine)
    }
}

impl<E: VectorizationEngine + ?Sized> Drop for EngineBuffer<'_, E> {
    fn drop(&mut self) {
        self.engine.release(self.handle);
        tracing::trace!(offset = self.handle.offset, "released engine buffer");
    }
}

/// Run a single conversion synchronously on the calling thread.
///
/// Allocates exactly `rows * cols * 4` bytes of engine memory, copies the
/// pixels in, invokes the engine and frees the buffer before returning.
/// `on_stage` observes the Marshalling, Invoking and Returning transitions.
pub fn convert_raster<E, F>(
    engine: &mut E,
    request: &ConversionRequest,
    mut on_stage: F,
) -> Result<Conversion, ConversionError>
where
    E: VectorizationEngine + ?Sized,
    F: FnMut(ChannelState),
{
    request.params.check()?;
    let raster = &request.raster;

    on_stage(ChannelState::Marshalling);
    let svg = {
        let mut buffer = EngineBuffer::allocate(engine, raster.pixels().len())?;
        buffer.copy_in(raster.pixels())?;
        on_stage(ChannelState::Invoking);
        buffer.convert(raster.rows(), raster.cols(), &request.params)?
    };

    on_stage(ChannelState::Returning);
    let artifact = SvgArtifact::new(&svg, request.source_name.as_deref());
    Ok(Conversion { svg, artifact })
}
