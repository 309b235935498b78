//! Capability interface for the external vectorization engine.

use autosvg_protocol::ConversionParams;
use thiserror::Error;

/// A region of engine memory handed out by [`VectorizationEngine::allocate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle {
    /// Byte offset of the region in the engine's address space.
    pub offset: usize,
    pub len: usize,
}

impl BufferHandle {
    pub fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }
}

/// Failure reported by an engine operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EngineError {
    message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The engine as seen by the worker: its own linear memory plus one
/// conversion entry point.
///
/// Buffers are owned by the caller between `allocate` and `release`; the
/// worker guarantees every allocated handle is released exactly once.
pub trait VectorizationEngine {
    fn allocate(&mut self, size: usize) -> Result<BufferHandle, EngineError>;

    /// Copy `bytes` to the start of `buffer`.
    fn copy_in(&mut self, buffer: BufferHandle, bytes: &[u8]) -> Result<(), EngineError>;

    /// Vectorize the RGBA pixels held in `buffer` and return an SVG document.
    fn convert(
        &mut self,
        buffer: BufferHandle,
        rows: u32,
        cols: u32,
        params: &ConversionParams,
    ) -> Result<String, EngineError>;

    fn release(&mut self, buffer: BufferHandle);
}

impl<E: VectorizationEngine + ?Sized> VectorizationEngine for Box<E> {
    fn allocate(&mut self, size: usize) -> Result<BufferHandle, EngineError> {
        (**self).allocate(size)
    }

    fn copy_in(&mut self, buffer: BufferHandle, bytes: &[u8]) -> Result<(), EngineError> {
        (**self).copy_in(buffer, bytes)
    }

    fn convert(
        &mut self,
        buffer: BufferHandle,
        rows: u32,
        cols: u32,
        params: &ConversionParams,
    ) -> Result<String, EngineError> {
        (**self).convert(buffer, rows, cols, params)
    }

    fn release(&mut self, buffer: BufferHandle) {
        (**self).release(buffer);
    }
}
