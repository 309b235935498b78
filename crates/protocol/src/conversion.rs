use serde::{Deserialize, Serialize};
use thiserror::Error;

/// MIME type of every artifact the converter hands out.
pub const SVG_MIME_TYPE: &str = "image/svg+xml";

/// File name used when the source image name is unknown.
pub const DEFAULT_FILE_NAME: &str = "output.svg";

pub const MIN_COLOR_COUNT: u32 = 2;
pub const MIN_SMOOTHNESS: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParamsError {
    #[error("colorCount must be at least {min}, got {0}", min = MIN_COLOR_COUNT)]
    ColorCountTooLow(u32),
    #[error("smoothness must be at least {min}, got {0}", min = MIN_SMOOTHNESS)]
    SmoothnessTooLow(u32),
}

/// Tuning knobs forwarded to the vectorization engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionParams {
    /// Number of quantized colors (the "details" slider).
    pub color_count: u32,
    pub smoothness: u32,
}

impl Default for ConversionParams {
    fn default() -> Self {
        Self {
            color_count: 2,
            smoothness: 5,
        }
    }
}

impl ConversionParams {
    pub fn new(color_count: u32, smoothness: u32) -> Self {
        Self {
            color_count,
            smoothness,
        }
    }

    /// Reports the first out-of-range field, if any.
    pub fn check(&self) -> Result<(), ParamsError> {
        if self.color_count < MIN_COLOR_COUNT {
            return Err(ParamsError::ColorCountTooLow(self.color_count));
        }
        if self.smoothness < MIN_SMOOTHNESS {
            return Err(ParamsError::SmoothnessTooLow(self.smoothness));
        }
        Ok(())
    }
}

/// A downloadable SVG produced by one conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SvgArtifact {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SvgArtifact {
    /// Wrap rendered SVG text, naming it after `source_name`.
    pub fn new(svg: &str, source_name: Option<&str>) -> Self {
        Self {
            file_name: download_file_name(source_name),
            mime_type: SVG_MIME_TYPE.to_string(),
            bytes: svg.as_bytes().to_vec(),
        }
    }
}

/// Propose a download name: the source's base name up to its first `.`,
/// with an `.svg` suffix.
///
/// Directory components (either separator) are ignored. Falls back to
/// [`DEFAULT_FILE_NAME`] when nothing usable remains.
pub fn download_file_name(source_name: Option<&str>) -> String {
    let base = source_name
        .map(|name| name.rsplit(['/', '\\']).next().unwrap_or(name))
        .and_then(|name| name.split('.').next())
        .map(str::trim)
        .unwrap_or("");
    if base.is_empty() {
        DEFAULT_FILE_NAME.to_string()
    } else {
        format!("{base}.svg")
    }
}
