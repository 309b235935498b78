//! JavaScript bindings. Everything here runs inside the web worker that
//! hosts the vectorization engine; the page only exchanges messages with it.

use autosvg_core::worker::{
    BufferHandle, ConversionRequest, EngineError, RasterImage, VectorizationEngine,
    convert_raster,
};
use autosvg_protocol::ConversionParams;
use autosvg_protocol::conversion::SVG_MIME_TYPE;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// The emscripten module object the engine was compiled into.
    pub type EngineModule;

    #[wasm_bindgen(method, js_name = _malloc)]
    fn malloc(this: &EngineModule, size: usize) -> usize;

    #[wasm_bindgen(method, js_name = _free)]
    fn free(this: &EngineModule, ptr: usize);

    #[wasm_bindgen(method, getter, js_name = HEAPU8)]
    fn heap_u8(this: &EngineModule) -> js_sys::Uint8Array;

    /// An engine instance exposing `loadImage(ptr, rows, cols)` and
    /// `convertToSvg(colorCount, smoothness)`.
    pub type EngineInstance;

    #[wasm_bindgen(method, catch, js_name = loadImage)]
    fn load_image(this: &EngineInstance, ptr: usize, rows: u32, cols: u32)
    -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = convertToSvg)]
    fn convert_to_svg(
        this: &EngineInstance,
        color_count: u32,
        smoothness: u32,
    ) -> Result<String, JsValue>;
}

/// [`VectorizationEngine`] over the engine's emscripten heap.
struct JsEngine<'a> {
    module: &'a EngineModule,
    instance: &'a EngineInstance,
}

impl VectorizationEngine for JsEngine<'_> {
    fn allocate(&mut self, size: usize) -> Result<BufferHandle, EngineError> {
        let ptr = self.module.malloc(size);
        if ptr == 0 && size > 0 {
            return Err(EngineError::new(format!("_malloc({size}) returned null")));
        }
        Ok(BufferHandle::new(ptr, size))
    }

    fn copy_in(&mut self, buffer: BufferHandle, bytes: &[u8]) -> Result<(), EngineError> {
        let heap = self.module.heap_u8();
        let end = buffer.offset + bytes.len();
        if bytes.len() > buffer.len || end > heap.length() as usize {
            return Err(EngineError::new(format!(
                "{} bytes do not fit the {}-byte buffer at {}",
                bytes.len(),
                buffer.len,
                buffer.offset
            )));
        }
        heap.subarray(buffer.offset as u32, end as u32).copy_from(bytes);
        Ok(())
    }

    fn convert(
        &mut self,
        buffer: BufferHandle,
        rows: u32,
        cols: u32,
        params: &ConversionParams,
    ) -> Result<String, EngineError> {
        self.instance
            .load_image(buffer.offset, rows, cols)
            .map_err(engine_error)?;
        self.instance
            .convert_to_svg(params.color_count, params.smoothness)
            .map_err(engine_error)
    }

    fn release(&mut self, buffer: BufferHandle) {
        self.module.free(buffer.offset);
    }
}

fn engine_error(value: JsValue) -> EngineError {
    if let Some(message) = value.as_string() {
        return EngineError::new(message);
    }
    match value.dyn_ref::<js_sys::Error>() {
        Some(err) => EngineError::new(String::from(err.message())),
        None => EngineError::new(format!("{value:?}")),
    }
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsError::new(&err.to_string()).into()
}

/// Parse SVG text into the editor's scene JSON (`{width, height, objects}`).
#[wasm_bindgen]
pub fn parse_svg(svg: &str) -> Result<String, JsError> {
    autosvg_core::svg_to_scene_json(svg, false).map_err(|e| JsError::new(&e.to_string()))
}

/// Download name for the SVG converted from `source_name`.
#[wasm_bindgen]
pub fn download_file_name(source_name: Option<String>) -> String {
    autosvg_protocol::download_file_name(source_name.as_deref())
}

/// Convert RGBA `pixels` to SVG with the given engine.
///
/// Resolves to `{ svg, blobUrl, fileName, mimeType }`. Engine memory for the
/// pixels is freed before returning, on success and on failure.
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn convert_image(
    module: &EngineModule,
    instance: &EngineInstance,
    pixels: Vec<u8>,
    rows: u32,
    cols: u32,
    color_count: u32,
    smoothness: u32,
    source_name: Option<String>,
) -> Result<js_sys::Object, JsValue> {
    let raster = RasterImage::new(rows, cols, pixels).map_err(js_error)?;
    let mut request =
        ConversionRequest::new(raster, ConversionParams::new(color_count, smoothness));
    request.source_name = source_name;

    let mut engine = JsEngine { module, instance };
    let conversion = convert_raster(&mut engine, &request, |_| {}).map_err(js_error)?;

    let out = js_sys::Object::new();
    js_sys::Reflect::set(&out, &"svg".into(), &conversion.svg.as_str().into())?;
    js_sys::Reflect::set(&out, &"blobUrl".into(), &blob_url(&conversion.svg)?.into())?;
    js_sys::Reflect::set(
        &out,
        &"fileName".into(),
        &conversion.artifact.file_name.as_str().into(),
    )?;
    js_sys::Reflect::set(&out, &"mimeType".into(), &SVG_MIME_TYPE.into())?;
    Ok(out)
}

fn blob_url(svg: &str) -> Result<String, JsValue> {
    let parts = js_sys::Array::of1(&JsValue::from_str(svg));
    let options = web_sys::BlobPropertyBag::new();
    options.set_type(SVG_MIME_TYPE);
    let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &options)?;
    web_sys::Url::create_object_url_with_blob(&blob)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_svg_emits_scene_json() {
        let json = parse_svg(r#"<svg width="4" height="2"><path d="M 0 0 1 1"/></svg>"#)
            .unwrap_or_default();
        let scene: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(scene["height"], 2.0);
        assert_eq!(scene["objects"][0]["path"][0]["x"], 1.0);
    }

    #[test]
    fn download_name_from_source() {
        assert_eq!(download_file_name(Some("scan.png".into())), "scan.svg");
        assert_eq!(download_file_name(None), "output.svg");
    }
}
