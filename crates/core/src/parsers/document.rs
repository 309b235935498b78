//! SVG document → [`SceneGraph`].

use autosvg_protocol::SceneGraph;
use roxmltree::{Document, Node, ParsingOptions};
use thiserror::Error;

use super::path::build_shape;
use super::tokens::coerce_number;
use super::ParseError;

#[derive(Debug, Error)]
pub enum InvalidDocumentError {
    #[error("invalid XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("root element is <{0}>, expected <svg>")]
    NotSvg(String),
}

/// Parse engine output into an editable scene.
///
/// `width` and `height` come from the root element and are NaN when absent or
/// not plain numbers. Paths are visited in document order, which is the
/// editor's z-order. The first malformed path aborts the whole parse.
pub fn parse_svg_document(svg: &str) -> Result<SceneGraph, ParseError> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(svg, options).map_err(InvalidDocumentError::from)?;
    let root = doc.root_element();
    if !root.has_tag_name("svg") {
        return Err(InvalidDocumentError::NotSvg(root.tag_name().name().to_string()).into());
    }

    let mut scene = SceneGraph::new(
        numeric_attribute(root, "width"),
        numeric_attribute(root, "height"),
    );
    for (index, node) in root.descendants().filter(is_path).enumerate() {
        let shape = build_shape(node.attribute("d"), node.attribute("fill"))
            .map_err(|source| ParseError::Path { index, source })?;
        scene.shapes.push(shape);
    }

    tracing::debug!(
        width = scene.width,
        height = scene.height,
        shapes = scene.len(),
        segments = scene.segment_count(),
        "parsed svg document"
    );
    Ok(scene)
}

fn is_path(node: &Node<'_, '_>) -> bool {
    node.is_element() && node.has_tag_name("path")
}

fn numeric_attribute(node: Node<'_, '_>, name: &str) -> f64 {
    node.attribute(name).map_or(f64::NAN, coerce_number)
}
