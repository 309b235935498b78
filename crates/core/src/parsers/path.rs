//! Build one [`ShapeRecord`] from a path's `d` and `fill` attributes.

use autosvg_protocol::{Point, ShapeRecord};
use thiserror::Error;

use super::segments::{cluster_to_segment, group_clusters};
use super::tokens::{coerce_number, tokenize};

/// Tokens making up the leading move command: the letter and two coordinates.
const MOVE_TOKENS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedPathError {
    #[error("path has no `d` attribute")]
    MissingData,
    #[error("path data {data:?} has {found} token(s), a move needs 3")]
    MissingMove { data: String, found: usize },
}

/// Convert a single path into a shape.
///
/// The first three tokens are taken as the move command; its coordinates
/// become the shape's start anchor (NaN when they are not numeric). Every
/// remaining coordinate cluster of length 2 or 6 becomes a segment, others
/// are skipped.
pub fn build_shape(d: Option<&str>, fill: Option<&str>) -> Result<ShapeRecord, MalformedPathError> {
    let data = d.ok_or(MalformedPathError::MissingData)?;
    let mut tokens = tokenize(data);

    let head: Vec<&str> = tokens.by_ref().take(MOVE_TOKENS).collect();
    let [_, move_x, move_y] = head[..] else {
        return Err(MalformedPathError::MissingMove {
            data: data.to_string(),
            found: head.len(),
        });
    };
    let start = Point::new(coerce_number(move_x), coerce_number(move_y));

    let segments = group_clusters(tokens)
        .iter()
        .filter_map(|cluster| cluster_to_segment(cluster))
        .collect();

    Ok(ShapeRecord::new(start, segments, fill.map(str::to_string)))
}
