//! End-to-end checks: engine SVG → scene graph, and raster → worker → scene.

use autosvg_core::parsers::{ParseError, build_shape, parse_svg_document};
use autosvg_core::worker::{
    BufferHandle, ChannelState, ConversionError, ConversionRequest, EngineError, RasterImage,
    VectorizationEngine, WorkerChannel,
};
use autosvg_protocol::{ConversionParams, Segment};
use futures::executor::block_on;
use proptest::prelude::*;
use std::sync::{Arc, Mutex};

#[test]
fn parses_engine_fixture() {
    let svg = include_str!("fixtures/engine-output.svg");
    let scene = parse_svg_document(svg).expect("fixture should parse");

    assert_eq!(scene.width, 600.0);
    assert_eq!(scene.height, 450.0);
    assert_eq!(scene.len(), 3);

    let background = &scene.shapes[0];
    assert_eq!(background.fill.as_deref(), Some("rgb(34,51,68)"));
    assert_eq!(background.segments.len(), 3);
    assert!(background.segments.iter().all(Segment::is_degenerate));

    // Repeated move commands are plain cluster boundaries.
    let blob = &scene.shapes[1];
    assert_eq!((blob.move_x, blob.move_y), (120.0, 80.0));
    let kinds: Vec<bool> = blob.segments.iter().map(Segment::is_degenerate).collect();
    assert_eq!(kinds, vec![false, true, false, true, true]);
    assert_eq!(blob.segments[0].x2, 150.0);

    // `320 220 330` is a three-value cluster and vanishes.
    let shard = &scene.shapes[2];
    assert_eq!(shard.segments, vec![Segment::line(310.0, 210.0)]);
}

/// Engine stub that draws one straight segment from the origin to the
/// raster's bottom-right corner and keeps a ledger of its memory.
#[derive(Clone, Default)]
struct LedgerEngine {
    ledger: Arc<Mutex<Ledger>>,
    fail: bool,
}

#[derive(Default)]
struct Ledger {
    allocated: Vec<usize>,
    released: Vec<BufferHandle>,
    next_offset: usize,
}

impl VectorizationEngine for LedgerEngine {
    fn allocate(&mut self, size: usize) -> Result<BufferHandle, EngineError> {
        let mut ledger = self.ledger.lock().unwrap();
        let handle = BufferHandle::new(ledger.next_offset, size);
        ledger.next_offset += size.max(1);
        ledger.allocated.push(size);
        Ok(handle)
    }

    fn copy_in(&mut self, buffer: BufferHandle, bytes: &[u8]) -> Result<(), EngineError> {
        if bytes.len() == buffer.len {
            Ok(())
        } else {
            Err(EngineError::new("size mismatch"))
        }
    }

    fn convert(
        &mut self,
        _buffer: BufferHandle,
        rows: u32,
        cols: u32,
        _params: &ConversionParams,
    ) -> Result<String, EngineError> {
        if self.fail {
            return Err(EngineError::new("contour tracing failed"));
        }
        Ok(format!(
            r##"<svg width="{cols}" height="{rows}"><path d="M 0 0 {cols} {rows}" fill="#000000"/></svg>"##
        ))
    }

    fn release(&mut self, buffer: BufferHandle) {
        self.ledger.lock().unwrap().released.push(buffer);
    }
}

fn request(rows: u32, cols: u32) -> ConversionRequest {
    let raster = RasterImage::new(rows, cols, vec![255; (rows * cols * 4) as usize]).unwrap();
    ConversionRequest::new(raster, ConversionParams::new(3, 4))
}

#[test]
fn raster_round_trips_to_scene() {
    let engine = LedgerEngine::default();
    let ledger = Arc::clone(&engine.ledger);
    let channel = WorkerChannel::spawn(engine).unwrap();

    let conversion = block_on(channel.convert(request(10, 10).with_source_name("square.png")))
        .expect("conversion should succeed");
    assert_eq!(conversion.artifact.file_name, "square.svg");
    assert_eq!(conversion.artifact.mime_type, "image/svg+xml");

    let scene = conversion.scene().unwrap();
    let shape = &scene.shapes[0];
    assert_eq!((shape.move_x, shape.move_y), (0.0, 0.0));
    assert_eq!(shape.segments, vec![Segment::line(10.0, 10.0)]);
    assert_eq!(shape.stroke.as_deref(), Some("#000000"));

    let ledger = ledger.lock().unwrap();
    assert_eq!(ledger.allocated, vec![400]);
    assert_eq!(ledger.released, vec![BufferHandle::new(0, 400)]);
}

#[test]
fn every_buffer_released_once_on_success_and_failure() {
    let ok_engine = LedgerEngine::default();
    let failing = LedgerEngine {
        ledger: Arc::clone(&ok_engine.ledger),
        fail: true,
    };
    let ledger = Arc::clone(&ok_engine.ledger);

    let ok_channel = WorkerChannel::spawn(ok_engine).unwrap();
    let failing_channel = WorkerChannel::spawn(failing).unwrap();

    let sizes = [(1, 1), (3, 7), (16, 9)];
    for (rows, cols) in sizes {
        assert!(block_on(ok_channel.convert(request(rows, cols))).is_ok());
        let err = block_on(failing_channel.convert(request(rows, cols))).unwrap_err();
        assert!(matches!(err, ConversionError::Engine(_)));
        assert_eq!(failing_channel.state(), ChannelState::Idle);
    }
    drop(ok_channel);
    drop(failing_channel);

    let ledger = ledger.lock().unwrap();
    assert_eq!(ledger.allocated.len(), 6);
    assert_eq!(ledger.released.len(), 6);
    let mut released: Vec<usize> = ledger.released.iter().map(|h| h.len).collect();
    let mut allocated = ledger.allocated.clone();
    released.sort_unstable();
    allocated.sort_unstable();
    assert_eq!(released, allocated);
    for (rows, cols) in sizes {
        assert!(allocated.contains(&((rows * cols * 4) as usize)));
    }
    let mut offsets: Vec<usize> = ledger.released.iter().map(|h| h.offset).collect();
    offsets.sort_unstable();
    offsets.dedup();
    assert_eq!(offsets.len(), 6, "no buffer released twice");
}

#[test]
fn malformed_xml_fails_before_paths() {
    let err = parse_svg_document(r#"<svg width="1"><path d="M"/>"#).unwrap_err();
    assert!(matches!(err, ParseError::Document(_)));
}

fn group() -> impl Strategy<Value = Vec<i32>> {
    prop_oneof![
        prop::collection::vec(-1000i32..1000, 2),
        prop::collection::vec(-1000i32..1000, 6),
    ]
}

fn render_groups(groups: &[Vec<i32>]) -> String {
    let mut d = String::from("M 0 0");
    for group in groups {
        d.push_str(if group.len() == 2 { " L" } else { " C" });
        for value in group {
            d.push_str(&format!(" {value}"));
        }
    }
    d
}

fn expected_segment(group: &[i32]) -> Segment {
    let v: Vec<f64> = group.iter().map(|&n| f64::from(n)).collect();
    if v.len() == 2 {
        Segment::line(v[0], v[1])
    } else {
        Segment {
            x1: v[0],
            y1: v[1],
            x2: v[2],
            y2: v[3],
            x: v[4],
            y: v[5],
        }
    }
}

proptest! {
    #[test]
    fn valid_groups_map_one_to_one(groups in prop::collection::vec(group(), 0..20)) {
        let shape = build_shape(Some(&render_groups(&groups)), None).unwrap();
        let expected: Vec<Segment> = groups.iter().map(|g| expected_segment(g)).collect();
        prop_assert_eq!(shape.segments, expected);
    }

    #[test]
    fn odd_groups_are_skipped(
        groups in prop::collection::vec(
            prop_oneof![group(), prop::collection::vec(-50i32..50, 0..10)],
            0..20,
        )
    ) {
        let shape = build_shape(Some(&render_groups(&groups)), None).unwrap();
        let expected: Vec<Segment> = groups
            .iter()
            .filter(|g| g.len() == 2 || g.len() == 6)
            .map(|g| expected_segment(g))
            .collect();
        prop_assert_eq!(shape.segments, expected);
    }

    #[test]
    fn document_order_is_preserved(anchors in prop::collection::vec(-500i32..500, 0..12)) {
        let mut svg = String::from(r#"<svg width="10" height="10">"#);
        for (i, anchor) in anchors.iter().enumerate() {
            if i % 3 == 1 {
                svg.push_str(&format!(r#"<g><path d="M {anchor} {i}"/></g>"#));
            } else {
                svg.push_str(&format!(r#"<path d="M {anchor} {i}"/>"#));
            }
        }
        svg.push_str("</svg>");

        let scene = parse_svg_document(&svg).unwrap();
        let got: Vec<(f64, f64)> = scene.shapes.iter().map(|s| (s.move_x, s.move_y)).collect();
        let want: Vec<(f64, f64)> = anchors
            .iter()
            .enumerate()
            .map(|(i, &a)| (f64::from(a), i as f64))
            .collect();
        prop_assert_eq!(got, want);
    }
}
