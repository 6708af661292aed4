#![allow(dead_code)]

use phototagger::detection::RawDetection;
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub const LABELS: [&str; 8] = [
    "person",
    "car",
    "dog",
    "cat",
    "bicycle",
    "traffic light",
    "cup",
    "teddy bear",
];

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

pub fn arb_label() -> BoxedStrategy<String> {
    prop::sample::select(LABELS.to_vec())
        .prop_map(str::to_string)
        .boxed()
}

/// A box inside a `width` x `height` frame, possibly degenerate.
pub fn arb_bbox_within(width: u32, height: u32) -> BoxedStrategy<(i64, i64, i64, i64)> {
    let (w, h) = (width as i64, height as i64);
    (0..=w, 0..=h, 0..=w, 0..=h)
        .prop_map(|(xa, ya, xb, yb)| (xa.min(xb), ya.min(yb), xa.max(xb), ya.max(yb)))
        .boxed()
}

pub fn arb_detection(width: u32, height: u32) -> BoxedStrategy<RawDetection> {
    (arb_bbox_within(width, height), arb_label(), 0.0f64..=1.0)
        .prop_map(|(bbox, label, confidence)| RawDetection::new(bbox, label, confidence))
        .boxed()
}

/// Frame size plus up to `max_detections` detections inside it.
pub fn arb_scene(max_detections: usize) -> BoxedStrategy<(u32, u32, Vec<RawDetection>)> {
    (1u32..=640, 1u32..=480)
        .prop_flat_map(move |(w, h)| {
            (
                Just(w),
                Just(h),
                prop::collection::vec(arb_detection(w, h), 0..=max_detections),
            )
        })
        .boxed()
}

/// Keyword-ish text, including non-BMP characters.
pub fn arb_keyword_text() -> BoxedStrategy<String> {
    prop::collection::vec(
        prop_oneof![
            prop::char::range('a', 'z'),
            Just(','),
            Just(' '),
            Just('é'),
            Just('犬'),
            Just('🐶'),
        ],
        0..40,
    )
    .prop_map(|chars| chars.into_iter().collect())
    .boxed()
}

/// Two distinct labels and a shuffled scene on a 100 x 100 frame where every
/// `heavy` box (20..=30 px sides, at least 400 px) outweighs all `light` boxes
/// together (1..=5 px sides, at most 10 boxes, at most 250 px).
pub fn arb_dominance_scene() -> BoxedStrategy<(String, String, Vec<RawDetection>)> {
    prop::sample::subsequence(LABELS.to_vec(), 2)
        .prop_flat_map(|pair| {
            let (heavy, light) = (pair[0].to_string(), pair[1].to_string());
            let heavy_boxes = prop::collection::vec(arb_sized_box(20..=30), 1..=3);
            let light_boxes = prop::collection::vec(arb_sized_box(1..=5), 1..=10);
            (Just(heavy), Just(light), heavy_boxes, light_boxes)
        })
        .prop_flat_map(|(heavy, light, heavy_boxes, light_boxes)| {
            let detections: Vec<RawDetection> = heavy_boxes
                .into_iter()
                .map(|bbox| RawDetection::new(bbox, heavy.clone(), 0.5))
                .chain(
                    light_boxes
                        .into_iter()
                        .map(|bbox| RawDetection::new(bbox, light.clone(), 0.5)),
                )
                .collect();
            (Just(heavy), Just(light), Just(detections).prop_shuffle())
        })
        .boxed()
}

fn arb_sized_box(
    side: std::ops::RangeInclusive<i64>,
) -> BoxedStrategy<(i64, i64, i64, i64)> {
    (0i64..=70, 0i64..=70, side.clone(), side)
        .prop_map(|(x, y, w, h)| (x, y, x + w, y + h))
        .boxed()
}
