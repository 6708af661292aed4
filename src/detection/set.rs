//! Per-image detection aggregation and label ranking.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::bbox::BBox;

/// A detection as reported by a detector, before it joins a [`DetectionSet`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    /// Bounding box in pixel coordinates.
    pub bbox: BBox,

    /// Class name of the detected object (e.g. "dog", "bicycle").
    pub label: String,

    /// Detector confidence in `[0.0, 1.0]`.
    pub confidence: f64,
}

impl RawDetection {
    pub fn new(bbox: impl Into<BBox>, label: impl Into<String>, confidence: f64) -> Self {
        Self {
            bbox: bbox.into(),
            label: label.into(),
            confidence,
        }
    }
}

/// One detected object accepted into a [`DetectionSet`].
///
/// The area is computed once at construction; records are never mutated
/// afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    bbox: BBox,
    label: String,
    confidence: f64,
    area: i64,
}

impl Detection {
    /// Creates a new detection record and computes its area.
    pub fn new(bbox: impl Into<BBox>, label: impl Into<String>, confidence: f64) -> Self {
        let bbox = bbox.into();
        Self {
            area: bbox.area(),
            bbox,
            label: label.into(),
            confidence,
        }
    }

    pub fn bbox(&self) -> BBox {
        self.bbox
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Pixel area of the bounding box.
    pub fn area(&self) -> i64 {
        self.area
    }
}

impl From<RawDetection> for Detection {
    fn from(raw: RawDetection) -> Self {
        Detection::new(raw.bbox, raw.label, raw.confidence)
    }
}

/// Cumulative share of the frame covered by one label.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelArea {
    pub label: String,
    /// Sum of the pixel areas of every detection with this label.
    pub pixel_area: u128,
    /// `pixel_area / parent_area`.
    ///
    /// Usually within `[0, 1]`, but overlapping boxes can push it past 1.
    pub relative_area: f64,
}

/// Relative area per label, in first-occurrence order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LabelAreas {
    entries: Vec<LabelArea>,
}

impl LabelAreas {
    /// Returns the cumulative relative area for `label`, if it was detected.
    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|entry| entry.label == label)
            .map(|entry| entry.relative_area)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LabelArea> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<LabelArea> {
        self.entries
    }
}

/// All detections for one image, plus the image's pixel dimensions.
///
/// One set is built per processed image: created empty, filled with
/// [`DetectionSet::add`], then only queried.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionSet {
    parent_width: u32,
    parent_height: u32,
    records: Vec<Detection>,
}

impl DetectionSet {
    /// Creates an empty set for an image of the given dimensions.
    ///
    /// Returns `None` if either dimension is zero, since relative areas
    /// would divide by zero.
    pub fn new(parent_width: u32, parent_height: u32) -> Option<Self> {
        if parent_width == 0 || parent_height == 0 {
            return None;
        }
        Some(Self {
            parent_width,
            parent_height,
            records: Vec::new(),
        })
    }

    /// Appends a detection. Never fails.
    pub fn add(&mut self, bbox: impl Into<BBox>, label: impl Into<String>, confidence: f64) {
        self.records.push(Detection::new(bbox, label, confidence));
    }

    pub fn parent_width(&self) -> u32 {
        self.parent_width
    }

    pub fn parent_height(&self) -> u32 {
        self.parent_height
    }

    /// Total pixel area of the image. Always positive.
    pub fn parent_area(&self) -> u64 {
        self.parent_width as u64 * self.parent_height as u64
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[Detection] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct labels in first-occurrence order.
    pub fn labels_unique(&self) -> Vec<&str> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut labels = Vec::new();

        for record in &self.records {
            if seen.insert(record.label()) {
                labels.push(record.label());
            }
        }

        labels
    }

    /// Sums each label's relative area across all of its detections.
    ///
    /// Pixel areas are summed exactly and divided by the image area once per
    /// label, so labels covering the same number of pixels get identical
    /// relative areas.
    pub fn relative_area_by_label(&self) -> LabelAreas {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut entries: Vec<LabelArea> = Vec::new();

        for record in &self.records {
            // `area` is never negative.
            let pixels = record.area().max(0) as u128;
            match index.get(record.label()) {
                Some(&i) => entries[i].pixel_area += pixels,
                None => {
                    index.insert(record.label(), entries.len());
                    entries.push(LabelArea {
                        label: record.label().to_string(),
                        pixel_area: pixels,
                        relative_area: 0.0,
                    });
                }
            }
        }

        let parent_area = self.parent_area() as f64;
        for entry in &mut entries {
            entry.relative_area = entry.pixel_area as f64 / parent_area;
        }

        LabelAreas { entries }
    }

    /// Labels sorted by cumulative area, largest first.
    ///
    /// The sort is stable: labels with equal area keep first-occurrence order.
    pub fn labels_ranked_by_area(&self) -> Vec<LabelArea> {
        let mut ranked = self.relative_area_by_label().into_vec();
        ranked.sort_by(|a, b| b.pixel_area.cmp(&a.pixel_area));
        ranked
    }

    /// Ranked label names, truncated to `limit` when one is given.
    pub fn ranked_labels(&self, limit: Option<usize>) -> Vec<String> {
        let ranked = self.labels_ranked_by_area().into_iter().map(|e| e.label);
        match limit {
            Some(n) => ranked.take(n).collect(),
            None => ranked.collect(),
        }
    }
}

/// Builds a [`DetectionSet`] from detector output for an image of `width` x `height`.
///
/// Returns `None` for a zero-area image.
pub fn aggregate<I>(detections: I, width: u32, height: u32) -> Option<DetectionSet>
where
    I: IntoIterator<Item = RawDetection>,
{
    let mut set = DetectionSet::new(width, height)?;
    set.records.extend(detections.into_iter().map(Detection::from));
    Some(set)
}

/// Ranks the labels of a set by visual prominence.
pub fn rank(set: &DetectionSet) -> Vec<String> {
    set.ranked_labels(None)
}
