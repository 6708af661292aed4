//! Object detections and their aggregation per image.
//!
//! A detector reports boxes, labels and confidences for one image. This
//! module collects them into a [`DetectionSet`] and ranks the labels by how
//! much of the frame they cover, so that one large object (or many small
//! ones) outranks a label that merely appears often.
//!
//! # Example
//!
//! ```
//! use phototagger::detection::{aggregate, rank, RawDetection};
//!
//! let detections = vec![
//!     RawDetection::new((0, 0, 10, 10), "cup", 0.7),
//!     RawDetection::new((0, 0, 60, 40), "laptop", 0.9),
//! ];
//! let set = aggregate(detections, 100, 100).expect("non-empty image");
//! assert_eq!(rank(&set), vec!["laptop", "cup"]);
//! ```

mod bbox;
pub mod provider;
mod set;

pub use bbox::BBox;
pub use provider::{load_image_info, DetectionProvider, ImageInfo, SidecarDetections};
pub use set::{aggregate, rank, Detection, DetectionSet, LabelArea, LabelAreas, RawDetection};
