//! Extraction of sub-regions by geographic bounding box

mod crop;

pub use crop::{crop, crop_window};
