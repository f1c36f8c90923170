//! Default value functions for serde deserialization.

use crate::grid::DEFAULT_HEIGHT_RANGE;

pub fn resolution() -> f64 {
    0.1
}

pub fn grid_size() -> u32 {
    200
}

pub fn origin_mode() -> String {
    "center".to_string()
}

pub fn min_height() -> f64 {
    DEFAULT_HEIGHT_RANGE[0]
}

pub fn max_height() -> f64 {
    DEFAULT_HEIGHT_RANGE[1]
}

pub fn truncation() -> f32 {
    1.0
}

pub fn min_variance() -> f32 {
    0.001
}

pub fn measurement_variance() -> f32 {
    0.01
}
