//! Address-ranged road segments and the geometric fallback built on them.
//!
//! When the search service cannot place a house number, the TIGER address
//! ranges in the road reference store still can: interpolate along the
//! segment that covers the number, or snap to the nearest range endpoint.

mod interpolate;
mod store;

pub use interpolate::{locate, Located, SnapMode};
pub use store::{RoadStore, StoreError};

use geo::Point;

/// One address-ranged road segment from the reference store.
///
/// `start`/`end` points carry longitude in `x` and latitude in `y`. A `step`
/// of 2 marks single-parity numbering (one side of the street).
#[derive(Debug, Clone, PartialEq)]
pub struct RoadSegment {
    pub road_name: String,
    pub start_number: i64,
    pub end_number: i64,
    pub step: Option<i64>,
    pub start: Point<f64>,
    pub end: Point<f64>,
    pub place_id: Option<i64>,
    pub road_class: Option<String>,
    pub road_type: Option<String>,
}

impl RoadSegment {
    /// Minimal segment for tests and synthetic data.
    pub fn new(start_number: i64, end_number: i64, start: Point<f64>, end: Point<f64>) -> Self {
        Self {
            road_name: String::new(),
            start_number,
            end_number,
            step: None,
            start,
            end,
            place_id: None,
            road_class: None,
            road_type: None,
        }
    }
}
