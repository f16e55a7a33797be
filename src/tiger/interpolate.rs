//! House-number interpolation and endpoint snapping over address ranges.

use serde::Serialize;
use std::fmt;

use geo::Point;

use super::RoadSegment;

/// How the coordinate was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapMode {
    /// Linear interpolation within or between ranges.
    Extrapolated,
    /// Nearest range endpoint, coordinate unmodified.
    Snapped,
}

impl fmt::Display for SnapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapMode::Extrapolated => f.write_str("extrapolated"),
            SnapMode::Snapped => f.write_str("snapped"),
        }
    }
}

/// A coordinate computed for one house number.
#[derive(Debug, Clone, PartialEq)]
pub struct Located {
    pub lat: f64,
    pub lon: f64,
    pub mode: SnapMode,
    /// Index into the input slice of the segment that produced the point
    /// (the left segment for a between-ranges interpolation).
    pub segment_index: usize,
    /// Selection record for the strategy trace.
    pub detail: String,
}

/// Segment with its range normalized so `low <= high` and the endpoint
/// coordinates reassigned to match.
struct Ranged<'a> {
    index: usize,
    segment: &'a RoadSegment,
    low: i64,
    high: i64,
    low_pt: Point<f64>,
    high_pt: Point<f64>,
    parity_ok: bool,
    span: i64,
    midpoint: f64,
}

fn lerp(start: f64, end: f64, fraction: f64) -> f64 {
    start + (end - start) * fraction
}

fn lerp_point(a: Point<f64>, b: Point<f64>, fraction: f64) -> (f64, f64) {
    (
        lerp(a.y(), b.y(), fraction),
        lerp(a.x(), b.x(), fraction),
    )
}

fn normalize_segments(house_number: i64, segments: &[RoadSegment]) -> Vec<Ranged<'_>> {
    segments
        .iter()
        .enumerate()
        .filter(|(_, s)| {
            s.start.x().is_finite()
                && s.start.y().is_finite()
                && s.end.x().is_finite()
                && s.end.y().is_finite()
        })
        .map(|(index, segment)| {
            let (low, high, low_pt, high_pt) = if segment.start_number <= segment.end_number {
                (
                    segment.start_number,
                    segment.end_number,
                    segment.start,
                    segment.end,
                )
            } else {
                (
                    segment.end_number,
                    segment.start_number,
                    segment.end,
                    segment.start,
                )
            };
            let parity_ok = segment.step != Some(2) || house_number % 2 == low % 2;
            Ranged {
                index,
                segment,
                low,
                high,
                low_pt,
                high_pt,
                parity_ok,
                span: high - low,
                midpoint: (low + high) as f64 / 2.0,
            }
        })
        .collect()
}

/// Compute a coordinate for `house_number` from the given segments.
///
/// Selection order: within-range interpolation on the tightest covering
/// segment, then between-range interpolation across the narrowest bracketing
/// gap, then a snap to the numerically nearest endpoint. Returns `None` only
/// when no segment has usable geometry.
pub fn locate(house_number: i64, segments: &[RoadSegment]) -> Option<Located> {
    let ranged = normalize_segments(house_number, segments);
    if ranged.is_empty() {
        return None;
    }

    // 1. Within range: smallest span wins, then closest midpoint.
    let inside = ranged
        .iter()
        .filter(|r| r.parity_ok && r.low <= house_number && house_number <= r.high)
        .min_by(|a, b| {
            (a.span, (house_number as f64 - a.midpoint).abs())
                .partial_cmp(&(b.span, (house_number as f64 - b.midpoint).abs()))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    if let Some(best) = inside {
        let fraction = if best.span > 0 {
            ((house_number - best.low) as f64 / best.span as f64).clamp(0.0, 1.0)
        } else {
            0.5
        };
        let (lat, lon) = lerp_point(best.low_pt, best.high_pt, fraction);
        return Some(Located {
            lat,
            lon,
            mode: SnapMode::Extrapolated,
            segment_index: best.index,
            detail: format!(
                "within_range_interpolation: house_number={}, range=[{},{}], frac={:.6}",
                house_number, best.low, best.high, fraction
            ),
        });
    }

    // 2. Between ranges: adjacent parity-passing pair with the narrowest
    // bracketing gap.
    let mut passing: Vec<&Ranged<'_>> = ranged.iter().filter(|r| r.parity_ok).collect();
    passing.sort_by_key(|r| (r.low, r.high));
    let bracket = passing
        .windows(2)
        .filter(|pair| pair[0].high < house_number && house_number < pair[1].low)
        .min_by_key(|pair| pair[1].low - pair[0].high);
    if let Some(pair) = bracket {
        let (left, right) = (pair[0], pair[1]);
        let gap = right.low - left.high;
        let fraction = if gap > 0 {
            ((house_number - left.high) as f64 / gap as f64).clamp(0.0, 1.0)
        } else {
            0.5
        };
        let (lat, lon) = lerp_point(left.high_pt, right.low_pt, fraction);
        return Some(Located {
            lat,
            lon,
            mode: SnapMode::Extrapolated,
            segment_index: left.index,
            detail: format!(
                "between_ranges_interpolation: house_number={}, lower_high={}, upper_low={}, frac={:.6}",
                house_number, left.high, right.low, fraction
            ),
        });
    }

    // 3. Nearest endpoint, preferring parity-passing segments when any exist.
    let any_parity = ranged.iter().any(|r| r.parity_ok);
    let nearest = ranged
        .iter()
        .filter(|r| !any_parity || r.parity_ok)
        .flat_map(|r| {
            [
                (r, r.low, r.low_pt, "low"),
                (r, r.high, r.high_pt, "high"),
            ]
        })
        .min_by_key(|(_, number, _, _)| (house_number - number).abs())?;

    let (ranged_ref, endpoint_number, endpoint_pt, side) = nearest;
    Some(Located {
        lat: endpoint_pt.y(),
        lon: endpoint_pt.x(),
        mode: SnapMode::Snapped,
        segment_index: ranged_ref.index,
        detail: format!(
            "nearest_endpoint_snap: house_number={}, endpoint={}, side={}, delta={}",
            house_number,
            endpoint_number,
            side,
            (house_number - endpoint_number).abs()
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(low: i64, high: i64, start: (f64, f64), end: (f64, f64)) -> RoadSegment {
        RoadSegment::new(
            low,
            high,
            Point::new(start.1, start.0),
            Point::new(end.1, end.0),
        )
    }

    #[test]
    fn within_range_interpolates_linearly() {
        let segments = vec![seg(100, 200, (0.0, 0.0), (0.0, 1.0))];
        let located = locate(150, &segments).unwrap();
        assert_eq!(located.mode, SnapMode::Extrapolated);
        assert!((located.lon - 0.5).abs() < 1e-9);
        assert!((located.lat - 0.0).abs() < 1e-9);
    }

    #[test]
    fn tightest_covering_segment_wins() {
        let segments = vec![
            seg(0, 1000, (10.0, 10.0), (11.0, 11.0)),
            seg(100, 200, (0.0, 0.0), (0.0, 1.0)),
        ];
        let located = locate(150, &segments).unwrap();
        assert_eq!(located.segment_index, 1);
    }

    #[test]
    fn between_ranges_uses_gap_fraction() {
        let segments = vec![
            seg(100, 120, (0.0, 0.0), (0.0, 1.0)),
            seg(140, 160, (0.0, 2.0), (0.0, 3.0)),
        ];
        let located = locate(130, &segments).unwrap();
        assert_eq!(located.mode, SnapMode::Extrapolated);
        // halfway between the 120 endpoint (lon 1.0) and the 140 endpoint (lon 2.0)
        assert!((located.lon - 1.5).abs() < 1e-9);
    }

    #[test]
    fn outside_all_ranges_snaps_to_nearest_endpoint() {
        let segments = vec![seg(100, 200, (0.0, 0.0), (0.25, 1.0))];
        let located = locate(500, &segments).unwrap();
        assert_eq!(located.mode, SnapMode::Snapped);
        assert!((located.lon - 1.0).abs() < 1e-9);
        assert!((located.lat - 0.25).abs() < 1e-9);
    }

    #[test]
    fn zero_span_range_uses_midpoint() {
        let segments = vec![seg(100, 100, (0.0, 0.0), (0.0, 1.0))];
        let located = locate(100, &segments).unwrap();
        assert!((located.lon - 0.5).abs() < 1e-9);
    }

    #[test]
    fn reversed_ranges_are_normalized() {
        let segments = vec![seg(200, 100, (0.0, 1.0), (0.0, 0.0))];
        let located = locate(125, &segments).unwrap();
        // 125 sits a quarter of the way up from the 100 end (lon 0.0)
        assert!((located.lon - 0.25).abs() < 1e-9);
    }

    #[test]
    fn parity_mismatch_falls_through_to_snap() {
        let mut segment = seg(100, 200, (0.0, 0.0), (0.0, 1.0));
        segment.step = Some(2);
        let located = locate(151, &[segment]).unwrap();
        assert_eq!(located.mode, SnapMode::Snapped);
        assert!((located.lon - 1.0).abs() < 1e-9);
    }

    #[test]
    fn parity_passing_endpoints_preferred_for_snap() {
        let mut even = seg(100, 120, (0.0, 0.0), (0.0, 1.0));
        even.step = Some(2);
        let mut odd = seg(241, 261, (0.0, 5.0), (0.0, 6.0));
        odd.step = Some(2);
        // 230 is even: the odd-only snap candidates lose to the even segment
        // even though 241 is numerically closer than 120.
        let located = locate(230, &[even, odd]).unwrap();
        assert_eq!(located.segment_index, 0);
        assert!((located.lon - 1.0).abs() < 1e-9);
    }

    #[test]
    fn no_segments_yields_none() {
        assert!(locate(100, &[]).is_none());
    }
}
