//! Spherical distance and bearing primitives, plus a local tangent-plane
//! projection for road-scale segments.
//!
//! Point-to-point distances are always great-circle (haversine). The flat
//! approximation is only used inside [`project_onto_segment`], where the
//! segment is short enough (well under a kilometre) for it to hold.

use crate::{Meters, model::Coordinate};

/// Sphere radius used by every distance computation in the crate
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

const METERS_PER_DEGREE: f64 = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;

/// Haversine great-circle distance in meters.
pub fn distance_meters(a: Coordinate, b: Coordinate) -> Meters {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.min(1.0).sqrt().asin()
}

/// Initial great-circle bearing from `a` to `b` in degrees, `[0, 360)`.
/// 0 is due north, increasing clockwise.
pub fn bearing_degrees(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let y = dlng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlng.cos();

    normalize_degrees(y.atan2(x).to_degrees())
}

/// Wraps an angle into `[0, 360)`.
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid may round tiny negative inputs up to exactly 360
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Wraps an angle into `(-180, 180]`.
pub fn normalize_signed_degrees(angle: f64) -> f64 {
    let wrapped = normalize_degrees(angle);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Result of projecting a point onto a segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentProjection {
    /// Position along the segment, clamped to `[0, 1]`
    pub t: f64,
    /// Distance from the point to the segment in meters
    pub distance: Meters,
    /// Projected point on the segment
    pub point: Coordinate,
}

/// Projects `p` onto the segment `a`–`b`.
///
/// Uses an equirectangular plane centred on `a`'s latitude. `t` is clamped,
/// so points beyond either end project onto that endpoint. A zero-length
/// segment projects everything onto `a`.
pub fn project_onto_segment(p: Coordinate, a: Coordinate, b: Coordinate) -> SegmentProjection {
    let cos_lat = a.lat.to_radians().cos();

    let bx = (b.lng - a.lng) * cos_lat * METERS_PER_DEGREE;
    let by = (b.lat - a.lat) * METERS_PER_DEGREE;
    let px = (p.lng - a.lng) * cos_lat * METERS_PER_DEGREE;
    let py = (p.lat - a.lat) * METERS_PER_DEGREE;

    let len_sq = bx * bx + by * by;
    if len_sq <= f64::EPSILON {
        return SegmentProjection {
            t: 0.0,
            distance: px.hypot(py),
            point: a,
        };
    }

    let t = ((px * bx + py * by) / len_sq).clamp(0.0, 1.0);
    let qx = t * bx;
    let qy = t * by;

    SegmentProjection {
        t,
        distance: (px - qx).hypot(py - qy),
        point: Coordinate::new(a.lat + t * (b.lat - a.lat), a.lng + t * (b.lng - a.lng)),
    }
}

/// Coordinate displaced from `origin` by the given east/north offsets in meters,
/// on the same local plane [`project_onto_segment`] uses.
pub fn offset_meters(origin: Coordinate, east: Meters, north: Meters) -> Coordinate {
    let cos_lat = origin.lat.to_radians().cos();
    Coordinate::new(
        origin.lat + north / METERS_PER_DEGREE,
        origin.lng + east / (METERS_PER_DEGREE * cos_lat),
    )
}
