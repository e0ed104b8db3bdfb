//! GeoJSON in and out of the engine
//!
//! Road features are read into plain coordinate polylines for
//! [`build_graph`](plotnav_core::build_graph); routes go back out as
//! `LineString` features.

use geo::{Coord, Geometry, LineString};
use ::geojson::{Feature, FeatureCollection};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::Error;
use plotnav_core::{Coordinate, Route};

/// Order of the two numbers in each GeoJSON position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateOrder {
    /// `[lng, lat]`, as RFC 7946 requires
    #[default]
    LngLat,
    /// `[lat, lng]`, as some map editors export
    LatLng,
    /// Decide from the data: a first value outside ±90 can only be a
    /// longitude, a second value outside ±90 only a latitude's partner
    Detect,
}

/// Road polylines from a GeoJSON `FeatureCollection`.
///
/// `LineString` and `MultiLineString` features become one road per line.
/// Features without geometry are skipped; any other geometry type is an
/// error.
///
/// # Errors
///
/// Malformed JSON or GeoJSON, unsupported geometries, and
/// [`Error::AmbiguousCoordinateOrder`] when `Detect` cannot decide.
pub fn read_roads(text: &str, order: CoordinateOrder) -> Result<Vec<Vec<Coordinate>>, Error> {
    let collection: FeatureCollection = serde_json::from_str(text)?;

    let mut lines: Vec<LineString> = Vec::new();
    for (index, feature) in collection.features.into_iter().enumerate() {
        let Some(geometry) = feature.geometry else {
            warn!("Feature {index} has no geometry, skipping");
            continue;
        };
        let geometry = Geometry::<f64>::try_from(geometry)
            .map_err(|e| Error::GeoJson(format!("feature {index}: {e}")))?;
        match geometry {
            Geometry::LineString(line) => lines.push(line),
            Geometry::MultiLineString(multi) => lines.extend(multi),
            other => {
                return Err(Error::UnsupportedGeometry(format!(
                    "feature {index} is a {}",
                    geometry_name(&other)
                )));
            }
        }
    }

    let order = match order {
        CoordinateOrder::Detect => detect_order(&lines)?,
        fixed => fixed,
    };
    debug!("Read {} road lines as {order:?}", lines.len());

    Ok(lines
        .iter()
        .map(|line| line.coords().map(|&c| to_coordinate(c, order)).collect())
        .collect())
}

/// Route as a GeoJSON `Feature` with `distance_m` and `node_ids` properties.
/// Positions are written `[lng, lat]`.
///
/// # Errors
///
/// Fails only if the feature cannot be assembled from its JSON form.
pub fn route_to_feature(route: &Route) -> Result<Feature, Error> {
    let line = route.to_line_string();
    let geometry = ::geojson::Geometry::new(::geojson::Value::from(&line));

    let value = json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": {
            "distance_m": route.distance(),
            "node_ids": route.node_ids(),
        }
    });

    serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJson(e.to_string()))
}

fn to_coordinate(coord: Coord<f64>, order: CoordinateOrder) -> Coordinate {
    match order {
        CoordinateOrder::LatLng => Coordinate::new(coord.x, coord.y),
        CoordinateOrder::LngLat | CoordinateOrder::Detect => coord.into(),
    }
}

fn detect_order(lines: &[LineString]) -> Result<CoordinateOrder, Error> {
    let coords = || lines.iter().flat_map(LineString::coords);

    let first_is_lng = coords().any(|c| c.x.abs() > 90.0);
    let second_is_lng = coords().any(|c| c.y.abs() > 90.0);
    match (first_is_lng, second_is_lng) {
        (true, false) => Ok(CoordinateOrder::LngLat),
        (false, true) => Ok(CoordinateOrder::LatLng),
        // Nothing to convert
        (false, false) if coords().next().is_none() => Ok(CoordinateOrder::LngLat),
        _ => Err(Error::AmbiguousCoordinateOrder),
    }
}

fn geometry_name(geometry: &Geometry) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROADS_LNG_LAT: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "name": "Main aisle" },
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[123.337212, 10.950012], [123.337300, 10.950100]]
                }
            },
            {
                "type": "Feature",
                "properties": {},
                "geometry": {
                    "type": "MultiLineString",
                    "coordinates": [
                        [[123.3373, 10.9501], [123.3374, 10.9502]],
                        [[123.3375, 10.9503], [123.3376, 10.9504]]
                    ]
                }
            },
            { "type": "Feature", "properties": {}, "geometry": null }
        ]
    }"#;

    #[test]
    fn test_reads_lines_and_multilines() {
        let roads = read_roads(ROADS_LNG_LAT, CoordinateOrder::LngLat).unwrap();
        assert_eq!(roads.len(), 3);
        assert_eq!(roads[0][0], Coordinate::new(10.950012, 123.337212));
        assert_eq!(roads[2][1], Coordinate::new(10.9504, 123.3376));
    }

    #[test]
    fn test_detects_lng_lat() {
        let detected = read_roads(ROADS_LNG_LAT, CoordinateOrder::Detect).unwrap();
        let explicit = read_roads(ROADS_LNG_LAT, CoordinateOrder::LngLat).unwrap();
        assert_eq!(detected, explicit);
    }

    #[test]
    fn test_detects_lat_lng() {
        let text = r#"{"type": "FeatureCollection", "features": [{
            "type": "Feature", "properties": {},
            "geometry": {"type": "LineString", "coordinates": [[10.95, 123.33], [10.96, 123.34]]}
        }]}"#;
        let roads = read_roads(text, CoordinateOrder::Detect).unwrap();
        assert_eq!(roads[0][1], Coordinate::new(10.96, 123.34));
    }

    #[test]
    fn test_ambiguous_order_is_rejected() {
        let text = r#"{"type": "FeatureCollection", "features": [{
            "type": "Feature", "properties": {},
            "geometry": {"type": "LineString", "coordinates": [[10.95, 12.33], [10.96, 12.34]]}
        }]}"#;
        assert!(matches!(
            read_roads(text, CoordinateOrder::Detect),
            Err(Error::AmbiguousCoordinateOrder)
        ));
        // An explicit order is taken at its word
        assert_eq!(
            read_roads(text, CoordinateOrder::LatLng).unwrap()[0][0],
            Coordinate::new(10.95, 12.33)
        );
    }

    #[test]
    fn test_rejects_points() {
        let text = r#"{"type": "FeatureCollection", "features": [{
            "type": "Feature", "properties": {},
            "geometry": {"type": "Point", "coordinates": [123.33, 10.95]}
        }]}"#;
        match read_roads(text, CoordinateOrder::LngLat) {
            Err(Error::UnsupportedGeometry(message)) => assert!(message.contains("Point")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_empty_collection() {
        let text = r#"{"type": "FeatureCollection", "features": []}"#;
        assert!(read_roads(text, CoordinateOrder::Detect).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            read_roads("{not json", CoordinateOrder::LngLat),
            Err(Error::Json(_))
        ));
    }
}
