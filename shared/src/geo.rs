use serde::{Deserialize, Serialize};

/// Coordinate reference systems the overlay has to bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Crs {
    /// Spherical web mercator, in meters. The host editor's native system.
    WebMercator,
    /// Geographic longitude/latitude in degrees. What the provider expects.
    Wgs84,
}

impl Crs {
    pub fn code(self) -> &'static str {
        match self {
            // The host still names it by the legacy Google code.
            Crs::WebMercator => "EPSG:900913",
            Crs::Wgs84 => "EPSG:4326",
        }
    }
}

/// A position expressed in some `Crs`. `x` is easting/longitude, `y` is northing/latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Projection capability supplied by the host (or a geometry library).
pub trait CoordinateTransform {
    fn transform(&self, coord: Coordinate, from: Crs, to: Crs) -> Coordinate;
}

impl<F> CoordinateTransform for F
where
    F: Fn(Coordinate, Crs, Crs) -> Coordinate,
{
    fn transform(&self, coord: Coordinate, from: Crs, to: Crs) -> Coordinate {
        self(coord, from, to)
    }
}

/// Converts `coord` only when the systems differ.
pub fn reproject(
    transform: &dyn CoordinateTransform,
    coord: Coordinate,
    from: Crs,
    to: Crs,
) -> Coordinate {
    if from == to {
        coord
    } else {
        transform.transform(coord, from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::{Coordinate, Crs, reproject};
    use std::cell::Cell;

    #[test]
    fn reproject_skips_transform_for_same_crs() {
        let calls = Cell::new(0);
        let transform = |c: Coordinate, _: Crs, _: Crs| {
            calls.set(calls.get() + 1);
            Coordinate::new(c.x + 1.0, c.y + 1.0)
        };

        let out = reproject(&transform, Coordinate::new(3.0, 4.0), Crs::Wgs84, Crs::Wgs84);
        assert_eq!(out, Coordinate::new(3.0, 4.0));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn reproject_delegates_across_crs() {
        let transform = |c: Coordinate, from: Crs, to: Crs| {
            assert_eq!(from, Crs::WebMercator);
            assert_eq!(to, Crs::Wgs84);
            Coordinate::new(c.x / 2.0, c.y / 2.0)
        };

        let out = reproject(
            &transform,
            Coordinate::new(10.0, -8.0),
            Crs::WebMercator,
            Crs::Wgs84,
        );
        assert_eq!(out, Coordinate::new(5.0, -4.0));
    }

    #[test]
    fn crs_codes_match_host_projection_names() {
        assert_eq!(Crs::WebMercator.code(), "EPSG:900913");
        assert_eq!(Crs::Wgs84.code(), "EPSG:4326");
    }
}
