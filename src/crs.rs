#![allow(non_snake_case)]

use std::{fs, path::Path};

use geo::{BoundingRect, MapCoords};
use geo_types::{Coord, Geometry, MultiPolygon, Rect};
use geojson::GeoJson;

use crate::error::{Result, S1ArchError};

pub const WGS84: u32 = 4326;

/// A geometry together with the EPSG code of its coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Vector {
    geometry: Geometry<f64>,
    epsg: u32,
}

impl Vector {
    pub fn new<G: Into<Geometry<f64>>>(geometry: G, epsg: u32) -> Self {
        Vector {
            geometry: geometry.into(),
            epsg,
        }
    }

    pub fn wgs84<G: Into<Geometry<f64>>>(geometry: G) -> Self {
        Self::new(geometry, WGS84)
    }

    /// Reads all polygons of a GeoJSON file (coordinates are WGS84 per RFC 7946).
    pub fn read_geojson(path: &Path) -> Result<Self> {
        let geojson: GeoJson = fs::read_to_string(path)?.parse()?;
        let collection = geojson::quick_collection(&geojson)?;

        let mut polygons = vec![];
        for geometry in collection {
            match geometry {
                Geometry::Polygon(p) => polygons.push(p),
                Geometry::MultiPolygon(mp) => polygons.extend(mp),
                other => {
                    return Err(S1ArchError::InvalidFilterType {
                        key: "vectorobject",
                        message: format!("{:?} in {:?} is not an area", other, path),
                    })
                }
            }
        }

        Ok(Self::wgs84(MultiPolygon(polygons)))
    }

    pub fn geometry(&self) -> &Geometry<f64> {
        &self.geometry
    }

    pub fn epsg(&self) -> u32 {
        self.epsg
    }

    pub fn is_areal(&self) -> bool {
        matches!(
            self.geometry,
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) | Geometry::Rect(_) | Geometry::Triangle(_)
        )
    }

    pub fn to_wgs84(&self) -> Result<Vector> {
        match self.epsg {
            WGS84 => Ok(self.clone()),
            32601..=32660 => Ok(self.from_utm(self.epsg - 32600, true)),
            32701..=32760 => Ok(self.from_utm(self.epsg - 32700, false)),
            other => Err(S1ArchError::UnsupportedCrs(other)),
        }
    }

    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        self.geometry.bounding_rect()
    }

    fn from_utm(&self, zone: u32, north: bool) -> Vector {
        let geometry = self
            .geometry
            .map_coords(move |c| utm_to_lon_lat(c.x, c.y, zone, north));
        Vector::new(geometry, WGS84)
    }
}

// Krueger series, see https://en.wikipedia.org/wiki/Universal_Transverse_Mercator_coordinate_system
fn utm_to_lon_lat(easting: f64, northing: f64, zone: u32, north: bool) -> Coord<f64> {
    let k0_A = 6364.902166165086634; // km
    let β1 = 0.000837732164082144;
    let β2 = 0.00000005906110863719917;
    let β3 = 0.00000000016769911794379754;
    let δ1 = 0.003356551448628875;
    let δ2 = 0.000006571913193172695;
    let δ3 = 0.0000000176774599620756;

    let E0 = 500.0;
    let N0 = if north { 0.0 } else { 10000.0 };

    let ξ = (northing / 1000.0 - N0) / k0_A;
    let η = (easting / 1000.0 - E0) / k0_A;

    let ξʹ = ξ
        - (β1 * (2.0 * ξ).sin() * (2.0 * η).cosh()
            + β2 * (4.0 * ξ).sin() * (4.0 * η).cosh()
            + β3 * (6.0 * ξ).sin() * (6.0 * η).cosh());
    let ηʹ = η
        - (β1 * (2.0 * ξ).cos() * (2.0 * η).sinh()
            + β2 * (4.0 * ξ).cos() * (4.0 * η).sinh()
            + β3 * (6.0 * ξ).cos() * (6.0 * η).sinh());

    let χ = (ξʹ.sin() / ηʹ.cosh()).asin();
    let φ = χ + δ1 * (2.0 * χ).sin() + δ2 * (4.0 * χ).sin() + δ3 * (6.0 * χ).sin();

    let λ0 = ((zone * 6) as f64 - 183.0).to_radians();
    let λ = λ0 + ηʹ.sinh().atan2(ξʹ.cos());

    Coord {
        x: λ.to_degrees(),
        y: φ.to_degrees(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{point, polygon};

    #[test]
    fn central_meridian_on_equator() {
        let c = utm_to_lon_lat(500_000.0, 0.0, 32, true);
        assert!((c.x - 9.0).abs() < 1e-9);
        assert!(c.y.abs() < 1e-9);
    }

    #[test]
    fn reprojects_utm_tile_corner() {
        // 32TNT lower left, roughly 46.9N 7.7E
        let c = utm_to_lon_lat(399_960.0, 5_200_020.0, 32, true);
        assert!((c.x - 7.69).abs() < 0.01, "lon {}", c.x);
        assert!((c.y - 46.94).abs() < 0.01, "lat {}", c.y);

        let south = utm_to_lon_lat(500_000.0, 5_000_000.0, 33, false);
        assert!((south.x - 15.0).abs() < 1e-9);
        assert!(south.y < -44.0 && south.y > -46.0);
    }

    #[test]
    fn bounding_rect_after_reprojection() {
        let tile = polygon![
            (x: 399_960.0, y: 5_200_020.0),
            (x: 509_760.0, y: 5_200_020.0),
            (x: 509_760.0, y: 5_090_220.0),
            (x: 399_960.0, y: 5_090_220.0),
        ];
        let v = Vector::new(tile, 32632).to_wgs84().unwrap();
        assert_eq!(v.epsg(), WGS84);

        let rect = v.bounding_rect().unwrap();
        assert!(rect.min().x > 7.6 && rect.max().x < 9.2);
        assert!(rect.min().y > 45.9 && rect.max().y < 47.0);
    }

    #[test]
    fn unknown_crs_and_non_areal_geometries() {
        let pt = Vector::new(point!(x: 1.0, y: 2.0), 3035);
        assert!(matches!(pt.to_wgs84(), Err(S1ArchError::UnsupportedCrs(3035))));
        assert!(!pt.is_areal());
    }
}
