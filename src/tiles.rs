use std::{collections::BTreeMap, fs, path::Path};

use geo::Intersects;
use geo_types::{Geometry, MultiPolygon};
use geojson::{FeatureCollection, GeoJson};

use crate::{
    crs::Vector,
    error::{Result, S1ArchError},
};

/// One cell of the output tiling grid, geometry in WGS84.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    pub id: String,
    pub geometry: MultiPolygon<f64>,
}

impl Tile {
    pub fn vector(&self) -> Vector {
        Vector::wgs84(self.geometry.clone())
    }

    pub fn intersects(&self, geometry: &Geometry<f64>) -> bool {
        geometry.intersects(&self.geometry)
    }
}

/// Lookup of grid tiles by area or by id.
pub trait TileGrid {
    /// Tiles intersecting any of `areas`, sorted by id.
    fn tiles_for(&self, areas: &[Vector]) -> Result<Vec<Tile>>;

    /// Tiles in the order of `ids`.
    fn tiles_by_id(&self, ids: &[String]) -> Result<Vec<Tile>>;
}

/// A tiling grid read from a GeoJSON feature collection with a `Name` property per tile.
#[derive(Clone, Debug, Default)]
pub struct GeoJsonTileGrid {
    tiles: BTreeMap<String, Tile>,
}

impl GeoJsonTileGrid {
    pub fn read(path: &Path) -> Result<Self> {
        let grid = Self::from_geojson(&fs::read_to_string(path)?)?;
        log::info!("Read {} grid tiles from {:?}", grid.tiles.len(), path);
        Ok(grid)
    }

    pub fn from_geojson(text: &str) -> Result<Self> {
        let collection = FeatureCollection::try_from(text.parse::<GeoJson>()?)?;

        let mut tiles = BTreeMap::new();
        for feature in collection.features {
            let id = feature
                .property("Name")
                .and_then(|v| v.as_str())
                .map(str::to_owned)
                .ok_or_else(|| S1ArchError::Config("grid tile without 'Name'".into()))?;

            let geometry = match feature.geometry {
                Some(g) => Geometry::<f64>::try_from(g)?,
                None => return Err(S1ArchError::Config(format!("grid tile {} without geometry", id))),
            };
            let geometry = match geometry {
                Geometry::Polygon(p) => MultiPolygon(vec![p]),
                Geometry::MultiPolygon(mp) => mp,
                _ => return Err(S1ArchError::Config(format!("grid tile {} is not an area", id))),
            };

            tiles.insert(id.clone(), Tile { id, geometry });
        }

        Ok(GeoJsonTileGrid { tiles })
    }

    pub fn from_tiles(tiles: Vec<Tile>) -> Self {
        GeoJsonTileGrid {
            tiles: tiles.into_iter().map(|t| (t.id.clone(), t)).collect(),
        }
    }
}

impl TileGrid for GeoJsonTileGrid {
    fn tiles_for(&self, areas: &[Vector]) -> Result<Vec<Tile>> {
        let areas = areas
            .iter()
            .map(|a| a.to_wgs84())
            .collect::<Result<Vec<_>>>()?;

        Ok(self
            .tiles
            .values()
            .filter(|tile| areas.iter().any(|a| tile.intersects(a.geometry())))
            .cloned()
            .collect())
    }

    fn tiles_by_id(&self, ids: &[String]) -> Result<Vec<Tile>> {
        ids.iter()
            .map(|id| {
                self.tiles
                    .get(id)
                    .cloned()
                    .ok_or_else(|| S1ArchError::UnknownTile(id.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::polygon;

    const GRID: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"Name": "32UNA", "EPSG": 32632},
             "geometry": {"type": "Polygon", "coordinates": [[[8,48],[9,48],[9,49],[8,49],[8,48]]]}},
            {"type": "Feature", "properties": {"Name": "32UPA", "EPSG": 32632},
             "geometry": {"type": "Polygon", "coordinates": [[[9,48],[10,48],[10,49],[9,49],[9,48]]]}},
            {"type": "Feature", "properties": {"Name": "33UUP", "EPSG": 32633},
             "geometry": {"type": "Polygon", "coordinates": [[[12,48],[13,48],[13,49],[12,49],[12,48]]]}}
        ]
    }"#;

    #[test]
    fn tiles_by_area_are_sorted() {
        let grid = GeoJsonTileGrid::from_geojson(GRID).unwrap();
        let area = polygon![(x: 8.5, y: 48.2), (x: 9.5, y: 48.2), (x: 9.5, y: 48.4), (x: 8.5, y: 48.4)];

        let ids: Vec<String> = grid
            .tiles_for(&[Vector::wgs84(area)])
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["32UNA", "32UPA"]);
    }

    #[test]
    fn tiles_by_id() {
        let grid = GeoJsonTileGrid::from_geojson(GRID).unwrap();
        let tiles = grid
            .tiles_by_id(&["33UUP".to_string(), "32UNA".to_string()])
            .unwrap();
        assert_eq!(tiles[0].id, "33UUP");
        assert_eq!(tiles[1].id, "32UNA");

        assert!(matches!(
            grid.tiles_by_id(&["99XXX".to_string()]),
            Err(S1ArchError::UnknownTile(_))
        ));
    }
}
