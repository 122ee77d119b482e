use std::{fs, path::Path, path::PathBuf};

use chrono::naive::NaiveDateTime;
use serde::Deserialize;

use crate::{
    error::{Result, S1ArchError},
    product::{AcquisitionMode, Product},
    sensor::Sensor,
};

/// Where scenes are looked up.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub enum CatalogConfig {
    /// SQLite database, filled with all scenes found under the scene directory.
    Local { db_file: PathBuf },
    Stac { url: String, collections: Vec<String> },
}

/// A scene selection run, read from a RON file.
///
/// ```text
/// SelectionConfig(
///     scene_dir: "/data/s1",
///     catalog: Local(db_file: "/data/s1/scenes.db"),
///     tile_grid: "/data/grid.geojson",
///     aoi_tiles: Some(["32TNS", "32TPS"]),
///     sensor: Some(["S1A"]),
///     product: "GRD",
///     acq_mode: "IW",
///     mindate: Some("2021-01-05T00:00:00"),
///     maxdate: Some("2021-01-06T00:00:00"),
/// )
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct SelectionConfig {
    pub scene_dir: PathBuf,
    pub catalog: CatalogConfig,
    pub tile_grid: PathBuf,
    #[serde(default)]
    pub aoi_tiles: Option<Vec<String>>,
    /// GeoJSON file with the area of interest, used when no tiles are given.
    #[serde(default)]
    pub aoi_geometry: Option<PathBuf>,
    #[serde(default)]
    pub sensor: Option<Vec<Sensor>>,
    pub product: Product,
    pub acq_mode: AcquisitionMode,
    #[serde(default)]
    pub mindate: Option<NaiveDateTime>,
    #[serde(default)]
    pub maxdate: Option<NaiveDateTime>,
    /// Secondary catalog search endpoint, ASF if not set.
    #[serde(default)]
    pub reference_url: Option<String>,
    /// Threads used for the completeness check, sequential if not set.
    #[serde(default)]
    pub workers: Option<usize>,
}

pub fn load_config(path: &Path) -> Result<SelectionConfig> {
    let text = fs::read_to_string(path)?;
    let config: SelectionConfig = ron::from_str(&text)?;

    if let (Some(min), Some(max)) = (config.mindate, config.maxdate) {
        if min > max {
            return Err(S1ArchError::Config(format!(
                "{:?}: mindate {} after maxdate {}",
                path, min, max
            )));
        }
    }
    if config.aoi_tiles.is_some() && config.aoi_geometry.is_some() {
        return Err(S1ArchError::Config(format!(
            "{:?}: aoi_tiles and aoi_geometry are exclusive",
            path
        )));
    }

    log::debug!("Loaded config {:?}", path);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_local_catalog_config() {
        let file = write_config(
            r#"SelectionConfig(
                scene_dir: "/data/s1",
                catalog: Local(db_file: "/data/s1/scenes.db"),
                tile_grid: "/data/grid.geojson",
                aoi_tiles: Some(["32TNS"]),
                sensor: Some(["S1A", "S1B"]),
                product: "GRD",
                acq_mode: "IW",
                mindate: Some("2021-01-05T00:00:00"),
            )"#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(
            config.catalog,
            CatalogConfig::Local {
                db_file: "/data/s1/scenes.db".into()
            }
        );
        assert_eq!(config.sensor, Some(vec![Sensor::S1A, Sensor::S1B]));
        assert_eq!(config.acq_mode, AcquisitionMode::IW);
        assert!(config.maxdate.is_none());
        assert!(config.workers.is_none());
    }

    #[test]
    fn rejects_inverted_dates() {
        let file = write_config(
            r#"SelectionConfig(
                scene_dir: "/data/s1",
                catalog: Stac(url: "http://localhost/stac", collections: ["s1"]),
                tile_grid: "/data/grid.geojson",
                product: "SLC",
                acq_mode: "SM",
                mindate: Some("2021-01-06T00:00:00"),
                maxdate: Some("2021-01-05T00:00:00"),
            )"#,
        );

        assert!(matches!(
            load_config(file.path()),
            Err(S1ArchError::Config(_))
        ));
    }
}
