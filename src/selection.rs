use std::{collections::BTreeSet, path::PathBuf};

use chrono::Duration;
use geo_types::Geometry;

use crate::{
    acquisition::Acquisition,
    archive::SceneArchive,
    crs::Vector,
    error::{Result, S1ArchError},
    filter::SearchFilter,
    product::AcquisitionMode,
    tiles::{Tile, TileGrid},
};

/// How the area of interest is given.
#[derive(Clone, Debug)]
pub enum Aoi {
    Tiles(Vec<String>),
    Geometry(Vector),
    /// Derive the tiles from the footprints of all scenes matching the filter.
    Discover,
}

/// Widening applied to a discovered time range so that the acquisitions just
/// before and after each data take group are selected as well.
pub fn time_margin() -> Duration {
    Duration::minutes(1)
}

/// Selects all scenes needed to cover the area of interest.
/// Returns the scene directories and the ids of the covered tiles.
pub fn select_scenes<A, G>(
    archive: &A,
    grid: &G,
    aoi: &Aoi,
    filter: &SearchFilter,
) -> Result<(Vec<PathBuf>, Vec<String>)>
where
    A: SceneArchive + ?Sized,
    G: TileGrid + ?Sized,
{
    let mut args = filter.clone();
    args.vectorobject = None;
    if let Some(modes) = &args.acquisition_mode {
        args.acquisition_mode = Some(AcquisitionMode::expand_all(modes));
    }

    let tiles = match aoi {
        Aoi::Tiles(ids) => grid.tiles_by_id(ids)?,
        Aoi::Geometry(area) => grid.tiles_for(std::slice::from_ref(area))?,
        Aoi::Discover => {
            let discovered = Acquisition::identify_many(&archive.select(&args)?)?;
            let (first_start, last_stop) = match (
                discovered.iter().map(|a| a.start()).min(),
                discovered.iter().map(|a| a.stop()).max(),
            ) {
                (Some(start), Some(stop)) => (start, stop),
                _ => return Err(no_scenes_found(&args)),
            };

            let footprints: Vec<Vector> = discovered
                .iter()
                .map(|a| Vector::wgs84(a.footprint().clone()))
                .collect();
            let tiles = grid.tiles_for(&footprints)?;

            args.mindate = Some(args.mindate.unwrap_or(first_start) - time_margin());
            args.maxdate = Some(args.maxdate.unwrap_or(last_stop) + time_margin());
            log::info!(
                "{} scenes touch {} tiles, searching {} - {}",
                discovered.len(),
                tiles.len(),
                first_start,
                last_stop
            );
            tiles
        }
    };
    let tile_ids: Vec<String> = match aoi {
        Aoi::Tiles(ids) => ids.clone(),
        _ => tiles.iter().map(|t| t.id.clone()).collect(),
    };

    let mut selection: BTreeSet<PathBuf> = BTreeSet::new();
    for tile in &tiles {
        let mut tile_args = args.clone();
        tile_args.vectorobject = Some(tile.vector());
        let found = archive.select(&tile_args)?;
        log::debug!("{} scenes for tile {}", found.len(), tile.id);
        selection.extend(found);
    }

    let scenes = retain_overlapping(selection, &tiles)?;
    log::info!("Selected {} scenes for {} tiles", scenes.len(), tile_ids.len());
    Ok((scenes, tile_ids))
}

/// The catalog bounding box search over-selects at tile corners, drop what no tile touches.
fn retain_overlapping(selection: BTreeSet<PathBuf>, tiles: &[Tile]) -> Result<Vec<PathBuf>> {
    let mut keep = Vec::with_capacity(selection.len());
    for scene in selection {
        if !scene.exists() {
            log::warn!("Cannot check tile overlap of non-local scene {:?}", scene);
            keep.push(scene);
            continue;
        }

        let acq = Acquisition::identify(&scene)?;
        let footprint = Geometry::Polygon(acq.footprint().clone());
        if tiles.iter().any(|t| t.intersects(&footprint)) {
            keep.push(scene);
        } else {
            log::debug!("Dropping {:?}, it overlaps none of the tiles", scene);
        }
    }
    Ok(keep)
}

/// The no-data condition of an empty search.
pub fn no_scenes_found(filter: &SearchFilter) -> S1ArchError {
    fn show<T: std::fmt::Debug>(val: &Option<T>) -> String {
        match val {
            Some(v) => format!("{:?}", v),
            None => "any".into(),
        }
    }

    S1ArchError::NoScenesFound(format!(
        "No scenes could be found for the following search query:\n \
         sensor:    {}\n \
         product:   {}\n \
         acq. mode: {}\n \
         mindate:   {}\n \
         maxdate:   {}",
        show(&filter.sensor),
        show(&filter.product),
        show(&filter.acquisition_mode),
        show(&filter.mindate),
        show(&filter.maxdate)
    ))
}
