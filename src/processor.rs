use crate::{
    acquisition::Acquisition,
    archive::{find_scenes, SceneArchive},
    completeness::{verify_completeness, verify_completeness_parallel},
    config::{CatalogConfig, SelectionConfig},
    crs::Vector,
    error::Result,
    filter::SearchFilter,
    local::LocalArchive,
    reference::{AsfCatalog, ReferenceCatalog},
    selection::{no_scenes_found, select_scenes, Aoi},
    stac::StacArchive,
    tiles::{GeoJsonTileGrid, TileGrid},
};

/// Result of a selection run: acquisitions sorted by start, and the covered tiles.
#[derive(Debug)]
pub struct Selection {
    pub scenes: Vec<Acquisition>,
    pub tiles: Vec<String>,
}

/// Selects the scenes covering the configured area and checks that every selected
/// data take group is complete.
pub fn run(config: &SelectionConfig) -> Result<Selection> {
    let grid = GeoJsonTileGrid::read(&config.tile_grid)?;
    let aoi = match (&config.aoi_tiles, &config.aoi_geometry) {
        (Some(ids), _) => Aoi::Tiles(ids.clone()),
        (None, Some(pth)) => Aoi::Geometry(Vector::read_geojson(pth)?),
        (None, None) => Aoi::Discover,
    };
    let filter = search_filter(config);
    let reference = match &config.reference_url {
        Some(url) => AsfCatalog::with_url(url)?,
        None => AsfCatalog::connect()?,
    };

    match &config.catalog {
        CatalogConfig::Local { db_file } => {
            let archive = LocalArchive::open(db_file)?;
            archive.insert(&find_scenes(&config.scene_dir)?)?;

            let db_file = db_file.clone();
            select_and_verify(
                archive,
                move || LocalArchive::open(&db_file),
                &grid,
                &aoi,
                &filter,
                &reference,
                config.workers,
            )
        }
        CatalogConfig::Stac { url, collections } => {
            let archive = StacArchive::open(url, collections.clone())?;

            let (url, collections) = (url.clone(), collections.clone());
            select_and_verify(
                archive,
                move || StacArchive::open(&url, collections.clone()),
                &grid,
                &aoi,
                &filter,
                &reference,
                config.workers,
            )
        }
    }
}

fn search_filter(config: &SelectionConfig) -> SearchFilter {
    let mut filter = SearchFilter::new()
        .product(config.product)
        .acquisition_mode(config.acq_mode);
    filter.sensor = config.sensor.clone();
    filter.mindate = config.mindate;
    filter.maxdate = config.maxdate;
    filter
}

fn select_and_verify<A, F, G, R>(
    mut archive: A,
    open: F,
    grid: &G,
    aoi: &Aoi,
    filter: &SearchFilter,
    reference: &R,
    workers: Option<usize>,
) -> Result<Selection>
where
    A: SceneArchive + 'static,
    F: Fn() -> Result<A> + Send + Sync + 'static,
    G: TileGrid,
    R: ReferenceCatalog + 'static,
{
    let outcome = select_scenes(&archive, grid, aoi, filter).and_then(|(scenes, tiles)| {
        if scenes.is_empty() {
            return Err(no_scenes_found(filter));
        }
        let scenes = Acquisition::identify_many(&scenes)?;

        match workers {
            Some(num_workers) if num_workers > 1 => {
                verify_completeness_parallel(open, reference, &scenes, num_workers)?
            }
            _ => verify_completeness(&archive, reference, &scenes)?,
        }

        Ok(Selection { scenes, tiles })
    });

    archive.close()?;
    outcome
}
