/**************************************************************************************************
 *                                           Public API
 *************************************************************************************************/
pub use crate::{
    acquisition::{Acquisition, SlicePosition},
    archive::{find_scenes, SceneArchive},
    completeness::{check_scene, verify_completeness, verify_completeness_parallel, SceneCheck},
    config::{load_config, CatalogConfig, SelectionConfig},
    crs::{Vector, WGS84},
    duplicates::filter_duplicates,
    error::{Indeterminate, MissingNeighbors, Result, S1ArchError},
    filter::{FilterExpr, SearchFilter},
    local::LocalArchive,
    manifest::{read_processing_time, Manifest, MANIFEST_FNAME},
    neighbors::{buffer_time, collect_neighbors, neighbor_buffer, neighbor_filter},
    processor::{run, Selection},
    product::{AcquisitionMode, Product},
    reference::{AsfCatalog, ReferenceCatalog, ASF_SEARCH_URL},
    retry::RetryPolicy,
    scene_name::{IdentitySignature, SceneName, TIME_FORMAT},
    selection::{no_scenes_found, select_scenes, time_margin, Aoi},
    sensor::Sensor,
    stac::StacArchive,
    tiles::{GeoJsonTileGrid, Tile, TileGrid},
};
/**************************************************************************************************
 *                                      Private Implementation
 *************************************************************************************************/
mod acquisition;
mod archive;
mod completeness;
mod config;
mod crs;
mod duplicates;
mod error;
mod filter;
mod local;
mod manifest;
mod neighbors;
mod processor;
mod product;
mod reference;
mod retry;
mod scene_name;
mod selection;
mod sensor;
mod stac;
mod tiles;
