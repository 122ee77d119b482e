use std::path::PathBuf;

use chrono::{naive::NaiveDateTime, Duration};

use crate::{
    acquisition::Acquisition, archive::SceneArchive, error::Result, filter::SearchFilter,
    scene_name::SceneName,
};

/// Gap tolerated between consecutive acquisitions of one data take.
pub fn neighbor_buffer() -> Duration {
    Duration::seconds(2)
}

pub fn buffer_time(
    start: NaiveDateTime,
    stop: NaiveDateTime,
    buffer: Duration,
) -> (NaiveDateTime, NaiveDateTime) {
    (start - buffer, stop + buffer)
}

/// Search for the acquisitions adjacent to `scene`: same sensor, product and mode,
/// overlapping its buffered acquisition period.
pub fn neighbor_filter(scene: &Acquisition) -> SearchFilter {
    let (start, stop) = buffer_time(scene.start(), scene.stop(), neighbor_buffer());
    SearchFilter::new()
        .sensor(scene.sensor())
        .product(scene.product())
        .acquisition_mode(scene.acquisition_mode())
        .mindate(start)
        .maxdate(stop)
        .date_strict(false)
}

/// Neighboring acquisitions of `scene` in its data take. Consumes and closes the archive.
pub fn collect_neighbors<A: SceneArchive>(mut archive: A, scene: &Acquisition) -> Result<Vec<PathBuf>> {
    let selected = archive.select(&neighbor_filter(scene));
    archive.close()?;

    let neighbors: Vec<PathBuf> = selected?
        .into_iter()
        .filter(|pth| match SceneName::from_path(pth) {
            Ok(name) => name.as_str() != scene.identifier(),
            Err(_) => true,
        })
        .collect();

    log::debug!("{} neighbors for {}", neighbors.len(), scene.identifier());
    Ok(neighbors)
}
