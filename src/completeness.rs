use std::sync::Arc;

use chrono::naive::NaiveDateTime;
use crossbeam_channel::{bounded, unbounded};

use crate::{
    acquisition::{Acquisition, SlicePosition},
    archive::SceneArchive,
    error::{Indeterminate, MissingNeighbors, Result, S1ArchError},
    neighbors::{buffer_time, neighbor_buffer, neighbor_filter},
    reference::ReferenceCatalog,
    scene_name::SceneName,
};

/// Outcome of checking one acquisition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SceneCheck {
    Complete,
    Missing(MissingNeighbors),
    Indeterminate(Indeterminate),
}

#[derive(Clone, Copy, Debug)]
struct Expected {
    predecessor: bool,
    successor: bool,
}

impl Expected {
    fn group_size(&self) -> usize {
        1 + self.predecessor as usize + self.successor as usize
    }
}

/// Checks that the predecessor and successor of every scene can be found in `archive`,
/// unless the scene starts or ends its data take. Suspected gaps are confirmed against
/// `reference`; all confirmed gaps are reported together.
pub fn verify_completeness<A, R>(archive: &A, reference: &R, scenes: &[Acquisition]) -> Result<()>
where
    A: SceneArchive + ?Sized,
    R: ReferenceCatalog,
{
    let checks = scenes
        .iter()
        .map(|scene| check_scene(archive, reference, scene))
        .collect::<Result<Vec<_>>>()?;
    summarize(checks)
}

/// Same as [`verify_completeness`], spread over `num_workers` threads that each open
/// their own catalog connection through `open`.
pub fn verify_completeness_parallel<A, F, R>(
    open: F,
    reference: &R,
    scenes: &[Acquisition],
    num_workers: usize,
) -> Result<()>
where
    A: SceneArchive + 'static,
    F: Fn() -> Result<A> + Send + Sync + 'static,
    R: ReferenceCatalog + 'static,
{
    if scenes.is_empty() {
        return Ok(());
    }
    let num_workers = num_workers.clamp(1, scenes.len());

    let open = Arc::new(open);
    let (to_checker, needs_checked) = bounded(scenes.len());
    let (to_collector, checked) = unbounded();

    let pool = threadpool::ThreadPool::with_name("Completeness Check".to_owned(), num_workers);

    for _ in 0..num_workers {
        let open = open.clone();
        let reference = reference.clone();
        let needs_checked = needs_checked.clone();
        let to_collector = to_collector.clone();

        pool.execute(move || {
            let mut archive: Option<A> = None;

            for (idx, scene) in needs_checked {
                let res = match archive.take().map_or_else(|| (*open)(), Ok) {
                    Ok(opened) => {
                        let res = check_scene(&opened, &reference, &scene);
                        archive = Some(opened);
                        res
                    }
                    Err(err) => {
                        log::error!("Error opening catalog: {}", err);
                        Err(err)
                    }
                };

                if to_collector.send((idx, res)).is_err() {
                    break;
                }
            }

            if let Some(mut archive) = archive {
                if let Err(err) = archive.close() {
                    log::error!("Error closing catalog: {}", err);
                }
            }
        });
    }

    for (idx, scene) in scenes.iter().cloned().enumerate() {
        to_checker
            .send((idx, scene))
            .map_err(|e| S1ArchError::Worker(e.to_string()))?;
    }
    drop(to_checker);
    drop(to_collector);

    let mut results: Vec<(usize, Result<SceneCheck>)> = checked.iter().collect();
    pool.join();

    if results.len() != scenes.len() {
        return Err(S1ArchError::Worker(format!(
            "{} of {} completeness checks did not finish",
            scenes.len() - results.len(),
            scenes.len()
        )));
    }
    results.sort_by_key(|(idx, _)| *idx);

    let checks = results
        .into_iter()
        .map(|(_, res)| res)
        .collect::<Result<Vec<_>>>()?;
    summarize(checks)
}

fn summarize(checks: Vec<SceneCheck>) -> Result<()> {
    let mut missing = vec![];
    let mut indeterminate = vec![];
    for check in checks {
        match check {
            SceneCheck::Complete => {}
            SceneCheck::Missing(m) => missing.push(m),
            SceneCheck::Indeterminate(i) => indeterminate.push(i),
        }
    }

    if !missing.is_empty() {
        if !indeterminate.is_empty() {
            log::warn!(
                "{} further scenes could not be checked for completeness",
                indeterminate.len()
            );
        }
        let err = S1ArchError::IncompleteAcquisitionBatch(missing);
        log::error!("{}", err);
        Err(err)
    } else if !indeterminate.is_empty() {
        let err = S1ArchError::CompletenessIndeterminate(indeterminate);
        log::warn!("{}", err);
        Err(err)
    } else {
        Ok(())
    }
}

/// Checks one acquisition against the local catalog, consulting `reference` where
/// local information is not sufficient.
pub fn check_scene<A, R>(archive: &A, reference: &R, scene: &Acquisition) -> Result<SceneCheck>
where
    A: SceneArchive + ?Sized,
    R: ReferenceCatalog,
{
    let (start, stop) = buffer_time(scene.start(), scene.stop(), neighbor_buffer());
    let mut expected = Expected {
        predecessor: true,
        successor: true,
    };
    let mut ref_extent: Option<(NaiveDateTime, NaiveDateTime)> = None;
    // an unknown position still allows a decision once both neighbors are found locally
    let mut ref_failure: Option<String> = None;

    match scene.position() {
        SlicePosition::Unsliced => match reference_extent(reference, scene, start, stop) {
            Ok((ref_start_min, ref_stop_max)) => {
                if ref_start_min == scene.start() {
                    expected.predecessor = false;
                }
                if ref_stop_max == scene.stop() {
                    expected.successor = false;
                }
                ref_extent = Some((ref_start_min, ref_stop_max));
            }
            Err(reason) => ref_failure = Some(reason),
        },
        SlicePosition::Sliced { slice, total } => {
            if slice == 1 {
                expected.predecessor = false;
            }
            if slice == total {
                expected.successor = false;
            }
        }
    }

    let group = archive
        .select(&neighbor_filter(scene))?
        .iter()
        .map(|pth| SceneName::from_path(pth))
        .collect::<Result<Vec<_>>>()?;

    if group.len() >= expected.group_size() {
        log::debug!(
            "{} complete with {} of {} group members",
            scene.identifier(),
            group.len(),
            expected.group_size()
        );
        return Ok(SceneCheck::Complete);
    }

    let extent = match (ref_extent, ref_failure) {
        (Some(extent), _) => Ok(extent),
        (None, Some(reason)) => Err(reason),
        (None, None) => reference_extent(reference, scene, start, stop),
    };
    let (ref_start_min, ref_stop_max) = match extent {
        Ok(extent) => extent,
        Err(reason) => return Ok(indeterminate(scene, reason)),
    };
    let start_min = group
        .iter()
        .map(|n| n.start())
        .min()
        .unwrap_or_else(|| scene.start());
    let stop_max = group
        .iter()
        .map(|n| n.stop())
        .max()
        .unwrap_or_else(|| scene.stop());

    let predecessor = expected.predecessor && ref_start_min < start && start < start_min;
    let successor = expected.successor && stop_max < stop && stop < ref_stop_max;

    if predecessor || successor {
        let missing = MissingNeighbors {
            scene: scene.base_name(),
            predecessor,
            successor,
        };
        log::warn!("Missing {}", missing);
        Ok(SceneCheck::Missing(missing))
    } else {
        Ok(SceneCheck::Complete)
    }
}

fn indeterminate(scene: &Acquisition, reason: String) -> SceneCheck {
    log::warn!("Cannot check completeness of {}: {}", scene.identifier(), reason);
    SceneCheck::Indeterminate(Indeterminate {
        scene: scene.base_name(),
        reason,
    })
}

/// Earliest start and latest stop of the reference acquisitions around `scene`.
fn reference_extent<R: ReferenceCatalog>(
    reference: &R,
    scene: &Acquisition,
    start: NaiveDateTime,
    stop: NaiveDateTime,
) -> std::result::Result<(NaiveDateTime, NaiveDateTime), String> {
    let ids = reference
        .search(
            scene.sensor(),
            scene.product(),
            scene.acquisition_mode(),
            start,
            stop,
        )
        .map_err(|err| format!("reference catalog unavailable ({})", err))?;

    let names: Vec<SceneName> = ids
        .iter()
        .filter_map(|id| match SceneName::parse(id) {
            Ok(name) => Some(name),
            Err(err) => {
                log::warn!("Ignoring reference record: {}", err);
                None
            }
        })
        .collect();

    match (
        names.iter().map(|n| n.start()).min(),
        names.iter().map(|n| n.stop()).max(),
    ) {
        (Some(start_min), Some(stop_max)) => Ok((start_min, stop_max)),
        _ => Err("reference catalog has no matching acquisitions".into()),
    }
}
