mod common;

use std::fs;

use common::*;
use s1_arch::{
    collect_neighbors, verify_completeness, verify_completeness_parallel, Acquisition,
    LocalArchive, S1ArchError, SceneArchive,
};

fn archive_with(dir: &std::path::Path, idx: &[usize]) -> (LocalArchive, Vec<Acquisition>) {
    let scenes = write_datatake(dir, idx);
    let archive = LocalArchive::open(&dir.join("scenes.db")).unwrap();
    archive.insert(&scenes).unwrap();
    (archive, Acquisition::identify_many(&scenes).unwrap())
}

#[test]
fn neighbors_of_a_middle_slice() {
    let dir = tempfile::tempdir().unwrap();
    let (archive, scenes) = archive_with(dir.path(), &[0, 1, 2, 3]);

    let neighbors = collect_neighbors(archive, &scenes[1]).unwrap();
    assert_eq!(
        neighbors,
        vec![scenes[0].scene().to_path_buf(), scenes[2].scene().to_path_buf()]
    );
}

#[test]
fn complete_datatake_passes() {
    let dir = tempfile::tempdir().unwrap();
    let (archive, scenes) = archive_with(dir.path(), &[0, 1, 2, 3]);

    let reference = StaticReference::datatake(&[0, 1, 2, 3]);
    verify_completeness(&archive, &reference, &scenes).unwrap();
}

#[test]
fn first_slice_with_successor_passes() {
    let dir = tempfile::tempdir().unwrap();
    let (archive, scenes) = archive_with(dir.path(), &[0, 1]);

    let reference = StaticReference::datatake(&[0, 1, 2, 3]);
    verify_completeness(&archive, &reference, &scenes[..1]).unwrap();
}

#[test]
fn lonely_middle_slice_misses_both_neighbors() {
    let dir = tempfile::tempdir().unwrap();
    let (archive, scenes) = archive_with(dir.path(), &[1]);

    let reference = StaticReference::datatake(&[0, 1, 2, 3]);
    let err = verify_completeness(&archive, &reference, &scenes).unwrap_err();

    assert!(matches!(err, S1ArchError::IncompleteAcquisitionBatch(_)));
    assert_eq!(
        err.to_string(),
        format!(
            "missing the following scenes:\n - predecessor and successor acquisition for scene {}.SAFE",
            slice_name(1)
        )
    );
}

#[test]
fn nrt_scene_at_datatake_start() {
    let dir = tempfile::tempdir().unwrap();
    let scenes: Vec<_> = [0, 1]
        .iter()
        .map(|&i| {
            write_scene(
                dir.path(),
                &slice_name(i),
                "2021-01-05T05:30:00.000000",
                None,
                FOOTPRINT_32UNA,
            )
        })
        .collect();
    let archive = LocalArchive::open_in_memory().unwrap();
    archive.insert(&scenes).unwrap();
    let scenes = Acquisition::identify_many(&scenes).unwrap();

    // the secondary catalog only knows the first two acquisitions of the data take
    let reference = StaticReference::datatake(&[0, 1]);
    verify_completeness(&archive, &reference, &scenes[..1]).unwrap();
}

#[test]
fn repeated_checks_agree() {
    let dir = tempfile::tempdir().unwrap();
    let (archive, scenes) = archive_with(dir.path(), &[0, 1, 3]);
    let reference = StaticReference::datatake(&[0, 1, 2, 3]);

    let first = verify_completeness(&archive, &reference, &scenes).unwrap_err();
    let second = verify_completeness(&archive, &reference, &scenes).unwrap_err();
    assert_eq!(first.to_string(), second.to_string());

    match first {
        S1ArchError::IncompleteAcquisitionBatch(missing) => {
            assert_eq!(missing.len(), 2);
            assert!(!missing[0].predecessor && missing[0].successor);
            assert!(missing[1].predecessor && !missing[1].successor);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn empty_reference_is_indeterminate_not_incomplete() {
    let dir = tempfile::tempdir().unwrap();
    let (archive, scenes) = archive_with(dir.path(), &[1]);

    let reference = StaticReference { names: vec![] };
    let err = verify_completeness(&archive, &reference, &scenes).unwrap_err();
    assert!(matches!(err, S1ArchError::CompletenessIndeterminate(ref s) if s.len() == 1));
}

#[test]
fn parallel_check_matches_sequential() {
    let dir = tempfile::tempdir().unwrap();
    let (mut archive, scenes) = archive_with(dir.path(), &[0, 1, 3]);
    let reference = StaticReference::datatake(&[0, 1, 2, 3]);

    let sequential = verify_completeness(&archive, &reference, &scenes)
        .unwrap_err()
        .to_string();
    archive.close().unwrap();

    let db_file = dir.path().join("scenes.db");
    let parallel = verify_completeness_parallel(
        move || LocalArchive::open(&db_file),
        &reference,
        &scenes,
        2,
    )
    .unwrap_err()
    .to_string();

    assert_eq!(sequential, parallel);
}

#[test]
fn parallel_check_reports_open_failures() {
    let dir = tempfile::tempdir().unwrap();
    let (_archive, scenes) = archive_with(dir.path(), &[0, 1]);
    let reference = StaticReference::datatake(&[0, 1]);

    let missing_dir = dir.path().join("nowhere");
    let res = verify_completeness_parallel(
        move || {
            fs::read_dir(&missing_dir)?;
            LocalArchive::open(&missing_dir.join("scenes.db"))
        },
        &reference,
        &scenes,
        2,
    );
    assert!(matches!(res, Err(S1ArchError::Io(_))));
}
