use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use chrono::naive::NaiveDateTime;

use crate::{
    error::Result,
    manifest::read_processing_time,
    scene_name::{IdentitySignature, SceneName},
};

/// Keeps only the most recently processed version of every acquisition.
pub fn filter_duplicates(scenes: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
    resolve(scenes, read_processing_time)
}

fn resolve<F>(mut scenes: Vec<PathBuf>, processing_time: F) -> Result<Vec<PathBuf>>
where
    F: Fn(&Path) -> Result<NaiveDateTime>,
{
    scenes.sort();
    scenes.dedup();

    let mut groups: BTreeMap<IdentitySignature, Vec<PathBuf>> = BTreeMap::new();
    for scene in scenes {
        let identity = SceneName::from_path(&scene)?.identity();
        groups.entry(identity).or_default().push(scene);
    }

    let mut keep = Vec::with_capacity(groups.len());
    for (identity, group) in groups {
        if group.len() == 1 {
            keep.extend(group);
            continue;
        }

        let mut latest: Option<(NaiveDateTime, PathBuf)> = None;
        for scene in group {
            let tproc = processing_time(&scene)?;
            match &latest {
                Some((t, _)) if *t >= tproc => {
                    log::debug!("Discarding older duplicate {:?}", scene);
                }
                _ => latest = Some((tproc, scene)),
            }
        }

        if let Some((tproc, scene)) = latest {
            log::info!(
                "Keeping {:?} processed {} for {} {}",
                scene,
                tproc,
                identity.token,
                identity.start
            );
            keep.push(scene);
        }
    }

    keep.sort();
    Ok(keep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene_name::TIME_FORMAT;
    use std::collections::HashMap;

    const BASE: &str = "S1A_IW_GRDH_1SDV_20210105T052143_20210105T052208_036003_043842";

    fn scene(checksum: &str) -> PathBuf {
        PathBuf::from(format!("/data/{}_{}.SAFE", BASE, checksum))
    }

    fn t(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIME_FORMAT).unwrap()
    }

    #[test]
    fn keeps_latest_processing() {
        let times: HashMap<PathBuf, NaiveDateTime> = vec![
            (scene("AAAA"), t("20210105T080000")),
            (scene("BBBB"), t("20210301T120000")),
            (scene("CCCC"), t("20210201T000000")),
        ]
        .into_iter()
        .collect();
        let other =
            PathBuf::from("/data/S1A_IW_GRDH_1SDV_20210105T052208_20210105T052233_036003_043842_1111.SAFE");

        let mut input: Vec<PathBuf> = times.keys().cloned().collect();
        input.push(other.clone());

        let kept = resolve(input, |p| Ok(times[p])).unwrap();
        assert_eq!(kept, vec![scene("BBBB"), other]);
    }

    #[test]
    fn ties_keep_first_in_sorted_order() {
        let same = t("20210105T080000");
        let kept = resolve(vec![scene("BBBB"), scene("AAAA")], |_| Ok(same)).unwrap();
        assert_eq!(kept, vec![scene("AAAA")]);
    }

    #[test]
    fn singletons_need_no_manifest() {
        let kept = resolve(vec![scene("AAAA")], |p| {
            panic!("no manifest lookup expected for {:?}", p)
        })
        .unwrap();
        assert_eq!(kept, vec![scene("AAAA")]);
    }
}
