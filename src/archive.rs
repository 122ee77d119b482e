use std::{
    fs::read_dir,
    path::{Path, PathBuf},
};

use crate::{
    duplicates::filter_duplicates,
    error::{Result, S1ArchError},
    filter::SearchFilter,
};

/// A scene catalog connection. Connections are opened by the constructor of the
/// implementing type and must be closed exactly once; implementors also close on drop.
pub trait SceneArchive {
    /// Scene directories matching `filter`, reprocessed duplicates resolved.
    fn select(&self, filter: &SearchFilter) -> Result<Vec<PathBuf>>;

    fn close(&mut self) -> Result<()>;
}

/// Turns catalog locations into local scene directories, honoring `check_exist`.
pub(crate) fn resolve_local(locations: Vec<PathBuf>, check_exist: bool) -> Result<Vec<PathBuf>> {
    let mut out = Vec::with_capacity(locations.len());
    for pth in locations {
        if pth.exists() {
            out.push(pth.canonicalize()?);
        } else if check_exist {
            log::error!("Scene does not exist locally: {:?}", pth);
            return Err(S1ArchError::MissingLocalScene(pth));
        } else {
            log::debug!("Passing through non-local scene {:?}", pth);
            out.push(pth);
        }
    }

    filter_duplicates(out)
}

/// Recursively collects the Sentinel-1 `.SAFE` directories below `root`.
pub fn find_scenes(root: &Path) -> Result<Vec<PathBuf>> {
    let mut to_ret = vec![];
    let mut dirs = vec![root.to_path_buf()];

    while let Some(dir) = dirs.pop() {
        let read_dir = match read_dir(&dir) {
            Ok(read_dir) => read_dir,
            Err(err) => {
                log::error!("Error reading directory: {:?} : {}", dir, err);
                continue;
            }
        };

        for entry_res in read_dir {
            let entry = match entry_res {
                Ok(entry) => entry,
                Err(err) => {
                    log::error!("Error reading directory entry: {}", err);
                    continue;
                }
            };

            let pth = entry.path();
            if !pth.is_dir() {
                continue;
            }

            let fname = entry.file_name().to_string_lossy().into_owned();
            if fname.starts_with("S1") && fname.ends_with(".SAFE") {
                to_ret.push(pth);
            } else {
                dirs.push(pth);
            }
        }
    }

    to_ret.sort();
    log::info!("Found {} scenes below {:?}", to_ret.len(), root);
    Ok(to_ret)
}
