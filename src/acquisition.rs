use std::path::{Path, PathBuf};

use chrono::naive::NaiveDateTime;
use geo_types::Polygon;

use crate::{
    error::{Result, S1ArchError},
    manifest::Manifest,
    product::{AcquisitionMode, Product},
    scene_name::SceneName,
    sensor::Sensor,
};

/// Where an acquisition sits inside its datatake.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlicePosition {
    /// NRT slicing, the position has to be inferred from other catalogs.
    Unsliced,
    Sliced { slice: u32, total: u32 },
}

impl SlicePosition {
    pub fn new(slice: u32, total: u32) -> Option<Self> {
        match (slice, total) {
            (0, 0) => Some(SlicePosition::Unsliced),
            (s, t) if s >= 1 && s <= t => Some(SlicePosition::Sliced { slice: s, total: t }),
            _ => None,
        }
    }
}

/// One Sentinel-1 scene on disk, as identified from its name and manifest.
#[derive(Clone, Debug)]
pub struct Acquisition {
    scene: PathBuf,
    name: SceneName,
    position: SlicePosition,
    footprint: Polygon<f64>,
}

impl PartialEq for Acquisition {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Acquisition {}

impl Acquisition {
    pub fn new(
        scene: PathBuf,
        name: SceneName,
        slice: u32,
        total_slices: u32,
        footprint: Polygon<f64>,
    ) -> Result<Self> {
        if name.start() > name.stop() {
            return Err(S1ArchError::InvalidAcquisition(format!(
                "{}: start after stop",
                name
            )));
        }

        let position = SlicePosition::new(slice, total_slices).ok_or_else(|| {
            S1ArchError::InvalidAcquisition(format!(
                "{}: slice {} of {}",
                name, slice, total_slices
            ))
        })?;

        Ok(Acquisition {
            scene,
            name,
            position,
            footprint,
        })
    }

    /// Reads the scene name and manifest of a SAFE directory.
    pub fn identify(scene: &Path) -> Result<Self> {
        let name = SceneName::from_path(scene)?;
        let manifest = Manifest::read(scene)?;
        log::debug!("Identified {} ({:?})", name, scene);

        Self::new(
            scene.to_path_buf(),
            name,
            manifest.slice_number,
            manifest.total_slices,
            manifest.footprint,
        )
    }

    pub fn identify_many(scenes: &[PathBuf]) -> Result<Vec<Self>> {
        let mut identified = scenes
            .iter()
            .map(|pth| Self::identify(pth))
            .collect::<Result<Vec<_>>>()?;
        identified.sort_by(|a, b| {
            a.start()
                .cmp(&b.start())
                .then_with(|| a.identifier().cmp(b.identifier()))
        });
        Ok(identified)
    }

    pub fn identifier(&self) -> &str {
        self.name.as_str()
    }

    pub fn name(&self) -> &SceneName {
        &self.name
    }

    pub fn scene(&self) -> &Path {
        &self.scene
    }

    pub fn sensor(&self) -> Sensor {
        self.name.sensor()
    }

    pub fn product(&self) -> Product {
        self.name.product()
    }

    pub fn acquisition_mode(&self) -> AcquisitionMode {
        self.name.mode()
    }

    pub fn start(&self) -> NaiveDateTime {
        self.name.start()
    }

    pub fn stop(&self) -> NaiveDateTime {
        self.name.stop()
    }

    pub fn position(&self) -> SlicePosition {
        self.position
    }

    pub fn footprint(&self) -> &Polygon<f64> {
        &self.footprint
    }

    /// The SAFE directory name, used in user facing messages.
    pub fn base_name(&self) -> String {
        self.scene
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.to_string())
    }
}
