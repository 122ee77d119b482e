use std::{fmt, path::Path};

use chrono::naive::NaiveDateTime;

use crate::{
    error::{Result, S1ArchError},
    product::{AcquisitionMode, Product},
    sensor::Sensor,
};

pub const TIME_FORMAT: &str = "%Y%m%dT%H%M%S";

// MMM_BB_TTTR_LFPP_YYYYMMDDTHHMMSS_YYYYMMDDTHHMMSS_OOOOOO_DDDDDD_CCCC[_SUFFIX]
const NAME_LEN: usize = 67;
const SEPARATORS: [usize; 8] = [3, 6, 11, 16, 32, 48, 55, 62];

/// The parts of a canonical Sentinel-1 SAFE name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SceneName {
    name: String,
    sensor: Sensor,
    mode: AcquisitionMode,
    product: Product,
    start: NaiveDateTime,
    stop: NaiveDateTime,
    orbit: u32,
    datatake: String,
}

/// Key under which reprocessed versions of the same acquisition collide.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentitySignature {
    pub token: String,
    pub start: NaiveDateTime,
    pub stop: NaiveDateTime,
}

impl SceneName {
    pub fn parse(name: &str) -> Result<Self> {
        let base = name.rsplit('/').next().unwrap_or(name);
        let base = base
            .strip_suffix(".SAFE")
            .or_else(|| base.strip_suffix(".zip"))
            .unwrap_or(base);

        let invalid = |reason: &'static str| S1ArchError::InvalidSceneName {
            name: name.to_owned(),
            reason,
        };

        if base.len() < NAME_LEN || !base.is_ascii() {
            return Err(invalid("unexpected length"));
        }
        // product variants append a suffix, e.g. `_COG`
        if base.len() > NAME_LEN && !base[NAME_LEN..].starts_with('_') {
            return Err(invalid("unexpected length"));
        }
        let bytes = base.as_bytes();
        if SEPARATORS.iter().any(|i| bytes[*i] != b'_') {
            return Err(invalid("misplaced separator"));
        }

        let sensor = base[0..3]
            .parse::<Sensor>()
            .map_err(|_| invalid("unknown sensor"))?;
        let mode = base[4..6]
            .parse::<AcquisitionMode>()
            .map_err(|_| invalid("unknown acquisition mode"))?;
        let product = base[7..10]
            .parse::<Product>()
            .map_err(|_| invalid("unknown product type"))?;
        let start = NaiveDateTime::parse_from_str(&base[17..32], TIME_FORMAT)
            .map_err(|_| invalid("malformed start time"))?;
        let stop = NaiveDateTime::parse_from_str(&base[33..48], TIME_FORMAT)
            .map_err(|_| invalid("malformed stop time"))?;
        let orbit = base[49..55]
            .parse::<u32>()
            .map_err(|_| invalid("malformed orbit number"))?;
        let datatake = &base[56..62];
        if !datatake.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid("malformed datatake id"));
        }

        Ok(SceneName {
            name: base.to_owned(),
            sensor,
            mode,
            product,
            start,
            stop,
            orbit,
            datatake: datatake.to_uppercase(),
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let fname = path
            .file_name()
            .map(|f| f.to_string_lossy())
            .ok_or_else(|| S1ArchError::InvalidSceneName {
                name: format!("{:?}", path),
                reason: "no file name",
            })?;
        Self::parse(&fname)
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn sensor(&self) -> Sensor {
        self.sensor
    }

    pub fn mode(&self) -> AcquisitionMode {
        self.mode
    }

    pub fn product(&self) -> Product {
        self.product
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn stop(&self) -> NaiveDateTime {
        self.stop
    }

    pub fn orbit(&self) -> u32 {
        self.orbit
    }

    /// Six digit uppercase hex datatake id, as written in the name.
    pub fn datatake_hex(&self) -> &str {
        &self.datatake
    }

    pub fn identity(&self) -> IdentitySignature {
        IdentitySignature {
            token: self.name[0..16].to_owned(),
            start: self.start,
            stop: self.stop,
        }
    }
}

impl fmt::Display for SceneName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
