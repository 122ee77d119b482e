use serde_with::{DeserializeFromStr, SerializeDisplay};
use strum::{Display, EnumString};

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    DeserializeFromStr,
    SerializeDisplay,
)]
pub enum Sensor {
    #[strum(serialize = "S1A")]
    S1A,
    #[strum(serialize = "S1B")]
    S1B,
    #[strum(serialize = "S1C")]
    S1C,
    #[strum(serialize = "S1D")]
    S1D,
}

impl Sensor {
    /// Value of the STAC `platform` property.
    pub fn stac_platform(&self) -> &'static str {
        match *self {
            Sensor::S1A => "sentinel-1a",
            Sensor::S1B => "sentinel-1b",
            Sensor::S1C => "sentinel-1c",
            Sensor::S1D => "sentinel-1d",
        }
    }

    /// Platform name used by the ASF search API.
    pub fn asf_platform(&self) -> &'static str {
        match *self {
            Sensor::S1A => "Sentinel-1A",
            Sensor::S1B => "Sentinel-1B",
            Sensor::S1C => "Sentinel-1C",
            Sensor::S1D => "Sentinel-1D",
        }
    }
}
