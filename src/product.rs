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
pub enum Product {
    #[strum(serialize = "GRD")]
    GRD,
    #[strum(serialize = "SLC")]
    SLC,
}

impl Product {
    /// Processing levels the ASF search API files this product under.
    pub fn asf_processing_levels(&self) -> Vec<&'static str> {
        match *self {
            Product::GRD => vec!["GRD_HD", "GRD_MD", "GRD_MS", "GRD_HS", "GRD_FD"],
            Product::SLC => vec!["SLC"],
        }
    }
}

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
pub enum AcquisitionMode {
    #[strum(serialize = "IW")]
    IW,
    #[strum(serialize = "EW")]
    EW,
    #[strum(serialize = "WV")]
    WV,
    /// Stripmap, which is acquired in one of the beams S1..S6.
    #[strum(serialize = "SM")]
    SM,
    #[strum(serialize = "S1")]
    S1,
    #[strum(serialize = "S2")]
    S2,
    #[strum(serialize = "S3")]
    S3,
    #[strum(serialize = "S4")]
    S4,
    #[strum(serialize = "S5")]
    S5,
    #[strum(serialize = "S6")]
    S6,
}

const STRIPMAP_BEAMS: [AcquisitionMode; 6] = [
    AcquisitionMode::S1,
    AcquisitionMode::S2,
    AcquisitionMode::S3,
    AcquisitionMode::S4,
    AcquisitionMode::S5,
    AcquisitionMode::S6,
];

impl AcquisitionMode {
    /// The modes that actually appear in scene names and catalogs.
    pub fn expand(&self) -> Vec<AcquisitionMode> {
        match *self {
            AcquisitionMode::SM => STRIPMAP_BEAMS.to_vec(),
            mode => vec![mode],
        }
    }

    pub fn expand_all(modes: &[AcquisitionMode]) -> Vec<AcquisitionMode> {
        let mut expanded: Vec<AcquisitionMode> = vec![];
        for mode in modes.iter().flat_map(|m| m.expand()) {
            if !expanded.contains(&mode) {
                expanded.push(mode);
            }
        }
        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stripmap_expands_to_beams() {
        assert_eq!(AcquisitionMode::SM.expand().len(), 6);
        assert_eq!(AcquisitionMode::IW.expand(), vec![AcquisitionMode::IW]);
        assert_eq!(
            AcquisitionMode::expand_all(&[AcquisitionMode::S2, AcquisitionMode::SM]),
            vec![
                AcquisitionMode::S2,
                AcquisitionMode::S1,
                AcquisitionMode::S3,
                AcquisitionMode::S4,
                AcquisitionMode::S5,
                AcquisitionMode::S6,
            ]
        );
    }

    #[test]
    fn grd_covers_all_resolutions() {
        assert_eq!(Product::GRD.asf_processing_levels().len(), 5);
        assert_eq!("SLC".parse::<Product>().unwrap(), Product::SLC);
    }
}
