use std::time::Duration;

use chrono::naive::NaiveDateTime;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::{
    error::{Result, S1ArchError},
    product::{AcquisitionMode, Product},
    sensor::Sensor,
};

pub const ASF_SEARCH_URL: &str = "https://api.daac.asf.alaska.edu/services/search/param";

/// An independent scene catalog, only consulted to confirm suspected gaps.
pub trait ReferenceCatalog: Clone + Send {
    /// Ids (scene names without extension) of all acquisitions overlapping `start..=end`.
    fn search(
        &self,
        sensor: Sensor,
        product: Product,
        mode: AcquisitionMode,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<String>>;
}

/// The Alaska Satellite Facility search API.
#[derive(Debug, Clone)]
pub struct AsfCatalog {
    url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct AsfResult {
    #[serde(default)]
    features: Vec<AsfFeature>,
}

#[derive(Debug, Deserialize)]
struct AsfFeature {
    properties: AsfProperties,
}

#[derive(Debug, Deserialize)]
struct AsfProperties {
    #[serde(rename = "sceneName")]
    scene_name: String,
}

impl AsfCatalog {
    pub fn connect() -> Result<Self> {
        Self::with_url(ASF_SEARCH_URL)
    }

    pub fn with_url(url: &str) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(AsfCatalog {
            url: url.to_owned(),
            client,
        })
    }
}

impl ReferenceCatalog for AsfCatalog {
    fn search(
        &self,
        sensor: Sensor,
        product: Product,
        mode: AcquisitionMode,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<String>> {
        let query = asf_query(sensor, product, mode, start, end);
        log::debug!("ASF search {:?}", query);

        let resp = self.client.get(&self.url).query(&query).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(S1ArchError::Catalog {
                status: status.as_u16(),
                message: resp.text().unwrap_or_default(),
            });
        }

        Ok(scene_names(resp.json::<AsfResult>()?))
    }
}

fn asf_query(
    sensor: Sensor,
    product: Product,
    mode: AcquisitionMode,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Vec<(&'static str, String)> {
    let beam_modes: Vec<String> = mode.expand().iter().map(|m| m.to_string()).collect();
    let fmt = "%Y-%m-%dT%H:%M:%SZ";

    vec![
        ("platform", sensor.asf_platform().to_owned()),
        ("processingLevel", product.asf_processing_levels().join(",")),
        ("beamMode", beam_modes.join(",")),
        ("start", start.format(fmt).to_string()),
        ("end", end.format(fmt).to_string()),
        ("output", "geojson".to_owned()),
    ]
}

fn scene_names(result: AsfResult) -> Vec<String> {
    let mut scenes: Vec<String> = result
        .features
        .into_iter()
        .map(|f| f.properties.scene_name)
        .collect();
    scenes.sort();
    scenes.dedup();
    scenes
}
