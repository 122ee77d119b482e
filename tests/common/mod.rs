#![allow(dead_code)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::naive::NaiveDateTime;
use s1_arch::{
    AcquisitionMode, Product, ReferenceCatalog, Result, SceneName, Sensor, MANIFEST_FNAME,
    TIME_FORMAT,
};

/// Footprint over grid tile 32UNA, "lat,lon" pairs.
pub const FOOTPRINT_32UNA: &str = "48.2,8.2 48.2,8.8 48.8,8.8 48.8,8.2";
/// Footprint over grid tile 33UUP.
pub const FOOTPRINT_33UUP: &str = "48.2,12.2 48.2,12.8 48.8,12.8 48.8,12.2";

pub const GRID: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {"type": "Feature", "properties": {"Name": "32UNA", "EPSG": 32632},
         "geometry": {"type": "Polygon", "coordinates": [[[8,48],[9,48],[9,49],[8,49],[8,48]]]}},
        {"type": "Feature", "properties": {"Name": "32UPA", "EPSG": 32632},
         "geometry": {"type": "Polygon", "coordinates": [[[9,48],[10,48],[10,49],[9,49],[9,48]]]}},
        {"type": "Feature", "properties": {"Name": "33UUP", "EPSG": 32633},
         "geometry": {"type": "Polygon", "coordinates": [[[12,48],[13,48],[13,49],[12,49],[12,48]]]}}
    ]
}"#;

/// Four contiguous 25 s slices of one data take.
pub const DATATAKE: [(&str, &str); 4] = [
    ("20210105T052118", "20210105T052143"),
    ("20210105T052143", "20210105T052208"),
    ("20210105T052208", "20210105T052233"),
    ("20210105T052233", "20210105T052258"),
];

pub fn slice_name(i: usize) -> String {
    format!(
        "S1A_IW_GRDH_1SDV_{}_{}_036003_043842_{:04X}",
        DATATAKE[i].0,
        DATATAKE[i].1,
        0xA000 + i
    )
}

/// A scene of another data take, acquired over tile 33UUP a day later.
pub fn remote_name() -> String {
    "S1A_IW_GRDH_1SDV_20210106T170512_20210106T170537_036019_0438E1_77C1".to_owned()
}

pub fn time(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, TIME_FORMAT).unwrap()
}

/// Writes a `<name>.SAFE` directory with a manifest below `root`.
pub fn write_scene(
    root: &Path,
    name: &str,
    processing: &str,
    slice: Option<(u32, u32)>,
    coordinates: &str,
) -> PathBuf {
    let dir = root.join(format!("{}.SAFE", name));
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join(MANIFEST_FNAME),
        manifest_xml(processing, slice, coordinates),
    )
    .unwrap();
    dir.canonicalize().unwrap()
}

/// Writes the slices `idx` of the test data take, out of 4 slices.
pub fn write_datatake(root: &Path, idx: &[usize]) -> Vec<PathBuf> {
    idx.iter()
        .map(|&i| {
            write_scene(
                root,
                &slice_name(i),
                "2021-01-05T06:48:12.000000",
                Some((i as u32 + 1, 4)),
                FOOTPRINT_32UNA,
            )
        })
        .collect()
}

pub fn manifest_xml(processing: &str, slice: Option<(u32, u32)>, coordinates: &str) -> String {
    let slicing = match slice {
        Some((n, total)) => format!(
            "<s1sarl1:sliceNumber>{}</s1sarl1:sliceNumber>\
             <s1sarl1:totalSlices>{}</s1sarl1:totalSlices>",
            n, total
        ),
        None => String::new(),
    };
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<xfdu:XFDU xmlns:xfdu="urn:ccsds:schema:xfdu:1" xmlns:safe="http://www.esa.int/safe/sentinel-1.0"
    xmlns:s1sarl1="http://www.esa.int/safe/sentinel-1.0/sentinel-1/sar/level-1"
    xmlns:gml="http://www.opengis.net/gml">
  <metadataSection>
    <metadataObject ID="processing">
      <metadataWrap><xmlData>
        <safe:processing name="GRD Post Processing" start="{processing}" stop="{processing}"></safe:processing>
      </xmlData></metadataWrap>
    </metadataObject>
    <metadataObject ID="generalProductInformation">
      <metadataWrap><xmlData>
        <s1sarl1:standAloneProductInformation>{slicing}</s1sarl1:standAloneProductInformation>
      </xmlData></metadataWrap>
    </metadataObject>
    <metadataObject ID="measurementFrameSet">
      <metadataWrap><xmlData>
        <safe:frameSet><safe:frame><safe:footPrint>
          <gml:coordinates>{coordinates}</gml:coordinates>
        </safe:footPrint></safe:frame></safe:frameSet>
      </xmlData></metadataWrap>
    </metadataObject>
  </metadataSection>
</xfdu:XFDU>
"#,
        processing = processing,
        slicing = slicing,
        coordinates = coordinates
    )
}

/// Secondary catalog answering from a fixed list of scene names.
#[derive(Clone, Debug)]
pub struct StaticReference {
    pub names: Vec<String>,
}

impl StaticReference {
    pub fn datatake(idx: &[usize]) -> Self {
        StaticReference {
            names: idx.iter().map(|&i| slice_name(i)).collect(),
        }
    }
}

impl ReferenceCatalog for StaticReference {
    fn search(
        &self,
        sensor: Sensor,
        product: Product,
        mode: AcquisitionMode,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<String>> {
        Ok(self
            .names
            .iter()
            .filter(|n| {
                let name = SceneName::parse(n).unwrap();
                name.sensor() == sensor
                    && name.product() == product
                    && mode.expand().contains(&name.mode())
                    && name.stop() >= start
                    && name.start() <= end
            })
            .cloned()
            .collect())
    }
}
