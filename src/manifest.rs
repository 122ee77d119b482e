use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::naive::NaiveDateTime;
use geo_types::{Coord, LineString, Polygon};
use quick_xml::{events::Event, Reader};

use crate::error::{Result, S1ArchError};

pub const MANIFEST_FNAME: &str = "manifest.safe";

const PROCESSING_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// The parts of a SAFE `manifest.safe` this crate needs.
#[derive(Clone, Debug, PartialEq)]
pub struct Manifest {
    pub processing_start: NaiveDateTime,
    pub slice_number: u32,
    pub total_slices: u32,
    pub footprint: Polygon<f64>,
}

#[derive(Clone, Copy, PartialEq)]
enum TextField {
    SliceNumber,
    TotalSlices,
    Coordinates,
}

#[derive(Default)]
struct RawManifest {
    processing_start: Option<NaiveDateTime>,
    slice_number: Option<u32>,
    total_slices: Option<u32>,
    footprint: Option<Polygon<f64>>,
}

impl Manifest {
    pub fn read(scene_dir: &Path) -> Result<Self> {
        let path = scene_dir.join(MANIFEST_FNAME);
        let raw = read_raw(&path)?;

        let missing = |what: &str| S1ArchError::Manifest {
            path: path.clone(),
            message: format!("no {} found", what),
        };

        Ok(Manifest {
            processing_start: raw.processing_start.ok_or_else(|| missing("processing start"))?,
            slice_number: raw.slice_number.unwrap_or(0),
            total_slices: raw.total_slices.unwrap_or(0),
            footprint: raw.footprint.ok_or_else(|| missing("footprint"))?,
        })
    }
}

/// Start time of the (outermost) processing step that produced the scene.
pub fn read_processing_time(scene_dir: &Path) -> Result<NaiveDateTime> {
    Manifest::read(scene_dir).map(|m| m.processing_start)
}

fn read_raw(path: &Path) -> Result<RawManifest> {
    let xml = fs::read_to_string(path).map_err(|err| {
        log::error!("Error reading manifest: {:?} : {}", path, err);
        S1ArchError::Io(err)
    })?;
    parse(&xml, path)
}

fn parse(xml: &str, path: &Path) -> Result<RawManifest> {
    let xml_err = |message: String| S1ArchError::Manifest {
        path: PathBuf::from(path),
        message,
    };

    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut raw = RawManifest::default();
    let mut current: Option<TextField> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                current = match e.local_name().as_ref() {
                    b"sliceNumber" => Some(TextField::SliceNumber),
                    b"totalSlices" => Some(TextField::TotalSlices),
                    b"coordinates" => Some(TextField::Coordinates),
                    b"processing" => {
                        if raw.processing_start.is_none() {
                            for attr in e.attributes().flatten() {
                                if attr.key.local_name().as_ref() == b"start" {
                                    let value =
                                        attr.unescape_value().map_err(|e| xml_err(e.to_string()))?;
                                    raw.processing_start = Some(
                                        NaiveDateTime::parse_from_str(
                                            &value,
                                            PROCESSING_TIME_FORMAT,
                                        )
                                        .map_err(|e| xml_err(e.to_string()))?,
                                    );
                                }
                            }
                        }
                        None
                    }
                    _ => None,
                };
            }
            Ok(Event::Text(t)) => {
                if let Some(field) = current {
                    let txt = t.unescape().map_err(|e| xml_err(e.to_string()))?;
                    match field {
                        TextField::SliceNumber => {
                            raw.slice_number =
                                Some(txt.trim().parse().map_err(|_| {
                                    xml_err(format!("bad slice number '{}'", txt))
                                })?)
                        }
                        TextField::TotalSlices => {
                            raw.total_slices =
                                Some(txt.trim().parse().map_err(|_| {
                                    xml_err(format!("bad total slices '{}'", txt))
                                })?)
                        }
                        TextField::Coordinates if raw.footprint.is_none() => {
                            raw.footprint = Some(parse_coordinates(&txt).ok_or_else(|| {
                                xml_err(format!("bad footprint coordinates '{}'", txt))
                            })?)
                        }
                        TextField::Coordinates => {}
                    }
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_err(e.to_string())),
            _ => {}
        }
    }

    Ok(raw)
}

// "lat,lon lat,lon ..." as written by the Sentinel-1 ground segment
fn parse_coordinates(txt: &str) -> Option<Polygon<f64>> {
    let mut coords: Vec<Coord<f64>> = vec![];
    for pair in txt.split_whitespace() {
        let (lat, lon) = pair.split_once(',')?;
        coords.push(Coord {
            x: lon.trim().parse().ok()?,
            y: lat.trim().parse().ok()?,
        });
    }

    if coords.len() < 3 {
        return None;
    }
    Some(Polygon::new(LineString::from(coords), vec![]))
}
