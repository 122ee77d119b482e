use std::{fmt, path::PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, S1ArchError>;

#[derive(Error, Debug)]
pub enum S1ArchError {
    #[error("transient catalog failure: {0}")]
    TransientCatalog(String),

    #[error("catalog request failed with status {status}: {message}")]
    Catalog { status: u16, message: String },

    #[error("scene does not exist locally: {0:?}")]
    MissingLocalScene(PathBuf),

    #[error("invalid filter value for '{key}': {message}")]
    InvalidFilterType { key: &'static str, message: String },

    #[error("unsupported coordinate reference system EPSG:{0}")]
    UnsupportedCrs(u32),

    #[error("{}", format_missing(.0))]
    IncompleteAcquisitionBatch(Vec<MissingNeighbors>),

    #[error("{}", format_indeterminate(.0))]
    CompletenessIndeterminate(Vec<Indeterminate>),

    #[error("{0}")]
    NoScenesFound(String),

    #[error("invalid scene name '{name}': {reason}")]
    InvalidSceneName { name: String, reason: &'static str },

    #[error("invalid acquisition {0}")]
    InvalidAcquisition(String),

    #[error("manifest error in {path:?}: {message}")]
    Manifest { path: PathBuf, message: String },

    #[error("unknown tile '{0}'")]
    UnknownTile(String),

    #[error("archive connection already closed")]
    ArchiveClosed,

    #[error("config error {0}")]
    Config(String),

    #[error("worker error {0}")]
    Worker(String),

    #[error("IO error {0}")]
    Io(#[from] std::io::Error),

    #[error("http error {0}")]
    Http(#[from] reqwest::Error),

    #[error("json error {0}")]
    Json(#[from] serde_json::Error),

    #[error("sqlite error {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("geojson error {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("ron error {0}")]
    Ron(#[from] ron::error::SpannedError),
}

impl S1ArchError {
    /// Errors that are worth another attempt after a short pause.
    pub fn is_transient(&self) -> bool {
        matches!(self, S1ArchError::TransientCatalog(_))
    }
}

/// Neighbor(s) of one scene that the secondary catalog knows but the local catalog lacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingNeighbors {
    pub scene: String,
    pub predecessor: bool,
    pub successor: bool,
}

impl fmt::Display for MissingNeighbors {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kinds = match (self.predecessor, self.successor) {
            (true, true) => "predecessor and successor",
            (true, false) => "predecessor",
            (false, true) => "successor",
            (false, false) => "no",
        };
        write!(f, "{} acquisition for scene {}", kinds, self.scene)
    }
}

/// A scene whose completeness could not be decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indeterminate {
    pub scene: String,
    pub reason: String,
}

impl fmt::Display for Indeterminate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "scene {}: {}", self.scene, self.reason)
    }
}

fn format_missing(missing: &[MissingNeighbors]) -> String {
    let text: Vec<String> = missing.iter().map(|m| m.to_string()).collect();
    format!("missing the following scenes:\n - {}", text.join("\n - "))
}

fn format_indeterminate(scenes: &[Indeterminate]) -> String {
    let text: Vec<String> = scenes.iter().map(|s| s.to_string()).collect();
    format!(
        "acquisition completeness could not be determined:\n - {}",
        text.join("\n - ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_batch_lists_every_scene() {
        let err = S1ArchError::IncompleteAcquisitionBatch(vec![
            MissingNeighbors {
                scene: "A.SAFE".into(),
                predecessor: true,
                successor: true,
            },
            MissingNeighbors {
                scene: "B.SAFE".into(),
                predecessor: false,
                successor: true,
            },
        ]);

        assert_eq!(
            err.to_string(),
            "missing the following scenes:\n \
             - predecessor and successor acquisition for scene A.SAFE\n \
             - successor acquisition for scene B.SAFE"
        );
    }

    #[test]
    fn only_transient_failures_are_retryable() {
        assert!(S1ArchError::TransientCatalog("503".into()).is_transient());
        assert!(!S1ArchError::MissingLocalScene("x".into()).is_transient());
        assert!(!S1ArchError::ArchiveClosed.is_transient());
    }
}
