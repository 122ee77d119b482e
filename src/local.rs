use std::path::{Path, PathBuf};

use geo::BoundingRect;
use rusqlite::{params, params_from_iter, Connection};

use crate::{
    acquisition::{Acquisition, SlicePosition},
    archive::{resolve_local, SceneArchive},
    error::{Result, S1ArchError},
    filter::{FilterExpr, SearchFilter},
    scene_name::TIME_FORMAT,
};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS scenes (
        identifier       TEXT PRIMARY KEY,
        scene            TEXT NOT NULL,
        sensor           TEXT NOT NULL,
        product          TEXT NOT NULL,
        acquisition_mode TEXT NOT NULL,
        start            TEXT NOT NULL,
        stop             TEXT NOT NULL,
        orbit            INTEGER NOT NULL,
        frame_number     TEXT NOT NULL,
        slice            INTEGER NOT NULL,
        total_slices     INTEGER NOT NULL,
        xmin             REAL NOT NULL,
        xmax             REAL NOT NULL,
        ymin             REAL NOT NULL,
        ymax             REAL NOT NULL
    );
    CREATE INDEX IF NOT EXISTS scenes_start ON scenes (start);
";

/// Scene catalog kept in a local SQLite database.
#[derive(Debug)]
pub struct LocalArchive {
    location: String,
    conn: Option<Connection>,
}

impl LocalArchive {
    pub fn open(dbfile: &Path) -> Result<Self> {
        let conn = Connection::open(dbfile)?;
        Self::init(conn, format!("{:?}", dbfile))
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?, ":memory:".into())
    }

    fn init(conn: Connection, location: String) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        log::info!("Connected to archive at: {}", location);
        Ok(LocalArchive {
            location,
            conn: Some(conn),
        })
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(S1ArchError::ArchiveClosed)
    }

    /// Registers scene directories, returning how many were new.
    /// Scenes that cannot be identified are logged and skipped.
    pub fn insert(&self, scenes: &[PathBuf]) -> Result<usize> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        let mut inserted = 0;

        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO scenes
                 (identifier, scene, sensor, product, acquisition_mode, start, stop, orbit,
                  frame_number, slice, total_slices, xmin, xmax, ymin, ymax)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            )?;

            for pth in scenes {
                let acq = match Acquisition::identify(pth) {
                    Ok(acq) => acq,
                    Err(err) => {
                        log::error!("Error identifying scene: {:?} : {}", pth, err);
                        continue;
                    }
                };
                let rect = match acq.footprint().bounding_rect() {
                    Some(rect) => rect,
                    None => {
                        log::error!("Scene without footprint: {:?}", pth);
                        continue;
                    }
                };
                let (slice, total) = match acq.position() {
                    SlicePosition::Unsliced => (0, 0),
                    SlicePosition::Sliced { slice, total } => (slice, total),
                };

                let scene = pth.canonicalize()?;
                inserted += stmt.execute(params![
                    acq.identifier(),
                    scene.to_string_lossy().into_owned(),
                    acq.sensor().to_string(),
                    acq.product().to_string(),
                    acq.acquisition_mode().to_string(),
                    acq.start().format(TIME_FORMAT).to_string(),
                    acq.stop().format(TIME_FORMAT).to_string(),
                    acq.name().orbit(),
                    acq.name().datatake_hex(),
                    slice,
                    total,
                    rect.min().x,
                    rect.max().x,
                    rect.min().y,
                    rect.max().y,
                ])?;
            }
        }

        tx.commit()?;
        log::info!(
            "Inserted {} new of {} scenes into {}",
            inserted,
            scenes.len(),
            self.location
        );
        Ok(inserted)
    }

    pub fn size(&self) -> Result<usize> {
        let n: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM scenes", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

impl SceneArchive for LocalArchive {
    fn select(&self, filter: &SearchFilter) -> Result<Vec<PathBuf>> {
        let conn = self.conn()?;
        let (condition, values) = FilterExpr::build(filter)?.to_sql();
        let sql = format!(
            "SELECT scene FROM scenes WHERE {} ORDER BY start, scene",
            condition
        );
        log::debug!("{} {:?}", sql, values);

        let mut stmt = conn.prepare(&sql)?;
        let locations = stmt
            .query_map(params_from_iter(values.iter()), |row| row.get::<_, String>(0))?
            .map(|res| res.map(PathBuf::from))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        resolve_local(locations, filter.check_exist)
    }

    fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(_, err)| err)?;
            log::info!("Closed archive at: {}", self.location);
        }
        Ok(())
    }
}

impl Drop for LocalArchive {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            log::error!("Error closing archive {}: {}", self.location, err);
        }
    }
}
