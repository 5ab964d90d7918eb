use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, ScrapeError};
use crate::parser::DialogueLine;

/// Destination for finished transcripts, one record set per episode.
pub trait RecordSink {
    /// Persist `rows` under `identifier`, replacing anything already there.
    fn write_records(&mut self, identifier: &str, rows: &[DialogueLine]) -> Result<PathBuf>;
}

/// Writes `{prefix}{identifier}.{extension}` files of quoted CSV rows.
pub struct CsvDirSink {
    dir: PathBuf,
    prefix: String,
    extension: String,
}

impl CsvDirSink {
    /// Creates `dir` if it does not exist yet.
    pub fn create(dir: impl Into<PathBuf>, prefix: &str, extension: &str) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| ScrapeError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(CsvDirSink {
            dir,
            prefix: prefix.to_string(),
            extension: extension.to_string(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, identifier: &str) -> PathBuf {
        self.dir
            .join(format!("{}{}.{}", self.prefix, identifier, self.extension))
    }
}

impl RecordSink for CsvDirSink {
    fn write_records(&mut self, identifier: &str, rows: &[DialogueLine]) -> Result<PathBuf> {
        let path = self.path_for(identifier);
        let io_err = |source| ScrapeError::Io {
            path: path.clone(),
            source,
        };

        let file = File::create(&path).map_err(io_err)?;
        let mut out = BufWriter::new(file);
        for row in rows {
            writeln!(out, "{},{}", quote(&row.speaker), quote(&row.line)).map_err(io_err)?;
        }
        out.flush().map_err(io_err)?;

        debug!(rows = rows.len(), "Wrote {:?}", path);
        Ok(path)
    }
}

/// Always-quoted CSV field with embedded quotes doubled.
fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

// ── Tests ──
