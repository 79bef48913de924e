//! Journal JSON Lines: uma linha por lote recebido.

use envmon_core::Reading;
use envmon_core::protocol::BatchPayload;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Registro gravado no journal.
#[derive(Debug, Serialize)]
pub struct BatchRecord<'a> {
    /// Recebimento (ms desde a época Unix)
    pub received_at_ms: u64,
    pub source: &'a str,
    pub device_id: &'a str,
    pub seq: u32,
    pub batch_time_ms: u64,
    pub readings: &'a [Reading],
}

impl<'a> BatchRecord<'a> {
    pub fn new(payload: &'a BatchPayload, source: &'a str) -> Self {
        let received_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            received_at_ms,
            source,
            device_id: &payload.device_id,
            seq: payload.seq,
            batch_time_ms: payload.batch_time_ms,
            readings: &payload.readings,
        }
    }
}

pub struct Journal {
    file: File,
    path: PathBuf,
}

impl Journal {
    /// Abre (ou cria) o arquivo em modo append.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, record: &BatchRecord<'_>) -> io::Result<()> {
        let mut line = serde_json::to_string(record).map_err(io::Error::from)?;
        line.push('\n');
        self.file.write_all(line.as_bytes())?;
        self.file.flush()
    }
}
