// SPDX-License-Identifier: MIT

//! Atomic load/save of the team agent status file: write to a uniquely
//! named temp file, `fsync`, then `rename` over the real path, so a crash
//! mid-write leaves either the previous file or the new one, never a
//! truncation.

use crate::error::HeartbeatError;
use crate::file_lock::FileLockRegistry;
use agentmux_core::model::TeamAgentStatusFile;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::warn;

/// Save atomically, serializing concurrent writers to the same path
/// through `locks`.
pub async fn save_status_file(
    path: &Path,
    file: &TeamAgentStatusFile,
    locks: &FileLockRegistry,
) -> Result<(), HeartbeatError> {
    let _guard = locks.lock_for(path).await;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let epoch_ms = file.metadata.last_updated.timestamp_millis();
    let suffix: u32 = rand::random();
    let tmp_path = path.with_extension(format!("tmp.{epoch_ms}.{suffix}"));

    {
        let tmp_file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(tmp_file);
        serde_json::to_writer(&mut writer, file)?;
        let tmp_file = writer.into_inner().map_err(|e| e.into_error())?;
        tmp_file.sync_all()?;
    }

    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Load the status file, or a default-initialized one if it doesn't exist
/// yet or has become unreadable (corrupt JSON is moved aside so the next
/// write starts clean rather than perpetually failing to parse).
pub fn load_status_file(path: &Path, now: chrono::DateTime<chrono::Utc>) -> Result<TeamAgentStatusFile, HeartbeatError> {
    if !path.exists() {
        return Ok(TeamAgentStatusFile::default_at(now));
    }

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    match serde_json::from_reader(reader) {
        Ok(status) => Ok(status),
        Err(e) => {
            let bak_path = path.with_extension("bak");
            warn!(error = %e, path = %path.display(), bak = %bak_path.display(), "corrupt status file, moving aside");
            let _ = fs::rename(path, &bak_path);
            Ok(TeamAgentStatusFile::default_at(now))
        }
    }
}

#[cfg(test)]
#[path = "persist_tests.rs"]
mod tests;
