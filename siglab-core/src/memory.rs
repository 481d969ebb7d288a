//! Cross-cycle signal memory.
//!
//! A JSON-document-backed map keyed `"{symbol}_{direction}"` that stops the
//! live loop from re-acting on a signal it already executed. A missing or
//! corrupt store resets to empty with a warning, never a failure; records
//! expire 48 hours after their recorded signal time.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::domain::Direction;

/// Hours after which a recorded signal is forgotten.
pub const EXPIRY_HOURS: i64 = 48;

/// Errors writing the memory document. Reads never fail.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("failed to write memory store {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode memory store: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One remembered signal for a symbol+direction pairing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub signal_time: DateTime<Utc>,
    pub marked_at: DateTime<Utc>,
}

/// The dedup store shared across polling cycles.
///
/// Mutation takes `&mut self`; callers invoking it from concurrent
/// symbol tasks must serialize through a lock. The expected usage is
/// sequential per-symbol processing.
#[derive(Debug, Clone)]
pub struct SignalMemory {
    records: BTreeMap<String, MemoryRecord>,
    path: Option<PathBuf>,
}

impl SignalMemory {
    /// An unpersisted in-memory store.
    pub fn in_memory() -> Self {
        Self {
            records: BTreeMap::new(),
            path: None,
        }
    }

    /// Load the store from a JSON document.
    ///
    /// A missing file is a fresh store; a corrupt one is reset to empty
    /// with a warning rather than an error.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(records) => records,
                Err(err) => {
                    warn!(path = %path.display(), %err, "corrupt memory store, resetting to empty");
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };
        Self {
            records,
            path: Some(path),
        }
    }

    fn key(symbol: &str, direction: Direction) -> String {
        format!("{symbol}_{direction}")
    }

    /// True if a recorded signal for this symbol+direction is at least as
    /// new as `signal_time`. A record whose signal time is older than the
    /// expiry window is purged as a side effect.
    pub fn already_traded(
        &mut self,
        symbol: &str,
        signal_time: DateTime<Utc>,
        direction: Direction,
    ) -> bool {
        self.already_traded_at(symbol, signal_time, direction, Utc::now())
    }

    /// [`Self::already_traded`] against an explicit clock, for tests and
    /// replay.
    pub fn already_traded_at(
        &mut self,
        symbol: &str,
        signal_time: DateTime<Utc>,
        direction: Direction,
        now: DateTime<Utc>,
    ) -> bool {
        let key = Self::key(symbol, direction);
        let Some(record) = self.records.get(&key) else {
            return false;
        };
        if record.signal_time >= signal_time {
            return true;
        }
        if now - record.signal_time > Duration::hours(EXPIRY_HOURS) {
            self.records.remove(&key);
            if let Err(err) = self.persist() {
                warn!(%err, "failed to persist memory store after expiry purge");
            }
        }
        false
    }

    /// Record that this signal was acted on and persist the store.
    pub fn mark_traded(
        &mut self,
        symbol: &str,
        signal_time: DateTime<Utc>,
        direction: Direction,
    ) -> Result<(), MemoryError> {
        self.mark_traded_at(symbol, signal_time, direction, Utc::now())
    }

    /// [`Self::mark_traded`] against an explicit clock.
    pub fn mark_traded_at(
        &mut self,
        symbol: &str,
        signal_time: DateTime<Utc>,
        direction: Direction,
        now: DateTime<Utc>,
    ) -> Result<(), MemoryError> {
        self.records.insert(
            Self::key(symbol, direction),
            MemoryRecord {
                signal_time,
                marked_at: now,
            },
        );
        self.persist()
    }

    /// Forget everything and persist the empty store.
    pub fn clear(&mut self) -> Result<(), MemoryError> {
        self.records.clear();
        self.persist()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MemoryRecord)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn persist(&self) -> Result<(), MemoryError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.records)?;
        write_atomic(path, &json).map_err(|source| MemoryError::Write {
            path: path.clone(),
            source,
        })
    }
}

fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, hour, 0, 0).unwrap()
    }

    #[test]
    fn unseen_signal_is_not_traded() {
        let mut memory = SignalMemory::in_memory();
        assert!(!memory.already_traded_at("XAUUSDm", t(9), Direction::Long, t(10)));
    }

    #[test]
    fn mark_then_check_same_time_is_traded() {
        let mut memory = SignalMemory::in_memory();
        memory
            .mark_traded_at("XAUUSDm", t(9), Direction::Long, t(9))
            .unwrap();
        assert!(memory.already_traded_at("XAUUSDm", t(9), Direction::Long, t(9)));
        // an older signal is also covered
        assert!(memory.already_traded_at("XAUUSDm", t(8), Direction::Long, t(9)));
        // a newer one is not
        assert!(!memory.already_traded_at("XAUUSDm", t(10), Direction::Long, t(9)));
    }

    #[test]
    fn directions_are_tracked_independently() {
        let mut memory = SignalMemory::in_memory();
        memory
            .mark_traded_at("XAUUSDm", t(9), Direction::Long, t(9))
            .unwrap();
        assert!(!memory.already_traded_at("XAUUSDm", t(9), Direction::Short, t(9)));
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn expiry_purges_stale_records() {
        let mut memory = SignalMemory::in_memory();
        memory
            .mark_traded_at("XAUUSDm", t(9), Direction::Long, t(9))
            .unwrap();
        // 49 hours later a newer signal arrives; the stale record is purged
        let later = t(9) + Duration::hours(49);
        assert!(!memory.already_traded_at("XAUUSDm", t(10), Direction::Long, later));
        assert!(memory.is_empty());
    }

    #[test]
    fn within_expiry_an_older_record_survives() {
        let mut memory = SignalMemory::in_memory();
        memory
            .mark_traded_at("XAUUSDm", t(9), Direction::Long, t(9))
            .unwrap();
        let later = t(9) + Duration::hours(20);
        assert!(!memory.already_traded_at("XAUUSDm", t(10), Direction::Long, later));
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn load_round_trips_through_the_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.json");
        let mut memory = SignalMemory::load(&path);
        memory
            .mark_traded_at("USDJPYm", t(11), Direction::Short, t(11))
            .unwrap();

        let mut reloaded = SignalMemory::load(&path);
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.already_traded_at("USDJPYm", t(11), Direction::Short, t(11)));
    }

    #[test]
    fn corrupt_document_resets_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.json");
        std::fs::write(&path, "{not json").unwrap();
        let memory = SignalMemory::load(&path);
        assert!(memory.is_empty());
    }

    #[test]
    fn clear_empties_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.json");
        let mut memory = SignalMemory::load(&path);
        memory
            .mark_traded_at("XAUUSDm", t(9), Direction::Long, t(9))
            .unwrap();
        memory.clear().unwrap();
        assert!(SignalMemory::load(&path).is_empty());
    }
}
