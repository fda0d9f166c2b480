//! Board persistence over a synchronous string key-value backend.
//!
//! The browser bridge plugs `localStorage` in behind `StorageBackend`;
//! native tests use the in-memory backend. Storage is best-effort by
//! contract: the public store methods never fail outward. A quota hit or
//! a corrupt payload is logged and the session continues on in-memory
//! state. The fallible plumbing lives in `try_*` helpers so the swallow
//! happens in exactly one layer.

use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed number of board slots.
pub const MAX_BOARDS: u8 = 6;

const KEY_PREFIX: &str = "corkboard";

// ─── Backend ─────────────────────────────────────────────────────────────

/// Minimal synchronous string KV store.
pub trait StorageBackend {
    fn get(&self, key: &str) -> Result<Option<String>, String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), String>;
    fn remove(&mut self, key: &str) -> Result<(), String>;
}

/// In-memory backend for tests and headless use.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    map: std::collections::HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, String> {
        Ok(self.map.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        self.map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), String> {
        self.map.remove(key);
        Ok(())
    }
}

// ─── Errors ──────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend: {0}")]
    Backend(String),
    #[error("encoding {key}: {source}")]
    Encode {
        key: String,
        source: serde_json::Error,
    },
    #[error("decoding {key}: {source}")]
    Decode {
        key: String,
        source: serde_json::Error,
    },
}

// ─── Slots ───────────────────────────────────────────────────────────────

/// One of the `MAX_BOARDS` storage slots, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardId(u8);

impl BoardId {
    pub const FIRST: BoardId = BoardId(1);

    pub fn new(slot: u8) -> Option<Self> {
        (1..=MAX_BOARDS).contains(&slot).then_some(Self(slot))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// All slots in order, 1..=MAX_BOARDS.
    pub fn all() -> impl Iterator<Item = BoardId> {
        (1..=MAX_BOARDS).map(BoardId)
    }
}

impl std::fmt::Display for BoardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-slot metadata, stored beside the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

/// One row of `list_all`, always synthesized for every slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardEntry {
    pub id: BoardId,
    pub name: String,
    pub last_modified: Option<String>,
    pub is_empty: bool,
}

/// Global UI preferences, stored outside any slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Prefs {
    pub sidebar_collapsed: bool,
}

fn default_name(slot: BoardId) -> String {
    format!("Board {slot}")
}

// ─── Store ───────────────────────────────────────────────────────────────

pub struct BoardStore<S: StorageBackend> {
    backend: S,
}

impl<S: StorageBackend> BoardStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    fn snapshot_key(slot: BoardId) -> String {
        format!("{KEY_PREFIX}-board-{slot}")
    }

    fn meta_key(slot: BoardId) -> String {
        format!("{KEY_PREFIX}-board-{slot}-meta")
    }

    fn preview_key(slot: BoardId) -> String {
        format!("{KEY_PREFIX}-board-{slot}-preview")
    }

    // ─── Snapshots ───────────────────────────────────────────────────────

    /// Persist a snapshot and refresh the slot's metadata. An existing
    /// custom name is kept; a fresh slot gets `"Board {n}"`. Failures are
    /// logged and swallowed.
    pub fn save(&mut self, slot: BoardId, snapshot: &Snapshot) {
        if let Err(err) = self.try_save(slot, snapshot) {
            log::error!("failed to save board {slot}: {err}");
        }
    }

    fn try_save(&mut self, slot: BoardId, snapshot: &Snapshot) -> Result<(), StoreError> {
        let key = Self::snapshot_key(slot);
        let payload = serde_json::to_string(snapshot).map_err(|source| StoreError::Encode {
            key: key.clone(),
            source,
        })?;
        self.backend.set(&key, &payload).map_err(StoreError::Backend)?;

        let name = self
            .try_load_meta(slot)?
            .map(|meta| meta.name)
            .unwrap_or_else(|| default_name(slot));
        let meta = BoardMeta {
            name,
            last_modified: Some(snapshot.last_modified.clone()),
        };
        self.write_meta(slot, &meta)
    }

    /// Load a slot's snapshot, falling back to the empty board when the
    /// slot was never written or its payload fails to decode.
    pub fn load(&self, slot: BoardId) -> Snapshot {
        match self.try_load(slot) {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => Snapshot::empty(),
            Err(err) => {
                log::error!("failed to load board {slot}: {err}");
                Snapshot::empty()
            }
        }
    }

    fn try_load(&self, slot: BoardId) -> Result<Option<Snapshot>, StoreError> {
        let key = Self::snapshot_key(slot);
        let Some(payload) = self.backend.get(&key).map_err(StoreError::Backend)? else {
            return Ok(None);
        };
        serde_json::from_str(&payload)
            .map(Some)
            .map_err(|source| StoreError::Decode { key, source })
    }

    fn slot_occupied(&self, slot: BoardId) -> bool {
        matches!(self.backend.get(&Self::snapshot_key(slot)), Ok(Some(_)))
    }

    // ─── Metadata ────────────────────────────────────────────────────────

    fn try_load_meta(&self, slot: BoardId) -> Result<Option<BoardMeta>, StoreError> {
        let key = Self::meta_key(slot);
        let Some(payload) = self.backend.get(&key).map_err(StoreError::Backend)? else {
            return Ok(None);
        };
        serde_json::from_str(&payload)
            .map(Some)
            .map_err(|source| StoreError::Decode { key, source })
    }

    fn write_meta(&mut self, slot: BoardId, meta: &BoardMeta) -> Result<(), StoreError> {
        let key = Self::meta_key(slot);
        let payload = serde_json::to_string(meta).map_err(|source| StoreError::Encode {
            key: key.clone(),
            source,
        })?;
        self.backend.set(&key, &payload).map_err(StoreError::Backend)
    }

    /// Exactly `MAX_BOARDS` rows, defaults synthesized for slots never
    /// written.
    pub fn list_all(&self) -> Vec<BoardEntry> {
        BoardId::all()
            .map(|slot| {
                let meta = match self.try_load_meta(slot) {
                    Ok(meta) => meta,
                    Err(err) => {
                        log::error!("failed to read metadata for board {slot}: {err}");
                        None
                    }
                };
                let is_empty = !self.slot_occupied(slot);
                match meta {
                    Some(meta) => BoardEntry {
                        id: slot,
                        name: meta.name,
                        last_modified: meta.last_modified,
                        is_empty,
                    },
                    None => BoardEntry {
                        id: slot,
                        name: default_name(slot),
                        last_modified: None,
                        is_empty,
                    },
                }
            })
            .collect()
    }

    /// Rename a slot. Only the name changes; the recorded modification
    /// time stays with the underlying data. A slot with no metadata yet
    /// inherits the snapshot's timestamp, if there is a snapshot.
    pub fn rename(&mut self, slot: BoardId, new_name: &str) {
        let result = match self.try_load_meta(slot) {
            Ok(Some(meta)) => self.write_meta(
                slot,
                &BoardMeta {
                    name: new_name.to_string(),
                    last_modified: meta.last_modified,
                },
            ),
            Ok(None) => {
                let inherited = self
                    .try_load(slot)
                    .ok()
                    .flatten()
                    .map(|snapshot| snapshot.last_modified)
                    .filter(|ts| !ts.is_empty());
                self.write_meta(
                    slot,
                    &BoardMeta {
                        name: new_name.to_string(),
                        last_modified: inherited,
                    },
                )
            }
            Err(err) => Err(err),
        };
        if let Err(err) = result {
            log::error!("failed to rename board {slot}: {err}");
        }
    }

    /// Drop the slot's snapshot, metadata, and preview. Slot numbers
    /// never shift.
    pub fn delete(&mut self, slot: BoardId) {
        for key in [
            Self::snapshot_key(slot),
            Self::meta_key(slot),
            Self::preview_key(slot),
        ] {
            if let Err(err) = self.backend.remove(&key) {
                log::error!("failed to remove {key}: {err}");
            }
        }
    }

    /// First slot with no snapshot, scanning 1..=MAX_BOARDS. With every
    /// slot occupied this falls back to slot 1 as an overwrite target;
    /// the caller decides whether to warn.
    pub fn create_in_first_empty_slot(&self) -> BoardId {
        BoardId::all()
            .find(|&slot| !self.slot_occupied(slot))
            .unwrap_or(BoardId::FIRST)
    }

    // ─── Previews ────────────────────────────────────────────────────────

    pub fn save_preview(&mut self, slot: BoardId, data_url: &str) {
        if let Err(err) = self.backend.set(&Self::preview_key(slot), data_url) {
            log::error!("failed to save preview for board {slot}: {err}");
        }
    }

    pub fn load_preview(&self, slot: BoardId) -> Option<String> {
        match self.backend.get(&Self::preview_key(slot)) {
            Ok(preview) => preview,
            Err(err) => {
                log::error!("failed to load preview for board {slot}: {err}");
                None
            }
        }
    }

    // ─── Active slot & preferences ───────────────────────────────────────

    /// Remember which slot is open so the next session reopens it.
    pub fn set_active_board(&mut self, slot: BoardId) {
        let key = format!("{KEY_PREFIX}-active-board");
        if let Err(err) = self.backend.set(&key, &slot.to_string()) {
            log::error!("failed to record active board: {err}");
        }
    }

    pub fn active_board(&self) -> Option<BoardId> {
        let key = format!("{KEY_PREFIX}-active-board");
        let value = self.backend.get(&key).ok()??;
        value.parse::<u8>().ok().and_then(BoardId::new)
    }

    pub fn save_prefs(&mut self, prefs: &Prefs) {
        let key = format!("{KEY_PREFIX}-sidebar-collapsed");
        let value = if prefs.sidebar_collapsed { "true" } else { "false" };
        if let Err(err) = self.backend.set(&key, value) {
            log::error!("failed to save preferences: {err}");
        }
    }

    pub fn load_prefs(&self) -> Prefs {
        let key = format!("{KEY_PREFIX}-sidebar-collapsed");
        Prefs {
            sidebar_collapsed: matches!(self.backend.get(&key), Ok(Some(v)) if v == "true"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Backend that fails every call. The store must stay quiet.
    struct BrokenStorage;

    impl StorageBackend for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, String> {
            Err("quota exceeded".into())
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<(), String> {
            Err("quota exceeded".into())
        }
        fn remove(&mut self, _key: &str) -> Result<(), String> {
            Err("quota exceeded".into())
        }
    }

    fn slot(n: u8) -> BoardId {
        BoardId::new(n).unwrap()
    }

    #[test]
    fn slot_ids_validate_range() {
        assert!(BoardId::new(0).is_none());
        assert!(BoardId::new(1).is_some());
        assert!(BoardId::new(MAX_BOARDS).is_some());
        assert!(BoardId::new(MAX_BOARDS + 1).is_none());
        assert_eq!(BoardId::all().count(), MAX_BOARDS as usize);
    }

    #[test]
    fn load_of_unwritten_slot_is_the_empty_board() {
        let store = BoardStore::new(MemoryStorage::new());
        let snapshot = store.load(slot(3));
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.note_id_counter, 0);
    }

    #[test]
    fn save_then_load_roundtrips() {
        let mut store = BoardStore::new(MemoryStorage::new());
        let mut snapshot = Snapshot::empty();
        snapshot.note_id_counter = 7;
        snapshot.board_width = 3000.0;
        snapshot.last_modified = "2024-05-01T12:00:00Z".into();

        store.save(slot(2), &snapshot);
        assert_eq!(store.load(slot(2)), snapshot);
    }

    #[test]
    fn save_defaults_the_name_and_keeps_custom_names() {
        let mut store = BoardStore::new(MemoryStorage::new());
        let mut snapshot = Snapshot::empty();
        snapshot.last_modified = "2024-05-01T12:00:00Z".into();

        store.save(slot(1), &snapshot);
        assert_eq!(store.list_all()[0].name, "Board 1");

        store.rename(slot(1), "Moon landing");
        snapshot.last_modified = "2024-06-01T12:00:00Z".into();
        store.save(slot(1), &snapshot);

        let entry = &store.list_all()[0];
        assert_eq!(entry.name, "Moon landing");
        assert_eq!(entry.last_modified.as_deref(), Some("2024-06-01T12:00:00Z"));
    }

    #[test]
    fn rename_preserves_last_modified() {
        let mut store = BoardStore::new(MemoryStorage::new());
        let mut snapshot = Snapshot::empty();
        snapshot.last_modified = "2024-05-01T12:00:00Z".into();
        store.save(slot(4), &snapshot);

        store.rename(slot(4), "Birds aren't real");
        let entry = &store.list_all()[3];
        assert_eq!(entry.name, "Birds aren't real");
        assert_eq!(entry.last_modified.as_deref(), Some("2024-05-01T12:00:00Z"));
    }

    #[test]
    fn rename_of_unwritten_slot_keeps_it_empty() {
        let mut store = BoardStore::new(MemoryStorage::new());
        store.rename(slot(5), "Placeholder");

        let entry = &store.list_all()[4];
        assert_eq!(entry.name, "Placeholder");
        assert_eq!(entry.last_modified, None);
        assert!(entry.is_empty);
    }

    #[test]
    fn list_all_always_reports_every_slot() {
        let mut store = BoardStore::new(MemoryStorage::new());
        assert_eq!(store.list_all().len(), MAX_BOARDS as usize);

        store.save(slot(2), &Snapshot::empty());
        let entries = store.list_all();
        assert_eq!(entries.len(), MAX_BOARDS as usize);
        assert!(entries[0].is_empty);
        assert!(!entries[1].is_empty);
        assert_eq!(entries[5].name, "Board 6");
    }

    #[test]
    fn delete_clears_all_three_keys_without_shifting() {
        let mut store = BoardStore::new(MemoryStorage::new());
        store.save(slot(2), &Snapshot::empty());
        store.save(slot(3), &Snapshot::empty());
        store.save_preview(slot(2), "data:image/png;base64,AAAA");
        store.rename(slot(2), "Doomed");

        store.delete(slot(2));

        let entries = store.list_all();
        assert!(entries[1].is_empty);
        assert_eq!(entries[1].name, "Board 2");
        assert_eq!(store.load_preview(slot(2)), None);
        // Slot 3 untouched
        assert!(!entries[2].is_empty);
    }

    #[test]
    fn first_empty_slot_scans_in_order() {
        let mut store = BoardStore::new(MemoryStorage::new());
        assert_eq!(store.create_in_first_empty_slot(), slot(1));

        store.save(slot(1), &Snapshot::empty());
        store.save(slot(2), &Snapshot::empty());
        assert_eq!(store.create_in_first_empty_slot(), slot(3));

        for s in BoardId::all() {
            store.save(s, &Snapshot::empty());
        }
        // All occupied: fall back to slot 1 as the overwrite target
        assert_eq!(store.create_in_first_empty_slot(), slot(1));
    }

    #[test]
    fn corrupt_payload_degrades_to_the_empty_board() {
        let mut backend = MemoryStorage::new();
        backend.set("corkboard-board-1", "{not json").unwrap();
        let store = BoardStore::new(backend);
        assert!(store.load(slot(1)).is_empty());
    }

    #[test]
    fn broken_backend_never_panics() {
        let mut store = BoardStore::new(BrokenStorage);
        store.save(slot(1), &Snapshot::empty());
        assert!(store.load(slot(1)).is_empty());
        assert_eq!(store.list_all().len(), MAX_BOARDS as usize);
        store.rename(slot(1), "nope");
        store.delete(slot(1));
        store.save_preview(slot(1), "data:");
        assert_eq!(store.load_preview(slot(1)), None);
        assert_eq!(store.create_in_first_empty_slot(), BoardId::FIRST);
        assert_eq!(store.load_prefs(), Prefs::default());
    }

    #[test]
    fn active_board_roundtrips() {
        let mut store = BoardStore::new(MemoryStorage::new());
        assert_eq!(store.active_board(), None);
        store.set_active_board(slot(4));
        assert_eq!(store.active_board(), Some(slot(4)));
    }

    #[test]
    fn prefs_roundtrip() {
        let mut store = BoardStore::new(MemoryStorage::new());
        assert!(!store.load_prefs().sidebar_collapsed);
        store.save_prefs(&Prefs {
            sidebar_collapsed: true,
        });
        assert!(store.load_prefs().sidebar_collapsed);
    }
}
