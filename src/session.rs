use serde::{Deserialize, Serialize};

use crate::store::{KvStore, StoreError};

/// Key the whole session log is stored under
pub const SESSION_LOG_KEY: &str = "sessionData";

/// One completed focus run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// 1-based sequence number
    pub session: u32,
    /// Whole seconds worked
    pub duration: u64,
}

/// Append-only history of focus runs, persisted as one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionLog {
    records: Vec<SessionRecord>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the stored log. Anything unreadable yields an empty log.
    pub fn load(store: &dyn KvStore) -> Self {
        match Self::try_load(store) {
            Ok(log) => log,
            Err(e) => {
                tracing::warn!(error = %e, "session log unavailable, starting empty");
                Self::new()
            }
        }
    }

    pub fn try_load(store: &dyn KvStore) -> Result<Self, StoreError> {
        let Some(bytes) = store.load(SESSION_LOG_KEY)? else {
            return Ok(Self::new());
        };
        let records =
            serde_json::from_slice::<Vec<SessionRecord>>(&bytes).map_err(|source| {
                StoreError::Decode {
                    key: SESSION_LOG_KEY.to_string(),
                    source,
                }
            })?;
        tracing::debug!(sessions = records.len(), "session log loaded");
        Ok(Self { records })
    }

    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total seconds across all sessions
    pub fn total(&self) -> u64 {
        self.records.iter().map(|r| r.duration).sum()
    }

    pub fn next_sequence(&self) -> u32 {
        self.records
            .last()
            .map_or(1, |r| r.session.saturating_add(1))
    }

    /// Record a run and write the full log back. A failed write is logged;
    /// the record is kept in memory regardless.
    pub fn append(&mut self, duration: u64, store: &mut dyn KvStore) -> SessionRecord {
        let record = SessionRecord {
            session: self.next_sequence(),
            duration,
        };
        self.records.push(record);

        match self.persist(store) {
            Ok(()) => tracing::info!(session = record.session, duration, "session recorded"),
            Err(e) => tracing::warn!(error = %e, "session log kept in memory only"),
        }
        record
    }

    fn persist(&self, store: &mut dyn KvStore) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(&self.records).map_err(StoreError::Encode)?;
        store.store(SESSION_LOG_KEY, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    struct BrokenStore;

    impl KvStore for BrokenStore {
        fn load(&self, _key: &str) -> Result<Option<Vec<u8>>, StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk gone")))
        }

        fn store(&mut self, _key: &str, _value: &[u8]) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk gone")))
        }

        fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk gone")))
        }
    }

    #[test]
    fn records_use_the_persisted_field_names() {
        let json = serde_json::to_string(&SessionRecord {
            session: 1,
            duration: 400,
        })
        .unwrap();
        assert_eq!(json, r#"{"session":1,"duration":400}"#);
    }

    #[test]
    fn append_numbers_sessions_and_persists() {
        let mut store = MemoryStore::new();
        let mut log = SessionLog::load(&store);
        assert!(log.is_empty());

        assert_eq!(log.append(400, &mut store).session, 1);
        assert_eq!(log.append(30, &mut store).session, 2);

        let stored = store.load(SESSION_LOG_KEY).unwrap().unwrap();
        assert_eq!(
            String::from_utf8(stored).unwrap(),
            r#"[{"session":1,"duration":400},{"session":2,"duration":30}]"#
        );
        assert_eq!(log.total(), 430);
    }

    #[test]
    fn numbering_continues_after_reload() {
        let mut store = MemoryStore::new();
        let mut log = SessionLog::load(&store);
        log.append(10, &mut store);
        log.append(20, &mut store);

        let mut reloaded = SessionLog::load(&store);
        assert_eq!(reloaded, log);
        assert_eq!(reloaded.append(30, &mut store).session, 3);
    }

    #[test]
    fn numbering_saturates_on_a_maxed_out_log() {
        let mut store = MemoryStore::new();
        let stored = format!(r#"[{{"session":{},"duration":5}}]"#, u32::MAX);
        store.store(SESSION_LOG_KEY, stored.as_bytes()).unwrap();

        let mut log = SessionLog::load(&store);
        assert_eq!(log.next_sequence(), u32::MAX);
        assert_eq!(log.append(30, &mut store).session, u32::MAX);
    }

    #[test]
    fn malformed_snapshot_starts_empty() {
        let mut store = MemoryStore::new();
        store.store(SESSION_LOG_KEY, b"not json").unwrap();
        assert!(SessionLog::try_load(&store).is_err());
        assert!(SessionLog::load(&store).is_empty());
    }

    #[test]
    fn failed_write_keeps_record_in_memory() {
        let mut store = BrokenStore;
        let mut log = SessionLog::load(&store);
        let record = log.append(120, &mut store);
        assert_eq!(record.session, 1);
        assert_eq!(log.records(), &[record]);
    }
}
