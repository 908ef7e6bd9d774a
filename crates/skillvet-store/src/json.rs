//! JSON-file-backed session store: one file per session id under a
//! directory.

use std::path::{Path, PathBuf};

use crate::snapshot::SessionSnapshot;
use crate::{SessionStore, StoreError};

/// Session store writing pretty-printed JSON files.
#[derive(Debug, Clone)]
pub struct JsonSessionStore {
    dir: PathBuf,
}

impl JsonSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, session_id: &str) -> PathBuf {
        self.dir.join(format!("{session_id}.json"))
    }
}

impl SessionStore for JsonSessionStore {
    fn save(&self, snapshot: &SessionSnapshot) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(snapshot)?;
        let path = self.path_for(&snapshot.header.session_id.to_string());
        std::fs::write(&path, json)?;
        tracing::debug!("saved session snapshot to {}", path.display());
        Ok(())
    }

    fn load(&self, session_id: &str) -> Result<SessionSnapshot, StoreError> {
        let path = self.path_for(session_id);
        if !path.exists() {
            return Err(StoreError::NotFound(session_id.to_string()));
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut ids: Vec<String> = std::fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillvet_core::model::CandidateInfo;
    use skillvet_core::session::InterviewSession;

    fn snapshot() -> SessionSnapshot {
        let mut session = InterviewSession::new(5.0);
        session.start(CandidateInfo::new("Test Candidate")).unwrap();
        SessionSnapshot::capture(&session, &[], None)
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSessionStore::new(dir.path());
        let snap = snapshot();
        let id = snap.header.session_id.to_string();

        store.save(&snap).unwrap();
        let loaded = store.load(&id).unwrap();
        assert_eq!(loaded.header.session_id, snap.header.session_id);
        assert_eq!(loaded.header.candidate_name, "Test Candidate");
    }

    #[test]
    fn load_missing_session_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSessionStore::new(dir.path());
        assert!(matches!(
            store.load("nonexistent"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn list_returns_saved_ids_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSessionStore::new(dir.path());
        assert!(store.list().unwrap().is_empty());

        let a = snapshot();
        let b = snapshot();
        store.save(&a).unwrap();
        store.save(&b).unwrap();

        let ids = store.list().unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&a.header.session_id.to_string()));
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn corrupt_file_is_a_serde_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSessionStore::new(dir.path());
        std::fs::write(dir.path().join("broken.json"), "not json").unwrap();
        assert!(matches!(
            store.load("broken"),
            Err(StoreError::Serde(_))
        ));
    }
}
