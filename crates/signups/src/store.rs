//! Flat-file store for activities and teachers.
//!
//! The activities document is the unit of persistence: every read loads the
//! whole file and every write replaces it. Nothing is cached between calls,
//! and nothing locks the file, so two concurrent updates to the same store
//! can lose one of the writes.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{Activities, Activity, TeacherRoster};

/// Handle to the two JSON documents backing the service.
#[derive(Debug, Clone)]
pub struct Store {
    activities_path: PathBuf,
    teachers_path: PathBuf,
}

impl Store {
    /// Create a store over the given document paths.
    ///
    /// Neither file is touched until the first load.
    pub fn new(activities_path: impl Into<PathBuf>, teachers_path: impl Into<PathBuf>) -> Self {
        Self {
            activities_path: activities_path.into(),
            teachers_path: teachers_path.into(),
        }
    }

    /// Create a store from the resolved configuration paths.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.activities_path(), config.teachers_path())
    }

    /// Path to the activities document.
    #[must_use]
    pub fn activities_path(&self) -> &Path {
        &self.activities_path
    }

    /// Path to the teachers document.
    #[must_use]
    pub fn teachers_path(&self) -> &Path {
        &self.teachers_path
    }

    /// Load every activity from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is missing or malformed.
    pub fn load_activities(&self) -> Result<Activities> {
        read_document(&self.activities_path)
    }

    /// Overwrite the activities document with `activities`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be serialized or written.
    pub fn save_activities(&self, activities: &Activities) -> Result<()> {
        let body = serde_json::to_string_pretty(activities)?;
        fs::write(&self.activities_path, body).map_err(|source| Error::StoreWrite {
            path: self.activities_path.clone(),
            source,
        })?;
        debug!(
            "Wrote {} activities to {}",
            activities.len(),
            self.activities_path.display()
        );
        Ok(())
    }

    /// Load the teacher credential list from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is missing or malformed.
    pub fn load_teachers(&self) -> Result<TeacherRoster> {
        read_document(&self.teachers_path)
    }

    /// Apply `update` to the named activity and persist the result.
    ///
    /// The whole document is reloaded first. It is written back only when
    /// `update` succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ActivityNotFound`] if no activity has that name, any
    /// error `update` returns, or a storage error.
    pub fn update_activity<F>(&self, name: &str, update: F) -> Result<Activity>
    where
        F: FnOnce(&mut Activity) -> Result<()>,
    {
        let mut activities = self.load_activities()?;
        let activity = activities
            .get_mut(name)
            .ok_or_else(|| Error::activity_not_found(name))?;

        update(activity)?;
        let updated = activity.clone();

        self.save_activities(&activities)?;
        Ok(updated)
    }

    /// Load both documents once, failing if either is unusable.
    ///
    /// # Errors
    ///
    /// Returns the first storage error encountered.
    pub fn check(&self) -> Result<()> {
        let activities = self.load_activities()?;
        let roster = self.load_teachers()?;
        info!(
            activities = activities.len(),
            teachers = roster.teachers.len(),
            "Store loaded from {}",
            self.activities_path.display()
        );
        Ok(())
    }
}

fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let body = fs::read_to_string(path).map_err(|source| Error::StoreRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&body).map_err(|source| Error::StoreParse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    const ACTIVITIES: &str = r#"{
  "Chess Club": {
    "description": "Learn strategies and compete in chess tournaments",
    "schedule": "Fridays, 3:30 PM - 5:00 PM",
    "max_participants": 2,
    "participants": ["michael@mergington.edu"]
  }
}"#;

    const TEACHERS: &str = r#"{"teachers": [
  {"username": "mrodriguez", "password": "art123", "name": "Ms. Rodriguez"}
]}"#;

    fn fixture() -> (TempDir, Store) {
        crate::logging::init_test_logging();
        let dir = tempfile::tempdir().unwrap();
        let activities = dir.path().join("activities.json");
        let teachers = dir.path().join("teachers.json");
        fs::write(&activities, ACTIVITIES).unwrap();
        fs::write(&teachers, TEACHERS).unwrap();
        (dir, Store::new(activities, teachers))
    }

    #[test]
    fn test_load_activities() {
        let (_dir, store) = fixture();
        let activities = store.load_activities().unwrap();

        let chess = &activities["Chess Club"];
        assert_eq!(chess.max_participants, 2);
        assert_eq!(chess.participants, vec!["michael@mergington.edu"]);
    }

    #[test]
    fn test_load_teachers() {
        let (_dir, store) = fixture();
        let roster = store.load_teachers().unwrap();

        assert_eq!(roster.teachers.len(), 1);
        assert_eq!(roster.teachers[0].username, "mrodriguez");
    }

    #[test]
    fn test_missing_document_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(
            dir.path().join("absent.json"),
            dir.path().join("teachers.json"),
        );

        let err = store.load_activities().unwrap_err();
        assert!(matches!(err, Error::StoreRead { .. }));
        assert_eq!(err.kind(), ErrorKind::Storage);
    }

    #[test]
    fn test_malformed_document_is_storage_error() {
        let (_dir, store) = fixture();
        fs::write(store.teachers_path(), "{not json").unwrap();

        let err = store.load_teachers().unwrap_err();
        assert!(matches!(err, Error::StoreParse { .. }));
    }

    #[test]
    fn test_save_then_reload() {
        let (_dir, store) = fixture();
        let mut activities = store.load_activities().unwrap();
        activities
            .get_mut("Chess Club")
            .unwrap()
            .participants
            .push("daniel@mergington.edu".to_string());

        store.save_activities(&activities).unwrap();

        assert_eq!(store.load_activities().unwrap(), activities);
    }

    #[test]
    fn test_saved_document_is_indented() {
        let (_dir, store) = fixture();
        let activities = store.load_activities().unwrap();
        store.save_activities(&activities).unwrap();

        let body = fs::read_to_string(store.activities_path()).unwrap();
        assert!(body.contains("\n  \"Chess Club\": {"));
    }

    #[test]
    fn test_update_activity_persists() {
        let (_dir, store) = fixture();

        let updated = store
            .update_activity("Chess Club", |a| a.enroll("daniel@mergington.edu"))
            .unwrap();
        assert_eq!(updated.participants.len(), 2);

        let reloaded = store.load_activities().unwrap();
        assert!(reloaded["Chess Club"].has_participant("daniel@mergington.edu"));
    }

    #[test]
    fn test_update_unknown_activity() {
        let (_dir, store) = fixture();

        let err = store
            .update_activity("Underwater Basket Weaving", |a| a.enroll("a@x.com"))
            .unwrap_err();
        assert!(matches!(err, Error::ActivityNotFound { .. }));
    }

    #[test]
    fn test_failed_update_leaves_document_untouched() {
        let (_dir, store) = fixture();
        let before = fs::read_to_string(store.activities_path()).unwrap();

        let err = store
            .update_activity("Chess Club", |a| a.withdraw("nobody@mergington.edu"))
            .unwrap_err();
        assert!(matches!(err, Error::NotSignedUp));

        let after = fs::read_to_string(store.activities_path()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_update_keeps_document_order_and_unknown_fields() {
        let (_dir, store) = fixture();
        fs::write(
            store.activities_path(),
            r#"{
  "Zumba": {"description": "Dance", "schedule": "Mondays", "max_participants": 10,
            "participants": [], "room": "Gym"},
  "Art": {"description": "Paint", "schedule": "Tuesdays", "max_participants": 10,
          "participants": []}
}"#,
        )
        .unwrap();

        store
            .update_activity("Art", |a| a.enroll("a@x.com"))
            .unwrap();

        let body = fs::read_to_string(store.activities_path()).unwrap();
        let zumba = body.find("\"Zumba\"").unwrap();
        let art = body.find("\"Art\"").unwrap();
        assert!(zumba < art, "activities reordered:\n{body}");

        let reloaded = store.load_activities().unwrap();
        let names: Vec<&str> = reloaded.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Zumba", "Art"]);
        assert_eq!(reloaded["Zumba"].extra["room"], "Gym");
        assert_eq!(reloaded["Art"].participants, vec!["a@x.com"]);
    }

    #[test]
    fn test_activity_without_participants_is_parse_error() {
        let (_dir, store) = fixture();
        fs::write(
            store.activities_path(),
            r#"{"Chess Club": {"description": "d", "schedule": "s", "max_participants": 2}}"#,
        )
        .unwrap();

        let err = store.load_activities().unwrap_err();
        assert!(matches!(err, Error::StoreParse { .. }));
        assert_eq!(err.kind(), ErrorKind::Storage);
    }

    #[test]
    fn test_check() {
        let (_dir, store) = fixture();
        assert!(store.check().is_ok());

        fs::remove_file(store.teachers_path()).unwrap();
        assert!(store.check().is_err());
    }
}
