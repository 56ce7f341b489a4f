//! Activity and teacher records.
//!
//! These types mirror the two JSON documents the store persists. Roster
//! mutations live on [`Activity`] so the capacity invariant is checked in one
//! place.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// All activities, keyed by activity name, in document order.
pub type Activities = IndexMap<String, Activity>;

/// An extracurricular activity with a capacity and a participant roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Free-form description shown to students.
    pub description: String,
    /// Human readable meeting schedule.
    pub schedule: String,
    /// Maximum number of participants.
    pub max_participants: usize,
    /// Participant emails in signup order.
    pub participants: Vec<String>,
    /// Fields this service does not interpret, kept so a rewrite preserves them.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Activity {
    /// Check whether `email` is on the roster.
    #[must_use]
    pub fn has_participant(&self, email: &str) -> bool {
        self.participants.iter().any(|p| p == email)
    }

    /// Check whether the roster has reached capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.participants.len() >= self.max_participants
    }

    /// Number of places still open.
    #[must_use]
    pub fn spots_left(&self) -> usize {
        self.max_participants.saturating_sub(self.participants.len())
    }

    /// Add `email` to the roster.
    ///
    /// A student already on the roster is rejected before capacity is
    /// considered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadySignedUp`] or [`Error::ActivityFull`].
    pub fn enroll(&mut self, email: &str) -> Result<()> {
        if self.has_participant(email) {
            return Err(Error::AlreadySignedUp);
        }
        if self.is_full() {
            return Err(Error::ActivityFull);
        }
        self.participants.push(email.to_string());
        Ok(())
    }

    /// Remove `email` from the roster.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSignedUp`] if the student is not on the roster.
    pub fn withdraw(&mut self, email: &str) -> Result<()> {
        let index = self
            .participants
            .iter()
            .position(|p| p == email)
            .ok_or(Error::NotSignedUp)?;
        self.participants.remove(index);
        Ok(())
    }
}

/// A staff identity allowed to change rosters.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    /// Login name.
    pub username: String,
    /// Clear text password.
    pub password: String,
    /// Display name used in confirmation messages.
    pub name: String,
}

impl fmt::Debug for Teacher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Teacher")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .finish()
    }
}

/// The teachers document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherRoster {
    /// Teachers in the order credentials are checked.
    pub teachers: Vec<Teacher>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chess_club() -> Activity {
        Activity {
            description: "Learn strategies and compete in chess tournaments".to_string(),
            schedule: "Fridays, 3:30 PM - 5:00 PM".to_string(),
            max_participants: 2,
            participants: Vec::new(),
            extra: Map::new(),
        }
    }

    #[test]
    fn test_enroll_appends_in_order() {
        let mut activity = chess_club();
        activity.enroll("a@x.com").unwrap();
        activity.enroll("b@x.com").unwrap();

        assert_eq!(activity.participants, vec!["a@x.com", "b@x.com"]);
    }

    #[test]
    fn test_enroll_twice_is_rejected() {
        let mut activity = chess_club();
        activity.enroll("a@x.com").unwrap();

        let err = activity.enroll("a@x.com").unwrap_err();
        assert!(matches!(err, Error::AlreadySignedUp));
        assert_eq!(activity.participants, vec!["a@x.com"]);
    }

    #[test]
    fn test_enroll_when_full_is_rejected() {
        let mut activity = chess_club();
        activity.enroll("a@x.com").unwrap();
        activity.enroll("b@x.com").unwrap();

        let err = activity.enroll("c@x.com").unwrap_err();
        assert!(matches!(err, Error::ActivityFull));
        assert_eq!(activity.participants.len(), 2);
    }

    #[test]
    fn test_duplicate_check_precedes_capacity() {
        let mut activity = chess_club();
        activity.enroll("a@x.com").unwrap();
        activity.enroll("b@x.com").unwrap();

        let err = activity.enroll("a@x.com").unwrap_err();
        assert!(matches!(err, Error::AlreadySignedUp));
    }

    #[test]
    fn test_withdraw_removes_participant() {
        let mut activity = chess_club();
        activity.enroll("a@x.com").unwrap();
        activity.enroll("b@x.com").unwrap();

        activity.withdraw("a@x.com").unwrap();
        assert_eq!(activity.participants, vec!["b@x.com"]);
        assert!(!activity.has_participant("a@x.com"));
    }

    #[test]
    fn test_withdraw_absent_is_rejected() {
        let mut activity = chess_club();
        activity.enroll("a@x.com").unwrap();

        let err = activity.withdraw("z@x.com").unwrap_err();
        assert!(matches!(err, Error::NotSignedUp));
        assert_eq!(activity.participants, vec!["a@x.com"]);
    }

    #[test]
    fn test_spots_left() {
        let mut activity = chess_club();
        assert_eq!(activity.spots_left(), 2);
        activity.enroll("a@x.com").unwrap();
        assert_eq!(activity.spots_left(), 1);
        assert!(!activity.is_full());
        activity.enroll("b@x.com").unwrap();
        assert_eq!(activity.spots_left(), 0);
        assert!(activity.is_full());
    }

    #[test]
    fn test_spots_left_saturates_on_overfull_document() {
        let activity = Activity {
            max_participants: 1,
            participants: vec!["a@x.com".to_string(), "b@x.com".to_string()],
            ..chess_club()
        };
        assert_eq!(activity.spots_left(), 0);
        assert!(activity.is_full());
    }

    #[test]
    fn test_activity_without_participants_is_rejected() {
        let json = r#"{"description": "d", "schedule": "s", "max_participants": 5}"#;
        let err = serde_json::from_str::<Activity>(json).unwrap_err();
        assert!(err.to_string().contains("participants"));
    }

    #[test]
    fn test_activity_keeps_unknown_fields() {
        let json = r#"{"description": "d", "schedule": "s", "max_participants": 5,
            "participants": [], "room": "Gym"}"#;
        let activity: Activity = serde_json::from_str(json).unwrap();
        assert_eq!(activity.extra["room"], "Gym");

        let value = serde_json::to_value(&activity).unwrap();
        assert_eq!(value["room"], "Gym");
    }

    #[test]
    fn test_teacher_debug_redacts_password() {
        let teacher = Teacher {
            username: "mrodriguez".to_string(),
            password: "art123".to_string(),
            name: "Ms. Rodriguez".to_string(),
        };
        let debug_str = format!("{teacher:?}");
        assert!(debug_str.contains("mrodriguez"));
        assert!(!debug_str.contains("art123"));
    }

    #[test]
    fn test_teacher_roster_deserialize() {
        let json = r#"{"teachers": [{"username": "u", "password": "p", "name": "N"}]}"#;
        let roster: TeacherRoster = serde_json::from_str(json).unwrap();
        assert_eq!(roster.teachers.len(), 1);
        assert_eq!(roster.teachers[0].name, "N");
    }
}
