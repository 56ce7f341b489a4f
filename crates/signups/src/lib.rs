//! `signups` - Extracurricular activity signup service
//!
//! This library lists school activities and lets authenticated teachers
//! enroll or remove students. All state lives in a JSON document on disk
//! that is reloaded for every request.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod store;
pub mod web;

pub use auth::{AuthenticatedTeacher, Credentials};
pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use logging::init_logging;
pub use model::{Activities, Activity, Teacher, TeacherRoster};
pub use store::Store;
pub use web::{build_router, serve, AppState};
