//! AssignMate - assignment tracker library
//!
//! This library provides the core functionality for the `assignmate` CLI:
//! a persisted collection of assignments with due dates, urgency
//! classification, and reminders that fire once per configured window.
//!
//! # Core Concepts
//!
//! - **Assignments**: title, subject, due date, notes and reminder choices
//! - **Urgency**: overdue / due within 24h / upcoming, for color coding
//! - **Reminders**: at due date, 1 hour before, 1 day before; each fires once
//! - **Store**: every mutation is persisted under a file lock
//!
//! # Module Organization
//!
//! - `assignment`: Assignment record, reminder kinds and form parsing
//! - `urgency`: Urgency classification, list filters and stats
//! - `reminder`: Pure reminder evaluation and delivery
//! - `store`: Assignment collection with persistence and change events
//! - `scheduler`: Periodic reminder tick on a tokio runtime
//! - `notifier`: Notification permission and delivery backends
//! - `theme`: Dark/light preference
//! - `storage`: Data directory layout and key/value files
//! - `lock`: File locking and atomic writes
//! - `config`: Configuration loading from `config.toml`
//! - `cli`: Command-line interface using clap
//! - `ui`: Interactive terminal tracker

pub mod assignment;
pub mod cli;
pub mod config;
pub mod error;
pub mod lock;
pub mod notifier;
pub mod output;
pub mod reminder;
pub mod scheduler;
pub mod storage;
pub mod store;
pub mod theme;
pub mod ui;
pub mod urgency;

pub use error::{Error, Result};
