//! Command-line interface for assignmate
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is implemented in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::storage::DATA_DIR_ENV;

mod assignment;
mod notify;
mod theme;
mod watch;

/// assignmate - assignment tracker with due-date reminders
///
/// Record assignments with due dates, get reminded before they are due, and
/// review them by urgency from the command line or the terminal UI.
#[derive(Parser, Debug)]
#[command(name = "assignmate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory (defaults to the platform data directory)
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    pub data_dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an assignment
    Add {
        /// Assignment title
        title: String,

        /// Subject or course
        #[arg(short, long)]
        subject: String,

        /// Due date-time in local time (YYYY-MM-DDTHH:MM) or RFC 3339
        #[arg(short, long)]
        due: String,

        /// Free-form notes
        #[arg(short, long)]
        notes: Option<String>,

        /// Reminder kind: at_due_date, 1_hour_before, 1_day_before (repeatable)
        #[arg(short, long = "remind", value_name = "KIND")]
        remind: Vec<String>,

        /// Create without any reminders
        #[arg(long, conflicts_with = "remind")]
        no_reminders: bool,
    },

    /// Edit an assignment (re-arms its reminders)
    Edit {
        /// Assignment id or unique prefix
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New subject
        #[arg(short, long)]
        subject: Option<String>,

        /// New due date-time
        #[arg(short, long)]
        due: Option<String>,

        /// New notes (empty string clears them)
        #[arg(short, long)]
        notes: Option<String>,

        /// Replace reminder kinds (repeatable)
        #[arg(short, long = "remind", value_name = "KIND")]
        remind: Vec<String>,

        /// Remove all reminders
        #[arg(long, conflicts_with = "remind")]
        no_reminders: bool,
    },

    /// Toggle an assignment's completion
    Done {
        /// Assignment id or unique prefix
        id: String,
    },

    /// Delete an assignment
    Rm {
        /// Assignment id or unique prefix
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List assignments sorted by due date
    #[command(alias = "ls")]
    List {
        /// Which assignments to show: active, completed, all
        #[arg(short, long, default_value = "active")]
        filter: String,
    },

    /// Show one assignment
    Show {
        /// Assignment id or unique prefix
        id: String,
    },

    /// Summary counts (total, active, overdue, due soon, completed)
    Stats,

    /// Run the reminder loop in the foreground
    Watch {
        /// Evaluate reminders once and exit
        #[arg(long)]
        once: bool,
    },

    /// Notification permission and delivery
    #[command(subcommand)]
    Notify(NotifyCommands),

    /// Show or change the color theme
    Theme {
        /// dark, light or toggle (omit to show the current theme)
        value: Option<String>,
    },

    /// Interactive terminal UI
    Tui,
}

/// Notification subcommands
#[derive(Subcommand, Debug)]
pub enum NotifyCommands {
    /// Show permission state and backend
    Status,

    /// Enable notifications
    Allow,

    /// Disable notifications
    Deny,

    /// Send a test notification
    Test,
}

impl Commands {
    /// Long-running commands log at info unless RUST_LOG says otherwise.
    pub fn default_log_filter(&self) -> &'static str {
        match self {
            Commands::Watch { once: false } => "info",
            _ => "off",
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Add {
                title,
                subject,
                due,
                notes,
                remind,
                no_reminders,
            } => assignment::run_add(assignment::AddOptions {
                title,
                subject,
                due,
                notes,
                remind,
                no_reminders,
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Edit {
                id,
                title,
                subject,
                due,
                notes,
                remind,
                no_reminders,
            } => assignment::run_edit(assignment::EditOptions {
                id,
                title,
                subject,
                due,
                notes,
                remind,
                no_reminders,
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Done { id } => assignment::run_done(assignment::DoneOptions {
                id,
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Rm { id, yes } => assignment::run_rm(assignment::RmOptions {
                id,
                yes,
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::List { filter } => assignment::run_list(assignment::ListOptions {
                filter,
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Show { id } => assignment::run_show(assignment::ShowOptions {
                id,
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Stats => assignment::run_stats(assignment::StatsOptions {
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Watch { once } => watch::run(watch::WatchOptions {
                once,
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Notify(cmd) => {
                let options = notify::NotifyOptions {
                    data_dir: self.data_dir,
                    json: self.json,
                    quiet: self.quiet,
                };
                match cmd {
                    NotifyCommands::Status => notify::run_status(options),
                    NotifyCommands::Allow => notify::run_allow(options),
                    NotifyCommands::Deny => notify::run_deny(options),
                    NotifyCommands::Test => notify::run_test(options),
                }
            }
            Commands::Theme { value } => theme::run(theme::ThemeOptions {
                value,
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Tui => assignment::run_tui(assignment::TuiOptions {
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
        }
    }
}
