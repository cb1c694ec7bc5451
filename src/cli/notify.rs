//! assignmate notify: permission state and test delivery.

use std::path::PathBuf;

use serde::Serialize;

use crate::config::Config;
use crate::error::Result;
use crate::notifier::{Notifier, Permission};
use crate::output::{emit, OutputOptions, Report};
use crate::storage::Storage;

pub struct NotifyOptions {
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct NotifyOutput {
    permission: Permission,
    backend: &'static str,
    supported: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    delivered: Option<bool>,
}

fn load_notifier(data_dir: Option<PathBuf>) -> Result<Notifier> {
    let storage = Storage::resolve(data_dir)?;
    let config = Config::load_from_dir(storage.data_dir());
    Ok(Notifier::load(&storage, &config.notifications))
}

fn respond(
    options: &NotifyOptions,
    command: &str,
    header: &str,
    notifier: &Notifier,
    delivered: Option<bool>,
) -> Result<()> {
    let output = NotifyOutput {
        permission: notifier.permission(),
        backend: notifier.backend_name(),
        supported: notifier.is_supported(),
        delivered,
    };

    let mut report = Report::new(header);
    report.field("Permission", output.permission.to_string());
    report.field("Backend", output.backend);
    report.field("Supported", if output.supported { "yes" } else { "no" });
    if let Some(delivered) = delivered {
        report.field("Delivered", if delivered { "yes" } else { "no" });
    }
    match output.permission {
        Permission::Granted => {}
        Permission::Denied if !output.supported => {
            report.warn("this host cannot display notifications with the configured backend");
            report.suggest("set notifications.backend = \"terminal\" in config.toml");
        }
        _ => report.suggest("assignmate notify allow"),
    }

    emit(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        command,
        &output,
        &report,
    )
}

pub fn run_status(options: NotifyOptions) -> Result<()> {
    let notifier = load_notifier(options.data_dir.clone())?;
    respond(&options, "notify status", "Notifications", &notifier, None)
}

pub fn run_allow(options: NotifyOptions) -> Result<()> {
    let mut notifier = load_notifier(options.data_dir.clone())?;
    let decision = notifier.request_permission()?;
    let header = if decision == Permission::Granted {
        "Notifications enabled"
    } else {
        "Notifications unavailable"
    };
    respond(&options, "notify allow", header, &notifier, None)
}

pub fn run_deny(options: NotifyOptions) -> Result<()> {
    let mut notifier = load_notifier(options.data_dir.clone())?;
    notifier.deny()?;
    respond(&options, "notify deny", "Notifications disabled", &notifier, None)
}

pub fn run_test(options: NotifyOptions) -> Result<()> {
    let notifier = load_notifier(options.data_dir.clone())?;
    let delivered = notifier.send("AssignMate", "Notifications are working.");
    respond(&options, "notify test", "Test notification", &notifier, Some(delivered))
}
