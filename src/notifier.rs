//! Notification delivery.
//!
//! A [`Notifier`] wraps one [`NotificationBackend`] and a permission state.
//! Messages are delivered only while permission is [`Permission::Granted`];
//! anything else drops them silently. Delivery failures are logged and
//! absorbed.

use std::fmt;
use std::path::PathBuf;
use std::process::Command;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::NotificationConfig;
use crate::error::{Error, Result};
use crate::storage::{Storage, PERMISSION_KEY};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Granted,
    Denied,
    #[default]
    Default,
}

impl Permission {
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::Granted => "granted",
            Permission::Denied => "denied",
            Permission::Default => "default",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "granted" => Ok(Permission::Granted),
            "denied" => Ok(Permission::Denied),
            "default" => Ok(Permission::Default),
            other => Err(Error::InvalidArgument(format!(
                "invalid permission '{other}' (expected granted|denied|default)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
}

/// Host notification capability.
pub trait NotificationBackend: Send {
    fn name(&self) -> &'static str;

    /// Whether the host can display notifications at all.
    fn is_supported(&self) -> bool;

    fn deliver(&self, notification: &Notification) -> Result<()>;
}

/// Native desktop notifications via `notify-send` (Linux) or `osascript` (macOS).
#[derive(Debug, Clone)]
pub struct DesktopBackend {
    app_name: String,
}

impl DesktopBackend {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }

    fn program() -> Option<&'static str> {
        if cfg!(target_os = "macos") {
            Some("osascript")
        } else if cfg!(unix) {
            Some("notify-send")
        } else {
            None
        }
    }
}

impl NotificationBackend for DesktopBackend {
    fn name(&self) -> &'static str {
        "desktop"
    }

    fn is_supported(&self) -> bool {
        Self::program().and_then(find_in_path).is_some()
    }

    fn deliver(&self, notification: &Notification) -> Result<()> {
        let program = Self::program().ok_or_else(|| {
            Error::Notification("desktop notifications are not supported on this platform".into())
        })?;

        let mut command = Command::new(program);
        if program == "osascript" {
            command.args([
                "-e",
                &format!(
                    "display notification \"{}\" with title \"{}\"",
                    escape_applescript(&notification.body),
                    escape_applescript(&notification.title)
                ),
            ]);
        } else {
            command.args([
                "--app-name",
                &self.app_name,
                "--icon",
                &notification.icon,
                &notification.title,
                &notification.body,
            ]);
        }

        let output = command.output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Notification(format!(
                "{program} exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

fn escape_applescript(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn find_in_path(program: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

/// Rings the terminal bell and prints the message to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBackend;

impl NotificationBackend for TerminalBackend {
    fn name(&self) -> &'static str {
        "terminal"
    }

    fn is_supported(&self) -> bool {
        true
    }

    fn deliver(&self, notification: &Notification) -> Result<()> {
        eprintln!("\x07{}: {}", notification.title, notification.body);
        Ok(())
    }
}

/// Records notifications in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    sent: Arc<Mutex<Vec<Notification>>>,
    unsupported: bool,
    failing: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unsupported() -> Self {
        Self {
            unsupported: true,
            ..Self::default()
        }
    }

    /// Every delivery attempt returns an error but is still recorded.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

impl NotificationBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn is_supported(&self) -> bool {
        !self.unsupported
    }

    fn deliver(&self, notification: &Notification) -> Result<()> {
        self.sent
            .lock()
            .map_err(|_| Error::Notification("notification recorder poisoned".into()))?
            .push(notification.clone());
        if self.failing {
            return Err(Error::Notification("delivery refused".into()));
        }
        Ok(())
    }
}

/// Pick the backend named by `notifications.backend`.
pub fn backend_from_config(config: &NotificationConfig) -> Box<dyn NotificationBackend> {
    match config.backend.as_str() {
        "terminal" => Box::new(TerminalBackend),
        _ => Box::new(DesktopBackend::new(config.app_name.clone())),
    }
}

pub struct Notifier {
    backend: Box<dyn NotificationBackend>,
    permission: Permission,
    icon: String,
    storage: Option<Storage>,
}

impl Notifier {
    /// A notifier without persisted permission state.
    pub fn new(backend: Box<dyn NotificationBackend>, permission: Permission) -> Self {
        Self {
            backend,
            permission,
            icon: NotificationConfig::default().icon,
            storage: None,
        }
    }

    /// Build from config, reading the saved permission from the data directory.
    pub fn load(storage: &Storage, config: &NotificationConfig) -> Self {
        let permission = load_permission(storage);
        debug!(backend = %config.backend, %permission, "notifier ready");
        Self {
            backend: backend_from_config(config),
            permission,
            icon: config.icon.clone(),
            storage: Some(storage.clone()),
        }
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn is_supported(&self) -> bool {
        self.backend.is_supported()
    }

    /// Explicit user request to enable notifications.
    ///
    /// Yields `Denied` when the host has no notification capability.
    pub fn request_permission(&mut self) -> Result<Permission> {
        let decision = if self.backend.is_supported() {
            Permission::Granted
        } else {
            warn!(
                backend = self.backend.name(),
                "notifications are not supported on this host"
            );
            Permission::Denied
        };
        self.set_permission(decision)?;
        Ok(decision)
    }

    pub fn deny(&mut self) -> Result<()> {
        self.set_permission(Permission::Denied)
    }

    fn set_permission(&mut self, permission: Permission) -> Result<()> {
        self.permission = permission;
        if let Some(storage) = &self.storage {
            storage.write_entry(PERMISSION_KEY, permission.as_str())?;
        }
        Ok(())
    }

    /// Deliver a message if permitted. Returns whether the backend accepted it.
    pub fn send(&self, title: &str, body: &str) -> bool {
        if self.permission != Permission::Granted {
            debug!(permission = %self.permission, title, "notification dropped");
            return false;
        }

        let notification = Notification {
            title: title.to_string(),
            body: body.to_string(),
            icon: self.icon.clone(),
        };
        match self.backend.deliver(&notification) {
            Ok(()) => {
                debug!(backend = self.backend.name(), title, "notification delivered");
                true
            }
            Err(err) => {
                warn!(backend = self.backend.name(), error = %err, "notification delivery failed");
                false
            }
        }
    }
}

/// Saved permission, `Default` when absent or unreadable.
pub fn load_permission(storage: &Storage) -> Permission {
    storage
        .read_entry(PERMISSION_KEY)
        .and_then(|raw| raw.parse().ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn send_is_noop_unless_granted() {
        let backend = MemoryBackend::new();
        for permission in [Permission::Default, Permission::Denied] {
            let notifier = Notifier::new(Box::new(backend.clone()), permission);
            assert!(!notifier.send("Upcoming Deadline", "Essay for Lit is due tomorrow."));
        }
        assert!(backend.sent().is_empty());

        let notifier = Notifier::new(Box::new(backend.clone()), Permission::Granted);
        assert!(notifier.send("Upcoming Deadline", "Essay for Lit is due tomorrow."));
        let sent = backend.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].icon, "appointment-soon");
    }

    #[test]
    fn request_without_capability_yields_denied() {
        let mut notifier = Notifier::new(Box::new(MemoryBackend::unsupported()), Permission::Default);
        assert_eq!(notifier.request_permission().unwrap(), Permission::Denied);
        assert!(!notifier.send("t", "b"));
    }

    #[test]
    fn delivery_failure_is_absorbed() {
        let backend = MemoryBackend::failing();
        let notifier = Notifier::new(Box::new(backend.clone()), Permission::Granted);
        assert!(!notifier.send("t", "b"));
        assert_eq!(backend.sent().len(), 1);
    }

    #[test]
    fn permission_decision_is_persisted() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path());
        assert_eq!(load_permission(&storage), Permission::Default);

        let config = NotificationConfig {
            backend: "terminal".to_string(),
            ..NotificationConfig::default()
        };
        let mut notifier = Notifier::load(&storage, &config);
        assert_eq!(notifier.backend_name(), "terminal");
        assert_eq!(notifier.request_permission().unwrap(), Permission::Granted);
        assert_eq!(load_permission(&storage), Permission::Granted);

        notifier.deny().unwrap();
        assert_eq!(Notifier::load(&storage, &config).permission(), Permission::Denied);
    }

    #[test]
    fn garbage_permission_entry_reads_as_default() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path());
        storage.write_entry(PERMISSION_KEY, "maybe").unwrap();
        assert_eq!(load_permission(&storage), Permission::Default);
    }

    #[test]
    fn applescript_quotes_are_escaped() {
        assert_eq!(escape_applescript(r#"say "hi""#), r#"say \"hi\""#);
    }
}
