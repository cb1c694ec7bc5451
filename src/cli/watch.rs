//! assignmate watch: foreground reminder daemon.
//!
//! Evaluates reminders at startup and then once per poll interval until
//! Ctrl-C. Each evaluation is a locked reload/evaluate/save, so it can run
//! next to the TUI or one-shot commands.

use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::notifier::{Notifier, Permission};
use crate::output::{emit, OutputOptions, Report};
use crate::reminder::FiredReminder;
use crate::scheduler::ReminderScheduler;
use crate::storage::Storage;
use crate::store::AssignmentStore;

pub struct WatchOptions {
    pub once: bool,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct WatchOutput {
    permission: Permission,
    fired: Vec<FiredReminder>,
}

pub fn run(options: WatchOptions) -> Result<()> {
    let storage = Storage::resolve(options.data_dir)?;
    let config = Config::load_from_dir(storage.data_dir());
    let notifier = Notifier::load(&storage, &config.notifications);
    let mut store = AssignmentStore::open(storage);

    let output_options = OutputOptions {
        json: options.json,
        quiet: options.quiet,
    };

    if options.once {
        let fired = store.apply_reminders(Utc::now(), &notifier)?;
        let mut report = Report::new("Reminders evaluated");
        report.field("Fired", fired.len().to_string());
        report.field("Permission", notifier.permission().to_string());
        for reminder in &fired {
            report.line(format!("{}: {}", reminder.title, reminder.body));
        }
        if notifier.permission() != Permission::Granted {
            report.warn("notifications are not enabled; reminders were marked but not shown");
            report.suggest("assignmate notify allow");
        }
        return emit(
            output_options,
            "watch",
            &WatchOutput {
                permission: notifier.permission(),
                fired,
            },
            &report,
        );
    }

    if notifier.permission() != Permission::Granted {
        warn!(permission = %notifier.permission(), "notifications are not enabled; run `assignmate notify allow`");
    }

    let period = config.reminders.poll_interval();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let (tick_tx, mut tick_rx) = mpsc::unbounded_channel::<()>();
        let mut scheduler = ReminderScheduler::start(&tokio::runtime::Handle::current(), period, move || {
            let _ = tick_tx.send(());
        });
        info!(
            period_secs = period.as_secs(),
            dir = %store.storage().data_dir().display(),
            "watching for reminders"
        );
        if !output_options.quiet && !output_options.json {
            eprintln!(
                "Watching {} (every {}s, Ctrl-C to stop)",
                store.storage().data_dir().display(),
                period.as_secs()
            );
        }

        evaluate(&mut store, &notifier);
        loop {
            tokio::select! {
                tick = tick_rx.recv() => {
                    if tick.is_none() {
                        break;
                    }
                    evaluate(&mut store, &notifier);
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("interrupted; stopping");
                    break;
                }
            }
        }
        scheduler.stop();
    });

    Ok(())
}

fn evaluate(store: &mut AssignmentStore, notifier: &Notifier) {
    match store.apply_reminders(Utc::now(), notifier) {
        Ok(fired) => {
            for reminder in fired {
                info!(id = %reminder.assignment_id, kind = %reminder.kind, "{}", reminder.body);
            }
        }
        Err(err) => warn!(error = %err, "reminder evaluation failed"),
    }
}
