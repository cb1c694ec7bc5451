//! assignmate theme command.

use std::path::PathBuf;

use serde::Serialize;

use crate::config::Config;
use crate::error::Result;
use crate::output::{emit, OutputOptions, Report};
use crate::storage::Storage;
use crate::theme::{self, Theme};

pub struct ThemeOptions {
    pub value: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct ThemeOutput {
    theme: Theme,
    updated: bool,
}

pub fn run(options: ThemeOptions) -> Result<()> {
    let storage = Storage::resolve(options.data_dir)?;
    let config = Config::load_from_dir(storage.data_dir());

    let (current, updated) = match options.value.as_deref().map(str::trim) {
        None | Some("") => (theme::load(&storage, &config.display), false),
        Some(value) if value.eq_ignore_ascii_case("toggle") => {
            (theme::toggle(&storage, &config.display)?, true)
        }
        Some(value) => {
            let requested: Theme = value.parse()?;
            theme::save(&storage, requested)?;
            (requested, true)
        }
    };

    let header = if updated { "Theme set" } else { "Theme" };
    let mut report = Report::new(header);
    report.field("Theme", current.to_string());

    emit(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "theme",
        &ThemeOutput {
            theme: current,
            updated,
        },
        &report,
    )
}
