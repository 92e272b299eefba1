use std::fs;
use std::path::Path;

use sel_core::settings::{self, Settings};

use super::CliError;

/// Install a custom settings file. Must run before anything reads settings.
pub fn load_settings(file: &Path) {
    let content = die!(
        fs::read_to_string(file),
        "Error reading {}: {}",
        file.display()
    );
    die!(settings::init_custom(content), "Error in settings: {}");
}

pub fn settings_export() {
    print!("{}", settings::default_toml());
}

pub fn run_settings_validate(file: &Path) -> Result<Settings, CliError> {
    let content = fs::read_to_string(file)?;
    Ok(settings::parse_settings_toml(&content)?)
}

pub fn settings_validate(file: &Path) {
    let s = die!(run_settings_validate(file), "Error: {}");
    println!(
        "OK: oracle.segment_penalty={}, selection.default_count={}, representative.restarts={}",
        s.oracle.segment_penalty, s.selection.default_count, s.representative.restarts
    );
}
