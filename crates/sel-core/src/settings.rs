//! Process-wide tuning knobs for the oracle, selection and sampling.
//!
//! Defaults ship inside the binary. A caller may swap in its own TOML with
//! [`init_custom`], but only before the first [`settings`] lookup freezes them.

use std::sync::OnceLock;

use serde::Deserialize;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// Validate `toml_content` and make it the source for [`settings`].
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    parse_settings_toml(&toml_content)?;
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

pub fn settings() -> &'static Settings {
    static FROZEN: OnceLock<Settings> = OnceLock::new();
    FROZEN.get_or_init(|| {
        let source = CUSTOM_TOML.get().map_or(DEFAULT_SETTINGS_TOML, String::as_str);
        // init_custom checked custom input; the embedded default is checked by tests.
        parse_settings_toml(source).expect("validated settings TOML")
    })
}

pub fn default_toml() -> &'static str {
    DEFAULT_SETTINGS_TOML
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub oracle: OracleSettings,
    pub selection: SelectionSettings,
    pub representative: RepresentativeSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OracleSettings {
    pub segment_penalty: f64,
    pub unknown_morph_cost: f64,
    pub bad_transition_penalty: f64,
    pub max_morph_len: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectionSettings {
    pub default_count: usize,
    pub substring_min_len: usize,
    pub oneoff_max_morph_len: usize,
    pub progress_interval: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepresentativeSettings {
    pub restarts: usize,
    pub max_iterations: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    fn invalid(field: &str, reason: &str) -> SettingsError {
        SettingsError::InvalidValue {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
    macro_rules! check_non_negative {
        ($section:ident . $field:ident) => {
            let v: f64 = s.$section.$field;
            if !(v.is_finite() && v >= 0.0) {
                let field = concat!(stringify!($section), ".", stringify!($field));
                return Err(invalid(field, "must be a finite non-negative number"));
            }
        };
    }
    macro_rules! check_positive_usize {
        ($section:ident . $field:ident) => {
            if s.$section.$field == 0 {
                let field = concat!(stringify!($section), ".", stringify!($field));
                return Err(invalid(field, "must be positive"));
            }
        };
    }

    check_non_negative!(oracle.segment_penalty);
    check_non_negative!(oracle.unknown_morph_cost);
    check_non_negative!(oracle.bad_transition_penalty);
    check_positive_usize!(oracle.max_morph_len);

    check_positive_usize!(selection.default_count);
    check_positive_usize!(selection.substring_min_len);
    check_positive_usize!(selection.oneoff_max_morph_len);
    check_positive_usize!(selection.progress_interval);

    check_positive_usize!(representative.restarts);
    check_positive_usize!(representative.max_iterations);

    Ok(())
}
