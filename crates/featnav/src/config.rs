//! Configuration loading for featnav
//!
//! Config lives at `.config/featnav/config.json` relative to the project root.
//! Editors can also send settings through LSP `initializationOptions` and
//! `workspace/didChangeConfiguration`; those override the file field by field.
//!
//! ```json
//! {
//!   "tagPattern": "TAG:(\\d+)",
//!   "searchPattern": "**/*${caseNumber}*.feature",
//!   "relativeRoot": "features",
//!   "searchInContent": true
//! }
//! ```

use std::path::Path;

use eyre::{Result, WrapErr};
use featnav_core::Settings;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

/// Config file location relative to the project root
pub const CONFIG_PATH: &str = ".config/featnav/config.json";

/// Key editors nest the settings under
pub const SETTINGS_SECTION: &str = "featureNavigator";

/// A partial set of settings; absent fields leave the current value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub tag_pattern: Option<String>,
    pub search_pattern: Option<String>,
    pub relative_root: Option<String>,
    pub search_in_content: Option<bool>,
    pub max_results: Option<usize>,
    pub max_content_candidates: Option<usize>,
    pub use_ignore_files: Option<bool>,
}

impl SettingsPatch {
    /// Parse settings sent by an editor, either bare or nested under
    /// `featureNavigator`.
    pub fn from_value(value: &Value) -> Result<Self> {
        let section = value.get(SETTINGS_SECTION).unwrap_or(value);
        if section.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(section.clone()).wrap_err("Invalid featureNavigator settings")
    }

    pub fn apply_to(self, settings: &mut Settings) {
        if let Some(v) = self.tag_pattern {
            settings.tag_pattern = Some(v);
        }
        if let Some(v) = self.search_pattern {
            settings.search_pattern = v;
        }
        if let Some(v) = self.relative_root {
            settings.relative_root = v;
        }
        if let Some(v) = self.search_in_content {
            settings.search_in_content = v;
        }
        if let Some(v) = self.max_results {
            settings.max_results = v;
        }
        if let Some(v) = self.max_content_candidates {
            settings.max_content_candidates = v;
        }
        if let Some(v) = self.use_ignore_files {
            settings.use_ignore_files = v;
        }
    }
}

/// Read the config file. A missing file yields an empty patch.
pub fn load_config(path: &Path) -> Result<SettingsPatch> {
    if !path.exists() {
        info!("No config file at {}, using defaults", path.display());
        return Ok(SettingsPatch::default());
    }

    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .wrap_err_with(|| format!("Config file {} has errors", path.display()))
}

/// Default settings with the config file applied on top
pub fn load_settings(path: &Path) -> Result<Settings> {
    let mut settings = Settings::default();
    load_config(path)?.apply_to(&mut settings);
    Ok(settings)
}
