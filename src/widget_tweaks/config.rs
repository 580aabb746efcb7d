use crate::error::{Result, TweaksError};
use crate::tag::WidgetClasses;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_FILENAME: &str = "widget-tweaks.json";

/// Keys accepted by [`TweaksConfig::get`] and [`TweaksConfig::set`].
pub const KEYS: [&str; 2] = ["error-class", "required-class"];

/// Configuration for widget-tweaks, stored in widget-tweaks.json
///
/// The classes are fallbacks for `WIDGET_ERROR_CLASS` and
/// `WIDGET_REQUIRED_CLASS`; a template context defining those wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TweaksConfig {
    /// Class `render_field` adds to fields with errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget_error_class: Option<String>,

    /// Class `render_field` adds to required fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget_required_class: Option<String>,
}

impl TweaksConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: TweaksConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content)?;
        Ok(())
    }

    pub fn exists_in<P: AsRef<Path>>(config_dir: P) -> bool {
        config_dir.as_ref().join(CONFIG_FILENAME).is_file()
    }

    /// Looks up a setting by its command-line key.
    pub fn get(&self, key: &str) -> Result<Option<&str>> {
        Ok(self.slot(key)?.as_deref())
    }

    /// Sets a setting by its command-line key. An empty value clears it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let slot = self.slot_mut(key)?;
        *slot = Some(value.trim().to_string()).filter(|v| !v.is_empty());
        Ok(())
    }

    pub fn widget_classes(&self) -> WidgetClasses {
        WidgetClasses {
            error: self.widget_error_class.clone(),
            required: self.widget_required_class.clone(),
        }
    }

    fn slot(&self, key: &str) -> Result<&Option<String>> {
        match key {
            "error-class" => Ok(&self.widget_error_class),
            "required-class" => Ok(&self.widget_required_class),
            _ => Err(unknown_key(key)),
        }
    }

    fn slot_mut(&mut self, key: &str) -> Result<&mut Option<String>> {
        match key {
            "error-class" => Ok(&mut self.widget_error_class),
            "required-class" => Ok(&mut self.widget_required_class),
            _ => Err(unknown_key(key)),
        }
    }
}

fn unknown_key(key: &str) -> TweaksError {
    TweaksError::Config(format!(
        "Unknown config key '{}' (expected one of: {})",
        key,
        KEYS.join(", ")
    ))
}
