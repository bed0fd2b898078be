use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use strum::VariantNames;

use crate::hierarchy::{Rect, WindowingMode};

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Windowing mode given to newly created displays. Everything below a
    /// display inherits it unless it sets its own.
    #[serde(default = "default_windowing_mode")]
    pub default_windowing_mode: WindowingMode,
    /// Whether containers may be switched to freeform windowing.
    #[serde(default = "yes")]
    pub freeform_enabled: bool,
    #[serde(default = "default_display_width")]
    pub default_display_width: i32,
    #[serde(default = "default_display_height")]
    pub default_display_height: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            default_windowing_mode: default_windowing_mode(),
            freeform_enabled: yes(),
            default_display_width: default_display_width(),
            default_display_height: default_display_height(),
        }
    }
}

impl Settings {
    pub fn default_display_bounds(&self) -> Rect {
        Rect::from_size(self.default_display_width, self.default_display_height)
    }

    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.default_display_width <= 0 || self.default_display_height <= 0 {
            issues.push(format!(
                "settings.default_display_width/height must be positive, got {}x{}",
                self.default_display_width, self.default_display_height
            ));
        }

        if self.default_windowing_mode.is_undefined() {
            let concrete: Vec<_> = WindowingMode::VARIANTS
                .iter()
                .filter(|name| **name != WindowingMode::Undefined.to_string())
                .copied()
                .collect();
            issues.push(format!(
                "settings.default_windowing_mode must be one of: {}",
                concrete.join(", ")
            ));
        }

        if self.default_windowing_mode == WindowingMode::Freeform && !self.freeform_enabled {
            issues.push(
                "settings.default_windowing_mode is freeform but settings.freeform_enabled is false"
                    .to_string(),
            );
        }

        issues
    }
}

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&buf)
    }

    pub fn parse(buf: &str) -> anyhow::Result<Config> {
        let config: Config = toml::from_str(buf)?;
        Ok(config)
    }

    pub fn default() -> Config {
        Self::parse(include_str!("../../window-hierarchy.default.toml"))
            .expect("bundled default config must parse")
    }

    /// Validates the entire configuration and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> { self.settings.validate() }
}

fn yes() -> bool { true }

fn default_windowing_mode() -> WindowingMode { WindowingMode::Fullscreen }

fn default_display_width() -> i32 { 1920 }

fn default_display_height() -> i32 { 1080 }
