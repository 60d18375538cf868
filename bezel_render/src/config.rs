// Copyright 2026 the Bezel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Persisted render settings.
//!
//! Only deviations from the baseline are recorded: every field is optional
//! and omitted when it equals the value the target or screen started with, so
//! saving an untouched setup produces an empty document.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use bezel_core::container::UserSettings;
use serde::{Deserialize, Serialize};

/// Errors reading or writing render settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The settings file could not be read or written.
    #[error("cannot access `{path}`: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid TOML for these settings.
    #[error("malformed settings: {0}")]
    Parse(#[from] toml::de::Error),
    /// The settings could not be encoded.
    #[error("cannot encode settings: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// A rotation other than 0, 90, 180 or 270 degrees.
    #[error("unsupported rotation {0}")]
    Rotation(u16),
}

/// Per-target deviations from the baseline.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Selected view name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    /// Backdrops shown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backdrops: Option<bool>,
    /// Overlays shown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlays: Option<bool>,
    /// Bezels shown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bezels: Option<bool>,
    /// Zoom to screens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<bool>,
    /// Rotation in degrees relative to the base orientation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate: Option<u16>,
}

impl TargetConfig {
    /// Returns `true` if nothing deviates from the baseline.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Per-screen deviations from neutral color and placement settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Brightness.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f32>,
    /// Contrast.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast: Option<f32>,
    /// Gamma.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gamma: Option<f32>,
    /// Horizontal offset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xoffset: Option<f32>,
    /// Vertical offset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yoffset: Option<f32>,
    /// Horizontal stretch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xstretch: Option<f32>,
    /// Vertical stretch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ystretch: Option<f32>,
}

impl ContainerConfig {
    /// Records the fields of `settings` that differ from `baseline`.
    #[must_use]
    pub fn diff(settings: &UserSettings, baseline: &UserSettings) -> Self {
        let field = |v: f32, base: f32| (v != base).then_some(v);
        Self {
            brightness: field(settings.brightness, baseline.brightness),
            contrast: field(settings.contrast, baseline.contrast),
            gamma: field(settings.gamma, baseline.gamma),
            xoffset: field(settings.xoffset, baseline.xoffset),
            yoffset: field(settings.yoffset, baseline.yoffset),
            xstretch: field(settings.xscale, baseline.xscale),
            ystretch: field(settings.yscale, baseline.yscale),
        }
    }

    /// Overwrites the recorded fields of `settings`.
    pub fn apply(&self, settings: &mut UserSettings) {
        let set = |dst: &mut f32, v: Option<f32>| {
            if let Some(v) = v {
                *dst = v;
            }
        };
        set(&mut settings.brightness, self.brightness);
        set(&mut settings.contrast, self.contrast);
        set(&mut settings.gamma, self.gamma);
        set(&mut settings.xoffset, self.xoffset);
        set(&mut settings.yoffset, self.yoffset);
        set(&mut settings.xscale, self.xstretch);
        set(&mut settings.yscale, self.ystretch);
    }

    /// Returns `true` if nothing deviates from the baseline.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// All persisted render settings, keyed by target and screen index.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Target settings by target index.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub targets: BTreeMap<String, TargetConfig>,
    /// Screen settings by screen index.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub screens: BTreeMap<String, ContainerConfig>,
}

impl RenderConfig {
    /// Parses settings from TOML.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Encodes the settings as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Reads settings from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Writes settings to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_toml()?).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })
    }

    /// Returns `true` if nothing deviates from the baseline.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty() && self.screens.is_empty()
    }

    /// Records a target's settings, dropping empty ones.
    pub fn set_target(&mut self, index: usize, config: TargetConfig) {
        if config.is_empty() {
            self.targets.remove(&index.to_string());
        } else {
            self.targets.insert(index.to_string(), config);
        }
    }

    /// Records a screen's settings, dropping empty ones.
    pub fn set_screen(&mut self, index: usize, config: ContainerConfig) {
        if config.is_empty() {
            self.screens.remove(&index.to_string());
        } else {
            self.screens.insert(index.to_string(), config);
        }
    }

    /// Settings recorded for a target.
    #[must_use]
    pub fn target(&self, index: usize) -> Option<&TargetConfig> {
        self.targets.get(&index.to_string())
    }

    /// Settings recorded for a screen.
    #[must_use]
    pub fn screen(&self, index: usize) -> Option<&ContainerConfig> {
        self.screens.get(&index.to_string())
    }
}
