//! Action configuration.
//!
//! Every field has a default matching the stock DJV View action, so an empty
//! JSON object (or no file at all) yields a working configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::pattern::{PathPattern, Platform};

/// Placeholder substituted into identifier, label and variant templates.
pub const VERSION_PLACEHOLDER: &str = "{version}";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionConfig {
    pub action_identifier: String,
    pub application_identifier: String,
    pub label: String,
    pub description: String,
    pub icon: String,
    pub variant: Option<String>,
    pub allowed_file_types: Vec<String>,
    pub default_fps: u32,
    pub selectable_entity_types: Vec<String>,
    /// Explicit segment list replacing the platform layout.
    pub segments: Option<Vec<String>>,
    /// Directory a relative root segment is resolved against.
    pub base_dir: Option<PathBuf>,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            action_identifier: "djvview-launch-action".to_string(),
            application_identifier: "djvview-{version}".to_string(),
            label: "DJVView {version}".to_string(),
            description: "DJV View Launcher".to_string(),
            icon: "http://a.fsdn.com/allura/p/djv/icon".to_string(),
            variant: None,
            allowed_file_types: vec!["img".to_string(), "mov".to_string(), "exr".to_string()],
            default_fps: 24,
            selectable_entity_types: vec!["assetversion".to_string(), "task".to_string()],
            segments: None,
            base_dir: default_base_dir(),
        }
    }
}

impl ActionConfig {
    /// Loads a configuration file, filling absent fields with defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {:?}", path))?;
        Self::from_json(&content).context(format!("Failed to parse config file: {:?}", path))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Compiles the configured layout, or the platform's when none is set.
    pub fn path_pattern(&self) -> crate::error::Result<PathPattern> {
        let base_dir = self.base_dir.as_deref();
        match &self.segments {
            Some(segments) => {
                let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
                PathPattern::compile(&segments, base_dir)
            }
            None => PathPattern::for_platform(Platform::current(), base_dir),
        }
    }

    pub fn is_allowed_file_type(&self, file_type: &str) -> bool {
        self.allowed_file_types.iter().any(|t| t == file_type)
    }

    pub fn is_selectable(&self, entity_type: &str) -> bool {
        self.selectable_entity_types.iter().any(|t| t == entity_type)
    }
}

/// Fills `{version}` in a template.
pub fn render(template: &str, version: &str) -> String {
    template.replace(VERSION_PLACEHOLDER, version)
}

fn default_base_dir() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        None
    } else {
        Some(PathBuf::from("/"))
    }
}
