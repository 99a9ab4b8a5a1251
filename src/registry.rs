//! Viewer discovery for DJV View.
//!
//! Discovery walks the filesystem from the literal root of a `PathPattern`,
//! pruning every directory whose name fails the matcher for its depth. At the
//! final depth every entry (file or directory, since a macOS executable may be
//! an `.app` bundle) is tested against the last matcher, and each hit that
//! carries a `major.minor.patch` token in its path becomes a
//! `DiscoveredApplication`.
//!
//! The walk follows symbolic links and has no cycle detection.

use crate::application::DiscoveredApplication;
use crate::config::{render, ActionConfig};
use crate::error::{ActionError, Result};
use crate::pattern::PathPattern;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

fn version_expression() -> &'static Regex {
    static VERSION: OnceLock<Regex> = OnceLock::new();
    VERSION.get_or_init(|| Regex::new(r"(?P<version>\d+.\d+.\d+)").expect("version pattern is valid"))
}

/// Runs discovery with the configured (or platform) layout.
pub fn discover(config: &ActionConfig) -> Result<Vec<DiscoveredApplication>> {
    let pattern = config.path_pattern()?;
    discover_with(&pattern, config)
}

/// Runs discovery against an explicit layout.
///
/// Fails only when the layout root does not exist. Results are unordered.
pub fn discover_with(pattern: &PathPattern, config: &ActionConfig) -> Result<Vec<DiscoveredApplication>> {
    let root = pattern.root();
    if !root.exists() {
        return Err(ActionError::Configuration {
            root: root.display().to_string(),
            expression: pattern.to_string(),
        });
    }

    let mut applications = Vec::new();
    let final_depth = pattern.final_depth();
    let mut pending: Vec<(PathBuf, usize)> = vec![(root.to_path_buf(), 0)];

    while let Some((dir, depth)) = pending.pop() {
        let Some(matcher) = pattern.segment(depth) else {
            continue;
        };

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("Skipping unreadable directory {:?}: {}", dir, e);
                continue;
            }
        };

        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !matcher.matches(name) {
                continue;
            }

            let path = entry.path();
            if depth < final_depth {
                // Files above the final level never lead to an executable.
                if path.is_dir() {
                    pending.push((path, depth + 1));
                }
            } else if let Some(application) = build_application(&path, config) {
                applications.push(application);
            }
        }
    }

    tracing::info!("Discovered {} DJV View installation(s) under {:?}", applications.len(), root);
    Ok(applications)
}

/// Extracts the first `major.minor.patch` token from a path.
pub fn extract_version(path: &Path) -> Option<String> {
    let path = path.to_string_lossy();
    version_expression()
        .captures(&path)
        .and_then(|caps| caps.name("version"))
        .map(|m| m.as_str().to_string())
}

fn build_application(path: &Path, config: &ActionConfig) -> Option<DiscoveredApplication> {
    let Some(version) = extract_version(path) else {
        tracing::debug!(
            "Discovered application executable, but it does not appear to contain required version information: {:?}",
            path
        );
        return None;
    };

    Some(DiscoveredApplication {
        identifier: render(&config.application_identifier, &version),
        path: path.to_path_buf(),
        label: render(&config.label, &version),
        icon: config.icon.clone(),
        description: config.description.clone(),
        variant: config.variant.as_deref().map(|v| render(v, &version)),
        version,
    })
}
