use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One viewer installation found by a discovery run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredApplication {
    pub identifier: String,
    pub path: PathBuf,
    pub version: String,
    pub label: String,
    pub icon: String,
    pub description: String,
    pub variant: Option<String>,
}

/// Action menu entry surfaced to the host for a discovered application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationItem {
    pub action_identifier: String,
    pub label: String,
    pub variant: Option<String>,
    pub description: String,
    pub icon: String,
    pub application_identifier: String,
}

impl ApplicationItem {
    pub fn new(action_identifier: &str, application: &DiscoveredApplication) -> Self {
        Self {
            action_identifier: action_identifier.to_string(),
            label: application.label.clone(),
            variant: application.variant.clone(),
            description: application.description.clone(),
            icon: application.icon.clone(),
            application_identifier: application.identifier.clone(),
        }
    }
}

/// Sorts applications by label, the order they are presented in.
pub fn sort_by_label(applications: &mut [DiscoveredApplication]) {
    applications.sort_by(|a, b| a.label.cmp(&b.label));
}
