//! Host event payloads and the response shapes returned to the host.

use crate::application::ApplicationItem;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A discover or launch event raised by the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionEvent {
    #[serde(default)]
    pub data: EventData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventData {
    #[serde(default)]
    pub selection: Vec<SelectionEntry>,
    /// Form values submitted from the item picker.
    #[serde(default)]
    pub values: Option<LaunchValues>,
    #[serde(default)]
    pub application_identifier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionEntry {
    pub entity_type: String,
    /// Opaque catalog id; hosts may send it as a string or a number.
    #[serde(deserialize_with = "opaque_id")]
    pub entity_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchValues {
    pub path: String,
}

fn opaque_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "entityId must be a string or number, got {other}"
        ))),
    }
}

impl ActionEvent {
    pub fn selection(&self) -> &[SelectionEntry] {
        &self.data.selection
    }

    /// The path chosen in the item picker, if this is a launch submission.
    pub fn launch_path(&self) -> Option<&str> {
        self.data.values.as_ref().map(|v| v.path.as_str())
    }
}

/// Answer to a discover event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoverResponse {
    pub items: Vec<ApplicationItem>,
}

/// `{success, message}` result of a user-triggered operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
}

impl ActionOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// One selectable entry of the item picker.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReviewableItem {
    pub label: String,
    pub value: String,
}

/// Form field presented to the user to pick a reviewable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumeratorField {
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub name: String,
    pub data: Vec<ReviewableItem>,
}

impl EnumeratorField {
    /// Picker over `items`, sorted by label descending.
    pub fn items_to_view(mut items: Vec<ReviewableItem>) -> Self {
        items.sort_by(|a, b| b.label.cmp(&a.label));
        Self {
            label: "Items to view".to_string(),
            field_type: "enumerator".to_string(),
            name: "path".to_string(),
            data: items,
        }
    }
}

/// Answer to a launch event: either the picker form or the launch result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LaunchResponse {
    Form { items: Vec<EnumeratorField> },
    Outcome(ActionOutcome),
}

impl From<ActionOutcome> for LaunchResponse {
    fn from(outcome: ActionOutcome) -> Self {
        LaunchResponse::Outcome(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_host_payload() {
        let event: ActionEvent = serde_json::from_value(json!({
            "data": {
                "selection": [{"entityType": "task", "entityId": "t1"}],
                "values": {"path": "/shots/a.mov"},
                "applicationIdentifier": "djvview-1.2.3"
            }
        }))
        .unwrap();

        assert_eq!(event.selection()[0].entity_type, "task");
        assert_eq!(event.launch_path(), Some("/shots/a.mov"));
        assert_eq!(event.data.application_identifier.as_deref(), Some("djvview-1.2.3"));
    }

    #[test]
    fn numeric_entity_id_is_accepted() {
        let event: ActionEvent = serde_json::from_value(json!({
            "data": {"selection": [{"entityType": "task", "entityId": 42}]}
        }))
        .unwrap();
        assert_eq!(event.selection()[0].entity_id, "42");

        let bad = serde_json::from_value::<ActionEvent>(json!({
            "data": {"selection": [{"entityType": "task", "entityId": {"id": 1}}]}
        }));
        assert!(bad.is_err());
    }

    #[test]
    fn picker_sorts_descending_and_serializes_type() {
        let field = EnumeratorField::items_to_view(vec![
            ReviewableItem { label: "v001 - comp - main".into(), value: "a".into() },
            ReviewableItem { label: "v003 - comp - main".into(), value: "b".into() },
        ]);
        assert_eq!(field.data[0].label, "v003 - comp - main");

        let value = serde_json::to_value(LaunchResponse::Form { items: vec![field] }).unwrap();
        assert_eq!(value["items"][0]["type"], "enumerator");
        assert_eq!(value["items"][0]["name"], "path");
    }

    #[test]
    fn outcome_serializes_flat() {
        let value = serde_json::to_value(LaunchResponse::from(ActionOutcome::failure("nope"))).unwrap();
        assert_eq!(value, json!({"success": false, "message": "nope"}));
    }
}
