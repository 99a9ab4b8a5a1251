//! The DJV View action: discover, list reviewable items, launch.
//!
//! The host drives the action with two events:
//! - Discover: answered with the discovered viewers when the selection holds
//!   an entity type the action can review.
//! - Launch: without form values, answered with a picker listing the
//!   reviewable components of the selection; with a chosen `path`, the viewer
//!   is started on it.
//!
//! User-triggered flows report failures as `{success: false, message}`. Only
//! an untranslatable entity type escapes as an `Err`.

use crate::application::{sort_by_label, ApplicationItem, DiscoveredApplication};
use crate::catalog::{resolve_type, Catalog, Entity};
use crate::command::{DetachedSpawner, LaunchCommand, ProcessSpawner};
use crate::config::ActionConfig;
use crate::error::{ActionError, Result};
use crate::event::{
    ActionEvent, ActionOutcome, DiscoverResponse, EnumeratorField, LaunchResponse, ReviewableItem,
};
use crate::registry;
use crate::sequence;

pub const STARTED_MESSAGE: &str = "DJV View started.";

pub struct DjvViewAction<S = DetachedSpawner> {
    config: ActionConfig,
    applications: Vec<DiscoveredApplication>,
    spawner: S,
}

impl DjvViewAction<DetachedSpawner> {
    /// Discovers installed viewers and prepares the action.
    ///
    /// Fails when the install root of the layout does not exist.
    pub fn new(config: ActionConfig) -> Result<Self> {
        let applications = registry::discover(&config)?;
        Ok(Self::with_applications(config, applications, DetachedSpawner))
    }
}

impl<S: ProcessSpawner> DjvViewAction<S> {
    pub fn with_applications(
        config: ActionConfig,
        mut applications: Vec<DiscoveredApplication>,
        spawner: S,
    ) -> Self {
        sort_by_label(&mut applications);
        Self {
            config,
            applications,
            spawner,
        }
    }

    pub fn config(&self) -> &ActionConfig {
        &self.config
    }

    /// Discovered viewers in label order.
    pub fn applications(&self) -> &[DiscoveredApplication] {
        &self.applications
    }

    pub fn items(&self) -> Vec<ApplicationItem> {
        self.applications
            .iter()
            .map(|app| ApplicationItem::new(&self.config.action_identifier, app))
            .collect()
    }

    /// True when the first selected entity has a reviewable type.
    pub fn is_valid_selection(&self, event: &ActionEvent) -> bool {
        event
            .selection()
            .first()
            .is_some_and(|entry| self.config.is_selectable(&entry.entity_type))
    }

    pub fn discover(&self, event: &ActionEvent) -> Option<DiscoverResponse> {
        if !self.is_valid_selection(event) {
            return None;
        }
        Some(DiscoverResponse { items: self.items() })
    }

    /// Resolves the event's selection into catalog entities.
    pub fn translate_event(&self, catalog: &dyn Catalog, event: &ActionEvent) -> Result<Vec<Entity>> {
        event
            .selection()
            .iter()
            .map(|entry| {
                let schema_id = resolve_type(catalog.schemas(), &entry.entity_type)?;
                catalog.get(&schema_id, &entry.entity_id)
            })
            .collect()
    }

    /// Handles a launch event.
    pub fn launch(&self, catalog: &dyn Catalog, event: &ActionEvent) -> Result<LaunchResponse> {
        let entities = match self.translate_event(catalog, event) {
            Ok(entities) => entities,
            Err(e) if e.is_request_failure() => return Err(e),
            Err(e) => return Ok(ActionOutcome::failure(e.to_string()).into()),
        };

        if let Some(path) = event.launch_path() {
            let outcome = match self.open(&entities, path, event.data.application_identifier.as_deref()) {
                Ok(()) => ActionOutcome::success(STARTED_MESSAGE),
                Err(e) => ActionOutcome::failure(e.to_string()),
            };
            return Ok(outcome.into());
        }

        match self.reviewable_items(catalog, &entities) {
            Ok(items) => Ok(LaunchResponse::Form {
                items: vec![EnumeratorField::items_to_view(items)],
            }),
            Err(e) => Ok(ActionOutcome::failure(e.to_string()).into()),
        }
    }

    /// Starts the viewer on `path`, expanding a frame sequence to its range.
    fn open(&self, entities: &[Entity], path: &str, application_identifier: Option<&str>) -> Result<()> {
        let application = self.select_application(application_identifier)?;
        let fps = entities
            .first()
            .and_then(Entity::frame_rate)
            .unwrap_or(self.config.default_fps);

        let media = sequence::resolve(path, sequence::file_extension(path))?;
        let command = LaunchCommand::build(&application.path, &media, fps);
        tracing::info!("Launching {}: {}", application.label, command.arguments().join(" "));

        self.spawner.spawn(&command)
    }

    /// The viewer named by `identifier`, else the last one in label order.
    fn select_application(&self, identifier: Option<&str>) -> Result<&DiscoveredApplication> {
        identifier
            .and_then(|id| self.applications.iter().find(|app| app.identifier == id))
            .or_else(|| self.applications.last())
            .ok_or(ActionError::NoApplication)
    }

    /// Lists the components of every reviewable version in the selection.
    pub fn reviewable_items(&self, catalog: &dyn Catalog, entities: &[Entity]) -> Result<Vec<ReviewableItem>> {
        let mut items = Vec::new();

        for entity in entities {
            let versions = self.reviewable_versions(catalog, entity)?;
            if versions.is_empty() {
                return Err(ActionError::NoReviewableContent);
            }

            for version in &versions {
                let asset_type = version.asset_type.as_deref().unwrap_or_default();
                for component in &version.components {
                    let Some(location) = component.locations.first() else {
                        tracing::warn!("Component {} of version {} has no location", component.name, version.id);
                        continue;
                    };
                    items.push(ReviewableItem {
                        label: format!(
                            "v{:03} - {} - {}",
                            version.version.unwrap_or_default(),
                            asset_type,
                            component.name
                        ),
                        value: location.path().to_string(),
                    });
                }
            }
        }

        Ok(items)
    }

    fn reviewable_versions(&self, catalog: &dyn Catalog, entity: &Entity) -> Result<Vec<Entity>> {
        let mut versions = Vec::new();

        if entity.is_type("assetversion") {
            if self.has_allowed_type(entity) {
                versions.push(entity.clone());
            }
        } else if entity.is_type("task") {
            // Asset versions hang off the task's parent shot.
            let Some(shot) = catalog.parent(entity)? else {
                return Ok(versions);
            };
            for asset in &shot.assets {
                for version in &asset.versions {
                    if version.task.as_deref() != Some(entity.id.as_str()) || !self.has_allowed_type(version) {
                        continue;
                    }
                    let mut version = version.clone();
                    version.asset_type.get_or_insert_with(|| asset.asset_type.clone());
                    versions.push(version);
                }
            }
        }

        Ok(versions)
    }

    fn has_allowed_type(&self, version: &Entity) -> bool {
        version
            .primary_file_type()
            .is_some_and(|file_type| self.config.is_allowed_file_type(file_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::JsonCatalog;
    use serde_json::json;
    use std::cell::RefCell;
    use std::path::PathBuf;

    #[derive(Default)]
    struct RecordingSpawner {
        launched: RefCell<Vec<Vec<String>>>,
    }

    impl ProcessSpawner for &RecordingSpawner {
        fn spawn(&self, command: &LaunchCommand) -> Result<()> {
            self.launched.borrow_mut().push(command.arguments());
            Ok(())
        }
    }

    fn application(version: &str) -> DiscoveredApplication {
        DiscoveredApplication {
            identifier: format!("djvview-{version}"),
            path: PathBuf::from(format!("/opt/djv-{version}/bin/djv_view")),
            version: version.to_string(),
            label: format!("DJVView {version}"),
            icon: "icon".to_string(),
            description: "DJV View Launcher".to_string(),
            variant: None,
        }
    }

    fn catalog() -> JsonCatalog {
        JsonCatalog::from_json(
            &json!({
                "schemas": [
                    {"id": "Task"}, {"id": "Shot"}, {"id": "AssetVersion"},
                    {"id": "Folder", "alias_for": "Shot"}
                ],
                "entities": [
                    {"id": "t1", "entity_type": "Task", "parent": "sh010",
                     "custom_attributes": {"fps": 25}},
                    {"id": "t2", "entity_type": "Task", "parent": "sh010"},
                    {"id": "sh010", "entity_type": "Shot", "assets": [{
                        "name": "comp", "asset_type": "Compositing",
                        "versions": [
                            {"id": "v1", "entity_type": "AssetVersion", "version": 1, "task": "t1",
                             "components": [{"name": "main", "file_type": "exr",
                                "locations": [{"resource_identifier": "/shots/sh010/comp_v001.%04d.exr"}]}]},
                            {"id": "v2", "entity_type": "AssetVersion", "version": 2, "task": "t1",
                             "components": [{"name": "main", "file_type": "mov",
                                "locations": [{"filesystem_path": "/shots/sh010/comp_v002.mov",
                                               "resource_identifier": "id-v2"}]}]},
                            {"id": "v3", "entity_type": "AssetVersion", "version": 3, "task": "t1",
                             "components": [{"name": "main", "file_type": "abc",
                                "locations": [{"resource_identifier": "/shots/sh010/cache.abc"}]}]},
                            {"id": "v4", "entity_type": "AssetVersion", "version": 4, "task": "t2",
                             "components": [{"name": "main", "file_type": "zip",
                                "locations": [{"resource_identifier": "/shots/sh010/a.zip"}]}]}
                        ]
                    }]}
                ]
            })
            .to_string(),
        )
        .unwrap()
    }

    fn event(value: serde_json::Value) -> ActionEvent {
        serde_json::from_value(value).unwrap()
    }

    fn action(spawner: &RecordingSpawner) -> DjvViewAction<&RecordingSpawner> {
        DjvViewAction::with_applications(
            ActionConfig::default(),
            vec![application("2.0.0"), application("1.2.3")],
            spawner,
        )
    }

    #[test]
    fn discover_answers_only_reviewable_selections() {
        let spawner = RecordingSpawner::default();
        let action = action(&spawner);

        let response = action
            .discover(&event(json!({"data": {"selection": [{"entityType": "task", "entityId": "t1"}]}})))
            .unwrap();
        let labels: Vec<&str> = response.items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["DJVView 1.2.3", "DJVView 2.0.0"]);
        assert_eq!(response.items[0].action_identifier, "djvview-launch-action");

        assert!(action
            .discover(&event(json!({"data": {"selection": [{"entityType": "shot", "entityId": "sh010"}]}})))
            .is_none());
        assert!(action.discover(&ActionEvent::default()).is_none());
    }

    #[test]
    fn task_lists_allowed_components_of_its_versions() {
        let spawner = RecordingSpawner::default();
        let response = action(&spawner)
            .launch(&catalog(), &event(json!({"data": {"selection": [{"entityType": "task", "entityId": "t1"}]}})))
            .unwrap();

        let items = match response {
            LaunchResponse::Form { items } => items,
            other => panic!("expected picker, got {other:?}"),
        };
        assert_eq!(items[0].label, "Items to view");
        assert_eq!(
            items[0].data,
            vec![
                ReviewableItem {
                    label: "v002 - Compositing - main".into(),
                    value: "/shots/sh010/comp_v002.mov".into()
                },
                ReviewableItem {
                    label: "v001 - Compositing - main".into(),
                    value: "/shots/sh010/comp_v001.%04d.exr".into()
                },
            ]
        );
    }

    #[test]
    fn task_without_reviewable_versions_fails_softly() {
        let spawner = RecordingSpawner::default();
        let response = action(&spawner)
            .launch(&catalog(), &event(json!({"data": {"selection": [{"entityType": "task", "entityId": "t2"}]}})))
            .unwrap();

        assert_eq!(
            response,
            LaunchResponse::Outcome(ActionOutcome::failure("There are no Asset Versions to open."))
        );
    }

    #[test]
    fn selected_version_is_listed_directly() {
        let spawner = RecordingSpawner::default();
        let response = action(&spawner)
            .launch(
                &catalog(),
                &event(json!({"data": {"selection": [{"entityType": "asset_version", "entityId": "v2"}]}})),
            )
            .unwrap();

        let items = match response {
            LaunchResponse::Form { items } => items,
            other => panic!("expected picker, got {other:?}"),
        };
        assert_eq!(items[0].data.len(), 1);
    }

    #[test]
    fn unknown_entity_type_propagates() {
        let spawner = RecordingSpawner::default();
        let err = action(&spawner)
            .launch(&catalog(), &event(json!({"data": {"selection": [{"entityType": "episode", "entityId": "e1"}]}})))
            .unwrap_err();

        assert!(matches!(err, ActionError::Translation(_)));
    }

    #[test]
    fn launch_uses_entity_frame_rate_and_chosen_viewer() {
        let spawner = RecordingSpawner::default();
        let response = action(&spawner)
            .launch(
                &catalog(),
                &event(json!({"data": {
                    "selection": [{"entityType": "task", "entityId": "t1"}],
                    "values": {"path": "/shots/sh010/comp_v002.mov"},
                    "applicationIdentifier": "djvview-1.2.3"
                }})),
            )
            .unwrap();

        assert_eq!(response, LaunchResponse::Outcome(ActionOutcome::success(STARTED_MESSAGE)));
        let launched = spawner.launched.borrow();
        assert_eq!(launched[0][0], "/opt/djv-1.2.3/bin/djv_view");
        assert_eq!(launched[0][4], "-playback_speed 25");
        assert_eq!(launched[0][6], "/shots/sh010/comp_v002.mov");
    }

    #[test]
    fn launch_defaults_to_last_viewer_and_24_fps() {
        let spawner = RecordingSpawner::default();
        action(&spawner)
            .launch(
                &catalog(),
                &event(json!({"data": {
                    "selection": [{"entityType": "task", "entityId": "t2"}],
                    "values": {"path": "/shots/a.mov"}
                }})),
            )
            .unwrap();

        let launched = spawner.launched.borrow();
        assert_eq!(launched[0][0], "/opt/djv-2.0.0/bin/djv_view");
        assert_eq!(launched[0][4], "-playback_speed 24");
    }

    #[test]
    fn multiple_markers_fail_without_launching() {
        let spawner = RecordingSpawner::default();
        let response = action(&spawner)
            .launch(
                &catalog(),
                &event(json!({"data": {"values": {"path": "/shots/%04d/a.%04d.exr"}}})),
            )
            .unwrap();

        assert_eq!(
            response,
            LaunchResponse::Outcome(ActionOutcome::failure(
                "DJV View - Filename has more than one sequence identifier."
            ))
        );
        assert!(spawner.launched.borrow().is_empty());
    }

    #[test]
    fn launch_without_viewers_fails_softly() {
        let spawner = RecordingSpawner::default();
        let action = DjvViewAction::with_applications(ActionConfig::default(), vec![], &spawner);

        let response = action
            .launch(&catalog(), &event(json!({"data": {"values": {"path": "/a.mov"}}})))
            .unwrap();

        assert!(matches!(response, LaunchResponse::Outcome(ActionOutcome { success: false, .. })));
    }

    struct FailingSpawner;

    impl ProcessSpawner for FailingSpawner {
        fn spawn(&self, command: &LaunchCommand) -> Result<()> {
            Err(ActionError::Spawn {
                program: command.executable.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            })
        }
    }

    #[test]
    fn spawn_failure_becomes_unsuccessful_result() {
        let action = DjvViewAction::with_applications(
            ActionConfig::default(),
            vec![application("1.2.3")],
            FailingSpawner,
        );

        let response = action
            .launch(&catalog(), &event(json!({"data": {"values": {"path": "/shots/a.mov"}}})))
            .unwrap();

        match response {
            LaunchResponse::Outcome(ActionOutcome { success: false, message }) => {
                assert!(message.starts_with("Failed to start"), "{message}");
                assert!(message.contains("djv-1.2.3"), "{message}");
            }
            other => panic!("expected failed outcome, got {other:?}"),
        }
    }

    #[test]
    fn oversized_frame_padding_fails_without_launching() {
        let spawner = RecordingSpawner::default();
        let response = action(&spawner)
            .launch(&catalog(), &event(json!({"data": {"values": {"path": "/shots/a.%70000d.exr"}}})))
            .unwrap();

        assert!(matches!(response, LaunchResponse::Outcome(ActionOutcome { success: false, .. })));
        assert!(spawner.launched.borrow().is_empty());
    }
}
