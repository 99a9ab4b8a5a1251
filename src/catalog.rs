//! Read-only view of the production tracking catalog.
//!
//! The catalog owns entities and their schemas; this crate only reads the
//! handful of fields it needs through the `Catalog` trait. `JsonCatalog` is a
//! file-backed implementation used by the CLI and in tests.

use crate::error::{ActionError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// A catalog type declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub id: String,
    /// Canonical type this schema stands in for.
    #[serde(default)]
    pub alias_for: Option<String>,
}

/// Where a component lives on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentLocation {
    #[serde(default)]
    pub filesystem_path: Option<String>,
    pub resource_identifier: String,
}

impl ComponentLocation {
    /// Filesystem path when the location resolves one, else the raw identifier.
    pub fn path(&self) -> &str {
        self.filesystem_path.as_deref().unwrap_or(&self.resource_identifier)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    pub file_type: String,
    #[serde(default)]
    pub locations: Vec<ComponentLocation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    pub asset_type: String,
    #[serde(default)]
    pub versions: Vec<Entity>,
}

/// A catalog record. Which fields are populated depends on `entity_type`:
/// shots carry `assets`, asset versions carry `version`, `task`,
/// `asset_type` and `components`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub entity_type: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub custom_attributes: BTreeMap<String, Value>,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub asset_type: Option<String>,
    #[serde(default)]
    pub components: Vec<Component>,
}

impl Entity {
    pub fn is_type(&self, entity_type: &str) -> bool {
        self.entity_type.eq_ignore_ascii_case(entity_type)
    }

    /// Integer frame rate from the `fps` custom attribute.
    ///
    /// `None` when the attribute is absent or not a whole number (numeric
    /// strings are accepted).
    pub fn frame_rate(&self) -> Option<u32> {
        match self.custom_attributes.get("fps")? {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
                .and_then(|v| u32::try_from(v).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// File type of the first component, the one that decides reviewability.
    pub fn primary_file_type(&self) -> Option<&str> {
        self.components.first().map(|c| c.file_type.as_str())
    }
}

/// Read access to the external catalog.
pub trait Catalog {
    fn schemas(&self) -> &[Schema];

    /// Fetches an entity of schema `schema_id` by id.
    fn get(&self, schema_id: &str, entity_id: &str) -> Result<Entity>;

    /// Fetches the parent of `entity`, if it has one.
    fn parent(&self, entity: &Entity) -> Result<Option<Entity>>;
}

/// Maps a host entity-type label to the catalog schema id.
///
/// The label is lowercased with underscores removed. A schema whose alias
/// target matches wins over one whose own id matches.
pub fn resolve_type(schemas: &[Schema], entity_type: &str) -> Result<String> {
    let normalized = entity_type.replace('_', "").to_lowercase();

    let by_alias = schemas.iter().find(|schema| {
        schema
            .alias_for
            .as_deref()
            .is_some_and(|alias| alias.to_lowercase() == normalized)
    });
    if let Some(schema) = by_alias {
        return Ok(schema.id.clone());
    }

    schemas
        .iter()
        .find(|schema| schema.id.to_lowercase() == normalized)
        .map(|schema| schema.id.clone())
        .ok_or(ActionError::Translation(normalized))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    schemas: Vec<Schema>,
    #[serde(default)]
    entities: Vec<Entity>,
}

/// Catalog loaded from a JSON document of schemas and entities.
///
/// Asset versions nested under a shot's assets are indexed alongside the
/// top-level entities, inheriting the asset's type when they do not name one.
#[derive(Debug, Clone, Default)]
pub struct JsonCatalog {
    schemas: Vec<Schema>,
    entities: HashMap<String, Entity>,
}

impl JsonCatalog {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read catalog file: {:?}", path))?;
        Self::from_json(&content).context(format!("Failed to parse catalog file: {:?}", path))
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let document: CatalogDocument = serde_json::from_str(content)?;
        Ok(Self::from_parts(document.schemas, document.entities))
    }

    pub fn from_parts(schemas: Vec<Schema>, entities: Vec<Entity>) -> Self {
        let mut catalog = Self {
            schemas,
            entities: HashMap::new(),
        };
        for entity in entities {
            catalog.insert(entity);
        }
        catalog
    }

    fn insert(&mut self, mut entity: Entity) {
        for asset in &mut entity.assets {
            for version in &mut asset.versions {
                if version.asset_type.is_none() {
                    version.asset_type = Some(asset.asset_type.clone());
                }
                self.entities
                    .entry(version.id.clone())
                    .or_insert_with(|| version.clone());
            }
        }
        self.entities.insert(entity.id.clone(), entity);
    }
}

impl Catalog for JsonCatalog {
    fn schemas(&self) -> &[Schema] {
        &self.schemas
    }

    fn get(&self, schema_id: &str, entity_id: &str) -> Result<Entity> {
        self.entities
            .get(entity_id)
            .filter(|entity| entity.is_type(schema_id))
            .cloned()
            .ok_or_else(|| ActionError::Catalog(format!("{schema_id}({entity_id}) not found")))
    }

    fn parent(&self, entity: &Entity) -> Result<Option<Entity>> {
        let Some(parent_id) = &entity.parent else {
            return Ok(None);
        };
        self.entities
            .get(parent_id)
            .cloned()
            .map(Some)
            .ok_or_else(|| ActionError::Catalog(format!("parent {parent_id} of {} not found", entity.id)))
    }
}
