//! DJV Launch Core Library
//!
//! Finds installed DJV View viewers and launches them on media picked from a
//! production tracking catalog.
//!
//! # Architecture
//!
//! The library is hosted by an event-driven action runtime (through the CLI or
//! the C ABI in `ffi`). The host owns event registration, the catalog session
//! and the UI; this crate owns the decisions.
//!
//! # Core Features Implemented
//!
//! ## Viewer Discovery (`pattern`, `registry` modules)
//! - `Platform::segments()` - Conventional install layout per platform family
//! - `discover()` - Pruning walk that matches the layout depth by depth
//! - Version extraction (`major.minor.patch`) from each matched executable
//!
//! ## Sequence Handling (`sequence` module)
//! - `resolve()` - Replace a `%04d`-style directive with the frame range on disk
//!
//! ## Launching (`command`, `operations` modules)
//! - `LaunchCommand::build()` - Viewer command line in the viewer's option order
//! - `DjvViewAction` - Discover/list/launch flows returning host result shapes
//!
//! ## Catalog (`catalog` module)
//! - `Catalog` - Read-only access to schemas and entities
//! - `resolve_type()` - Alias-then-id mapping of host entity types to schemas
//! - `JsonCatalog` - File-backed catalog for the CLI and tests

pub mod application;
pub mod catalog;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod ffi;
pub mod logging;
pub mod operations;
pub mod pattern;
pub mod registry;
pub mod sequence;

pub use application::{ApplicationItem, DiscoveredApplication};
pub use catalog::{resolve_type, Catalog, JsonCatalog};
pub use command::{DetachedSpawner, LaunchCommand, ProcessSpawner};
pub use config::ActionConfig;
pub use error::ActionError;
pub use event::{ActionEvent, ActionOutcome, LaunchResponse};
pub use operations::DjvViewAction;
pub use pattern::{PathPattern, Platform};
pub use registry::discover;
pub use sequence::{resolve, FrameSequenceSpec};
