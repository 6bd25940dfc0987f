//! Key → command mapping
//!
//! This module provides the mapping table that:
//! - Maps key identifiers to application commands
//! - Supports overwriting and overwrite-protected insertion
//! - Enables user customization via YAML keymap files
//!
//! # Loading Keymaps
//!
//! ```ignore
//! // Embedded defaults layered with project and user overrides
//! let mapping = load_default_keymap();
//!
//! // Or a single YAML file
//! let mapping = load_keymap_file(Path::new("keymap.yaml"))?;
//! ```

mod config;
mod defaults;
#[allow(clippy::module_inception)]
mod keymap;
mod types;

pub use config::{load_keymap_file, parse_keymap_yaml, KeymapError};
pub use defaults::{default_mapping, get_default_keymap_yaml, load_default_keymap, merge_mappings};
pub use keymap::{
    mapping_from, mapping_from_json_value, mapping_from_yaml_value, Mapping, MappingTable,
};
pub use types::{Command, Key};
