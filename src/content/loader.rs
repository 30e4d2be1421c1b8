//! Loader for RON boss files at startup.

use ron::Options;
use std::fs;
use std::path::Path;

use super::data::*;
use super::registry::BossRegistry;

/// Directory the plugin reads from unless told otherwise.
pub const DEFAULT_DATA_DIR: &str = "assets/data";
pub const BOSSES_FILE: &str = "bosses.ron";

/// Error type for content loading failures.
#[derive(Debug)]
pub struct ContentLoadError {
    pub file: String,
    pub message: String,
}

impl std::fmt::Display for ContentLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to load {}: {}", self.file, self.message)
    }
}

impl std::error::Error for ContentLoadError {}

/// Create RON options with extensions enabled for more flexible parsing.
fn ron_options() -> Options {
    Options::default().with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME)
}

/// Parse the contents of a RON file containing a DataFile<T> wrapper.
pub fn parse_data_file<T>(contents: &str, file_name: &str) -> Result<Vec<T>, ContentLoadError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let data: DataFile<T> = ron_options()
        .from_str(contents)
        .map_err(|e| ContentLoadError {
            file: file_name.to_string(),
            message: format!("Parse error: {}", e),
        })?;

    Ok(data.items)
}

/// Load a RON file containing a DataFile<T> wrapper.
fn load_data_file<T>(path: &Path) -> Result<Vec<T>, ContentLoadError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let file_name = path.display().to_string();
    let contents = fs::read_to_string(path).map_err(|e| ContentLoadError {
        file: file_name.clone(),
        message: format!("IO error: {}", e),
    })?;

    parse_data_file(&contents, &file_name)
}

/// Build a registry from parsed definitions. Duplicate ids are reported, first one wins.
pub fn registry_from_defs(
    defs: Vec<BossDef>,
    file_name: &str,
) -> Result<BossRegistry, Vec<ContentLoadError>> {
    let mut registry = BossRegistry::default();
    let mut errors = Vec::new();

    for def in defs {
        if registry.contains(&def.id) {
            errors.push(ContentLoadError {
                file: file_name.to_string(),
                message: format!("Duplicate boss id '{}'", def.id),
            });
            continue;
        }
        registry.insert(def);
    }

    if errors.is_empty() {
        Ok(registry)
    } else {
        Err(errors)
    }
}

/// Load assets/data/bosses.ron into a BossRegistry.
pub fn load_bosses(base_path: &Path) -> Result<BossRegistry, Vec<ContentLoadError>> {
    let path = base_path.join(BOSSES_FILE);
    let defs = load_data_file::<BossDef>(&path).map_err(|e| vec![e])?;
    registry_from_defs(defs, &path.display().to_string())
}
