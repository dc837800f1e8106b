//! Built-in manifest variants embedded at compile time.

use include_dir::{include_dir, Dir};
use serde_yaml::Value;

use crate::error::{OutpostError, Result};

static MANIFESTS_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/manifests");

/// Variant used when no manifest file exists.
pub const DEFAULT_VARIANT: &str = "full";

/// Names of the embedded variants, sorted.
pub fn variant_names() -> Vec<String> {
    let mut names: Vec<String> = MANIFESTS_DIR
        .files()
        .filter(|f| f.path().extension().is_some_and(|e| e == "yml"))
        .filter_map(|f| f.path().file_stem())
        .map(|s| s.to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Load an embedded variant as a raw YAML layer.
pub fn load_variant(name: &str) -> Result<Value> {
    let path = format!("{}.yml", name);
    let file = MANIFESTS_DIR
        .get_file(&path)
        .ok_or_else(|| OutpostError::ConfigValidationError {
            message: format!(
                "unknown variant '{}' (available: {})",
                name,
                variant_names().join(", ")
            ),
        })?;

    let content = file
        .contents_utf8()
        .ok_or_else(|| OutpostError::ConfigParseError {
            path: format!("manifests/{}", path).into(),
            message: "Invalid UTF-8".to_string(),
        })?;

    serde_yaml::from_str(content).map_err(|e| OutpostError::ConfigParseError {
        path: format!("manifests/{}", path).into(),
        message: e.to_string(),
    })
}
