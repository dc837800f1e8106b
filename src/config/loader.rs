//! Manifest discovery and loading.
//!
//! Layers are merged in this order (later overrides earlier):
//! 1. A built-in variant, when `--variant` names one or no project
//!    manifest exists
//! 2. Project manifest (`.outpost/manifest.yml`)
//! 3. Local overrides (`.outpost/manifest.local.yml`)
//!
//! An explicit `--manifest` path is loaded on its own, without merging.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::debug;

use crate::error::{OutpostError, Result};

use super::builtin::{self, DEFAULT_VARIANT};
use super::merger::merge_layers;
use super::schema::Manifest;

/// Directory holding project manifests.
pub const MANIFEST_DIR: &str = ".outpost";

/// Where to load the manifest from.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Directory searched for `.outpost/`.
    pub root: PathBuf,
    /// Load exactly this file.
    pub manifest: Option<PathBuf>,
    /// Start from this built-in variant.
    pub variant: Option<String>,
}

/// Manifest files present under a root.
#[derive(Debug, Clone)]
pub struct ManifestPaths {
    pub project: Option<PathBuf>,
    pub local: Option<PathBuf>,
}

impl ManifestPaths {
    pub fn discover(root: &Path) -> Self {
        let dir = root.join(MANIFEST_DIR);
        let existing = |name: &str| Some(dir.join(name)).filter(|p| p.is_file());
        Self {
            project: existing("manifest.yml"),
            local: existing("manifest.local.yml"),
        }
    }
}

/// A merged manifest and the layers it came from.
#[derive(Debug, Clone)]
pub struct LoadedManifest {
    pub manifest: Manifest,
    /// Human-readable layer names, in merge order.
    pub sources: Vec<String>,
}

/// Load a file as a raw YAML layer. An empty file is an empty mapping.
pub fn load_value(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            OutpostError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            OutpostError::Io(e)
        }
    })?;

    let value: Value = serde_yaml::from_str(&content).map_err(|e| OutpostError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(match value {
        Value::Null => Value::Mapping(Default::default()),
        other => other,
    })
}

/// Deserialize a merged tree into a [`Manifest`].
pub fn parse_manifest(value: Value, source: &Path) -> Result<Manifest> {
    serde_yaml::from_value(value).map_err(|e| OutpostError::ConfigParseError {
        path: source.to_path_buf(),
        message: e.to_string(),
    })
}

/// Parse YAML text into a [`Manifest`].
pub fn parse_manifest_str(content: &str, source: &Path) -> Result<Manifest> {
    let value: Value = serde_yaml::from_str(content).map_err(|e| OutpostError::ConfigParseError {
        path: source.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_manifest(value, source)
}

/// Collect every layer, in merge order.
pub fn collect_layers(options: &LoadOptions) -> Result<Vec<(String, Value)>> {
    if let Some(path) = &options.manifest {
        return Ok(vec![(path.display().to_string(), load_value(path)?)]);
    }

    let paths = ManifestPaths::discover(&options.root);
    let mut layers = Vec::new();

    let variant = match (&options.variant, &paths.project) {
        (Some(v), _) => Some(v.as_str()),
        (None, None) => Some(DEFAULT_VARIANT),
        (None, Some(_)) => None,
    };
    if let Some(variant) = variant {
        layers.push((format!("builtin:{}", variant), builtin::load_variant(variant)?));
    }

    for path in [&paths.project, &paths.local].into_iter().flatten() {
        layers.push((path.display().to_string(), load_value(path)?));
    }

    Ok(layers)
}

/// Load and merge the manifest.
pub fn load_manifest(options: &LoadOptions) -> Result<LoadedManifest> {
    let layers = collect_layers(options)?;
    let sources: Vec<String> = layers.iter().map(|(name, _)| name.clone()).collect();
    debug!(?sources, "Merging manifest layers");

    let values: Vec<Value> = layers.into_iter().map(|(_, v)| v).collect();
    let merged = merge_layers(&values);

    let source = PathBuf::from(sources.last().cloned().unwrap_or_default());
    let manifest = parse_manifest(merged, &source)?;

    Ok(LoadedManifest { manifest, sources })
}
