//! Manifest loading, interpolation, and validation.
//!
//! - Schema definitions in [`schema`]
//! - Layer discovery and loading in [`loader`]
//! - Deep merging in [`merger`]
//! - `${var}` interpolation in [`interpolation`]
//! - Validation in [`validator`]
//! - Target account resolution in [`target`]
//!
//! # Example
//!
//! ```
//! use outpost::config::{load_config, LoadOptions, TargetOverrides};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::create_dir_all(temp.path().join(".outpost")).unwrap();
//! fs::write(
//!     temp.path().join(".outpost/manifest.yml"),
//!     "profile:\n  - name: path\n    file: \"${home}/.zshrc\"\n    lines: [\"export A=1\"]\n",
//! )
//! .unwrap();
//!
//! let options = LoadOptions { root: temp.path().to_path_buf(), ..Default::default() };
//! let overrides = TargetOverrides { user: Some("kali".into()), home: None };
//! let config = load_config(&options, &overrides, None).unwrap();
//!
//! assert_eq!(config.manifest.profile[0].file.as_deref(), Some("/home/kali/.zshrc"));
//! ```

pub mod builtin;
pub mod interpolation;
pub mod loader;
pub mod merger;
pub mod schema;
pub mod target;
pub mod validator;

pub use interpolation::{resolve_string, InterpolationContext};
pub use loader::{load_manifest, LoadOptions, LoadedManifest, ManifestPaths, MANIFEST_DIR};
pub use merger::{deep_merge, merge_layers};
pub use schema::{
    manifest_schema, CommunityConfig, EnvironmentConfig, HelperConfig, Manifest, PackageEntry,
    PackageManagerConfig, PackageSpec, ProfileBlock, Settings, StepSettings, TargetConfig,
    ToolConfig, WorkspaceConfig,
};
pub use target::{Target, TargetOverrides};
pub use validator::{validate, validate_manifest, ValidationError};

use serde_yaml::Value;

use crate::error::{OutpostError, Result};

/// A loaded, interpolated, validated manifest and its target.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub manifest: Manifest,
    pub target: Target,
    pub sources: Vec<String>,
}

/// Load the manifest layers, resolve the target, interpolate, and validate.
///
/// `detected_user` is the fallback account, normally
/// [`shell::current_user`](crate::shell::current_user).
pub fn load_config(
    options: &LoadOptions,
    overrides: &TargetOverrides,
    detected_user: Option<String>,
) -> Result<ResolvedConfig> {
    let LoadedManifest { manifest, sources } = load_manifest(options)?;
    let target = Target::resolve(overrides, &manifest.target, detected_user)?;
    let manifest = interpolate_manifest(manifest, &target)?;
    validate(&manifest)?;

    Ok(ResolvedConfig {
        manifest,
        target,
        sources,
    })
}

/// Resolve every `${var}` in the manifest for a target.
///
/// The `target` and `vars` sections are consumed while building the
/// context and are left as written.
pub fn interpolate_manifest(manifest: Manifest, target: &Target) -> Result<Manifest> {
    let ctx = target.interpolation_context().with_vars(&manifest.vars)?;

    let mut value = serde_yaml::to_value(&manifest).map_err(anyhow::Error::from)?;
    if let Value::Mapping(map) = &mut value {
        for (key, item) in map.iter_mut() {
            if matches!(key.as_str(), Some("target") | Some("vars")) {
                continue;
            }
            interpolation::resolve_value(item, &ctx)?;
        }
    }

    serde_yaml::from_value(value).map_err(|e| OutpostError::ConfigValidationError {
        message: format!("manifest changed shape after interpolation: {}", e),
    })
}
