//! Manifest schema definitions.
//!
//! These structs map one-to-one onto the YAML manifest format. Every
//! section is optional; a missing section deserializes to its default.

use std::collections::BTreeMap;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::steps::Severity;

/// Root of a provisioning manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Manifest {
    /// Display name of the manifest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Emit a Fatal `privilege` step that requires root.
    #[serde(skip_serializing_if = "is_false")]
    pub require_root: bool,

    /// The account being provisioned.
    pub target: TargetConfig,

    /// Extra `${name}` variables.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub vars: BTreeMap<String, String>,

    /// Run-wide settings.
    pub settings: Settings,

    /// The system package manager.
    pub package_manager: PackageManagerConfig,

    /// Secondary repository tried when the official install fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community: Option<CommunityConfig>,

    /// Third-party helper built from source for packages outside both
    /// repositories.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub helper: Option<HelperConfig>,

    /// Isolated per-tool environments.
    pub environment: EnvironmentConfig,

    /// Foundational packages. Fatal by default.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub base: Vec<PackageEntry>,

    /// Individual packages. Advisory by default.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<PackageEntry>,

    /// Tools fetched from source control.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolConfig>,

    /// Shell profile blocks appended idempotently.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub profile: Vec<ProfileBlock>,

    /// Workspace directory owned by the target user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<WorkspaceConfig>,
}

/// Target account overrides. Unset fields are detected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TargetConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home: Option<String>,
    /// Workspace root. Defaults to `${home}/workspace`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
    /// Where tools are cloned. Defaults to `${workspace}/tools`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools_dir: Option<String>,
}

/// Run-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Settings {
    /// Default per-command time limit for every step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Command templates for the system package manager. `{package}` is
/// replaced with the package name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PackageManagerConfig {
    /// Exits zero when the package is installed.
    pub query: String,
    pub install: String,
    /// Refreshes the package database.
    pub sync: String,
    /// Emit the Fatal `sync` step.
    pub sync_first: bool,
}

impl Default for PackageManagerConfig {
    fn default() -> Self {
        Self {
            query: "pacman -Qi {package}".to_string(),
            install: "pacman -S --noconfirm --needed {package}".to_string(),
            sync: "pacman -Sy --noconfirm".to_string(),
            sync_first: true,
        }
    }
}

/// A secondary repository with its own namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CommunityConfig {
    /// Namespace prefixed to package names (`<repo>/<name>`).
    pub repo: String,
    /// Install template. Defaults to the package manager's.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install: Option<String>,
}

/// A package helper bootstrapped from source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HelperConfig {
    /// Executable the helper installs.
    pub name: String,
    /// Repository to build it from.
    pub url: String,
    /// Build command run inside the clone as the target user.
    #[serde(default = "default_helper_build")]
    pub build: String,
    /// Install template run as the target user.
    pub install: String,
    #[serde(flatten)]
    pub step: StepSettings,
}

fn default_helper_build() -> String {
    "makepkg -si --noconfirm".to_string()
}

/// Command templates for isolated per-tool environments. `{env}` is the
/// environment path; `{requirements}` the requirements file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub create: String,
    pub install_requirements: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            create: "python3 -m venv {env}".to_string(),
            install_requirements: "{env}/bin/pip install -r {requirements}".to_string(),
        }
    }
}

/// Per-step overrides shared by every manifest entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct StepSettings {
    /// Override the default severity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    /// Extra prerequisites by step name.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub after: Vec<String>,
    /// Per-command time limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl StepSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// A package, either a bare name or a full entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum PackageEntry {
    Name(String),
    Spec(PackageSpec),
}

impl PackageEntry {
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Spec(spec) => &spec.name,
        }
    }

    /// The full form of this entry.
    pub fn to_spec(&self) -> PackageSpec {
        match self {
            Self::Name(name) => PackageSpec {
                name: name.clone(),
                ..Default::default()
            },
            Self::Spec(spec) => spec.clone(),
        }
    }
}

/// A package with install options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PackageSpec {
    pub name: String,
    /// Name in the community repository, if it differs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community_name: Option<String>,
    /// Try the community repository after the official one.
    #[serde(default = "default_true")]
    pub community: bool,
    /// Try the third-party helper last.
    #[serde(default = "default_true")]
    pub helper: bool,
    /// Command to look for on `PATH` instead of querying the package manager.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(flatten)]
    pub step: StepSettings,
}

impl Default for PackageSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            community_name: None,
            community: true,
            helper: true,
            command: None,
            step: StepSettings::default(),
        }
    }
}

/// A tool cloned from source control.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ToolConfig {
    pub name: String,
    /// Repository url.
    #[serde(default)]
    pub url: String,
    /// Clone destination. Defaults to `${tools_dir}/<name>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,
    /// Create an isolated environment inside the clone.
    #[serde(default, skip_serializing_if = "is_false")]
    pub venv: bool,
    /// Requirements file relative to the clone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    /// Commands run in the clone after fetching, as the target user.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub post_install: Vec<String>,
    #[serde(flatten)]
    pub step: StepSettings,
}

/// A named block of lines kept in a shell profile file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProfileBlock {
    pub name: String,
    /// Profile file. Defaults to `${home}/.zshrc`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Block body, written verbatim between `# outpost:begin <name>` and
    /// `# outpost:end <name>` markers.
    #[serde(default)]
    pub lines: Vec<String>,
    #[serde(flatten)]
    pub step: StepSettings,
}

/// The workspace directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WorkspaceConfig {
    /// Subdirectories created under the workspace root.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dirs: Vec<String>,
    #[serde(flatten)]
    pub step: StepSettings,
}

fn default_true() -> bool {
    true
}

fn is_false(v: &bool) -> bool {
    !v
}

/// JSON Schema for the manifest format.
pub fn manifest_schema() -> serde_json::Value {
    let schema = schemars::schema_for!(Manifest);
    serde_json::to_value(&schema).unwrap_or(serde_json::Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_manifest_uses_defaults() {
        let manifest: Manifest = serde_yaml::from_str("{}").unwrap();
        assert!(!manifest.require_root);
        assert!(manifest.packages.is_empty());
        assert_eq!(manifest.package_manager, PackageManagerConfig::default());
    }

    #[test]
    fn packages_accept_names_and_specs() {
        let manifest: Manifest = serde_yaml::from_str(
            r#"
packages:
  - git
  - name: burpsuite
    community_name: extra/burpsuite
    helper: false
    severity: fatal
    after: [pkg:git]
"#,
        )
        .unwrap();

        assert_eq!(manifest.packages[0], PackageEntry::Name("git".into()));
        let spec = manifest.packages[1].to_spec();
        assert_eq!(spec.name, "burpsuite");
        assert_eq!(spec.community_name.as_deref(), Some("extra/burpsuite"));
        assert!(spec.community);
        assert!(!spec.helper);
        assert_eq!(spec.step.severity, Some(Severity::Fatal));
        assert_eq!(spec.step.after, vec!["pkg:git"]);
    }

    #[test]
    fn bare_name_spec_keeps_fallbacks_on() {
        let spec = PackageEntry::Name("nmap".into()).to_spec();
        assert!(spec.community);
        assert!(spec.helper);
        assert_eq!(spec.step, StepSettings::default());
    }

    #[test]
    fn tool_parses_with_step_settings() {
        let manifest: Manifest = serde_yaml::from_str(
            r#"
tools:
  - name: sqlmap
    url: https://github.com/sqlmapproject/sqlmap.git
    venv: true
    requirements: requirements.txt
    timeout_secs: 600
"#,
        )
        .unwrap();

        let tool = &manifest.tools[0];
        assert!(tool.venv);
        assert_eq!(tool.step.timeout(), Some(Duration::from_secs(600)));
    }

    #[test]
    fn helper_build_has_default() {
        let helper: HelperConfig = serde_yaml::from_str(
            "name: yay\nurl: https://aur.archlinux.org/yay.git\ninstall: yay -S {package}",
        )
        .unwrap();
        assert_eq!(helper.build, "makepkg -si --noconfirm");
    }

    #[test]
    fn schema_describes_top_level_sections() {
        let schema = manifest_schema();
        let props = &schema["properties"];
        for key in ["packages", "tools", "profile", "target", "package_manager"] {
            assert!(props.get(key).is_some(), "missing {}", key);
        }
    }
}
