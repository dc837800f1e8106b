//! Manifest to steps.
//!
//! Every variant goes through the same builder: the manifest alone decides
//! which steps exist. Foundation steps (`privilege`, `sync` and the base
//! packages) are Fatal and every other step depends on them.

use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use tracing::debug;

use crate::config::{Manifest, PackageSpec, StepSettings, Target};
use crate::error::Result;
use crate::probe::{AllOf, CommandOnPath, Elevated, Never, PathExists, Probe};
use crate::steps::{Severity, Step};

use super::actions::{
    AppendProfile, BuildHelper, FetchTool, PrepareWorkspace, RequirePrivilege, SyncDatabase,
    ToolLayout,
};
use super::command::SharedRunner;
use super::install::{HelperInstall, InstallChain, Precheck, RepositoryInstall};
use super::ownership::OwnershipNormalizer;
use super::packages::{HelperBuilder, PackageInstalled, PackageRepository};
use super::profile::ProfileBlockPresent;
use super::source::{EnvironmentBuilder, SourceControl};

pub const PRIVILEGE_STEP: &str = "privilege";
pub const SYNC_STEP: &str = "sync";
pub const HELPER_STEP: &str = "helper";
pub const WORKSPACE_STEP: &str = "workspace";

pub fn package_step(name: &str) -> String {
    format!("pkg:{name}")
}

pub fn tool_step(name: &str) -> String {
    format!("tool:{name}")
}

pub fn profile_step(name: &str) -> String {
    format!("profile:{name}")
}

/// Capabilities shared by the steps of one build.
struct Capabilities {
    runner: SharedRunner,
    official: Rc<PackageRepository>,
    community: Option<Rc<PackageRepository>>,
    helper: Option<Rc<HelperBuilder>>,
    source: Rc<SourceControl>,
    environments: Rc<EnvironmentBuilder>,
    ownership: Rc<OwnershipNormalizer>,
}

impl Capabilities {
    fn new(manifest: &Manifest, target: &Target, runner: SharedRunner) -> Self {
        let pm = &manifest.package_manager;
        Self {
            official: Rc::new(PackageRepository::official(runner.clone(), pm)),
            community: manifest
                .community
                .as_ref()
                .map(|c| Rc::new(PackageRepository::community(runner.clone(), pm, c))),
            helper: manifest
                .helper
                .clone()
                .map(|h| Rc::new(HelperBuilder::new(runner.clone(), h, target.user.clone()))),
            source: Rc::new(SourceControl::new(runner.clone())),
            environments: Rc::new(EnvironmentBuilder::new(
                runner.clone(),
                manifest.environment.clone(),
            )),
            ownership: Rc::new(OwnershipNormalizer::new(runner.clone(), target.user.clone())),
            runner,
        }
    }

    fn package_probe(&self, spec: &PackageSpec) -> Box<dyn Probe> {
        match &spec.command {
            Some(command) => Box::new(CommandOnPath::new(command.clone())),
            None => Box::new(PackageInstalled::new(self.official.clone(), &spec.name)),
        }
    }

    /// Official, then community, then helper, as far as the entry allows.
    fn install_chain(&self, spec: &PackageSpec, allow_helper: bool) -> InstallChain {
        let mut chain = InstallChain::new(spec.name.clone())
            .then(RepositoryInstall::official(self.official.clone(), &spec.name));
        if spec.community {
            if let Some(community) = &self.community {
                chain = chain.then(RepositoryInstall::community(
                    community.clone(),
                    &spec.name,
                    spec.community_name.as_deref(),
                ));
            }
        }
        if allow_helper && spec.helper {
            if let Some(helper) = &self.helper {
                chain = chain.then(HelperInstall::new(helper.clone(), &spec.name));
            }
        }
        chain
    }
}

/// Applies per-entry overrides on top of a step's defaults.
fn configure(
    step: Step,
    settings: &StepSettings,
    default_severity: Severity,
    default_timeout: Option<Duration>,
    foundations: &[String],
) -> Step {
    step.with_severity(settings.severity.unwrap_or(default_severity))
        .with_timeout(settings.timeout().or(default_timeout))
        .after_all(foundations.iter().cloned())
        .after_all(settings.after.iter().cloned())
}

/// Turn a manifest into the steps of a plan, in declaration order.
pub fn build_steps(manifest: &Manifest, target: &Target, runner: SharedRunner) -> Result<Vec<Step>> {
    let caps = Capabilities::new(manifest, target, runner);
    let timeout = manifest.settings.timeout_secs.map(Duration::from_secs);
    let none = StepSettings::default();

    let mut steps = Vec::new();
    let mut foundations: Vec<String> = Vec::new();

    if manifest.require_root {
        steps.push(
            Step::new(PRIVILEGE_STEP, RequirePrivilege)
                .title("Check for root privileges")
                .fatal()
                .probe(Elevated),
        );
        foundations.push(PRIVILEGE_STEP.to_string());
    }

    if manifest.package_manager.sync_first {
        let action = SyncDatabase {
            repository: caps.official.clone(),
        };
        let step = Step::new(SYNC_STEP, action)
            .title("Refresh package database")
            .probe(Never);
        steps.push(configure(step, &none, Severity::Fatal, timeout, &foundations));
        foundations.push(SYNC_STEP.to_string());
    }

    // Base packages may not use the helper: it is built on top of them.
    let base_prereqs = foundations.clone();
    for entry in &manifest.base {
        let spec = entry.to_spec();
        let name = package_step(&spec.name);
        let chain = caps.install_chain(&spec, false);
        let step = Step::new(name.clone(), Precheck::new(chain))
            .title(format!("Install {}", spec.name))
            .boxed_probe(caps.package_probe(&spec));
        steps.push(configure(step, &spec.step, Severity::Fatal, timeout, &base_prereqs));
        foundations.push(name);
    }

    if let (Some(helper), Some(config)) = (&caps.helper, &manifest.helper) {
        let step = Step::new(
            HELPER_STEP,
            BuildHelper {
                helper: helper.clone(),
            },
        )
        .title(format!("Build {}", helper.name()))
        .probe(helper.probe());
        steps.push(configure(step, &config.step, Severity::Fatal, timeout, &foundations));
    }

    for entry in &manifest.packages {
        let spec = entry.to_spec();
        let step = Step::new(package_step(&spec.name), caps.install_chain(&spec, true))
            .title(format!("Install {}", spec.name))
            .boxed_probe(caps.package_probe(&spec));
        steps.push(configure(step, &spec.step, Severity::Advisory, timeout, &foundations));
    }

    for tool in &manifest.tools {
        let layout = ToolLayout::new(tool, &target.tools_dir);
        let mut probes: Vec<Box<dyn Probe>> =
            vec![Box::new(PathExists::new(layout.dest.join(".git")))];
        if let Some(env) = &layout.venv {
            probes.push(Box::new(PathExists::new(env.join("bin"))));
        }
        let action = FetchTool {
            url: tool.url.clone(),
            layout,
            post_install: tool.post_install.clone(),
            user: target.user.clone(),
            runner: caps.runner.clone(),
            source: caps.source.clone(),
            environments: caps.environments.clone(),
            ownership: caps.ownership.clone(),
        };
        let step = Step::new(tool_step(&tool.name), action)
            .title(format!("Fetch {}", tool.name))
            .probe(AllOf::new(probes));
        steps.push(configure(step, &tool.step, Severity::Advisory, timeout, &foundations));
    }

    for block in &manifest.profile {
        let file = block
            .file
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| target.home.join(".zshrc"));
        let present = ProfileBlockPresent {
            file: file.clone(),
            name: block.name.clone(),
            lines: block.lines.clone(),
        };
        let action = AppendProfile {
            file,
            name: block.name.clone(),
            lines: block.lines.clone(),
            ownership: caps.ownership.clone(),
        };
        let step = Step::new(profile_step(&block.name), action)
            .title(format!("Configure {}", block.name))
            .probe(present);
        steps.push(configure(step, &block.step, Severity::Advisory, timeout, &foundations));
    }

    if let Some(workspace) = &manifest.workspace {
        let action = PrepareWorkspace {
            root: target.workspace.clone(),
            dirs: workspace.dirs.clone(),
            ownership: caps.ownership.clone(),
        };
        let probes = action
            .paths()
            .into_iter()
            .map(|p| Box::new(PathExists::new(p)) as Box<dyn Probe>)
            .collect();
        let step = Step::new(WORKSPACE_STEP, action)
            .title("Prepare workspace")
            .probe(AllOf::new(probes));
        steps.push(configure(
            step,
            &workspace.step,
            Severity::Advisory,
            timeout,
            &foundations,
        ));
    }

    debug!(steps = steps.len(), "Built steps from manifest");
    Ok(steps)
}
