//! SM-004: Orchestrator — one intent in, one report out.
//!
//! Owns the composer, the runner, and the code generator, all built from
//! injected settings. Dispatch is a single match over the intent; there is
//! no retry logic and no state beyond what the filesystem holds.

use crate::codegen::CodeGenerator;
use crate::compose::{self, Composer};
use crate::core::settings::Settings;
use crate::core::types::{
    Ec2Spec, Intent, LifecycleOutcome, RdsSpec, ResourceKind, ResourceSummary, S3Spec,
    StateSnapshot,
};
use crate::core::{mutator, types};
use crate::lifecycle::{self, inspect, Runner};
use serde::Serialize;
use std::path::PathBuf;

/// How a delete request is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// Tear down everything the kind's config manages.
    DestroyAll,

    /// Remove one resource block from the config, then re-apply so the tool
    /// converges real resources onto the edited config.
    Targeted,
}

/// What an executed intent produced.
///
/// A lifecycle outcome inside a report means the tool ran (possibly
/// failing); an `Err` from `execute` means the step could not be attempted
/// at all.
#[derive(Debug, Serialize)]
#[serde(tag = "report", rename_all = "snake_case")]
pub enum Report {
    /// A config was composed and the create sequence ran over it.
    Provisioned {
        config_path: PathBuf,
        fingerprint: String,

        /// Unsafe defaults the composed config carries, surfaced rather
        /// than silently accepted
        warnings: Vec<String>,

        outcome: LifecycleOutcome,
    },

    /// A delete ran (either mode).
    Deleted {
        directory: PathBuf,
        outcome: LifecycleOutcome,
    },

    /// Code was generated; nothing was executed.
    Generated { code: String },

    /// A state inspection, with summaries when the state parsed.
    State {
        snapshot: StateSnapshot,
        resources: Vec<ResourceSummary>,
    },
}

pub struct Orchestrator {
    settings: Settings,
    composer: Composer,
    runner: Runner,
    generator: Box<dyn CodeGenerator>,
}

impl Orchestrator {
    pub fn new(settings: Settings, generator: Box<dyn CodeGenerator>) -> Self {
        let composer = Composer::new(&settings.base_dir);
        let runner = Runner::new(&settings.terraform_bin);
        Self {
            settings,
            composer,
            runner,
            generator,
        }
    }

    /// Execute one intent. `delete_mode` only matters for delete intents.
    pub fn execute(&self, intent: &Intent, delete_mode: DeleteMode) -> Result<Report, String> {
        match intent {
            Intent::CreateEc2(spec) => self.create_ec2(spec),
            Intent::CreateS3(spec) => self.create_s3(spec),
            Intent::CreateRds(spec) => self.create_rds(spec),
            Intent::DeleteResource {
                resource_type,
                resource_identifier,
            } => self.delete(*resource_type, resource_identifier, delete_mode),
            Intent::GenerateCode {
                service_type,
                user_input,
            } => {
                let code = self.generator.generate_code(service_type, user_input)?;
                Ok(Report::Generated { code })
            }
            Intent::DeployCustom { user_input } => self.deploy_custom(user_input),
            Intent::GetState { resource_type } => self.get_state(*resource_type),
        }
    }

    fn create_ec2(&self, spec: &Ec2Spec) -> Result<Report, String> {
        let path = self.composer.ec2(spec)?;
        // Operator policy wins over the request default; an explicit CIDR in
        // the request wins over both
        let cidr = if spec.allowed_ssh_cidrs != types::default_ssh_cidrs() {
            &spec.allowed_ssh_cidrs
        } else {
            &self.settings.allowed_ssh_cidrs
        };
        self.composer.override_ssh_cidr(cidr)?;
        self.provision(
            ResourceKind::Ec2,
            path,
            vec![format!(
                "security group allows HTTP/HTTPS from 0.0.0.0/0; SSH limited to {}",
                cidr
            )],
        )
    }

    fn create_s3(&self, spec: &S3Spec) -> Result<Report, String> {
        let path = self.composer.s3(spec)?;
        self.provision(ResourceKind::S3, path, Vec::new())
    }

    fn create_rds(&self, spec: &RdsSpec) -> Result<Report, String> {
        let path = self.composer.rds(spec)?;
        self.provision(
            ResourceKind::Rds,
            path,
            vec![
                "database uses the placeholder credential \"changeme123!\"; replace it before production use"
                    .to_string(),
            ],
        )
    }

    fn deploy_custom(&self, user_input: &str) -> Result<Report, String> {
        let config = self.generator.generate_terraform(user_input)?;
        let path = self.composer.custom(&config)?;
        self.provision(ResourceKind::Custom, path, Vec::new())
    }

    fn provision(
        &self,
        kind: ResourceKind,
        path: PathBuf,
        warnings: Vec<String>,
    ) -> Result<Report, String> {
        let fingerprint = compose::fingerprint(&path)?;
        let outcome = self
            .runner
            .run(&self.composer.dir(kind), &lifecycle::create_stages(), true);
        Ok(Report::Provisioned {
            config_path: path,
            fingerprint,
            warnings,
            outcome,
        })
    }

    fn delete(
        &self,
        kind: ResourceKind,
        identifier: &str,
        mode: DeleteMode,
    ) -> Result<Report, String> {
        let dir = self.composer.dir(kind);
        if !dir.is_dir() {
            return Err(format!(
                "no {} configuration exists at {}; nothing to delete",
                kind,
                dir.display()
            ));
        }

        let outcome = match mode {
            DeleteMode::DestroyAll => {
                self.runner.run(&dir, &lifecycle::destroy_stages(), true)
            }
            DeleteMode::Targeted => {
                let outputs: &[&str] = match kind {
                    ResourceKind::Ec2 => &["instance_public_ip"],
                    _ => &[],
                };
                mutator::remove_from_file(
                    &self.composer.main_tf(kind),
                    kind.tf_type(),
                    identifier,
                    outputs,
                )?;
                self.runner.run(&dir, &lifecycle::converge_stages(), true)
            }
        };

        Ok(Report::Deleted {
            directory: dir,
            outcome,
        })
    }

    fn get_state(&self, kind: ResourceKind) -> Result<Report, String> {
        let snapshot = inspect::inspect(&self.settings.terraform_bin, &self.composer.dir(kind))?;
        let resources = match &snapshot {
            StateSnapshot::Parsed { state } => inspect::resource_summaries(state),
            _ => Vec::new(),
        };
        Ok(Report::State {
            snapshot,
            resources,
        })
    }
}
