//! SM-006: Config composition — turns typed resource specs into Terraform
//! configs on disk.
//!
//! The fragments (`network`, `ec2`, `s3`, `rds`) are pure `params -> String`
//! functions; `Composer` owns the filesystem layout and is the only place
//! that writes. Every compose call overwrites `main.tf` wholesale, so a
//! config directory always reflects exactly one spec.

pub mod ec2;
pub mod network;
pub mod rds;
pub mod s3;

use crate::core::types::{Ec2Spec, RdsSpec, ResourceKind, S3Spec};
use std::path::{Path, PathBuf};

/// Writes per-kind Terraform configs under a base directory.
///
/// The base directory is constructor state; nothing here reads ambient
/// configuration or environment.
#[derive(Debug, Clone)]
pub struct Composer {
    base_dir: PathBuf,
}

impl Composer {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Config directory for one resource kind.
    pub fn dir(&self, kind: ResourceKind) -> PathBuf {
        self.base_dir.join(kind.dir_name())
    }

    /// Path of the kind's `main.tf`, whether or not it exists yet.
    pub fn main_tf(&self, kind: ResourceKind) -> PathBuf {
        self.dir(kind).join("main.tf")
    }

    /// Compose the EC2 config: provider, network stack, instance. Also writes
    /// `terraform.tfvars` with the spec's variable values.
    pub fn ec2(&self, spec: &Ec2Spec) -> Result<PathBuf, String> {
        let config = format!(
            "{}\n{}\n{}",
            ec2::provider(&spec.region),
            network::vpc_stack(&spec.region),
            ec2::instance_config(spec),
        );
        let path = self.write(ResourceKind::Ec2, &config)?;
        self.write_file(&self.dir(ResourceKind::Ec2).join("terraform.tfvars"), &ec2::tfvars(spec))?;
        Ok(path)
    }

    /// Compose the S3 config.
    pub fn s3(&self, spec: &S3Spec) -> Result<PathBuf, String> {
        self.write(ResourceKind::S3, &s3::bucket_config(spec))
    }

    /// Compose the RDS config.
    pub fn rds(&self, spec: &RdsSpec) -> Result<PathBuf, String> {
        self.write(ResourceKind::Rds, &rds::database_config(spec))
    }

    /// Persist externally generated config text verbatim. No structural
    /// validation; the lifecycle run surfaces whatever Terraform thinks.
    pub fn custom(&self, config: &str) -> Result<PathBuf, String> {
        self.write(ResourceKind::Custom, config)
    }

    /// Rewrite the `allowed_ssh_cidrs` line of the EC2 tfvars in place.
    /// Post-composition hook for operator-level CIDR policy.
    pub fn override_ssh_cidr(&self, cidr: &str) -> Result<(), String> {
        let path = self.dir(ResourceKind::Ec2).join("terraform.tfvars");
        let text = std::fs::read_to_string(&path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
        let rewritten: String = text
            .lines()
            .map(|line| {
                if line.trim_start().starts_with("allowed_ssh_cidrs") {
                    format!("allowed_ssh_cidrs = \"{}\"", cidr)
                } else {
                    line.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
            + "\n";
        self.write_file(&path, &rewritten)
    }

    fn write(&self, kind: ResourceKind, config: &str) -> Result<PathBuf, String> {
        let dir = self.dir(kind);
        std::fs::create_dir_all(&dir)
            .map_err(|e| format!("cannot create {}: {}", dir.display(), e))?;
        let path = dir.join("main.tf");
        self.write_file(&path, config)?;
        Ok(path)
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<(), String> {
        std::fs::write(path, content).map_err(|e| format!("cannot write {}: {}", path.display(), e))
    }
}

/// BLAKE3 fingerprint of a written config, as `blake3:<hex>`.
pub fn fingerprint(path: &Path) -> Result<String, String> {
    let bytes = std::fs::read(path).map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    Ok(format!("blake3:{}", blake3::hash(&bytes).to_hex()))
}
