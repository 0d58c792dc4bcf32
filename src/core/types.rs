//! SM-001: Shared data model — intents, resource specs, lifecycle results.
//!
//! Defines intents, per-action parameter records, lifecycle outcomes, and
//! state snapshots. Intents serialize with an `action` tag so the structured
//! API surface and the natural-language front-end share one shape.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// ============================================================================
// Intent
// ============================================================================

/// A normalized request — action plus a typed parameter record.
///
/// Produced once per request (by `core::intent::resolve` or directly from
/// structured input) and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Intent {
    CreateEc2(Ec2Spec),
    CreateS3(S3Spec),
    CreateRds(RdsSpec),
    DeleteResource {
        resource_type: ResourceKind,
        resource_identifier: String,
    },
    GenerateCode {
        service_type: String,
        user_input: String,
    },
    DeployCustom {
        user_input: String,
    },
    GetState {
        resource_type: ResourceKind,
    },
}

impl Intent {
    /// Short action name, matching the serialized `action` tag.
    pub fn action(&self) -> &'static str {
        match self {
            Self::CreateEc2(_) => "create_ec2",
            Self::CreateS3(_) => "create_s3",
            Self::CreateRds(_) => "create_rds",
            Self::DeleteResource { .. } => "delete_resource",
            Self::GenerateCode { .. } => "generate_code",
            Self::DeployCustom { .. } => "deploy_custom",
            Self::GetState { .. } => "get_state",
        }
    }
}

// ============================================================================
// Resource kinds
// ============================================================================

/// The provisionable resource categories, plus the free-form custom bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Ec2,
    S3,
    Rds,
    Custom,
}

impl ResourceKind {
    /// Name of this kind's config directory under the base directory.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Ec2 => "terraform_ec2",
            Self::S3 => "terraform_s3",
            Self::Rds => "terraform_rds",
            Self::Custom => "terraform_custom",
        }
    }

    /// Terraform resource type whose label carries the caller-supplied name.
    /// Used by the mutator to locate a block for targeted removal.
    pub fn tf_type(&self) -> &'static str {
        match self {
            Self::Ec2 => "aws_instance",
            Self::S3 => "aws_s3_bucket",
            Self::Rds => "aws_db_instance",
            Self::Custom => "aws_instance",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ec2 => write!(f, "ec2"),
            Self::S3 => write!(f, "s3"),
            Self::Rds => write!(f, "rds"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ec2" => Ok(Self::Ec2),
            "s3" => Ok(Self::S3),
            "rds" => Ok(Self::Rds),
            "custom" => Ok(Self::Custom),
            other => Err(format!(
                "unknown resource kind \"{}\" (expected ec2, s3, rds, or custom)",
                other
            )),
        }
    }
}

// ============================================================================
// Resource specs
// ============================================================================

/// Parameters for an EC2 instance plus its network stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ec2Spec {
    #[serde(default = "default_instance_type")]
    pub instance_type: String,

    /// AMI reference
    #[serde(default = "default_image_id")]
    pub image_id: String,

    #[serde(default = "default_region")]
    pub region: String,

    /// Instance name — becomes the resource label and Name tag
    #[serde(default = "default_instance_name")]
    pub instance_name: String,

    /// CIDR allowed to reach SSH (HTTP/HTTPS stay open to the world)
    #[serde(default = "default_ssh_cidrs")]
    pub allowed_ssh_cidrs: String,
}

impl Default for Ec2Spec {
    fn default() -> Self {
        Self {
            instance_type: default_instance_type(),
            image_id: default_image_id(),
            region: default_region(),
            instance_name: default_instance_name(),
            allowed_ssh_cidrs: default_ssh_cidrs(),
        }
    }
}

/// Parameters for an S3 bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct S3Spec {
    pub bucket_name: String,

    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default)]
    pub versioning: bool,
}

/// Parameters for an RDS database instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RdsSpec {
    #[serde(default = "default_db_instance_class")]
    pub db_instance_class: String,

    /// Engine name — unrecognized engines fall back to the default port and
    /// version rather than failing
    #[serde(default = "default_engine")]
    pub engine: String,

    pub db_name: String,

    #[serde(default = "default_region")]
    pub region: String,
}

fn default_instance_type() -> String {
    "t2.micro".to_string()
}

fn default_image_id() -> String {
    "ami-03f4878755434977f".to_string()
}

pub(crate) fn default_region() -> String {
    "ap-south-1".to_string()
}

fn default_instance_name() -> String {
    "example".to_string()
}

pub(crate) fn default_ssh_cidrs() -> String {
    "10.0.0.0/8".to_string()
}

fn default_db_instance_class() -> String {
    "db.t3.micro".to_string()
}

fn default_engine() -> String {
    "mysql".to_string()
}

// ============================================================================
// Lifecycle outcome
// ============================================================================

/// Captured output of one lifecycle stage invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageResult {
    /// Stage name (init, plan, apply, destroy)
    pub stage: String,

    /// Process exit code (-1 when killed by signal or timed out)
    pub exit_code: i32,

    pub stdout: String,
    pub stderr: String,
}

impl StageResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Aggregated result of a lifecycle run. Created fresh per invocation and
/// never persisted — Terraform's own state file is the durable record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleOutcome {
    /// Per-stage results in execution order
    pub stages: Vec<StageResult>,

    /// True iff every gating stage exited successfully
    pub overall_success: bool,

    /// Set only when the run could not be attempted (e.g. missing binary);
    /// stage failures live in `stages`, not here
    #[serde(default)]
    pub error: Option<String>,
}

impl LifecycleOutcome {
    /// A run that never got as far as executing any stage.
    pub fn aborted(error: impl Into<String>) -> Self {
        Self {
            stages: Vec::new(),
            overall_success: false,
            error: Some(error.into()),
        }
    }

    /// Look up a stage result by name.
    pub fn stage(&self, name: &str) -> Option<&StageResult> {
        self.stages.iter().find(|s| s.stage == name)
    }
}

// ============================================================================
// State snapshot
// ============================================================================

/// Parsed view of Terraform's current state for one config directory.
/// Regenerated on every inspection; never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum StateSnapshot {
    /// The config directory does not exist; no process was invoked.
    NotFound { directory: PathBuf },

    /// `show -json` succeeded and its output parsed as JSON.
    Parsed { state: serde_json::Value },

    /// `show -json` succeeded but the output was not valid JSON.
    Unparsed { raw: String },

    /// The subcommand exited non-zero; its stderr is the diagnostic.
    ToolFailed { stderr: String },
}

/// One resource extracted from a parsed state snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSummary {
    pub resource_type: String,
    pub name: String,

    /// Identifying attributes (id, arn, name, state) when present
    #[serde(default)]
    pub attributes: Vec<(String, String)>,
}

// ============================================================================
// Label sanitization
// ============================================================================

/// Rewrite a user-supplied name into a valid Terraform identifier.
/// Hyphens (and any other non-identifier byte) become underscores; the
/// original value is kept wherever Terraform accepts a free string.
pub fn sanitize_label(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sm001_intent_serialize_tag() {
        let intent = Intent::CreateEc2(Ec2Spec::default());
        let json = serde_json::to_string(&intent).unwrap();
        assert!(json.contains("\"action\":\"create_ec2\""));
        assert!(json.contains("\"instance_type\":\"t2.micro\""));
        assert!(json.contains("\"region\":\"ap-south-1\""));
    }

    #[test]
    fn test_sm001_intent_roundtrip() {
        let intent = Intent::DeleteResource {
            resource_type: ResourceKind::S3,
            resource_identifier: "my-data".to_string(),
        };
        let json = serde_json::to_string(&intent).unwrap();
        assert!(json.contains("\"resource_type\":\"s3\""));
        let back: Intent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, intent);
    }

    #[test]
    fn test_sm001_intent_deserialize_defaults() {
        // A structured caller may omit defaulted fields
        let intent: Intent =
            serde_json::from_str(r#"{"action":"create_rds","db_name":"orders"}"#).unwrap();
        match intent {
            Intent::CreateRds(spec) => {
                assert_eq!(spec.db_name, "orders");
                assert_eq!(spec.engine, "mysql");
                assert_eq!(spec.db_instance_class, "db.t3.micro");
            }
            other => panic!("wrong intent: {:?}", other),
        }
    }

    #[test]
    fn test_sm001_resource_kind_dirs() {
        assert_eq!(ResourceKind::Ec2.dir_name(), "terraform_ec2");
        assert_eq!(ResourceKind::S3.dir_name(), "terraform_s3");
        assert_eq!(ResourceKind::Rds.dir_name(), "terraform_rds");
        assert_eq!(ResourceKind::Custom.dir_name(), "terraform_custom");
    }

    #[test]
    fn test_sm001_resource_kind_parse() {
        assert_eq!("ec2".parse::<ResourceKind>().unwrap(), ResourceKind::Ec2);
        assert_eq!("RDS".parse::<ResourceKind>().unwrap(), ResourceKind::Rds);
        assert!("ebs".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn test_sm001_resource_kind_tf_type() {
        assert_eq!(ResourceKind::Ec2.tf_type(), "aws_instance");
        assert_eq!(ResourceKind::S3.tf_type(), "aws_s3_bucket");
        assert_eq!(ResourceKind::Rds.tf_type(), "aws_db_instance");
    }

    #[test]
    fn test_sm001_ec2_spec_defaults() {
        let spec = Ec2Spec::default();
        assert_eq!(spec.instance_type, "t2.micro");
        assert_eq!(spec.image_id, "ami-03f4878755434977f");
        assert_eq!(spec.region, "ap-south-1");
        assert_eq!(spec.instance_name, "example");
        assert_eq!(spec.allowed_ssh_cidrs, "10.0.0.0/8");
    }

    #[test]
    fn test_sm001_stage_result_success() {
        let ok = StageResult {
            stage: "init".to_string(),
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(ok.success());
        let fail = StageResult {
            stage: "apply".to_string(),
            exit_code: 1,
            stdout: String::new(),
            stderr: "error".to_string(),
        };
        assert!(!fail.success());
    }

    #[test]
    fn test_sm001_outcome_aborted() {
        let outcome = LifecycleOutcome::aborted("terraform not found");
        assert!(!outcome.overall_success);
        assert!(outcome.stages.is_empty());
        assert_eq!(outcome.error.as_deref(), Some("terraform not found"));
    }

    #[test]
    fn test_sm001_outcome_stage_lookup() {
        let outcome = LifecycleOutcome {
            stages: vec![StageResult {
                stage: "plan".to_string(),
                exit_code: 2,
                stdout: String::new(),
                stderr: String::new(),
            }],
            overall_success: true,
            error: None,
        };
        assert_eq!(outcome.stage("plan").unwrap().exit_code, 2);
        assert!(outcome.stage("apply").is_none());
    }

    #[test]
    fn test_sm001_sanitize_label() {
        assert_eq!(sanitize_label("my-data-bucket"), "my_data_bucket");
        assert_eq!(sanitize_label("app.prod"), "app_prod");
        assert_eq!(sanitize_label("already_clean"), "already_clean");
        assert_eq!(sanitize_label("db name!"), "db_name_");
    }

    #[test]
    fn test_sm001_snapshot_serialize() {
        let snap = StateSnapshot::ToolFailed {
            stderr: "no state".to_string(),
        };
        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"result\":\"tool_failed\""));
    }

    #[test]
    fn test_sm001_intent_action_names() {
        assert_eq!(Intent::CreateEc2(Ec2Spec::default()).action(), "create_ec2");
        assert_eq!(
            Intent::GetState {
                resource_type: ResourceKind::Rds
            }
            .action(),
            "get_state"
        );
    }
}
