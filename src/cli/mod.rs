//! SM-014: CLI subcommands — init, run, resolve, create-*, deploy, generate,
//! delete, state.

use crate::codegen::PromptTemplates;
use crate::compose::{self, Composer};
use crate::core::orchestrator::{DeleteMode, Orchestrator, Report};
use crate::core::types::{Ec2Spec, Intent, RdsSpec, ResourceKind, S3Spec, StateSnapshot};
use crate::core::settings::Settings;
use crate::core::{intent, settings, types};
use clap::Subcommand;
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a sembrar project (sembrar.yaml plus config directories)
    Init {
        /// Directory to initialize (default: current)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Resolve a request and execute the resulting intent
    Run {
        /// Natural-language request
        text: String,

        /// Remove only the named resource on delete instead of destroying
        /// everything the config manages
        #[arg(long)]
        targeted: bool,

        /// Path to sembrar.yaml
        #[arg(short, long, default_value = "sembrar.yaml")]
        config: PathBuf,
    },

    /// Resolve a request and print the intent as JSON without executing
    Resolve {
        /// Natural-language request
        text: String,
    },

    /// Provision an EC2 instance with its network stack
    CreateEc2 {
        /// Instance name (resource label and Name tag)
        #[arg(long, default_value = "example")]
        name: String,

        #[arg(long, default_value = "t2.micro")]
        instance_type: String,

        /// AMI to launch
        #[arg(long, default_value = "ami-03f4878755434977f")]
        image_id: String,

        #[arg(long)]
        region: Option<String>,

        /// CIDR allowed to reach SSH
        #[arg(long)]
        ssh_cidr: Option<String>,

        /// Write the config without running Terraform
        #[arg(long)]
        compose_only: bool,

        /// Path to sembrar.yaml
        #[arg(short, long, default_value = "sembrar.yaml")]
        config: PathBuf,
    },

    /// Provision an S3 bucket
    CreateS3 {
        /// Bucket name
        bucket_name: String,

        #[arg(long)]
        region: Option<String>,

        /// Enable object versioning
        #[arg(long)]
        versioning: bool,

        /// Write the config without running Terraform
        #[arg(long)]
        compose_only: bool,

        /// Path to sembrar.yaml
        #[arg(short, long, default_value = "sembrar.yaml")]
        config: PathBuf,
    },

    /// Provision an RDS database instance
    CreateRds {
        /// Database name
        db_name: String,

        #[arg(long, default_value = "mysql")]
        engine: String,

        #[arg(long, default_value = "db.t3.micro")]
        db_instance_class: String,

        #[arg(long)]
        region: Option<String>,

        /// Write the config without running Terraform
        #[arg(long)]
        compose_only: bool,

        /// Path to sembrar.yaml
        #[arg(short, long, default_value = "sembrar.yaml")]
        config: PathBuf,
    },

    /// Generate a config from a free-form request and deploy it
    Deploy {
        /// Natural-language request
        text: String,

        /// Path to sembrar.yaml
        #[arg(short, long, default_value = "sembrar.yaml")]
        config: PathBuf,
    },

    /// Generate code for a request without executing anything
    Generate {
        /// Natural-language request
        text: String,

        /// terraform, boto3, or python
        #[arg(long, default_value = "terraform")]
        service_type: String,
    },

    /// Delete resources of one kind (ec2, s3, rds, custom)
    Delete {
        /// Resource kind
        kind: ResourceKind,

        /// Resource name, for targeted removal
        #[arg(default_value = "")]
        identifier: String,

        /// Remove only the named resource block, then re-apply
        #[arg(long)]
        targeted: bool,

        /// Path to sembrar.yaml
        #[arg(short, long, default_value = "sembrar.yaml")]
        config: PathBuf,
    },

    /// Show Terraform's current state for one kind
    State {
        /// Resource kind
        kind: ResourceKind,

        /// Path to sembrar.yaml
        #[arg(short, long, default_value = "sembrar.yaml")]
        config: PathBuf,
    },
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<(), String> {
    match cmd {
        Commands::Init { path } => cmd_init(&path),
        Commands::Run {
            text,
            targeted,
            config,
        } => {
            let resolved = intent::resolve(&text);
            println!("Resolved: {}", resolved.action());
            execute(settings::load(&config)?, &resolved, delete_mode(targeted))
        }
        Commands::Resolve { text } => cmd_resolve(&text),
        Commands::CreateEc2 {
            name,
            instance_type,
            image_id,
            region,
            ssh_cidr,
            compose_only,
            config,
        } => {
            let cfg = settings::load(&config)?;
            let spec = Ec2Spec {
                instance_type,
                image_id,
                region: region.unwrap_or_else(|| cfg.default_region.clone()),
                instance_name: name,
                allowed_ssh_cidrs: ssh_cidr.unwrap_or_else(|| cfg.allowed_ssh_cidrs.clone()),
            };
            if compose_only {
                return compose_only_report(&cfg.base_dir, |c| c.ec2(&spec));
            }
            execute(cfg, &Intent::CreateEc2(spec), DeleteMode::DestroyAll)
        }
        Commands::CreateS3 {
            bucket_name,
            region,
            versioning,
            compose_only,
            config,
        } => {
            let cfg = settings::load(&config)?;
            let spec = S3Spec {
                bucket_name,
                region: region.unwrap_or_else(|| cfg.default_region.clone()),
                versioning,
            };
            if compose_only {
                return compose_only_report(&cfg.base_dir, |c| c.s3(&spec));
            }
            execute(cfg, &Intent::CreateS3(spec), DeleteMode::DestroyAll)
        }
        Commands::CreateRds {
            db_name,
            engine,
            db_instance_class,
            region,
            compose_only,
            config,
        } => {
            let cfg = settings::load(&config)?;
            let spec = RdsSpec {
                db_instance_class,
                engine,
                db_name,
                region: region.unwrap_or_else(|| cfg.default_region.clone()),
            };
            if compose_only {
                return compose_only_report(&cfg.base_dir, |c| c.rds(&spec));
            }
            execute(cfg, &Intent::CreateRds(spec), DeleteMode::DestroyAll)
        }
        Commands::Deploy { text, config } => execute(
            settings::load(&config)?,
            &Intent::DeployCustom { user_input: text },
            DeleteMode::DestroyAll,
        ),
        Commands::Generate { text, service_type } => execute(
            settings::load(Path::new("sembrar.yaml"))?,
            &Intent::GenerateCode {
                service_type,
                user_input: text,
            },
            DeleteMode::DestroyAll,
        ),
        Commands::Delete {
            kind,
            identifier,
            targeted,
            config,
        } => {
            if targeted && identifier.is_empty() {
                return Err("targeted delete needs a resource identifier".to_string());
            }
            execute(
                settings::load(&config)?,
                &Intent::DeleteResource {
                    resource_type: kind,
                    resource_identifier: identifier,
                },
                delete_mode(targeted),
            )
        }
        Commands::State { kind, config } => execute(
            settings::load(&config)?,
            &Intent::GetState {
                resource_type: kind,
            },
            DeleteMode::DestroyAll,
        ),
    }
}

fn delete_mode(targeted: bool) -> DeleteMode {
    if targeted {
        DeleteMode::Targeted
    } else {
        DeleteMode::DestroyAll
    }
}

fn execute(cfg: Settings, intent: &Intent, mode: DeleteMode) -> Result<(), String> {
    let orchestrator = Orchestrator::new(cfg, Box::new(PromptTemplates));
    let report = orchestrator.execute(intent, mode)?;
    print_report(&report);
    match &report {
        Report::Provisioned { outcome, .. } | Report::Deleted { outcome, .. }
            if !outcome.overall_success =>
        {
            Err("lifecycle run failed".to_string())
        }
        _ => Ok(()),
    }
}

fn compose_only_report<F>(base_dir: &Path, compose: F) -> Result<(), String>
where
    F: FnOnce(&Composer) -> Result<PathBuf, String>,
{
    let composer = Composer::new(base_dir);
    let path = compose(&composer)?;
    println!("Composed: {}", path.display());
    println!("  {}", compose::fingerprint(&path)?);
    Ok(())
}

fn cmd_init(path: &Path) -> Result<(), String> {
    let config_path = path.join("sembrar.yaml");
    if config_path.exists() {
        return Err(format!("{} already exists", config_path.display()));
    }
    std::fs::write(&config_path, settings::template())
        .map_err(|e| format!("cannot write {}: {}", config_path.display(), e))?;
    println!("Initialized sembrar project at {}", path.display());
    println!("  Created: {}", config_path.display());

    let base = path.join("terraform");
    for kind in [
        ResourceKind::Ec2,
        ResourceKind::S3,
        ResourceKind::Rds,
        ResourceKind::Custom,
    ] {
        let dir = base.join(kind.dir_name());
        std::fs::create_dir_all(&dir).map_err(|e| format!("cannot create {}: {}", dir.display(), e))?;
        println!("  Created: {}/", dir.display());
    }
    Ok(())
}

fn cmd_resolve(text: &str) -> Result<(), String> {
    let resolved = intent::resolve(text);
    let json = serde_json::to_string_pretty(&resolved)
        .map_err(|e| format!("cannot serialize intent: {}", e))?;
    println!("{}", json);
    Ok(())
}

/// Display a report to stdout.
fn print_report(report: &Report) {
    match report {
        Report::Provisioned {
            config_path,
            fingerprint,
            warnings,
            outcome,
        } => {
            println!("Config: {}", config_path.display());
            println!("  {}", fingerprint);
            for warning in warnings {
                println!("  WARNING: {}", warning);
            }
            print_outcome(outcome);
        }
        Report::Deleted { directory, outcome } => {
            println!("Delete in {}", directory.display());
            print_outcome(outcome);
        }
        Report::Generated { code } => {
            println!("{}", code);
        }
        Report::State {
            snapshot,
            resources,
        } => match snapshot {
            StateSnapshot::NotFound { directory } => {
                println!("No state: {} does not exist", directory.display());
            }
            StateSnapshot::Parsed { .. } => {
                println!("State: {} resource(s)", resources.len());
                for r in resources {
                    println!("  {} \"{}\"", r.resource_type, r.name);
                    for (key, value) in &r.attributes {
                        println!("    {} = {}", key, value);
                    }
                }
            }
            StateSnapshot::Unparsed { raw } => {
                println!("State (unparsed):");
                println!("{}", raw);
            }
            StateSnapshot::ToolFailed { stderr } => {
                println!("State query failed:");
                println!("{}", stderr);
            }
        },
    }
}

fn print_outcome(outcome: &types::LifecycleOutcome) {
    if let Some(error) = &outcome.error {
        println!("  ABORTED: {}", error);
        return;
    }
    for stage in &outcome.stages {
        let mark = if stage.success() { "ok" } else { "FAILED" };
        println!("  {} {} (exit {})", stage.stage, mark, stage.exit_code);
        if !stage.success() && !stage.stderr.is_empty() {
            for line in stage.stderr.lines().take(20) {
                println!("    {}", line);
            }
        }
    }
    println!(
        "  Overall: {}",
        if outcome.overall_success {
            "success"
        } else {
            "failure"
        }
    );
}
