//! SM-011: Lifecycle runner — sequential Terraform stage execution.
//!
//! Stages run one at a time in a config directory, each with its own
//! timeout. Output is captured through reader threads while the parent polls
//! `try_wait` against a deadline; a stage that overruns is killed, reaped,
//! and recorded as failed rather than left running.
//!
//! A failing stage is data (`StageResult`), not an error. The only `error`
//! this module produces is a run that could not be attempted at all, such as
//! a missing binary.

pub mod inspect;

use crate::core::types::{LifecycleOutcome, StageResult};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// One tool invocation: subcommand plus arguments, a wall-clock budget, and
/// whether its failure counts against the run.
#[derive(Debug, Clone)]
pub struct Stage {
    pub name: String,
    pub args: Vec<String>,
    pub timeout: Duration,

    /// Non-gating stages are diagnostic: their failure is recorded but does
    /// not flip `overall_success` or stop the run.
    pub gating: bool,
}

impl Stage {
    pub fn new(name: &str, args: &[&str], timeout: Duration, gating: bool) -> Self {
        Self {
            name: name.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            timeout,
            gating,
        }
    }
}

/// The standard create sequence: init, plan (diagnostic), apply.
pub fn create_stages() -> Vec<Stage> {
    vec![
        Stage::new("init", &["init"], Duration::from_secs(300), true),
        Stage::new("plan", &["plan"], Duration::from_secs(300), false),
        Stage::new(
            "apply",
            &["apply", "-auto-approve"],
            Duration::from_secs(600),
            true,
        ),
    ]
}

/// Full teardown of a config directory's resources.
pub fn destroy_stages() -> Vec<Stage> {
    vec![Stage::new(
        "destroy",
        &["destroy", "-auto-approve"],
        Duration::from_secs(600),
        true,
    )]
}

/// Re-apply after a config mutation, converging real resources onto the
/// edited config. Init already ran when the config was first created.
pub fn converge_stages() -> Vec<Stage> {
    vec![Stage::new(
        "apply",
        &["apply", "-auto-approve"],
        Duration::from_secs(600),
        true,
    )]
}

/// Runs stage sequences against one tool binary.
#[derive(Debug, Clone)]
pub struct Runner {
    binary: PathBuf,
}

impl Runner {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Execute `stages` in order inside `dir`.
    ///
    /// With `short_circuit`, a failed gating stage stops the run; later
    /// stages are never attempted and do not appear in the outcome. A failed
    /// non-gating stage never stops anything.
    pub fn run(&self, dir: &Path, stages: &[Stage], short_circuit: bool) -> LifecycleOutcome {
        let mut results: Vec<StageResult> = Vec::new();
        let mut gating_failed = false;

        for stage in stages {
            let result = match self.run_stage(dir, stage) {
                Ok(r) => r,
                Err(e) => {
                    return LifecycleOutcome::aborted(format!(
                        "stage {} could not start: {}",
                        stage.name, e
                    ));
                }
            };
            let failed = !result.success();
            results.push(result);
            if failed && stage.gating {
                gating_failed = true;
                if short_circuit {
                    break;
                }
            }
        }

        LifecycleOutcome {
            stages: results,
            overall_success: !gating_failed,
            error: None,
        }
    }

    fn run_stage(&self, dir: &Path, stage: &Stage) -> Result<StageResult, String> {
        let mut child = Command::new(&self.binary)
            .args(&stage.args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("failed to spawn {}: {}", self.binary.display(), e))?;

        // Drain both pipes off-thread so a chatty child cannot deadlock
        // against a full pipe buffer while we poll for exit.
        let stdout_reader = spawn_reader(child.stdout.take());
        let stderr_reader = spawn_reader(child.stderr.take());

        let deadline = Instant::now() + stage.timeout;
        let mut timed_out = false;
        let exit_code = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status.code().unwrap_or(-1),
                Ok(None) => {
                    if Instant::now() >= deadline {
                        timed_out = true;
                        let _ = child.kill();
                        let _ = child.wait();
                        break -1;
                    }
                    std::thread::sleep(Duration::from_millis(25));
                }
                Err(e) => return Err(format!("wait error: {}", e)),
            }
        };

        let stdout = stdout_reader.join().unwrap_or_default();
        let stderr = if timed_out {
            // Reader thread ends once the kill closes the pipe; its capture
            // is replaced by the synthetic diagnostic
            let _ = stderr_reader.join();
            format!(
                "stage {} timed out after {} seconds",
                stage.name,
                stage.timeout.as_secs_f64()
            )
        } else {
            stderr_reader.join().unwrap_or_default()
        };

        Ok(StageResult {
            stage: stage.name.clone(),
            exit_code,
            stdout,
            stderr,
        })
    }
}

fn spawn_reader<R: Read + Send + 'static>(
    source: Option<R>,
) -> std::thread::JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buf = String::new();
        if let Some(mut r) = source {
            let _ = r.read_to_string(&mut buf);
        }
        buf
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Write an executable fake tool into `dir` and return its path.
    fn fake_tool(dir: &Path, script: &str) -> PathBuf {
        let path = dir.join("fake-terraform");
        std::fs::write(&path, format!("#!/bin/bash\n{}", script)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn quick(name: &str, args: &[&str], gating: bool) -> Stage {
        Stage::new(name, args, Duration::from_secs(10), gating)
    }

    #[test]
    fn test_sm011_all_stages_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_tool(dir.path(), "echo \"ran $1\"");
        let runner = Runner::new(&tool);

        let outcome = runner.run(
            dir.path(),
            &[quick("init", &["init"], true), quick("apply", &["apply"], true)],
            true,
        );

        assert!(outcome.overall_success);
        assert!(outcome.error.is_none());
        assert_eq!(outcome.stages.len(), 2);
        assert_eq!(outcome.stages[0].stage, "init");
        assert!(outcome.stages[0].stdout.contains("ran init"));
        assert_eq!(outcome.stages[1].stage, "apply");
    }

    #[test]
    fn test_sm011_gating_failure_short_circuits() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_tool(
            dir.path(),
            "if [ \"$1\" = init ]; then echo boom >&2; exit 1; fi\necho ok",
        );
        let runner = Runner::new(&tool);

        let outcome = runner.run(
            dir.path(),
            &[quick("init", &["init"], true), quick("apply", &["apply"], true)],
            true,
        );

        assert!(!outcome.overall_success);
        assert_eq!(outcome.stages.len(), 1, "apply must never be attempted");
        assert_eq!(outcome.stages[0].exit_code, 1);
        assert!(outcome.stages[0].stderr.contains("boom"));
    }

    #[test]
    fn test_sm011_non_gating_failure_is_diagnostic() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_tool(
            dir.path(),
            "if [ \"$1\" = plan ]; then exit 1; fi\necho ok",
        );
        let runner = Runner::new(&tool);

        let outcome = runner.run(
            dir.path(),
            &[
                quick("init", &["init"], true),
                quick("plan", &["plan"], false),
                quick("apply", &["apply"], true),
            ],
            true,
        );

        assert!(outcome.overall_success, "plan failure must not gate the run");
        assert_eq!(outcome.stages.len(), 3);
        assert!(!outcome.stage("plan").unwrap().success());
        assert!(outcome.stage("apply").unwrap().success());
    }

    #[test]
    fn test_sm011_duplicate_stage_names_not_masked() {
        // Two gating stages sharing a name: the second invocation fails, and
        // the first's success must not paper over it
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("ran-once");
        let tool = fake_tool(
            dir.path(),
            &format!(
                "if [ -f {m} ]; then exit 1; else touch {m}; fi",
                m = marker.display()
            ),
        );
        let runner = Runner::new(&tool);

        let outcome = runner.run(
            dir.path(),
            &[quick("apply", &["apply"], true), quick("apply", &["apply"], true)],
            false,
        );

        assert_eq!(outcome.stages.len(), 2);
        assert!(outcome.stages[0].success());
        assert!(!outcome.stages[1].success());
        assert!(!outcome.overall_success);
    }

    #[test]
    fn test_sm011_no_short_circuit_runs_later_stages() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_tool(
            dir.path(),
            "if [ \"$1\" = init ]; then exit 1; fi\necho \"ran $1\"",
        );
        let runner = Runner::new(&tool);

        let outcome = runner.run(
            dir.path(),
            &[quick("init", &["init"], true), quick("apply", &["apply"], true)],
            false,
        );

        assert_eq!(outcome.stages.len(), 2, "apply still runs after init fails");
        assert!(!outcome.stages[0].success());
        assert!(outcome.stages[1].success());
        assert!(outcome.stages[1].stdout.contains("ran apply"));
        assert!(!outcome.overall_success);
    }

    #[test]
    fn test_sm011_timeout_kills_and_records() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_tool(dir.path(), "sleep 30");
        let runner = Runner::new(&tool);

        let started = Instant::now();
        let outcome = runner.run(
            dir.path(),
            &[Stage::new("apply", &["apply"], Duration::from_millis(200), true)],
            true,
        );

        assert!(started.elapsed() < Duration::from_secs(5), "child was reaped");
        assert!(!outcome.overall_success);
        let stage = outcome.stage("apply").unwrap();
        assert_eq!(stage.exit_code, -1);
        assert!(stage.stderr.contains("timed out"));
    }

    #[test]
    fn test_sm011_missing_binary_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Runner::new("/nonexistent/terraform");

        let outcome = runner.run(dir.path(), &create_stages(), true);

        assert!(!outcome.overall_success);
        assert!(outcome.stages.is_empty());
        assert!(outcome.error.unwrap().contains("could not start"));
    }

    #[test]
    fn test_sm011_runs_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        let work = dir.path().join("terraform_ec2");
        std::fs::create_dir_all(&work).unwrap();
        let tool = fake_tool(dir.path(), "pwd");
        let runner = Runner::new(&tool);

        let outcome = runner.run(&work, &[quick("init", &["init"], true)], true);

        let canonical = work.canonicalize().unwrap();
        assert!(outcome.stages[0]
            .stdout
            .contains(canonical.to_str().unwrap()));
    }

    #[test]
    fn test_sm011_standard_stage_sets() {
        let create = create_stages();
        assert_eq!(create.len(), 3);
        assert_eq!(create[0].name, "init");
        assert_eq!(create[0].timeout, Duration::from_secs(300));
        assert!(create[0].gating);
        assert!(!create[1].gating);
        assert_eq!(create[2].args, vec!["apply", "-auto-approve"]);
        assert_eq!(create[2].timeout, Duration::from_secs(600));

        let destroy = destroy_stages();
        assert_eq!(destroy.len(), 1);
        assert_eq!(destroy[0].args, vec!["destroy", "-auto-approve"]);

        let converge = converge_stages();
        assert_eq!(converge.len(), 1);
        assert_eq!(converge[0].name, "apply");
    }

    #[test]
    fn test_sm011_large_output_no_deadlock() {
        // Enough output to overflow an unread pipe buffer
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_tool(dir.path(), "yes x | head -n 100000");
        let runner = Runner::new(&tool);

        let outcome = runner.run(dir.path(), &[quick("plan", &["plan"], true)], true);

        assert!(outcome.overall_success);
        assert!(outcome.stages[0].stdout.len() >= 200_000);
    }
}
