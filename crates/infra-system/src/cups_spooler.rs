// CUPS spooler adapter: drives `lp` / `lpq` as child processes
use async_trait::async_trait;
use regex::Regex;
use std::process::Stdio;
use std::sync::LazyLock;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use blackoutbox_core::domain::QueueEntry;
use blackoutbox_core::port::{JobHandle, SpoolerClient, SpoolerError};

static REQUEST_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"request id is \S+-(\d+)").unwrap());

/// Programs and options for the spooler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CupsSpoolerConfig {
    pub submit_command: String,
    pub queue_command: String,
    /// Printer name, passed as `-d` to submit and `-P` to the listing
    pub destination: Option<String>,
    /// Upper bound per command; None waits indefinitely
    pub command_timeout: Option<Duration>,
}

impl Default for CupsSpoolerConfig {
    fn default() -> Self {
        Self {
            submit_command: "lp".to_string(),
            queue_command: "lpq".to_string(),
            destination: None,
            command_timeout: None,
        }
    }
}

pub struct CupsSpooler {
    config: CupsSpoolerConfig,
}

impl CupsSpooler {
    pub fn new(config: CupsSpoolerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CupsSpoolerConfig {
        &self.config
    }

    /// Run `program args...`, returning combined stdout+stderr on success
    async fn run(&self, program: &str, args: &[&str]) -> Result<String, SpoolerError> {
        debug!(command = %program, args = ?args, "Running spooler command");

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SpoolerError::Spawn {
                command: program.to_string(),
                reason: e.to_string(),
            })?;

        let output = match self.config.command_timeout {
            Some(limit) => timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| SpoolerError::Timeout {
                    command: program.to_string(),
                    secs: limit.as_secs(),
                })?,
            None => child.wait_with_output().await,
        }
        .map_err(|e| SpoolerError::Spawn {
            command: program.to_string(),
            reason: e.to_string(),
        })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(SpoolerError::CommandFailed {
                command: program.to_string(),
                status: output.status.to_string(),
                output: combined.trim().to_string(),
            });
        }
        Ok(combined)
    }
}

/// Extract the numeric job id from `lp` output
///
/// `request id is office-482 (1 file(s))` gives `482`.
pub fn parse_request_id(output: &str) -> Option<String> {
    REQUEST_ID
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Split a queue listing into entries, dropping blank lines
pub fn parse_queue_listing(output: &str) -> Vec<QueueEntry> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(QueueEntry::new)
        .collect()
}

#[async_trait]
impl SpoolerClient for CupsSpooler {
    async fn submit(&self, file_path: &str) -> Result<JobHandle, SpoolerError> {
        let mut args = Vec::new();
        if let Some(dest) = &self.config.destination {
            args.extend(["-d", dest.as_str()]);
        }
        // A stored path may start with '-'
        args.extend(["--", file_path]);

        let output = self.run(&self.config.submit_command, &args).await?;

        match parse_request_id(&output) {
            Some(job_id) => {
                info!(file_path = %file_path, cups_job_id = %job_id, "Spooler accepted file");
                Ok(JobHandle { job_id, output })
            }
            None => {
                warn!(file_path = %file_path, output = %output.trim(), "No request id in spooler output");
                Err(SpoolerError::UnparsableOutput {
                    command: self.config.submit_command.clone(),
                    output: output.trim().to_string(),
                })
            }
        }
    }

    async fn list_queue(&self) -> Result<Vec<QueueEntry>, SpoolerError> {
        let mut args = Vec::new();
        if let Some(dest) = &self.config.destination {
            args.extend(["-P", dest.as_str()]);
        }

        let output = self.run(&self.config.queue_command, &args).await?;
        Ok(parse_queue_listing(&output))
    }
}
