//! Subcommand handlers

use crate::cli::{DocumentCommands, TemplateCommands, TriggerCommands};
use crate::wiring::App;
use anyhow::{Context, Result};
use blackoutbox_core::application::{stop_channel, stuck_cutoff, CheckSummary, StuckScanSummary};
use blackoutbox_core::domain::{
    is_public_ip, validate_probe_url, Document, PrintJob, Template, Trigger, TriggerStatus,
};
use colored::Colorize;
use std::time::Duration;
use tabled::{Table, Tabled};
use tracing::{error, info, warn};
use url::{Host, Url};

#[derive(Tabled)]
struct TriggerRow {
    id: i64,
    system: String,
    url: String,
    buffer_secs: i64,
    status: String,
    retries: u32,
    last_failed: String,
    last_checked: String,
}

impl From<&Trigger> for TriggerRow {
    fn from(t: &Trigger) -> Self {
        Self {
            id: t.id,
            system: t.system_id.clone(),
            url: t.url.clone(),
            buffer_secs: t.buffer_seconds,
            status: t.status.to_string(),
            retries: t.retry_count,
            last_failed: timestamp(t.last_failed_at),
            last_checked: timestamp(t.last_checked_at),
        }
    }
}

#[derive(Tabled)]
struct PrintJobRow {
    id: i64,
    document: i64,
    spooler_job: String,
    status: String,
    submitted: String,
    completed: String,
    error: String,
}

impl From<&PrintJob> for PrintJobRow {
    fn from(j: &PrintJob) -> Self {
        Self {
            id: j.id,
            document: j.document_id,
            spooler_job: j.cups_job_id.clone().unwrap_or_else(|| "-".to_string()),
            status: j.status.to_string(),
            submitted: timestamp(Some(j.submitted_at)),
            completed: timestamp(j.completed_at),
            error: j.error_message.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct DocumentRow {
    id: i64,
    system: String,
    file_reference: String,
    path: String,
    tags: String,
}

impl From<&Document> for DocumentRow {
    fn from(d: &Document) -> Self {
        Self {
            id: d.id,
            system: d.system_id.clone(),
            file_reference: d.file_reference.clone(),
            path: d.file_path.clone(),
            tags: d.tags.join(", "),
        }
    }
}

#[derive(Tabled)]
struct CheckRow {
    checked: usize,
    skipped: usize,
    escalated: usize,
    errors: usize,
}

#[derive(Tabled)]
struct StuckRow {
    found: usize,
    refreshed: usize,
    skipped: usize,
    errors: usize,
}

fn timestamp(secs: Option<i64>) -> String {
    secs.and_then(|s| chrono::DateTime::from_timestamp(s, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn print_table<T: Tabled>(rows: Vec<T>) {
    if rows.is_empty() {
        println!("{}", "(none)".dimmed());
    } else {
        println!("{}", Table::new(rows));
    }
}

/// Run the scheduler until SIGINT/SIGTERM, then give the in-flight tick
/// `shutdown_grace_secs` to finish
pub async fn run(app: App) -> Result<()> {
    let scheduler = app.watchdog.scheduler();
    let (stop, token) = stop_channel();
    let handle = tokio::spawn(async move { scheduler.run(token).await });

    info!("Watchdog running. Press Ctrl+C to stop");
    wait_for_signal().await?;
    info!("Shutdown signal received. Exiting gracefully...");

    stop.stop();
    match tokio::time::timeout(app.settings.shutdown_grace(), handle).await {
        Ok(Ok(())) => info!("Shutdown complete."),
        Ok(Err(e)) => error!(error = %e, "Scheduler task failed"),
        Err(_) => warn!(
            grace_secs = app.settings.shutdown_grace_secs,
            "In-flight tick did not finish in time"
        ),
    }
    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res.context("Failed to listen for Ctrl+C")?,
        _ = term.recv() => {}
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_signal() -> Result<()> {
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")
}

pub async fn check_triggers(app: &App) -> Result<()> {
    let CheckSummary {
        checked,
        skipped,
        escalated,
        errors,
    } = app.watchdog.check_all_triggers().await?;

    print_table(vec![CheckRow {
        checked,
        skipped,
        escalated,
        errors,
    }]);
    if escalated > 0 {
        println!("{}", format!("⚠ {} trigger(s) escalated", escalated).red().bold());
    }
    Ok(())
}

pub async fn check_stuck(app: &App, threshold_secs: Option<u64>) -> Result<()> {
    let threshold = threshold_secs
        .map(Duration::from_secs)
        .unwrap_or(app.watchdog.settings().scheduler.stuck_job_threshold);
    let StuckScanSummary {
        found,
        refreshed,
        skipped,
        errors,
    } = app.watchdog.check_stuck_jobs(threshold).await?;

    print_table(vec![StuckRow {
        found,
        refreshed,
        skipped,
        errors,
    }]);
    Ok(())
}

pub async fn print(app: &App, document_id: i64, file_path: &str) -> Result<()> {
    match app.watchdog.create_print_job(document_id, file_path).await {
        Ok(job) => {
            println!("{}", "✓ Print job submitted".green().bold());
            print_table(vec![PrintJobRow::from(&job)]);
            Ok(())
        }
        Err(e) => {
            println!("{}", "✗ Print job failed (recorded as failed)".red().bold());
            Err(e.into())
        }
    }
}

pub async fn job_status(app: &App, job_id: i64) -> Result<()> {
    let job = app.watchdog.update_job_status(job_id).await?;
    print_table(vec![PrintJobRow::from(&job)]);
    Ok(())
}

pub async fn jobs(app: &App, stuck_after_secs: Option<u64>) -> Result<()> {
    let jobs = match stuck_after_secs {
        Some(secs) => {
            let cutoff = stuck_cutoff(app.clock.now_secs(), Duration::from_secs(secs));
            app.stores.print_jobs.find_stuck(cutoff).await?
        }
        None => app.stores.print_jobs.list().await?,
    };
    print_table(jobs.iter().map(PrintJobRow::from).collect());
    Ok(())
}

pub async fn triggers(app: &App, command: TriggerCommands) -> Result<()> {
    let store = &app.stores.triggers;

    match command {
        TriggerCommands::List => {
            let triggers = store.list().await?;
            print_table(triggers.iter().map(TriggerRow::from).collect());
        }

        TriggerCommands::Add {
            system,
            url,
            buffer_secs,
        } => {
            if buffer_secs < 0 {
                anyhow::bail!("--buffer-secs must not be negative");
            }
            let parsed = validate_probe_url(&url)?;
            ensure_public_target(&parsed).await?;

            let trigger = Trigger::new(0, system, parsed.as_str(), buffer_secs, app.clock.now_secs());
            let id = store.insert(&trigger).await?;
            println!("{}", format!("✓ Trigger {} registered", id).green().bold());
        }

        TriggerCommands::Reset { id } => {
            store.reset_retry_count(id, app.clock.now_secs()).await?;
            println!("{}", format!("✓ Trigger {} reset", id).green().bold());
        }

        TriggerCommands::Mute { id } => {
            store.update_status(id, TriggerStatus::Triggered).await?;
            println!("{}", format!("✓ Trigger {} muted", id).yellow().bold());
        }

        TriggerCommands::Delete { id } => {
            store.delete(id).await?;
            println!("{}", format!("✓ Trigger {} deleted", id).green().bold());
        }
    }
    Ok(())
}

pub async fn documents(app: &App, command: DocumentCommands) -> Result<()> {
    let store = &app.stores.documents;

    match command {
        DocumentCommands::List { system } => {
            let documents = match system {
                Some(system) => store.find_by_system_id(&system).await?,
                None => store.list().await?,
            };
            print_table(documents.iter().map(DocumentRow::from).collect());
        }

        DocumentCommands::Add {
            system,
            file_reference,
            path,
            tags,
        } => {
            let mut document = Document::new(0, system, file_reference, path).with_tags(tags);
            document.updated_at = Some(app.clock.now_secs());
            let id = store.insert(&document).await?;
            println!("{}", format!("✓ Document {} added", id).green().bold());
        }
    }
    Ok(())
}

pub async fn templates(app: &App, command: TemplateCommands) -> Result<()> {
    match command {
        TemplateCommands::Add {
            system,
            file_reference,
            path,
            description,
        } => {
            let mut template =
                Template::new(0, system, file_reference, path, app.clock.now_secs());
            template.description = description;
            let id = app.stores.templates.insert(&template).await?;
            println!("{}", format!("✓ Template {} added", id).green().bold());
        }
    }
    Ok(())
}

/// Reject hostnames that resolve to private or local addresses
async fn ensure_public_target(url: &Url) -> Result<()> {
    let Some(Host::Domain(host)) = url.host() else {
        // IP literals were already checked by validate_probe_url
        return Ok(());
    };
    let port = url.port_or_known_default().unwrap_or(80);

    let addrs = tokio::net::lookup_host((host, port))
        .await
        .with_context(|| format!("Failed to resolve {}", host))?;

    for addr in addrs {
        if !is_public_ip(addr.ip()) {
            anyhow::bail!("{} resolves to non-public address {}", host, addr.ip());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_formatting() {
        assert_eq!(timestamp(None), "-");
        assert_eq!(timestamp(Some(0)), "1970-01-01 00:00:00");
    }

    #[tokio::test]
    async fn test_ip_literal_skips_resolution() {
        let url = Url::parse("https://8.8.8.8/health").unwrap();
        assert!(ensure_public_target(&url).await.is_ok());
    }

    #[tokio::test]
    async fn test_localhost_is_rejected() {
        let url = Url::parse("http://localhost:8080/health").unwrap();
        assert!(ensure_public_target(&url).await.is_err());
    }
}
