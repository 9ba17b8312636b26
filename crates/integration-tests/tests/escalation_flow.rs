//! Trigger escalation end to end over SQLite stores
//!
//! - A failing system escalates once the retry floor and buffer window pass
//! - Escalation fans out one print job per document plus matching templates
//! - A triggered trigger is left alone until an operator resets it
//! - Recovery clears the failure streak

mod common;

use blackoutbox_core::domain::{PrintJobStatus, TriggerStatus};
use blackoutbox_core::port::health_probe::mocks::ScriptedHealthProbe;
use blackoutbox_core::port::{SpoolerError, TimeProvider};
use common::{harness, scripted};

#[tokio::test]
async fn test_failing_system_escalates_on_third_check() {
    let probe = scripted(503);
    let h = harness(probe.clone()).await;
    let id = h.add_trigger("payroll", "https://payroll.example.com/health", 60).await;
    h.add_document("payroll", "runbook", "/srv/docs/runbook.pdf").await;

    // t=0: first failure latches last_failed_at
    let summary = h.watchdog.check_all_triggers().await.unwrap();
    assert_eq!(summary.checked, 1);
    assert_eq!(summary.escalated, 0);
    let t = h.trigger(id).await;
    assert_eq!(t.status, TriggerStatus::Error);
    assert_eq!(t.retry_count, 1);
    assert_eq!(t.last_failed_at, Some(0));

    // t=30: still inside the buffer window
    h.clock.set(30);
    h.watchdog.check_all_triggers().await.unwrap();
    let t = h.trigger(id).await;
    assert_eq!(t.status, TriggerStatus::Error);
    assert_eq!(t.retry_count, 2);
    assert_eq!(t.last_failed_at, Some(0));

    // t=60: third failure, buffer elapsed
    h.clock.set(60);
    let summary = h.watchdog.check_all_triggers().await.unwrap();
    assert_eq!(summary.escalated, 1);
    let t = h.trigger(id).await;
    assert_eq!(t.status, TriggerStatus::Triggered);
    assert_eq!(t.retry_count, 3);
    assert_eq!(t.last_checked_at, Some(60));

    assert_eq!(h.spooler.submitted_paths(), vec!["/srv/docs/runbook.pdf"]);
    let jobs = h.stores.print_jobs.list().await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].status, PrintJobStatus::Printing);
    assert_eq!(jobs[0].submitted_at, 60);

    println!("✅ Escalation after retry floor and buffer window");
}

#[tokio::test]
async fn test_retry_floor_alone_does_not_escalate() {
    let probe = scripted(500);
    let h = harness(probe).await;
    let id = h.add_trigger("billing", "https://billing.example.com/health", 600).await;

    for now in [0, 30, 60, 90, 120] {
        h.clock.set(now);
        h.watchdog.check_all_triggers().await.unwrap();
    }

    let t = h.trigger(id).await;
    assert_eq!(t.status, TriggerStatus::Error);
    assert_eq!(t.retry_count, 5);
    assert!(h.spooler.submitted_paths().is_empty());
}

#[tokio::test]
async fn test_triggered_is_a_fixed_point() {
    let probe = scripted(500);
    let h = harness(probe.clone()).await;
    let id = h.add_trigger("crm", "https://crm.example.com/health", 0).await;
    h.add_document("crm", "contacts", "/srv/docs/contacts.pdf").await;

    for now in [0, 30, 60] {
        h.clock.set(now);
        h.watchdog.check_all_triggers().await.unwrap();
    }
    assert_eq!(h.trigger(id).await.status, TriggerStatus::Triggered);
    let probes_at_escalation = probe.call_count();
    let escalated = h.trigger(id).await;

    // Even a healthy system does not un-trigger it
    probe.set_fallback(ScriptedHealthProbe::status(200));
    for now in [90, 120, 150] {
        h.clock.set(now);
        let summary = h.watchdog.check_all_triggers().await.unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.checked, 0);
    }

    assert_eq!(probe.call_count(), probes_at_escalation);
    assert_eq!(h.trigger(id).await, escalated);
    assert_eq!(h.spooler.submitted_paths().len(), 1, "fan-out happens once");
}

#[tokio::test]
async fn test_recovery_clears_failure_streak() {
    let probe = scripted(502);
    let h = harness(probe.clone()).await;
    let id = h.add_trigger("mail", "https://mail.example.com/health", 300).await;

    h.watchdog.check_all_triggers().await.unwrap();
    h.clock.set(30);
    h.watchdog.check_all_triggers().await.unwrap();
    assert_eq!(h.trigger(id).await.retry_count, 2);

    probe.set_fallback(ScriptedHealthProbe::status(204));
    h.clock.set(60);
    h.watchdog.check_all_triggers().await.unwrap();

    let t = h.trigger(id).await;
    assert_eq!(t.status, TriggerStatus::Ok);
    assert_eq!(t.retry_count, 0);
    assert_eq!(t.last_failed_at, None);
    assert_eq!(t.last_checked_at, Some(60));

    // A new streak starts from scratch
    probe.set_fallback(ScriptedHealthProbe::status(500));
    h.clock.set(90);
    h.watchdog.check_all_triggers().await.unwrap();
    let t = h.trigger(id).await;
    assert_eq!(t.retry_count, 1);
    assert_eq!(t.last_failed_at, Some(90));
}

#[tokio::test]
async fn test_operator_reset_rearms_trigger() {
    let probe = scripted(500);
    let h = harness(probe.clone()).await;
    let id = h.add_trigger("erp", "https://erp.example.com/health", 0).await;

    for now in [0, 30, 60] {
        h.clock.set(now);
        h.watchdog.check_all_triggers().await.unwrap();
    }
    assert_eq!(h.trigger(id).await.status, TriggerStatus::Triggered);

    h.stores
        .triggers
        .reset_retry_count(id, h.clock.now_secs())
        .await
        .unwrap();

    let t = h.trigger(id).await;
    assert_eq!(t.status, TriggerStatus::Ok);
    assert_eq!(t.retry_count, 0);

    h.clock.set(90);
    let summary = h.watchdog.check_all_triggers().await.unwrap();
    assert_eq!(summary.checked, 1);
    assert_eq!(h.trigger(id).await.retry_count, 1);
}

#[tokio::test]
async fn test_fan_out_includes_templates_and_survives_failures() {
    let probe = scripted(500);
    let h = harness(probe).await;
    let id = h.add_trigger("hr", "https://hr.example.com/health", 0).await;

    h.add_document("hr", "payslip", "/srv/docs/payslip-march.pdf").await;
    h.add_document("hr", "contract", "/srv/docs/contract.pdf").await;
    h.add_document("other", "payslip", "/srv/docs/other.pdf").await;

    h.add_template("hr", "payslip", "/srv/templates/payslip-old.pdf").await;
    h.clock.set(10);
    let newest = h.add_template("hr", "payslip", "/srv/templates/payslip.pdf").await;
    h.clock.set(0);

    h.spooler.fail_path(
        "/srv/docs/contract.pdf",
        SpoolerError::CommandFailed {
            command: "lp".to_string(),
            status: "exit status: 1".to_string(),
            output: "lp: No such file or directory".to_string(),
        },
    );

    for now in [0, 30, 60] {
        h.clock.set(now);
        h.watchdog.check_all_triggers().await.unwrap();
    }
    assert_eq!(h.trigger(id).await.status, TriggerStatus::Triggered);

    assert_eq!(
        h.spooler.submitted_paths(),
        vec![
            "/srv/docs/payslip-march.pdf",
            "/srv/templates/payslip.pdf",
            "/srv/docs/contract.pdf",
        ]
    );

    let jobs = h.stores.print_jobs.list().await.unwrap();
    assert_eq!(jobs.len(), 3, "every attempt is recorded");

    let failed: Vec<_> = jobs
        .iter()
        .filter(|j| j.status == PrintJobStatus::Failed)
        .collect();
    assert_eq!(failed.len(), 1);
    assert!(failed[0].cups_job_id.is_none());
    assert!(failed[0]
        .error_message
        .as_deref()
        .unwrap()
        .contains("No such file"));

    // The template job carries the newest template's id
    assert_eq!(jobs[1].document_id, newest);
    assert_eq!(jobs[1].status, PrintJobStatus::Printing);
    assert!(jobs[1].cups_job_id.is_some());
}

#[tokio::test]
async fn test_unreachable_system_counts_as_failure() {
    let probe = std::sync::Arc::new(ScriptedHealthProbe::new(
        blackoutbox_core::domain::ProbeResponse::Transport("connection refused".to_string()),
    ));
    let h = harness(probe).await;
    let id = h.add_trigger("vpn", "https://vpn.example.com/health", 0).await;

    h.watchdog.check_all_triggers().await.unwrap();

    let t = h.trigger(id).await;
    assert_eq!(t.status, TriggerStatus::Error);
    assert_eq!(t.retry_count, 1);
}
