//! Real HTTP probing against a local responder

mod common;

use blackoutbox_core::domain::{ProbeResponse, TriggerStatus};
use blackoutbox_core::port::HealthProbe;
use blackoutbox_infra_system::HttpHealthProbe;
use common::harness;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Answer every connection with `status_line`; returns the base URL
async fn responder(status_line: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!("HTTP/1.1 {status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
            let _ = socket.write_all(response.as_bytes()).await;
        }
    });

    format!("http://{addr}/health")
}

#[tokio::test]
async fn test_healthy_endpoint_keeps_trigger_ok() {
    let url = responder("200 OK").await;
    let probe = Arc::new(HttpHealthProbe::new(Duration::from_secs(5)).unwrap());
    let h = harness(probe).await;
    let id = h.add_trigger("local", &url, 0).await;

    h.watchdog.check_all_triggers().await.unwrap();

    let t = h.trigger(id).await;
    assert_eq!(t.status, TriggerStatus::Ok);
    assert_eq!(t.retry_count, 0);
    assert_eq!(t.last_checked_at, Some(0));
}

#[tokio::test]
async fn test_server_error_escalates_with_real_probe() {
    let url = responder("503 Service Unavailable").await;
    let probe = Arc::new(HttpHealthProbe::new(Duration::from_secs(5)).unwrap());
    let h = harness(probe).await;
    let id = h.add_trigger("local", &url, 0).await;
    h.add_document("local", "runbook", "/srv/docs/runbook.pdf").await;

    for now in [0, 30, 60] {
        h.clock.set(now);
        h.watchdog.check_all_triggers().await.unwrap();
    }

    assert_eq!(h.trigger(id).await.status, TriggerStatus::Triggered);
    assert_eq!(h.spooler.submitted_paths(), vec!["/srv/docs/runbook.pdf"]);
}

#[tokio::test]
async fn test_redirect_is_a_failure() {
    let url = responder("302 Found").await;
    let probe = HttpHealthProbe::new(Duration::from_secs(5)).unwrap();

    match probe.probe(&url).await.unwrap() {
        ProbeResponse::Status { code, .. } => assert_eq!(code, 302),
        other => panic!("expected a status, got {other:?}"),
    }

    let h = harness(Arc::new(probe)).await;
    let id = h.add_trigger("local", &url, 0).await;
    h.watchdog.check_all_triggers().await.unwrap();
    assert_eq!(h.trigger(id).await.status, TriggerStatus::Error);
}

#[tokio::test]
async fn test_closed_port_is_a_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let probe = Arc::new(HttpHealthProbe::new(Duration::from_secs(2)).unwrap());
    let h = harness(probe).await;
    let id = h.add_trigger("local", &format!("http://{addr}/health"), 0).await;

    let summary = h.watchdog.check_all_triggers().await.unwrap();
    assert_eq!(summary.errors, 0);

    let t = h.trigger(id).await;
    assert_eq!(t.status, TriggerStatus::Error);
    assert_eq!(t.retry_count, 1);
}
