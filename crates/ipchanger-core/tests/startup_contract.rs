//! Contract Test: Startup
//!
//! This test verifies that the orchestrator establishes its baseline
//! address before serving any request.
//!
//! Constraints verified:
//! - start() performs exactly one initial resolution
//! - A failed initial resolution prevents startup
//! - The interface is not touched during startup

mod common;

use common::*;
use ipchanger_core::{Error, ReconnectOrchestrator};
use std::sync::atomic::Ordering;

#[tokio::test]
async fn start_resolves_initial_ip() {
    let (controller, probe) = RecordingController::new();
    let (resolver, calls) = ScriptedResolver::new(vec![Step::Ip(ip(1, 2, 3, 4))]);

    let (orchestrator, _events) =
        ReconnectOrchestrator::start(Box::new(controller), Box::new(resolver), &fast_config())
            .await
            .expect("startup succeeds");

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(orchestrator.last_known_ip().await.ip, ip(1, 2, 3, 4));
    assert_eq!(orchestrator.interface(), "pppoe");
    assert_eq!(probe.reset_calls(), 0);
}

#[tokio::test]
async fn start_fails_without_initial_ip() {
    let (controller, probe) = RecordingController::new();
    let (resolver, _calls) = ScriptedResolver::new(vec![Step::Fail("500 Internal Server Error")]);

    let result =
        ReconnectOrchestrator::start(Box::new(controller), Box::new(resolver), &fast_config())
            .await;

    assert!(matches!(result, Err(Error::Http(_))));
    assert_eq!(probe.reset_calls(), 0);
}

#[tokio::test]
async fn start_validates_config_before_resolving() {
    let (controller, _probe) = RecordingController::new();
    let (resolver, calls) = ScriptedResolver::new(vec![Step::Ip(ip(1, 2, 3, 4))]);

    let mut config = fast_config();
    config.resolver.endpoints.clear();

    let result =
        ReconnectOrchestrator::start(Box::new(controller), Box::new(resolver), &config).await;

    assert!(matches!(result, Err(Error::Config(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
