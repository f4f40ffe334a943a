use super::*;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{
    domain::{Appliance, ApplianceId, SignalId},
    error::ErrorCode,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Barrier, Mutex};

const APPLIANCE: &str = "Living light";

struct FakeDirectory {
    appliances: Vec<Appliance>,
    fail_list: bool,
    fail_send: bool,
    send_barrier: Option<Barrier>,
    list_calls: AtomicUsize,
    sent: Mutex<Vec<String>>,
}

impl FakeDirectory {
    fn with_signals(names: &[&str]) -> Self {
        let signals = names
            .iter()
            .map(|name| Signal {
                id: SignalId(format!("sig-{name}")),
                name: name.to_string(),
                image: None,
            })
            .collect();
        Self {
            appliances: vec![
                Appliance {
                    id: ApplianceId("tv".into()),
                    nickname: "TV".into(),
                    signals: Vec::new(),
                },
                Appliance {
                    id: ApplianceId("light".into()),
                    nickname: APPLIANCE.into(),
                    signals,
                },
            ],
            fail_list: false,
            fail_send: false,
            send_barrier: None,
            list_calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    fn failing_send(mut self) -> Self {
        self.fail_send = true;
        self
    }

    fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    async fn sent(&self) -> Vec<String> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl SignalDirectory for FakeDirectory {
    async fn list_appliances(&self) -> Result<Vec<Appliance>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list {
            return Err(anyhow!("directory unavailable"));
        }
        Ok(self.appliances.clone())
    }

    async fn send_signal(&self, signal: &Signal) -> Result<()> {
        if let Some(barrier) = &self.send_barrier {
            barrier.wait().await;
        }
        if self.fail_send {
            return Err(anyhow!("remote rejected {}", signal.id.as_str()));
        }
        self.sent.lock().await.push(signal.name.clone());
        Ok(())
    }
}

fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn controller(directory: Arc<FakeDirectory>) -> SelectionController {
    SelectionController::new(directory, APPLIANCE, names(&["on", "off", "dim"]))
        .expect("controller")
}

#[test]
fn empty_sequence_is_a_configuration_error() {
    let directory = Arc::new(FakeDirectory::with_signals(&["on"]));
    let err = SelectionController::new(directory, APPLIANCE, Vec::new())
        .err()
        .expect("should fail");
    assert!(matches!(err, ConfigError::EmptySignalList));
}

#[tokio::test]
async fn next_cycles_and_wraps() {
    let directory = Arc::new(FakeDirectory::with_signals(&["on", "off", "dim"]));
    let controller = controller(directory.clone());
    assert_eq!(controller.current_index().await, 0);

    controller.activate_next().await.expect("first");
    assert_eq!(controller.current_index().await, 1);
    controller.activate_next().await.expect("second");
    assert_eq!(controller.current_index().await, 2);
    controller.activate_next().await.expect("third");
    assert_eq!(controller.current_index().await, 0);

    assert_eq!(directory.sent().await, vec!["off", "dim", "on"]);
}

#[tokio::test]
async fn n_nexts_advance_by_n_from_any_start() {
    let directory = Arc::new(FakeDirectory::with_signals(&["on", "off", "dim"]));
    let controller = controller(directory);
    controller.activate_by_name("off").await.expect("by name");

    for _ in 0..7 {
        controller.activate_next().await.expect("next");
        assert!(controller.current_index().await < controller.signal_names().len());
    }
    assert_eq!(controller.current_index().await, (1 + 7) % 3);
}

#[tokio::test]
async fn by_name_sets_index_regardless_of_prior() {
    let directory = Arc::new(FakeDirectory::with_signals(&["on", "off", "dim"]));
    let controller = controller(directory.clone());
    controller.activate_next().await.expect("next");

    controller.activate_by_name("dim").await.expect("by name");
    assert_eq!(controller.current_index().await, 2);
    controller.activate_by_name("on").await.expect("by name");
    assert_eq!(controller.current_index().await, 0);

    assert_eq!(directory.sent().await, vec!["off", "dim", "on"]);
}

#[tokio::test]
async fn duplicate_names_resolve_to_first_position() {
    let directory = Arc::new(FakeDirectory::with_signals(&["on", "off"]));
    let controller =
        SelectionController::new(directory, APPLIANCE, names(&["off", "on", "off"]))
            .expect("controller");
    controller.activate_next().await.expect("next");
    controller.activate_next().await.expect("next");
    assert_eq!(controller.current_index().await, 2);

    controller.activate_by_name("off").await.expect("by name");
    assert_eq!(controller.current_index().await, 0);
}

#[tokio::test]
async fn unknown_name_is_rejected_before_any_remote_call() {
    let directory = Arc::new(FakeDirectory::with_signals(&["on", "off", "dim"]));
    let controller = controller(directory.clone());
    controller.activate_next().await.expect("next");
    let calls = directory.list_calls.load(Ordering::SeqCst);

    let err = controller
        .activate_by_name("nonexistent")
        .await
        .expect_err("should fail");
    assert!(matches!(err, ControllerError::UnknownSignal(ref name) if name == "nonexistent"));
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(controller.current_index().await, 1);
    assert_eq!(directory.list_calls.load(Ordering::SeqCst), calls);
}

#[tokio::test]
async fn empty_name_is_rejected() {
    let directory = Arc::new(FakeDirectory::with_signals(&["on"]));
    let controller = controller(directory);
    let err = controller.activate_by_name("").await.expect_err("should fail");
    assert!(matches!(err, ControllerError::EmptySignalName));
}

#[tokio::test]
async fn configured_name_missing_remotely_is_not_found() {
    let directory = Arc::new(FakeDirectory::with_signals(&["on", "off"]));
    let controller = controller(directory.clone());

    let err = controller.activate_by_name("dim").await.expect_err("should fail");
    assert!(matches!(err, ControllerError::SignalNotFound { ref signal, .. } if signal == "dim"));

    controller.activate_next().await.expect("next");
    let err = controller.activate_next().await.expect_err("should fail");
    assert!(matches!(err, ControllerError::SignalNotFound { .. }));
    assert_eq!(controller.current_index().await, 1);
    assert_eq!(directory.sent().await, vec!["off"]);
}

#[tokio::test]
async fn missing_appliance_is_not_found() {
    let directory = Arc::new(FakeDirectory::with_signals(&["on", "off", "dim"]));
    let controller =
        SelectionController::new(directory, "Kitchen", names(&["on"])).expect("controller");

    let err = controller.activate_next().await.expect_err("should fail");
    assert!(matches!(err, ControllerError::ApplianceNotFound(ref name) if name == "Kitchen"));
    assert_eq!(controller.current_index().await, 0);
}

#[tokio::test]
async fn failed_transmission_leaves_index_unchanged() {
    let directory = Arc::new(FakeDirectory::with_signals(&["on", "off", "dim"]).failing_send());
    let controller = controller(directory.clone());

    for _ in 0..3 {
        let err = controller.activate_next().await.expect_err("should fail");
        assert_eq!(err.code(), ErrorCode::Upstream);
        assert_eq!(controller.current_index().await, 0);
    }
    let err = controller.activate_by_name("dim").await.expect_err("should fail");
    assert!(matches!(err, ControllerError::Transmission { ref signal, .. } if signal == "dim"));
    assert_eq!(controller.current_index().await, 0);
    assert!(directory.sent().await.is_empty());
}

#[tokio::test]
async fn failed_listing_leaves_index_unchanged() {
    let directory = Arc::new(FakeDirectory::with_signals(&["on", "off"]).failing_list());
    let controller = controller(directory);

    let err = controller.activate_next().await.expect_err("should fail");
    assert!(matches!(err, ControllerError::Directory(_)));
    assert_eq!(controller.current_index().await, 0);
}

#[tokio::test]
async fn every_activation_lists_appliances_again() {
    let directory = Arc::new(FakeDirectory::with_signals(&["on", "off", "dim"]));
    let controller = controller(directory.clone());

    controller.activate_next().await.expect("next");
    controller.activate_by_name("on").await.expect("by name");
    controller.activate_next().await.expect("next");
    assert_eq!(directory.list_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn concurrent_nexts_both_advance() {
    let mut directory = FakeDirectory::with_signals(&["on", "off", "dim"]);
    directory.send_barrier = Some(Barrier::new(2));
    let directory = Arc::new(directory);
    let controller = controller(directory.clone());

    let results =
        futures::future::join_all([controller.activate_next(), controller.activate_next()]).await;
    assert!(results.iter().all(|result| result.is_ok()));

    // Both read index 0 before either committed, so both sent "off".
    assert_eq!(controller.current_index().await, 2);
    assert_eq!(directory.sent().await, vec!["off", "off"]);
}
