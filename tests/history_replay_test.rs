//! Restoring past tasks into a live session.

mod common;

use std::time::Duration;

use a2a_probe::client::{CallOutcome, CallPhase};
use a2a_probe::error::ClientError;
use a2a_probe::models::Task;
use a2a_probe::rpc::RpcMethod;
use a2a_probe::session::SessionIdentity;
use common::*;
use serde_json::json;

fn task_from(value: serde_json::Value) -> Task {
    serde_json::from_value(value).unwrap()
}

async fn wait_until(cond: impl Fn() -> bool) {
    for _ in 0..400 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}

#[tokio::test]
async fn test_restore_over_get_task() {
    let (client, http) = mock_client();
    http.set_default_response(MockHttpClient::json_response(rpc_result(completed_task(
        "t-7",
        "c-7",
        "earlier answer",
    ))));

    assert!(client.restore("tasks/t-7").await);

    assert_eq!(client.identity(), SessionIdentity::resolve("t-7", "c-7"));
    assert_eq!(client.output_text(), "earlier answer");
    assert_eq!(client.rounds().len(), 1);
    assert!(client.stats().is_none());

    let sent = http.get_requests()[0].json().unwrap();
    assert_eq!(sent["method"], "GetTask");
    assert_eq!(sent["params"]["id"], "t-7");
}

#[tokio::test]
async fn test_restore_replaces_current_round_output() {
    let (client, http) = mock_client();
    http.push_response(MockHttpClient::json_response(rpc_result(agent_message(
        "live reply",
    ))));
    client.send_text(RpcMethod::SendMessage, "q").await.unwrap();
    let live_stats = client.stats();

    let source = MockTaskSource::new();
    source.insert("t-1", task_from(completed_task("t-1", "c-1", "from history")));

    assert!(client.restore_from(&source, "t-1").await);

    assert_eq!(client.rounds().len(), 1);
    assert_eq!(client.output_text(), "from history");
    assert_eq!(client.stats(), live_stats);
}

#[tokio::test]
async fn test_restore_falls_back_to_artifacts() {
    let (client, _http) = mock_client();
    let source = MockTaskSource::new();
    source.insert(
        "t-2",
        task_from(json!({
            "id": "t-2",
            "status": {"state": "completed"},
            "history": [{"role": "user", "parts": [{"text": "question"}]}],
            "artifacts": [
                {"parts": [{"text": "part one"}]},
                {"parts": [{"text": "part two"}]}
            ]
        })),
    );

    assert!(client.restore_from(&source, "t-2").await);
    assert_eq!(client.output_text(), "part one\npart two");
    assert_eq!(client.identity(), SessionIdentity::resolve("t-2", "t-2"));
}

#[tokio::test]
async fn test_restore_task_without_text_succeeds_empty() {
    let (client, _http) = mock_client();
    let source = MockTaskSource::new();
    source.insert("t-3", task_from(json!({"id": "t-3", "status": {"state": "working"}})));

    assert!(client.restore_from(&source, "t-3").await);
    assert_eq!(client.output_text(), "");
    assert_eq!(client.rounds().len(), 1);
}

#[tokio::test]
async fn test_mismatched_task_leaves_session_untouched() {
    let (client, http, mut rx) = mock_client_with_effects();
    http.set_default_response(MockHttpClient::json_response(rpc_result(completed_task(
        "t-8", "c-8", "wrong task",
    ))));
    client.set_identity("t-1", "c-1");
    drain(&mut rx);

    assert!(!client.restore("t-7").await);

    assert_eq!(client.identity(), SessionIdentity::resolve("t-1", "c-1"));
    assert!(client.rounds().is_empty());
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_missing_task_is_not_restored() {
    let (client, http, mut rx) = mock_client_with_effects();
    http.set_default_response(status_response(404, "not found"));

    assert!(!client.restore("t-404").await);
    assert!(client.identity().is_empty());
    assert!(client.rounds().is_empty());
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_lookup_failure_leaves_session_untouched() {
    let (client, http, mut rx) = mock_client_with_effects();
    http.set_default_response(MockHttpClient::json_response(rpc_result(agent_message(
        "kept",
    ))));
    client.send_text(RpcMethod::SendMessage, "q").await.unwrap();
    let identity = client.identity();
    let rounds = client.rounds();
    drain(&mut rx);

    let source = MockTaskSource::new();
    source.fail_with(ClientError::Transport("connection refused".to_string()));

    assert!(!client.restore_from(&source, "t-1").await);
    assert_eq!(client.identity(), identity);
    assert_eq!(client.rounds(), rounds);
    assert_eq!(client.output_text(), "kept");
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_empty_task_id_is_rejected_without_lookup() {
    let (client, http) = mock_client();
    assert!(!client.restore("  tasks/ ").await);
    assert!(http.get_requests().is_empty());
}

#[tokio::test]
async fn test_restore_failure_then_live_send_numbers_from_one() {
    let (client, http) = mock_client();
    http.push_response(status_response(500, "boom"));
    http.push_response(MockHttpClient::json_response(rpc_result(agent_message("ok"))));

    assert!(!client.restore("t-1").await);
    client.send_text(RpcMethod::SendMessage, "q").await.unwrap();

    assert_eq!(client.rounds()[0].id, 1);
    assert_eq!(client.output_text(), "ok");
}

#[tokio::test]
async fn test_restore_refused_while_call_active() {
    let (client, http) = mock_client();
    http.set_default_response(sse_then_hang(&[agent_message("live")]));
    let source = MockTaskSource::new();
    source.insert("t-9", task_from(completed_task("t-9", "c-9", "old")));

    let running = client.clone();
    let call = tokio::spawn(async move {
        running
            .send_text(RpcMethod::SendStreamingMessage, "q")
            .await
    });
    wait_until(|| client.output_text() == "live").await;

    assert!(!client.restore_from(&source, "t-9").await);
    assert_eq!(client.output_text(), "live");
    assert!(client.identity().is_empty());
    assert_eq!(client.phase(), CallPhase::Streaming);

    assert!(client.cancel());
    assert_eq!(call.await.unwrap(), Ok(CallOutcome::Aborted));

    assert!(client.restore_from(&source, "t-9").await);
    assert_eq!(client.output_text(), "old");
    assert_eq!(client.phase(), CallPhase::Idle);
}
