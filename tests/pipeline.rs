// tests/pipeline.rs
// End-to-end pipeline runs over HTTP
//
// Tests:
// 1. Round trip from query text to a table view
// 2. Index selector attached only where the operation needs one
// 3. Failures at each stage stop the pipeline there
// 4. Blank input never reaches the services

mod common;

use common::{Canned, Stub, dead_base_url, orchestrator, serve};
use minidb_console::error::ValidationError;
use minidb_console::pipeline::{FailureKind, PipelineOutcome, PipelineState, Submission};
use minidb_console::view::ViewModel;
use serde_json::json;

#[tokio::test]
async fn test_select_round_trip_to_table() {
    let stub = Stub::new(
        Canned::ok(json!({"op": 3, "table": "foo"})),
        Canned::ok(json!({"result": [{"id": 1, "name": "a"}], "count": 1, "engine": "bplustree"})),
    );
    let base = serve(stub.clone()).await;
    let orch = orchestrator(&base, "bplustree");

    let submission = orch.submit("SELECT * FROM foo").await;
    let outcome = submission.outcome().expect("run finished");

    assert!(outcome.is_success());
    match outcome.view() {
        Some(ViewModel::Tabular { columns, rows, footer }) => {
            assert_eq!(columns, &vec!["id".to_string(), "name".to_string()]);
            assert_eq!(rows, &vec![vec!["1".to_string(), "a".to_string()]]);
            assert_eq!(footer.count, Some(1));
            assert_eq!(footer.engine.as_deref(), Some("bplustree"));
        }
        other => panic!("expected a table, got {:?}", other),
    }

    // op 3 is sent without an index
    assert_eq!(stub.last_database_body(), Some(json!({"op": 3, "table": "foo"})));
    assert_eq!(orch.state().await, PipelineState::Idle);

    let path: Vec<PipelineState> = orch.transitions().await.iter().map(|t| t.to).collect();
    assert_eq!(
        path,
        vec![
            PipelineState::Parsing,
            PipelineState::Parsed,
            PipelineState::Enriching,
            PipelineState::Enriched,
            PipelineState::Executing,
            PipelineState::Completed,
            PipelineState::Idle,
        ]
    );
}

#[tokio::test]
async fn test_insert_carries_selected_index() {
    let stub = Stub::new(
        Canned::ok(json!({"op": 2, "table": "foo", "values": [[1, "a"]]})),
        Canned::ok(json!({"message": "inserted"})),
    );
    let base = serve(stub.clone()).await;
    let orch = orchestrator(&base, "seqfile");

    let submission = orch.submit("INSERT INTO foo VALUES (1, 'a')").await;
    assert!(submission.outcome().is_some_and(|o| o.is_success()));

    let sent = stub.last_database_body().unwrap();
    assert_eq!(sent["idx"], "seqfile");
    assert_eq!(sent["values"], json!([[1, "a"]]));
}

#[tokio::test]
async fn test_execution_failure_never_completes() {
    let stub = Stub::new(
        Canned::ok(json!({"op": 2, "table": "foo"})),
        Canned::Json(500, json!({"error": "duplicate key"})),
    );
    let base = serve(stub).await;
    let orch = orchestrator(&base, "seqfile");

    let submission = orch.submit("INSERT INTO foo VALUES (1)").await;
    let outcome = submission.outcome().unwrap();

    assert_eq!(outcome.state(), PipelineState::ExecutionFailed);
    assert_eq!(outcome.failure_kind(), Some(FailureKind::Rejected));
    assert_eq!(outcome.error_message().as_deref(), Some("duplicate key"));
    assert!(outcome.view().is_none());

    let transitions = orch.transitions().await;
    assert!(transitions.iter().all(|t| t.to != PipelineState::Completed));
    assert!(transitions.iter().any(|t| t.to == PipelineState::ExecutionFailed));
}

#[tokio::test]
async fn test_parse_failure_skips_database() {
    let stub = Stub::new(
        Canned::Json(400, json!({"error": "syntax error at 'SELEC'"})),
        Canned::ok(json!({})),
    );
    let base = serve(stub.clone()).await;
    let orch = orchestrator(&base, "isam");

    let submission = orch.submit("SELEC * FROM foo").await;
    let outcome = submission.outcome().unwrap();

    assert_eq!(outcome.state(), PipelineState::ParseFailed);
    assert_eq!(outcome.failure_kind(), Some(FailureKind::Syntax));
    assert_eq!(outcome.error_message().as_deref(), Some("syntax error at 'SELEC'"));
    assert_eq!(stub.database_hits(), 0);
}

#[tokio::test]
async fn test_non_object_descriptor_is_invalid() {
    let stub = Stub::new(Canned::ok(json!("not an object")), Canned::ok(json!({})));
    let base = serve(stub.clone()).await;
    let orch = orchestrator(&base, "isam");

    let submission = orch.submit("SELECT * FROM foo").await;
    match submission.outcome().map(|o| &**o) {
        Some(PipelineOutcome::ValidationFailed { error, .. }) => {
            assert_eq!(*error, ValidationError::InvalidQueryObject);
        }
        other => panic!("expected validation failure, got {:?}", other),
    }
    assert_eq!(stub.database_hits(), 0);
}

#[tokio::test]
async fn test_blank_input_is_ignored() {
    let stub = Stub::new(Canned::ok(json!({"op": 1})), Canned::ok(json!({})));
    let base = serve(stub.clone()).await;
    let orch = orchestrator(&base, "isam");

    assert!(matches!(orch.submit("   \n\t").await, Submission::Ignored));
    assert!(matches!(orch.submit("").await, Submission::Ignored));
    assert_eq!(stub.parser_hits(), 0);
    assert_eq!(stub.database_hits(), 0);
    assert_eq!(orch.state().await, PipelineState::Idle);
    assert!(orch.latest().await.is_none());
}

#[tokio::test]
async fn test_unreachable_services() {
    let base = dead_base_url().await;
    let orch = orchestrator(&base, "isam");

    let submission = orch.submit("SELECT * FROM foo").await;
    let outcome = submission.outcome().unwrap();

    assert_eq!(outcome.state(), PipelineState::ParseFailed);
    assert_eq!(outcome.failure_kind(), Some(FailureKind::Unreachable));
}

#[tokio::test]
async fn test_selector_change_applies_to_next_run() {
    let stub = Stub::new(
        Canned::ok(json!({"op": 4, "table": "foo"})),
        Canned::ok(json!({"message": "deleted"})),
    );
    let base = serve(stub.clone()).await;
    let orch = orchestrator(&base, "isam");

    orch.submit("DELETE FROM foo WHERE id = 1").await;
    assert_eq!(stub.last_database_body().unwrap()["idx"], "isam");

    orch.set_selector("exthashing").await;
    orch.submit("DELETE FROM foo WHERE id = 2").await;
    assert_eq!(stub.last_database_body().unwrap()["idx"], "exthashing");
}
