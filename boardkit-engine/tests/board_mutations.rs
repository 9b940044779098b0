//! Optimistic mutation behavior: immediate local application, rollback on
//! commit failure, snapshot integrity under rapid re-edits, and
//! server-corrected record adoption.

use std::sync::Arc;

use boardkit_engine::{
    BoardEvent, BoardHandle, CommitError, EngineError, Lead, LeadPatch, LeadStage, OpKind,
};
use boardkit_test_utils::{
    lead, leads, record_id, InMemoryDataSource, ManualMutationService, RecordingSink,
};

async fn lead_board(
    count: u128,
) -> (
    BoardHandle<Lead>,
    Arc<ManualMutationService<Lead>>,
    Arc<RecordingSink<LeadStage>>,
) {
    let source = Arc::new(
        InMemoryDataSource::<Lead>::new()
            .with_partition(LeadStage::New, leads(0, count, LeadStage::New)),
    );
    let commits = Arc::new(ManualMutationService::new());
    let sink = Arc::new(RecordingSink::new());
    let board = BoardHandle::builder()
        .partitions([LeadStage::New, LeadStage::Contact, LeadStage::Warm])
        .source(source)
        .mutation_service(commits.clone())
        .notification_sink(sink.clone())
        .build()
        .unwrap();
    board.start().await.unwrap();
    // start() emits one Reloaded event.
    (board, commits, sink)
}

/// The caller sees the patched value the moment edit returns.
#[tokio::test]
async fn test_edit_applies_optimistically() {
    let (board, commits, sink) = lead_board(2).await;
    let id = record_id(0);

    board.edit(id, LeadPatch::new().notes("call back monday")).unwrap();
    assert_eq!(
        board.record(id).unwrap().notes.as_deref(),
        Some("call back monday")
    );
    assert!(board.has_pending(id));

    commits.wait_for_calls(1).await;
    commits.resolve_next(Ok(None));
    sink.wait_for_events(2).await;
    assert!(!board.has_pending(id));
    assert!(sink.events().iter().any(|e| matches!(
        e,
        BoardEvent::CommitSucceeded {
            op: OpKind::Edit,
            ..
        }
    )));
}

/// A failed commit converges the record back to its pre-mutation value.
#[tokio::test]
async fn test_failed_commit_rolls_back() {
    let (board, commits, sink) = lead_board(2).await;
    let id = record_id(0);

    board.edit(id, LeadPatch::new().notes("optimistic")).unwrap();
    assert_eq!(board.record(id).unwrap().notes.as_deref(), Some("optimistic"));

    commits.wait_for_calls(1).await;
    commits.resolve_next(Err(CommitError::Rejected {
        code: "validation".to_string(),
        message: "notes too long".to_string(),
    }));
    sink.wait_for_events(2).await;

    assert_eq!(board.record(id).unwrap().notes, None);
    assert!(!board.has_pending(id));
    assert!(sink.events().iter().any(|e| matches!(
        e,
        BoardEvent::CommitFailed {
            op: OpKind::Edit,
            ..
        }
    )));
}

/// Two rapid edits before either commit settles: if the second commit
/// fails after the first succeeded, the record converges to the true
/// original, not the intermediate value.
#[tokio::test]
async fn test_rapid_reedit_rolls_back_to_true_original() {
    let (board, commits, sink) = lead_board(1).await;
    let id = record_id(0);

    board.edit(id, LeadPatch::new().notes("draft")).unwrap();
    board.edit(id, LeadPatch::new().notes("final")).unwrap();
    assert_eq!(board.record(id).unwrap().notes.as_deref(), Some("final"));

    commits.wait_for_calls(2).await;
    commits.resolve_next(Ok(None));
    sink.wait_for_events(2).await;

    // First settled fine; the chain is still open with the original
    // snapshot, and the optimistic value stays visible.
    assert!(board.has_pending(id));
    assert_eq!(board.record(id).unwrap().notes.as_deref(), Some("final"));

    commits.resolve_next(Err(CommitError::Rejected {
        code: "conflict".to_string(),
        message: "stale revision".to_string(),
    }));
    sink.wait_for_events(3).await;

    assert_eq!(board.record(id).unwrap().notes, None);
    assert!(!board.has_pending(id));
}

/// A successful commit may return a server-corrected record, which
/// replaces the optimistic value.
#[tokio::test]
async fn test_server_corrected_record_is_adopted() {
    let (board, commits, sink) = lead_board(1).await;
    let id = record_id(0);

    board.edit(id, LeadPatch::new().notes("local")).unwrap();
    commits.wait_for_calls(1).await;

    let mut corrected = lead(0, LeadStage::New);
    corrected.notes = Some("normalized by server".to_string());
    commits.resolve_next(Ok(Some(corrected)));
    sink.wait_for_events(2).await;

    assert_eq!(
        board.record(id).unwrap().notes.as_deref(),
        Some("normalized by server")
    );
}

/// Optimistic delete removes at once; a failed commit reinserts the
/// record at its origin position.
#[tokio::test]
async fn test_delete_rolls_back_on_failure() {
    let (board, commits, sink) = lead_board(3).await;
    let id = record_id(1);

    board.delete(id).unwrap();
    assert!(board.record(id).is_none());

    commits.wait_for_calls(1).await;
    let (_, kind) = commits.resolve_next(Err(CommitError::Gone { id })).unwrap();
    assert_eq!(kind, OpKind::Delete);
    sink.wait_for_events(2).await;

    let partition = board.partition(&LeadStage::New).unwrap();
    let ids: Vec<_> = partition.items.iter().map(|l| l.lead_id).collect();
    assert_eq!(ids, vec![record_id(0), record_id(1), record_id(2)]);
}

#[tokio::test]
async fn test_delete_commits() {
    let (board, commits, sink) = lead_board(2).await;
    let id = record_id(1);

    board.delete(id).unwrap();
    commits.wait_for_calls(1).await;
    commits.resolve_next(Ok(None));
    sink.wait_for_events(2).await;

    assert!(board.record(id).is_none());
    assert_eq!(board.partition(&LeadStage::New).unwrap().total_count, 1);
}

#[tokio::test]
async fn test_edit_unknown_record_errors() {
    let (board, commits, _sink) = lead_board(1).await;

    let err = board
        .edit(record_id(99), LeadPatch::new().notes("x"))
        .unwrap_err();
    assert!(matches!(err, EngineError::RecordNotFound { .. }));
    assert_eq!(commits.calls_seen(), 0);
}

/// Externally-created records enter at the head of their partition.
#[tokio::test]
async fn test_insert_goes_to_partition_head() {
    let (board, _commits, _sink) = lead_board(2).await;

    board.insert(lead(50, LeadStage::New)).unwrap();
    let partition = board.partition(&LeadStage::New).unwrap();
    assert_eq!(partition.items[0].lead_id, record_id(50));
    assert_eq!(partition.total_count, 3);
}
