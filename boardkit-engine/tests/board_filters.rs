//! Filter synchronization: debounce coalescing, value-compare skipping,
//! stale-response discarding, and refresh semantics.

use std::sync::Arc;
use std::time::Duration;

use boardkit_engine::{
    BoardConfig, BoardHandle, FilterSet, Lead, LeadPatch, LeadStage, Page,
};
use boardkit_test_utils::{
    lead, leads, record_id, InMemoryDataSource, ManualDataSource, ManualMutationService,
    OkMutationService, RecordingSink,
};

const COLUMNS: [LeadStage; 3] = [LeadStage::New, LeadStage::Contact, LeadStage::Warm];

/// Rapid successive filter changes coalesce into a single reload carrying
/// the final criteria.
#[tokio::test(start_paused = true)]
async fn test_debounced_filter_changes_coalesce() {
    let source = Arc::new(
        InMemoryDataSource::<Lead>::new()
            .with_partition(LeadStage::New, leads(0, 4, LeadStage::New)),
    );
    let sink = Arc::new(RecordingSink::new());
    let board: BoardHandle<Lead> = BoardHandle::builder()
        .partitions(COLUMNS)
        .config(
            BoardConfig::new()
                .with_page_size(10)
                .with_filter_debounce(Duration::from_millis(300)),
        )
        .source(source.clone())
        .mutation_service(Arc::new(OkMutationService::new()))
        .notification_sink(sink.clone())
        .build()
        .unwrap();
    board.start().await.unwrap();
    let initial = source.fetch_count();

    board.set_filters(FilterSet::empty().with_query("a"));
    board.set_filters(FilterSet::empty().with_query("ac"));
    board.set_filters(FilterSet::empty().with_query("acme"));

    // One Reloaded from start, one from the settled debounce.
    sink.wait_for_events(2).await;
    assert_eq!(source.fetch_count(), initial + COLUMNS.len());
    assert_eq!(
        source.last_filters().unwrap().query.as_deref(),
        Some("acme")
    );
}

/// Criteria equal to the applied ones trigger no reload once the window
/// settles.
#[tokio::test(start_paused = true)]
async fn test_unchanged_criteria_skip_reload() {
    let source = Arc::new(InMemoryDataSource::<Lead>::new());
    let sink = Arc::new(RecordingSink::new());
    let board: BoardHandle<Lead> = BoardHandle::builder()
        .partitions(COLUMNS)
        .config(BoardConfig::new().with_filter_debounce(Duration::from_millis(300)))
        .source(source.clone())
        .mutation_service(Arc::new(OkMutationService::new()))
        .notification_sink(sink.clone())
        .build()
        .unwrap();
    board.start().await.unwrap();
    let initial = source.fetch_count();

    board.set_filters(FilterSet::empty());
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(source.fetch_count(), initial);
    assert_eq!(sink.events().len(), 1); // only the Reloaded from start
}

/// Boards configured without a debounce window apply filter changes
/// immediately.
#[tokio::test]
async fn test_immediate_filters_apply_without_window() {
    let source = Arc::new(
        InMemoryDataSource::<Lead>::new()
            .with_partition(LeadStage::New, leads(0, 2, LeadStage::New)),
    );
    let sink = Arc::new(RecordingSink::new());
    let board: BoardHandle<Lead> = BoardHandle::builder()
        .partitions(COLUMNS)
        .config(BoardConfig::new().with_immediate_filters())
        .source(source.clone())
        .mutation_service(Arc::new(OkMutationService::new()))
        .notification_sink(sink.clone())
        .build()
        .unwrap();
    board.start().await.unwrap();

    board.set_filters(FilterSet::empty().with_query("warm leads"));
    sink.wait_for_events(2).await;
    assert_eq!(
        source.last_filters().unwrap().query.as_deref(),
        Some("warm leads")
    );
}

/// A page response that arrives after a filter reset superseded its load
/// is discarded, not merged.
#[tokio::test]
async fn test_superseded_load_response_is_discarded() {
    let source = Arc::new(ManualDataSource::<Lead>::new());
    let sink = Arc::new(RecordingSink::new());
    let board: BoardHandle<Lead> = BoardHandle::builder()
        .partitions(COLUMNS)
        .config(BoardConfig::new().with_page_size(2).with_immediate_filters())
        .source(source.clone())
        .mutation_service(Arc::new(OkMutationService::new()))
        .notification_sink(sink.clone())
        .build()
        .unwrap();

    let starter = tokio::spawn({
        let board = board.clone();
        async move { board.start().await }
    });
    source.wait_for_calls(3).await;
    for _ in 0..3 {
        let (key, _) = source.next_call().unwrap();
        let page = if key == LeadStage::New {
            Page::new(leads(0, 2, LeadStage::New), 6)
        } else {
            Page::new(Vec::new(), 0)
        };
        source.resolve_next(Ok(page));
    }
    starter.await.unwrap().unwrap();

    // A load_more is in flight when the filters change.
    let stale = tokio::spawn({
        let board = board.clone();
        async move { board.load_more(&LeadStage::New).await }
    });
    source.wait_for_calls(4).await;
    board.set_filters(FilterSet::empty().with_query("acme"));
    source.wait_for_calls(7).await;

    // The old response lands late and must not be applied.
    source.resolve_next(Ok(Page::new(leads(2, 2, LeadStage::New), 6)));
    stale.await.unwrap().unwrap();

    for _ in 0..3 {
        let (key, _) = source.next_call().unwrap();
        let page = if key == LeadStage::New {
            Page::new(leads(10, 2, LeadStage::New), 2)
        } else {
            Page::new(Vec::new(), 0)
        };
        source.resolve_next(Ok(page));
    }
    sink.wait_for_events(2).await;

    let partition = board.partition(&LeadStage::New).unwrap();
    let ids: Vec<_> = partition.items.iter().map(|l| l.lead_id).collect();
    assert_eq!(ids, vec![record_id(10), record_id(11)]);
    assert!(!partition.is_loading);
    assert!(!partition.has_more);
}

/// After an explicit refresh the server value wins: pending mutations are
/// dropped and their late settlements do not roll anything back.
#[tokio::test]
async fn test_refresh_makes_server_value_win() {
    let source = Arc::new(
        InMemoryDataSource::<Lead>::new()
            .with_partition(LeadStage::New, vec![lead(0, LeadStage::New)]),
    );
    let commits = Arc::new(ManualMutationService::new());
    let sink = Arc::new(RecordingSink::new());
    let board: BoardHandle<Lead> = BoardHandle::builder()
        .partitions(COLUMNS)
        .source(source.clone())
        .mutation_service(commits.clone())
        .notification_sink(sink.clone())
        .build()
        .unwrap();
    board.start().await.unwrap();
    let id = record_id(0);

    board.edit(id, LeadPatch::new().notes("unsaved")).unwrap();
    commits.wait_for_calls(1).await;
    assert!(board.has_pending(id));

    board.refresh().await.unwrap();
    assert!(!board.has_pending(id));
    assert_eq!(board.record(id).unwrap().notes, None);

    // The late failure finds nothing to roll back.
    commits.resolve_next(Err(boardkit_engine::CommitError::ConnectionLost {
        reason: "timeout".to_string(),
    }));
    sink.wait_for_events(3).await;
    assert_eq!(board.record(id).unwrap().notes, None);
}
