use crate::changes;
use crate::error::StorageError;
use crate::ports::{PushSender, SnapshotStore, TimeProvider};
use crate::push::PushDispatcher;
use crate::types::notice::{IngestPayload, IngestResult, Snapshot};
use crate::types::push::DispatchReport;

use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::task::JoinHandle;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("invalid payload: {0}")]
    Validation(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub struct IngestOutcome {
    pub result: IngestResult,
    /// Detached push fan-out, present only when there was something to push.
    pub dispatch: Option<JoinHandle<DispatchReport>>,
}

pub fn parse_payload(body: &[u8]) -> Result<IngestPayload, IngestError> {
    Ok(serde_json::from_slice(body)?)
}

/// Diffs the batch against the stored snapshot, replaces the snapshot and
/// launches the push fan-out for the new notices without waiting on it.
///
/// Only storage failures are reported. Concurrent calls are not serialized; the
/// last save wins and the loser's diff was computed against stale data.
pub fn ingest<S, T>(
    snapshots: &dyn SnapshotStore,
    dispatcher: Option<&PushDispatcher<S, T>>,
    time: &T,
    payload: IngestPayload,
) -> Result<IngestOutcome, IngestError>
where
    S: PushSender,
    T: TimeProvider,
{
    let previous = snapshots.load()?;
    let fresh = changes::new_notices(&payload.notices, &previous.notices);
    let snapshot = normalize(payload, time.now());
    snapshots.save(&snapshot)?;

    let result = IngestResult {
        ok: true,
        total_notices: snapshot.total_notices,
        new_notices: fresh.len(),
        pushed: !fresh.is_empty(),
    };
    tracing::info!(
        total_notices = result.total_notices,
        new_notices = result.new_notices,
        "notice snapshot replaced"
    );

    let dispatch = match dispatcher {
        Some(dispatcher) if !fresh.is_empty() => {
            let dispatcher = dispatcher.clone();
            Some(tokio::spawn(async move { dispatcher.dispatch(&fresh).await }))
        }
        None if !fresh.is_empty() => {
            tracing::info!(
                new_notices = fresh.len(),
                "push not configured; skipping notification"
            );
            None
        }
        _ => None,
    };

    Ok(IngestOutcome { result, dispatch })
}

fn normalize(payload: IngestPayload, now: OffsetDateTime) -> Snapshot {
    let total_notices = payload
        .total_notices
        .unwrap_or(payload.notices.len() as u64);
    let scraped_at = payload.scraped_at.unwrap_or_else(|| format_instant(now));
    Snapshot {
        scraped_at: Some(scraped_at),
        total_notices,
        notices: payload.notices,
    }
}

fn format_instant(at: OffsetDateTime) -> String {
    at.format(&Rfc3339)
        .unwrap_or_else(|_| at.unix_timestamp().to_string())
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use crate::changes::tests::notice;
    use crate::ports::SubscriptionRegistry;
    use crate::push::testing::{TestSender, TestTime, subscription};
    use crate::store::MemoryStore;
    use crate::types::notice::{Notice, NoticeExposure};
    use std::sync::Arc;
    use std::time::Duration;

    struct Fixture {
        store: Arc<MemoryStore>,
        sender: TestSender,
        dispatcher: PushDispatcher<TestSender, TestTime>,
        time: TestTime,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::default());
        store
            .replace_all(&[subscription("https://push.example/ok")])
            .expect("seed registry");
        let sender = TestSender::default();
        let time = TestTime::new();
        let dispatcher = PushDispatcher::new(
            sender.clone(),
            time.clone(),
            Arc::clone(&store) as Arc<dyn SubscriptionRegistry>,
            Duration::from_secs(10),
            NoticeExposure::Full,
        );
        Fixture {
            store,
            sender,
            dispatcher,
            time,
        }
    }

    fn payload(notices: Vec<Notice>) -> IngestPayload {
        IngestPayload {
            scraped_at: None,
            total_notices: None,
            notices,
        }
    }

    impl Fixture {
        async fn ingest(&self, notices: Vec<Notice>) -> (IngestResult, Option<DispatchReport>) {
            let outcome = ingest(
                self.store.as_ref(),
                Some(&self.dispatcher),
                &self.time,
                payload(notices),
            )
            .expect("ingest");
            let report = match outcome.dispatch {
                Some(handle) => Some(handle.await.expect("join dispatch")),
                None => None,
            };
            (outcome.result, report)
        }
    }

    #[tokio::test]
    async fn ingest__should_treat_first_batch_as_new() {
        // Given
        let fixture = fixture();
        let batch = vec![notice("1", "Acme", "Urgent"), notice("2", "Globex", "Normal")];

        // When
        let (result, report) = fixture.ingest(batch.clone()).await;

        // Then
        assert_eq!(
            result,
            IngestResult {
                ok: true,
                total_notices: 2,
                new_notices: 2,
                pushed: true,
            }
        );
        assert_eq!(report.expect("dispatch report").delivered, 1);
        let stored = fixture.store.load().expect("load");
        assert_eq!(stored.notices, batch);
        assert_eq!(stored.scraped_at.as_deref(), Some("2025-10-11T13:07:00Z"));
    }

    #[tokio::test]
    async fn ingest__should_find_nothing_new_on_repeat_batch() {
        // Given
        let fixture = fixture();
        let batch = vec![notice("1", "Acme", "Urgent")];
        fixture.ingest(batch.clone()).await;

        // When
        let (result, report) = fixture.ingest(batch).await;

        // Then
        assert_eq!(result.new_notices, 0);
        assert!(!result.pushed);
        assert!(report.is_none());
        assert_eq!(fixture.sender.sent().len(), 1);
    }

    #[tokio::test]
    async fn ingest__should_push_only_added_notices() {
        // Given
        let fixture = fixture();
        fixture.ingest(vec![notice("1", "Acme", "Urgent")]).await;

        // When
        let (result, _) = fixture
            .ingest(vec![
                notice("1", "Acme", "Urgent"),
                notice("2", "Globex", "Normal"),
            ])
            .await;

        // Then
        assert_eq!(result.new_notices, 1);
        assert_eq!(result.total_notices, 2);
        let sent = fixture.sender.sent();
        let last: serde_json::Value = serde_json::from_str(&sent[1].1).expect("parse payload");
        assert_eq!(last["title"], "🎓 1 New CDC Notice!");
        assert_eq!(last["body"], "Globex - Normal");
        assert_eq!(last["data"]["notices"].as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn ingest__should_keep_supplied_metadata() {
        // Given
        let fixture = fixture();
        let payload = IngestPayload {
            scraped_at: Some("2025-10-11T07:37:00+05:30".to_string()),
            total_notices: Some(40),
            notices: vec![notice("1", "Acme", "Urgent")],
        };

        // When
        let outcome = ingest(
            fixture.store.as_ref(),
            None::<&PushDispatcher<TestSender, TestTime>>,
            &fixture.time,
            payload,
        )
        .expect("ingest");

        // Then
        assert!(outcome.dispatch.is_none());
        assert!(outcome.result.pushed);
        assert_eq!(outcome.result.total_notices, 40);
        let stored = fixture.store.load().expect("load");
        assert_eq!(stored.scraped_at.as_deref(), Some("2025-10-11T07:37:00+05:30"));
        assert_eq!(stored.total_notices, 40);
    }

    struct ReadOnlyStore;

    impl SnapshotStore for ReadOnlyStore {
        fn load(&self) -> Result<Snapshot, StorageError> {
            Ok(Snapshot::default())
        }

        fn save(&self, _snapshot: &Snapshot) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("disk full")))
        }
    }

    #[tokio::test]
    async fn ingest__should_report_save_failure_without_pushing() {
        // Given
        let fixture = fixture();

        // When
        let result = ingest(
            &ReadOnlyStore,
            Some(&fixture.dispatcher),
            &fixture.time,
            payload(vec![notice("1", "Acme", "Urgent")]),
        );

        // Then
        assert!(matches!(result, Err(IngestError::Storage(_))));
        tokio::task::yield_now().await;
        assert!(fixture.sender.sent().is_empty());
    }

    #[test]
    fn parse_payload__should_reject_malformed_bodies() {
        // Then
        assert!(parse_payload(b"not json").is_err());
        assert!(parse_payload(br#"{"notices":{}}"#).is_err());
        let parsed = parse_payload(br#"{"notices":[]}"#).expect("parse");
        assert!(parsed.notices.is_empty());
    }
}
