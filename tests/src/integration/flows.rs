//! # Integration Test Flows
//!
//! Record accessor → ledger node → receipt → notification, end to end over
//! the in-process client.
//!
//! ## Flows Tested
//!
//! 1. **Create/read**: content, owner and completion flag come back as sent
//! 2. **Access control**: non-owners are refused and the record is unchanged
//! 3. **Faults**: a reverted transaction publishes nothing
//! 4. **Notifications**: payload carried only by `TodoCreated`

#[cfg(test)]
mod tests {
    use super::super::Harness;
    use shared_bus::EventFilter;
    use shared_types::{Address, EventKind, TodoError, TodoEvent, TodoId};
    use std::time::Duration;
    use td_02_record_accessor::{AccessorError, LedgerClient};
    use tokio::time::timeout;

    const ALICE: Address = Address::repeat(0xa1);
    const BOB: Address = Address::repeat(0xb0);

    fn fault(err: TodoError) -> AccessorError {
        AccessorError::Fault(err)
    }

    // =============================================================================
    // CREATE / READ
    // =============================================================================

    #[tokio::test]
    async fn test_create_then_get_returns_record() {
        let h = Harness::start();

        let id = h.accessor.create_todo(ALICE, "Buy milk").await.unwrap();
        let todo = h.accessor.get_todo(id).await.unwrap();

        assert_eq!(todo.id, id);
        assert_eq!(todo.content, "Buy milk");
        assert_eq!(todo.owner, ALICE);
        assert!(!todo.is_completed);
        assert_eq!(todo.created_at, todo.updated_at);
    }

    #[tokio::test]
    async fn test_empty_content_creates_nothing() {
        let h = Harness::start();
        let mut events = h.node.subscribe(EventFilter::all()).unwrap();

        let err = h.accessor.create_todo(ALICE, "").await.unwrap_err();

        assert_eq!(err, fault(TodoError::InvalidInput));
        assert!(h.accessor.get_user_todos(ALICE).await.unwrap().is_empty());
        assert_eq!(events.try_recv().unwrap(), None);
        assert_eq!(h.node.stats().transactions_reverted, 1);
    }

    #[tokio::test]
    async fn test_whitespace_content_is_stored() {
        let h = Harness::start();

        let id = h.accessor.create_todo(ALICE, "  ").await.unwrap();

        assert_eq!(h.accessor.get_todo(id).await.unwrap().content, "  ");
    }

    #[tokio::test]
    async fn test_listing_keeps_creation_order() {
        let h = Harness::start();
        for content in ["Todo 1", "Todo 2", "Todo 3"] {
            h.accessor.create_todo(ALICE, content).await.unwrap();
            h.accessor.create_todo(BOB, "interleaved").await.unwrap();
        }

        let todos = h.accessor.get_user_todos(ALICE).await.unwrap();
        let contents: Vec<_> = todos.iter().map(|t| t.content.as_str()).collect();

        assert_eq!(contents, vec!["Todo 1", "Todo 2", "Todo 3"]);
        assert!(todos.windows(2).all(|w| w[0].id < w[1].id));
    }

    // =============================================================================
    // OWNER MUTATIONS
    // =============================================================================

    #[tokio::test]
    async fn test_owner_edit_replaces_content() {
        let h = Harness::start();
        let id = h.accessor.create_todo(ALICE, "draft").await.unwrap();

        h.accessor.update_todo(ALICE, id, "X").await.unwrap();

        assert_eq!(h.accessor.get_todo(id).await.unwrap().content, "X");
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_flag() {
        let h = Harness::start();
        let id = h.accessor.create_todo(ALICE, "flip").await.unwrap();

        h.accessor.toggle_todo(ALICE, id).await.unwrap();
        assert!(h.accessor.get_todo(id).await.unwrap().is_completed);

        h.accessor.toggle_todo(ALICE, id).await.unwrap();
        assert!(!h.accessor.get_todo(id).await.unwrap().is_completed);
    }

    #[tokio::test]
    async fn test_deleted_id_never_returns() {
        let h = Harness::start();
        let id = h.accessor.create_todo(ALICE, "gone").await.unwrap();

        h.accessor.delete_todo(ALICE, id).await.unwrap();
        let next = h.accessor.create_todo(ALICE, "after").await.unwrap();

        assert_eq!(
            h.accessor.get_todo(id).await,
            Err(fault(TodoError::NotFound { id }))
        );
        assert!(next > id);
        let ids: Vec<_> = h
            .accessor
            .get_user_todos(ALICE)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![next]);
    }

    #[tokio::test]
    async fn test_mutations_on_deleted_record_not_found() {
        let h = Harness::start();
        let id = h.accessor.create_todo(ALICE, "gone").await.unwrap();
        h.accessor.delete_todo(ALICE, id).await.unwrap();

        let not_found = fault(TodoError::NotFound { id });
        assert_eq!(h.accessor.update_todo(ALICE, id, "x").await, Err(not_found.clone()));
        assert_eq!(h.accessor.toggle_todo(ALICE, id).await, Err(not_found.clone()));
        assert_eq!(h.accessor.delete_todo(ALICE, id).await, Err(not_found));
    }

    // =============================================================================
    // ACCESS CONTROL
    // =============================================================================

    #[tokio::test]
    async fn test_non_owner_refused_record_unchanged() {
        let h = Harness::start();
        let id = h.accessor.create_todo(ALICE, "mine").await.unwrap();
        let before = h.accessor.get_todo(id).await.unwrap();
        let unauthorized = fault(TodoError::Unauthorized { id, caller: BOB });

        assert_eq!(
            h.accessor.update_todo(BOB, id, "theirs").await,
            Err(unauthorized.clone())
        );
        assert_eq!(h.accessor.toggle_todo(BOB, id).await, Err(unauthorized.clone()));
        assert_eq!(h.accessor.delete_todo(BOB, id).await, Err(unauthorized));

        assert_eq!(h.accessor.get_todo(id).await.unwrap(), before);
        assert!(h.accessor.get_user_todos(BOB).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_owner_edit_with_empty_content_is_unauthorized() {
        let h = Harness::start();
        let id = h.accessor.create_todo(ALICE, "mine").await.unwrap();

        assert_eq!(
            h.accessor.update_todo(BOB, id, "").await,
            Err(fault(TodoError::Unauthorized { id, caller: BOB }))
        );
    }

    #[tokio::test]
    async fn test_reads_are_not_owner_scoped() {
        let h = Harness::start();
        let id = h.accessor.create_todo(ALICE, "public").await.unwrap();

        // Any caller may read any record or listing.
        assert_eq!(h.accessor.get_todo(id).await.unwrap().owner, ALICE);
        assert_eq!(h.accessor.get_user_todos(ALICE).await.unwrap().len(), 1);
    }

    // =============================================================================
    // NOTIFICATIONS
    // =============================================================================

    #[tokio::test]
    async fn test_notification_schema() {
        let h = Harness::start();
        let mut events = h.accessor.client().subscribe(EventFilter::all()).unwrap();

        let id = h.accessor.create_todo(ALICE, "notify").await.unwrap();
        h.accessor.update_todo(ALICE, id, "edited").await.unwrap();
        h.accessor.toggle_todo(ALICE, id).await.unwrap();
        h.accessor.delete_todo(ALICE, id).await.unwrap();

        let mut received = Vec::new();
        for _ in 0..4 {
            let event = timeout(Duration::from_secs(1), events.recv())
                .await
                .unwrap()
                .unwrap();
            received.push(event);
        }

        assert_eq!(
            received[0],
            TodoEvent::Created {
                id,
                owner: ALICE,
                content: "notify".into()
            }
        );
        let kinds: Vec<_> = received.iter().map(TodoEvent::kind).collect();
        assert_eq!(kinds, EventKind::ALL.to_vec());
        for event in &received[1..] {
            assert_eq!(event.id(), id);
            assert_eq!(event.owner(), None);
            assert_eq!(event.content(), None);
        }
    }

    #[tokio::test]
    async fn test_owner_filter_on_created() {
        let h = Harness::start();
        let mut mine = h
            .accessor
            .client()
            .subscribe(EventFilter::kind(EventKind::Created).with_owner(ALICE))
            .unwrap();

        h.accessor.create_todo(BOB, "not for alice").await.unwrap();
        let id = h.accessor.create_todo(ALICE, "for alice").await.unwrap();

        let event = timeout(Duration::from_secs(1), mine.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.id(), id);
        assert_eq!(mine.try_recv().unwrap(), None);
    }

    #[tokio::test]
    async fn test_receipt_logs_match_notifications() {
        let h = Harness::start();
        let call = shared_types::TodoCall::CreateTodo {
            content: "receipt".into(),
        };

        let tx_hash = h.accessor.submit(ALICE, &call).await.unwrap();
        let receipt = h.accessor.confirm(tx_hash).await.unwrap();

        assert!(receipt.is_success());
        assert_eq!(receipt.from, ALICE);
        assert_eq!(receipt.created_id(), Some(TodoId(1)));
        assert_eq!(receipt.logs.len(), 1);
    }

    // =============================================================================
    // TRANSPORT
    // =============================================================================

    #[tokio::test]
    async fn test_stopped_node_is_transport_failure() {
        let h = Harness::start();
        h.node.shutdown().await;

        let err = h.accessor.create_todo(ALICE, "late").await.unwrap_err();

        assert!(err.is_retryable());
        assert!(err.fault().is_none());
    }
}
