//! # View Convergence
//!
//! A session's view must settle on the owner's listing no matter how
//! mutations from several identities interleave, and no matter how many
//! notifications were folded into one refresh.

#[cfg(test)]
mod tests {
    use super::super::Harness;
    use proptest::prelude::*;
    use shared_types::{Address, Todo, TodoId};
    use std::sync::Arc;
    use std::time::Duration;
    use td_02_record_accessor::{InProcessLedger, RecordAccessor};
    use td_03_change_listener::ListenerErrors;
    use td_04_view_sync::{SyncConfig, SyncStatus, TodoIntent, TodoSession, TodoView};
    use tokio::time::{sleep, timeout};

    const ALICE: Address = Address::repeat(0xa1);
    const BOB: Address = Address::repeat(0xb0);

    type Session = TodoSession<InProcessLedger>;

    fn session(h: &Harness) -> (Session, ListenerErrors) {
        TodoSession::new(Arc::clone(&h.accessor), SyncConfig::default())
    }

    async fn converge_to(session: &Session, expected: &[Todo]) -> TodoView {
        let mut view = session.view();
        timeout(
            Duration::from_secs(3),
            view.wait_for(|v| v.todos == expected),
        )
        .await
        .expect("view did not converge")
        .map(|v| (*v).clone())
        .expect("view channel open")
    }

    async fn wait_for_triggers(session: &Session, at_least: u64) {
        let signal = Arc::clone(session.listener().signal());
        timeout(Duration::from_secs(1), async move {
            while signal.accepted() < at_least {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("trigger not observed");
    }

    // =============================================================================
    // INTERLEAVED WRITERS
    // =============================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_interleaved_identities_converge() {
        let h = Harness::start();
        let (session, _errors) = session(&h);
        session.connect(ALICE).await.unwrap();

        let alice = {
            let accessor = Arc::clone(&h.accessor);
            tokio::spawn(async move {
                let mut ids = Vec::new();
                for i in 0..8 {
                    ids.push(accessor.create_todo(ALICE, &format!("alice {i}")).await.unwrap());
                }
                accessor.toggle_todo(ALICE, ids[1]).await.unwrap();
                accessor.update_todo(ALICE, ids[2], "alice edited").await.unwrap();
                accessor.delete_todo(ALICE, ids[3]).await.unwrap();
                accessor.delete_todo(ALICE, ids[0]).await.unwrap();
            })
        };
        let bob = {
            let accessor = Arc::clone(&h.accessor);
            tokio::spawn(async move {
                for i in 0..8 {
                    let id = accessor.create_todo(BOB, &format!("bob {i}")).await.unwrap();
                    accessor.toggle_todo(BOB, id).await.unwrap();
                }
            })
        };
        alice.await.unwrap();
        bob.await.unwrap();

        let expected = h.accessor.get_user_todos(ALICE).await.unwrap();
        assert_eq!(expected.len(), 6);

        let view = converge_to(&session, &expected).await;
        assert_eq!(view.identity, Some(ALICE));
        assert_eq!(view.completed_count(), 1);
        assert!(view.todos.iter().all(|t| t.owner == ALICE));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_burst_is_coalesced_and_converges() {
        let h = Harness::start();
        let (session, _errors) = session(&h);
        session.connect(ALICE).await.unwrap();
        let refreshes_before = session.synchronizer().refresh_count();

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let accessor = Arc::clone(&h.accessor);
                tokio::spawn(async move {
                    accessor.create_todo(ALICE, &format!("burst {i}")).await.unwrap()
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let expected = h.accessor.get_user_todos(ALICE).await.unwrap();
        assert_eq!(expected.len(), 20);
        converge_to(&session, &expected).await;

        let refreshes = session.synchronizer().refresh_count() - refreshes_before;
        assert!(refreshes >= 1);
        assert!(refreshes <= 20);
    }

    #[tokio::test]
    async fn test_explicit_refresh_matches_listing() {
        let h = Harness::start();
        let (session, _errors) = session(&h);
        session.connect(ALICE).await.unwrap();
        for content in ["a", "b", "c"] {
            h.accessor.create_todo(ALICE, content).await.unwrap();
        }

        session.refresh().await.unwrap();

        assert_eq!(
            session.snapshot().todos,
            h.accessor.get_user_todos(ALICE).await.unwrap()
        );
    }

    // =============================================================================
    // SUBSCRIPTION SCOPE
    // =============================================================================

    #[tokio::test]
    async fn test_foreign_create_does_not_trigger() {
        let h = Harness::start();
        let (session, _errors) = session(&h);
        session.connect(ALICE).await.unwrap();
        let accepted = session.listener().signal().accepted();

        h.accessor.create_todo(BOB, "elsewhere").await.unwrap();
        sleep(Duration::from_millis(50)).await;

        assert_eq!(session.listener().signal().accepted(), accepted);
        assert!(session.snapshot().todos.is_empty());
    }

    #[tokio::test]
    async fn test_foreign_toggle_triggers_harmless_refresh() {
        let h = Harness::start();
        let id = h.accessor.create_todo(BOB, "bob's").await.unwrap();
        h.accessor.create_todo(ALICE, "alice's").await.unwrap();
        let (session, _errors) = session(&h);
        session.connect(ALICE).await.unwrap();
        let accepted = session.listener().signal().accepted();

        h.accessor.toggle_todo(BOB, id).await.unwrap();
        wait_for_triggers(&session, accepted + 1).await;

        let view = converge_to(&session, &h.accessor.get_user_todos(ALICE).await.unwrap()).await;
        assert_eq!(view.todos.len(), 1);
        assert_eq!(view.completed_count(), 0);
    }

    #[tokio::test]
    async fn test_switch_ignores_old_identity_changes() {
        let h = Harness::start();
        let (session, _errors) = session(&h);
        session.connect(ALICE).await.unwrap();
        session.switch_identity(BOB).await.unwrap();

        h.accessor.create_todo(ALICE, "alice later").await.unwrap();
        let bob_id = h.accessor.create_todo(BOB, "bob now").await.unwrap();

        let view = converge_to(&session, &h.accessor.get_user_todos(BOB).await.unwrap()).await;
        assert_eq!(view.identity, Some(BOB));
        assert_eq!(view.todos[0].id, bob_id);
    }

    // =============================================================================
    // SESSION FAULTS
    // =============================================================================

    #[tokio::test]
    async fn test_fault_shown_then_cleared_by_success() {
        let h = Harness::start();
        let foreign = h.accessor.create_todo(BOB, "bob's").await.unwrap();
        let (session, _errors) = session(&h);
        session.connect(ALICE).await.unwrap();

        let err = session
            .submit(TodoIntent::Toggle { id: foreign })
            .await
            .unwrap_err();
        assert!(!err.is_retryable());
        assert!(matches!(session.snapshot().status, SyncStatus::Error(_)));

        session
            .submit(TodoIntent::Create {
                content: "recovered".into(),
            })
            .await
            .unwrap();
        let mut view = session.view();
        timeout(
            Duration::from_secs(1),
            view.wait_for(|v| v.todos.len() == 1 && v.status == SyncStatus::Idle),
        )
        .await
        .unwrap()
        .unwrap();
    }

    // =============================================================================
    // PROPERTY: ANY INTERLEAVING CONVERGES
    // =============================================================================

    #[derive(Debug, Clone)]
    enum Op {
        Create(bool),
        Edit(bool, u64),
        Toggle(bool, u64),
        Delete(bool, u64),
    }

    impl Op {
        fn caller(&self) -> Address {
            let alice = match self {
                Op::Create(a) | Op::Edit(a, _) | Op::Toggle(a, _) | Op::Delete(a, _) => *a,
            };
            if alice {
                ALICE
            } else {
                BOB
            }
        }
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            any::<bool>().prop_map(Op::Create),
            (any::<bool>(), 1..12u64).prop_map(|(a, id)| Op::Edit(a, id)),
            (any::<bool>(), 1..12u64).prop_map(|(a, id)| Op::Toggle(a, id)),
            (any::<bool>(), 1..12u64).prop_map(|(a, id)| Op::Delete(a, id)),
        ]
    }

    async fn apply(accessor: &RecordAccessor<InProcessLedger>, op: &Op, step: usize) {
        let from = op.caller();
        // Faults are expected for ids that do not exist or belong to the
        // other identity.
        let _ = match op {
            Op::Create(_) => accessor
                .create_todo(from, &format!("step {step}"))
                .await
                .map(|_| ()),
            Op::Edit(_, id) => {
                accessor
                    .update_todo(from, TodoId(*id), &format!("edit {step}"))
                    .await
            }
            Op::Toggle(_, id) => accessor.toggle_todo(from, TodoId(*id)).await,
            Op::Delete(_, id) => accessor.delete_todo(from, TodoId(*id)).await,
        };
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(12))]

        #[test]
        fn prop_view_converges_to_listing(ops in prop::collection::vec(op_strategy(), 1..30)) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let h = Harness::start();
                let (session, _errors) = session(&h);
                session.connect(ALICE).await.unwrap();

                for (step, op) in ops.iter().enumerate() {
                    apply(&h.accessor, op, step).await;
                }

                let expected = h.accessor.get_user_todos(ALICE).await.unwrap();
                converge_to(&session, &expected).await;
                assert!(h.node.check_invariants().is_empty());
            });
        }
    }
}
