//! # Journal Over Real Traffic
//!
//! Every processed transaction, applied or reverted, lands in exactly one
//! block and the chain still verifies afterwards.

#[cfg(test)]
mod tests {
    use super::super::Harness;
    use node_runtime::{NodeConfig, NodeContainer};
    use shared_bus::InMemoryEventBus;
    use shared_types::{Address, TodoCall, TodoId};
    use std::collections::HashSet;
    use std::sync::Arc;
    use td_01_record_store::{LedgerConfig, LedgerNode, ManualClock};
    use td_02_record_accessor::{AccessorConfig, InProcessLedger, RecordAccessor};

    const ALICE: Address = Address::repeat(0xa1);
    const BOB: Address = Address::repeat(0xb0);

    #[tokio::test]
    async fn test_one_block_per_processed_transaction() {
        let h = Harness::start();
        assert_eq!(h.node.block_number(), 0);

        let id = h.accessor.create_todo(ALICE, "one").await.unwrap();
        h.accessor.toggle_todo(BOB, id).await.unwrap_err();
        h.accessor.create_todo(ALICE, "").await.unwrap_err();
        h.accessor.delete_todo(ALICE, id).await.unwrap();

        assert_eq!(h.node.block_number(), 4);
        assert!(h.node.verify_journal().is_ok());
        let stats = h.node.stats();
        assert_eq!(stats.transactions_applied, 2);
        assert_eq!(stats.transactions_reverted, 2);
        assert_eq!(stats.notifications_published, 2);
    }

    #[tokio::test]
    async fn test_receipts_carry_distinct_hashes_and_blocks() {
        let h = Harness::start();
        let mut hashes = HashSet::new();
        let mut blocks = Vec::new();

        for (from, content) in [(ALICE, "same"), (ALICE, "same"), (BOB, "same")] {
            let call = TodoCall::CreateTodo {
                content: content.into(),
            };
            let tx_hash = h.accessor.submit(from, &call).await.unwrap();
            let receipt = h.accessor.confirm(tx_hash).await.unwrap();
            hashes.insert(receipt.tx_hash);
            blocks.push(receipt.block_number);
        }

        assert_eq!(hashes.len(), 3);
        assert_eq!(blocks, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_timestamps_follow_the_clock() {
        let clock = Arc::new(ManualClock::new(1_000));
        let node = LedgerNode::start(
            LedgerConfig::default(),
            Arc::new(InMemoryEventBus::new()),
            clock.clone(),
        );
        let accessor = RecordAccessor::new(
            Arc::new(InProcessLedger::new(Arc::clone(&node))),
            AccessorConfig::default(),
        );

        let id = accessor.create_todo(ALICE, "clocked").await.unwrap();
        clock.advance(60);
        accessor.toggle_todo(ALICE, id).await.unwrap();

        let todo = accessor.get_todo(id).await.unwrap();
        assert_eq!(todo.id, TodoId(1));
        assert_eq!(todo.created_at, 1_000);
        assert_eq!(todo.updated_at, 1_060);
        assert!(node.verify_journal().is_ok());
    }

    #[tokio::test]
    async fn test_container_shutdown_keeps_journal_valid() {
        let container = NodeContainer::new(NodeConfig::default());
        for i in 0..5 {
            container
                .accessor
                .create_todo(ALICE, &format!("item {i}"))
                .await
                .unwrap();
        }

        container.node.shutdown().await;

        assert!(!container.node.is_running());
        assert_eq!(container.node.block_number(), 5);
        assert!(container.node.verify_journal().is_ok());
        assert!(container.node.check_invariants().is_empty());
    }
}
