//! # Demo Scenario
//!
//! Scripted walk through the client flow against a running node: create,
//! toggle, edit and delete for one identity, plus the two faults a user can
//! hit (blank content and touching someone else's record).

use crate::container::NodeContainer;
use anyhow::{bail, Context, Result};
use serde_json::{json, Value};
use shared_types::{Address, TodoError, TodoEvent, TodoId};
use std::time::Duration;
use td_02_record_accessor::AccessorError;
use td_04_view_sync::{SyncError, TodoIntent, TodoView};
use tokio::time::timeout;
use tracing::{info, warn};

/// Hardhat's first development account.
pub const DEMO_IDENTITY: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

/// Hardhat's second development account.
pub const OTHER_IDENTITY: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

/// Run the scripted scenario for `identity` and return the converged view.
pub async fn run_demo(container: &NodeContainer, identity: Address) -> Result<TodoView> {
    let (session, mut errors) = container.session();
    let reporter = tokio::spawn(async move {
        while let Some(err) = errors.recv().await {
            warn!(error = %err, "Listener stopped");
        }
    });

    session
        .connect(identity)
        .await
        .context("connecting demo session")?;

    let mut ids = Vec::new();
    for content in ["Buy groceries", "Write report", "Call mom"] {
        let receipt = session
            .submit(TodoIntent::Create {
                content: content.to_string(),
            })
            .await?;
        let id = receipt
            .created_id()
            .context("create receipt carries no id")?;
        info!(id = %id, block = receipt.block_number, "Created");
        ids.push(id);
    }
    let [groceries, report, call]: [TodoId; 3] = ids
        .try_into()
        .map_err(|_| anyhow::anyhow!("expected three created records"))?;

    match session
        .submit(TodoIntent::Create {
            content: "   ".to_string(),
        })
        .await
    {
        Err(SyncError::Fault(TodoError::InvalidInput)) => {
            info!("Blank content refused before submission")
        }
        other => bail!("blank content was not refused: {other:?}"),
    }

    session.submit(TodoIntent::Toggle { id: groceries }).await?;
    session
        .submit(TodoIntent::Edit {
            id: report,
            content: "Write quarterly report".to_string(),
        })
        .await?;
    session.submit(TodoIntent::Delete { id: call }).await?;

    let other: Address = OTHER_IDENTITY.parse()?;
    match container.accessor.toggle_todo(other, report).await {
        Err(AccessorError::Fault(fault @ TodoError::Unauthorized { .. })) => {
            info!(fault = %fault, "Foreign toggle reverted")
        }
        other => bail!("foreign toggle was not rejected: {other:?}"),
    }

    let mut view = session.view();
    let converged = timeout(
        container.config.confirmation_timeout(),
        view.wait_for(|v| {
            v.todos.len() == 2
                && v.completed_count() == 1
                && v.error().is_none()
                && v.todos.iter().any(|t| t.content == "Write quarterly report")
        }),
    )
    .await
    .context("view did not converge")?
    .map(|v| (*v).clone())
    .context("view channel closed")?;

    session.disconnect();
    drop(session);
    // The reporter ends once the listener's error sender is dropped.
    let _ = timeout(Duration::from_secs(1), reporter).await;

    Ok(converged)
}

/// Readable JSON for a view.
pub fn view_json(view: &TodoView) -> Value {
    json!({
        "identity": view.identity.map(|a| a.to_hex()),
        "status": format!("{:?}", view.status),
        "completed": view.completed_count(),
        "todos": view.todos.iter().map(|t| json!({
            "id": t.id.value(),
            "content": t.content,
            "isCompleted": t.is_completed,
            "owner": t.owner.to_hex(),
            "createdAt": t.created_at,
        })).collect::<Vec<_>>(),
    })
}

/// Readable JSON for a notification.
pub fn event_json(event: &TodoEvent) -> Value {
    json!({
        "kind": event.kind().name(),
        "id": event.id().value(),
        "owner": event.owner().map(|a| a.to_hex()),
        "content": event.content(),
    })
}
