//! # Record Store
//!
//! Canonical record state: the primary `id -> Todo` map, the secondary
//! `owner -> ids` index and the id counter. Every mutation returns the
//! notification it emits; a failed mutation changes nothing and emits
//! nothing.

use super::invariants::{authorize, validate_content, InvariantViolation};
use shared_types::{Address, Timestamp, Todo, TodoCall, TodoError, TodoEvent, TodoId};
use std::collections::{BTreeSet, HashMap};

/// Record map plus owner index.
#[derive(Debug, Clone)]
pub struct RecordStore {
    /// Primary map.
    records: HashMap<TodoId, Todo>,
    /// Ids per owner; ascending id order is creation order.
    owner_index: HashMap<Address, BTreeSet<TodoId>>,
    /// Next id to assign. Never decreases.
    next_id: TodoId,
}

impl RecordStore {
    /// Create an empty store. The first record gets `TodoId::FIRST`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
            owner_index: HashMap::new(),
            next_id: TodoId::FIRST,
        }
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Create a record owned by `caller`.
    pub fn create(
        &mut self,
        caller: Address,
        content: String,
        now: Timestamp,
    ) -> Result<(TodoId, TodoEvent), TodoError> {
        validate_content(&content)?;

        let id = self.next_id;
        self.next_id = id.next();

        let event = TodoEvent::Created {
            id,
            owner: caller,
            content: content.clone(),
        };
        self.records.insert(
            id,
            Todo {
                id,
                owner: caller,
                content,
                is_completed: false,
                created_at: now,
                updated_at: now,
            },
        );
        self.owner_index.entry(caller).or_default().insert(id);

        Ok((id, event))
    }

    /// Replace a record's content.
    ///
    /// Faults are checked in the order `NotFound`, `Unauthorized`,
    /// `InvalidInput`.
    pub fn edit(
        &mut self,
        caller: Address,
        id: TodoId,
        content: String,
        now: Timestamp,
    ) -> Result<TodoEvent, TodoError> {
        let todo = self.owned_mut(caller, id)?;
        validate_content(&content)?;

        todo.content = content;
        todo.updated_at = now;
        Ok(TodoEvent::Updated { id })
    }

    /// Invert a record's completion flag.
    pub fn toggle(
        &mut self,
        caller: Address,
        id: TodoId,
        now: Timestamp,
    ) -> Result<TodoEvent, TodoError> {
        let todo = self.owned_mut(caller, id)?;

        todo.is_completed = !todo.is_completed;
        todo.updated_at = now;
        Ok(TodoEvent::Toggled { id })
    }

    /// Remove a record. Its id is never reassigned.
    pub fn delete(&mut self, caller: Address, id: TodoId) -> Result<TodoEvent, TodoError> {
        self.owned_mut(caller, id)?;

        self.records.remove(&id);
        if let Some(ids) = self.owner_index.get_mut(&caller) {
            ids.remove(&id);
            if ids.is_empty() {
                self.owner_index.remove(&caller);
            }
        }
        Ok(TodoEvent::Deleted { id })
    }

    /// Dispatch a decoded call on behalf of `caller`.
    pub fn apply(
        &mut self,
        caller: Address,
        call: &TodoCall,
        now: Timestamp,
    ) -> Result<TodoEvent, TodoError> {
        match call {
            TodoCall::CreateTodo { content } => {
                self.create(caller, content.clone(), now).map(|(_, e)| e)
            }
            TodoCall::UpdateTodo { id, content } => self.edit(caller, *id, content.clone(), now),
            TodoCall::ToggleTodo { id } => self.toggle(caller, *id, now),
            TodoCall::DeleteTodo { id } => self.delete(caller, *id),
        }
    }

    fn owned_mut(&mut self, caller: Address, id: TodoId) -> Result<&mut Todo, TodoError> {
        let todo = self
            .records
            .get_mut(&id)
            .ok_or(TodoError::NotFound { id })?;
        authorize(todo, &caller)?;
        Ok(todo)
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// Fetch a record. Deleted and never-created ids are indistinguishable.
    pub fn get(&self, id: TodoId) -> Result<Todo, TodoError> {
        self.records
            .get(&id)
            .cloned()
            .ok_or(TodoError::NotFound { id })
    }

    /// Every record owned by `owner`, in creation order.
    #[must_use]
    pub fn list_by_owner(&self, owner: &Address) -> Vec<Todo> {
        self.owner_index
            .get(owner)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.records.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of live records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no record exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The id the next `create` will assign.
    #[must_use]
    pub fn next_id(&self) -> TodoId {
        self.next_id
    }

    // =========================================================================
    // AUDIT
    // =========================================================================

    /// Check INVARIANT-1, -4, -5 and -6 over the whole state.
    ///
    /// Returns every violation found; empty means consistent.
    #[must_use]
    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();

        for (key, todo) in &self.records {
            if *key != todo.id {
                violations.push(InvariantViolation::KeyMismatch {
                    key: *key,
                    id: todo.id,
                });
            }
            if todo.id >= self.next_id {
                violations.push(InvariantViolation::IdNotIssued {
                    id: todo.id,
                    next: self.next_id,
                });
            }
            if todo.updated_at < todo.created_at {
                violations.push(InvariantViolation::TimestampOrder { id: todo.id });
            }
            if todo.content.is_empty() {
                violations.push(InvariantViolation::EmptyContent { id: todo.id });
            }
            let indexed = self
                .owner_index
                .get(&todo.owner)
                .is_some_and(|ids| ids.contains(key));
            if !indexed {
                violations.push(InvariantViolation::MissingFromIndex {
                    id: *key,
                    owner: todo.owner,
                });
            }
        }

        for (owner, ids) in &self.owner_index {
            for id in ids {
                let owned = self.records.get(id).is_some_and(|t| t.owner == *owner);
                if !owned {
                    violations.push(InvariantViolation::DanglingIndexEntry {
                        id: *id,
                        owner: *owner,
                    });
                }
            }
        }

        violations
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}
