use std::sync::Arc;

use shared::domain::{UserId, UserRecord};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

pub mod store;
pub mod validate;

pub use store::{HttpUserStore, StoreError, UserStore};
pub use validate::ValidationError;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Transient input buffer shared by the create and update flows. Cleared
/// after a successful submit, kept as typed on every failure path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub name: String,
    pub email: String,
}

impl FormState {
    fn clear(&mut self) {
        self.name.clear();
        self.email.clear();
    }
}

/// Synchronous yes/no gate consulted before any remote delete.
pub trait DeletePrompt: Send + Sync {
    fn confirm(&self, record: &UserRecord) -> bool;
}

/// Approves every delete without asking. Suits non-interactive front-ends.
pub struct AutoConfirm;

impl DeletePrompt for AutoConfirm {
    fn confirm(&self, _record: &UserRecord) -> bool {
        true
    }
}

#[derive(Debug, Clone)]
pub enum DirectoryEvent {
    ListLoaded { count: usize },
    RecordCreated(UserRecord),
    RecordUpdated(UserRecord),
    RecordDeleted(UserId),
    ValidationRejected(ValidationError),
    LoadFailed(String),
    CreationFailed(String),
    UpdateFailed(String),
    DeletionFailed(String),
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("failed to load records: {0}")]
    Load(#[source] StoreError),
    #[error("failed to create record: {0}")]
    Creation(#[source] StoreError),
    #[error("failed to update record: {0}")]
    Update(#[source] StoreError),
    #[error("failed to delete record: {0}")]
    Deletion(#[source] StoreError),
    #[error("no record with id {0} in the loaded list")]
    UnknownRecord(i64),
}

/// Owns the record collection, the form, and the edit target, and sequences
/// every store call. Flows are `&mut self`, so a second flow cannot start
/// while one is suspended at the store boundary.
pub struct UserDirectory {
    store: Arc<dyn UserStore>,
    prompt: Arc<dyn DeletePrompt>,
    users: Vec<UserRecord>,
    form: FormState,
    edit_target: Option<UserId>,
    events: broadcast::Sender<DirectoryEvent>,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn UserStore>, prompt: Arc<dyn DeletePrompt>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            prompt,
            users: Vec::new(),
            form: FormState::default(),
            edit_target: None,
            events,
        }
    }

    pub fn users(&self) -> &[UserRecord] {
        &self.users
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    /// `None` means create mode; `Some(id)` means the form edits that record.
    pub fn edit_target(&self) -> Option<UserId> {
        self.edit_target
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.form.name = name.into();
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.form.email = email.into();
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<DirectoryEvent> {
        self.events.subscribe()
    }

    /// Fetches the full record list. Invoked once at startup; every later
    /// change is reconciled locally instead of re-fetched.
    pub async fn load_users(&mut self) -> Result<(), DirectoryError> {
        match self.store.list_all().await {
            Ok(records) => {
                info!(count = records.len(), "directory: record list loaded");
                self.users = records;
                let _ = self.events.send(DirectoryEvent::ListLoaded {
                    count: self.users.len(),
                });
                Ok(())
            }
            Err(err) => {
                warn!("directory: initial load failed: {err}");
                let _ = self
                    .events
                    .send(DirectoryEvent::LoadFailed(err.to_string()));
                Err(DirectoryError::Load(err))
            }
        }
    }

    /// Validates the form, then creates a record. The store is only reached
    /// when every rule passes; a failed create leaves form and list as they
    /// were.
    pub async fn create_user(&mut self) -> Result<(), DirectoryError> {
        if let Err(rule) = validate::check_submission(&self.form) {
            debug!("directory: create rejected: {rule}");
            let _ = self.events.send(DirectoryEvent::ValidationRejected(rule));
            return Err(rule.into());
        }

        match self.store.create(&self.form.name, &self.form.email).await {
            Ok(record) => {
                info!(user_id = record.id.0, "directory: record created");
                self.users.push(record.clone());
                self.form.clear();
                let _ = self.events.send(DirectoryEvent::RecordCreated(record));
                Ok(())
            }
            Err(err) => {
                warn!("directory: create failed: {err}");
                let _ = self
                    .events
                    .send(DirectoryEvent::CreationFailed(err.to_string()));
                Err(DirectoryError::Creation(err))
            }
        }
    }

    /// Enters edit mode for a listed record, copying its current values into
    /// the form. Purely local, no suspension; re-entry on an unchanged record
    /// is idempotent.
    pub fn begin_edit(&mut self, id: UserId) -> Result<(), DirectoryError> {
        let record = self
            .users
            .iter()
            .find(|record| record.id == id)
            .ok_or(DirectoryError::UnknownRecord(id.0))?;
        self.form.name = record.name.clone();
        self.form.email = record.email.clone();
        self.edit_target = Some(id);
        Ok(())
    }

    /// Submits the form against the current edit target; without one this is
    /// a guarded no-op. The raw form is sent as typed — the create rules are
    /// not applied on this path.
    pub async fn update_user(&mut self) -> Result<(), DirectoryError> {
        let Some(id) = self.edit_target else {
            debug!("directory: update ignored without an edit target");
            return Ok(());
        };

        match self
            .store
            .update(id, &self.form.name, &self.form.email)
            .await
        {
            Ok(updated) => {
                info!(user_id = updated.id.0, "directory: record updated");
                if let Some(slot) = self.users.iter_mut().find(|record| record.id == updated.id) {
                    *slot = updated.clone();
                }
                self.form.clear();
                self.edit_target = None;
                let _ = self.events.send(DirectoryEvent::RecordUpdated(updated));
                Ok(())
            }
            Err(err) => {
                warn!(user_id = id.0, "directory: update failed: {err}");
                let _ = self
                    .events
                    .send(DirectoryEvent::UpdateFailed(err.to_string()));
                Err(DirectoryError::Update(err))
            }
        }
    }

    /// Deletes a listed record once the prompt approves. A declined prompt
    /// never reaches the store.
    pub async fn delete_user(&mut self, id: UserId) -> Result<(), DirectoryError> {
        let record = self
            .users
            .iter()
            .find(|record| record.id == id)
            .ok_or(DirectoryError::UnknownRecord(id.0))?;

        if !self.prompt.confirm(record) {
            debug!(user_id = id.0, "directory: delete declined");
            return Ok(());
        }

        match self.store.delete(id).await {
            Ok(()) => {
                info!(user_id = id.0, "directory: record deleted");
                self.users.retain(|record| record.id != id);
                let _ = self.events.send(DirectoryEvent::RecordDeleted(id));
                Ok(())
            }
            Err(err) => {
                warn!(user_id = id.0, "directory: delete failed: {err}");
                let _ = self
                    .events
                    .send(DirectoryEvent::DeletionFailed(err.to_string()));
                Err(DirectoryError::Deletion(err))
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
