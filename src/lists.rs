//! Reading-list management workflow.
//!
//! [`ListManager`] holds an in-memory mirror of the server-side list
//! collection plus an explicit modal state. The mirror is the single source
//! of truth for rendering until the next full [`reload`](ListManager::reload):
//! each successful server call mutates it optimistically (append on create,
//! replace-by-id on update, remove-by-id on delete). Last local write wins;
//! concurrent edits are not reconciled.
//!
//! Transitions happen only on explicit calls. Submitting with a blank name
//! performs no network call at all; the caller raises the blocking warning
//! and the modal stays open.

use crate::api::CatalogApi;
use crate::error::ApiError;
use crate::models::{NewReadingList, ReadingList, ReadingListUpdate};

/// Form fields of the create/edit modal. An empty description is treated as
/// "none" on submission.
#[derive(Debug, Clone, Default)]
pub struct ListDraft {
    pub name: String,
    pub description: String,
}

impl ListDraft {
    fn from_list(list: &ReadingList) -> Self {
        Self {
            name: list.name.clone(),
            description: list.description.clone().unwrap_or_default(),
        }
    }
}

/// The manager's modal state.
#[derive(Debug)]
pub enum Modal {
    Closed,
    Creating(ListDraft),
    Editing { id: String, draft: ListDraft },
}

/// Result of a submit attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The server call succeeded, the mirror was updated, the modal closed.
    Saved,
    /// Name was empty after trimming; nothing was sent, the modal stays open.
    EmptyName,
    /// No modal was open.
    NoModal,
}

/// Result of a delete attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NoModal,
}

/// Create/edit/delete workflow over the user's reading lists.
pub struct ListManager<'a> {
    api: &'a dyn CatalogApi,
    lists: Vec<ReadingList>,
    modal: Modal,
}

impl<'a> ListManager<'a> {
    pub fn new(api: &'a dyn CatalogApi) -> Self {
        Self {
            api,
            lists: Vec::new(),
            modal: Modal::Closed,
        }
    }

    /// Replaces the mirror with a full re-fetch.
    pub async fn reload(&mut self) -> Result<(), ApiError> {
        self.lists = self.api.list_reading_lists().await?;
        Ok(())
    }

    /// The in-memory mirror, in display order.
    pub fn lists(&self) -> &[ReadingList] {
        &self.lists
    }

    pub fn modal(&self) -> &Modal {
        &self.modal
    }

    /// The open modal's form fields, if any.
    pub fn draft(&self) -> Option<&ListDraft> {
        match &self.modal {
            Modal::Closed => None,
            Modal::Creating(draft) => Some(draft),
            Modal::Editing { draft, .. } => Some(draft),
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut ListDraft> {
        match &mut self.modal {
            Modal::Closed => None,
            Modal::Creating(draft) => Some(draft),
            Modal::Editing { draft, .. } => Some(draft),
        }
    }

    /// Opens the create modal with blank fields.
    pub fn open_create(&mut self) {
        self.modal = Modal::Creating(ListDraft::default());
    }

    /// Opens the edit modal pre-filled from the mirror entry with the given
    /// id. Returns false when the id is not in the mirror.
    pub fn open_edit(&mut self, id: &str) -> bool {
        let Some(list) = self.lists.iter().find(|l| l.id == id) else {
            return false;
        };
        self.modal = Modal::Editing {
            id: list.id.clone(),
            draft: ListDraft::from_list(list),
        };
        true
    }

    /// Closes the modal without saving.
    pub fn cancel(&mut self) {
        self.modal = Modal::Closed;
    }

    /// Submits the open modal.
    ///
    /// Validation happens before any network call; a server failure leaves
    /// the modal open so the user can retry or cancel.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, ApiError> {
        let (id, draft) = match &self.modal {
            Modal::Closed => return Ok(SubmitOutcome::NoModal),
            Modal::Creating(draft) => (None, draft.clone()),
            Modal::Editing { id, draft } => (Some(id.clone()), draft.clone()),
        };

        let name = draft.name.trim();
        if name.is_empty() {
            return Ok(SubmitOutcome::EmptyName);
        }
        let description = match draft.description.trim() {
            "" => None,
            d => Some(d.to_string()),
        };

        match id {
            None => {
                let created = self
                    .api
                    .create_reading_list(&NewReadingList {
                        name: name.to_string(),
                        description,
                    })
                    .await?;
                self.lists.push(created);
            }
            Some(id) => {
                // The member set is not part of the form; carry it over.
                let book_ids = self
                    .lists
                    .iter()
                    .find(|l| l.id == id)
                    .map(|l| l.book_ids.clone())
                    .unwrap_or_default();

                let updated = self
                    .api
                    .update_reading_list(
                        &id,
                        &ReadingListUpdate {
                            name: name.to_string(),
                            description,
                            book_ids,
                        },
                    )
                    .await?;
                if let Some(slot) = self.lists.iter_mut().find(|l| l.id == updated.id) {
                    *slot = updated;
                }
            }
        }

        self.modal = Modal::Closed;
        Ok(SubmitOutcome::Saved)
    }

    /// Deletes the list the edit modal is open for. The caller is expected
    /// to have confirmed first.
    pub async fn delete_open(&mut self) -> Result<DeleteOutcome, ApiError> {
        let Modal::Editing { id, .. } = &self.modal else {
            return Ok(DeleteOutcome::NoModal);
        };
        let id = id.clone();

        self.api.delete_reading_list(&id).await?;
        self.lists.retain(|l| l.id != id);
        self.modal = Modal::Closed;
        Ok(DeleteOutcome::Deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_list, InMemoryCatalog};

    #[tokio::test]
    async fn create_appends_to_mirror_and_closes_modal() {
        let api = InMemoryCatalog::new();
        let mut manager = ListManager::new(&api);
        manager.reload().await.unwrap();

        manager.open_create();
        let draft = manager.draft_mut().unwrap();
        draft.name = "Summer".to_string();
        draft.description = "Beach reads".to_string();

        assert_eq!(manager.submit().await.unwrap(), SubmitOutcome::Saved);
        assert!(matches!(manager.modal(), Modal::Closed));
        assert_eq!(manager.lists().len(), 1);
        assert_eq!(manager.lists()[0].name, "Summer");
        assert_eq!(manager.lists()[0].description.as_deref(), Some("Beach reads"));
    }

    #[tokio::test]
    async fn blank_name_submits_nothing_and_keeps_modal_open() {
        let api = InMemoryCatalog::new();
        let mut manager = ListManager::new(&api);

        manager.open_create();
        manager.draft_mut().unwrap().name = "   ".to_string();

        assert_eq!(manager.submit().await.unwrap(), SubmitOutcome::EmptyName);
        assert!(matches!(manager.modal(), Modal::Creating(_)));
        // No network call was attempted.
        assert!(!api.calls().contains(&"create reading list"));
        assert!(manager.lists().is_empty());
    }

    #[tokio::test]
    async fn edit_renames_only_the_matching_entry() {
        let api = InMemoryCatalog::new().with_lists(vec![
            sample_list("1", "A", &[]),
            sample_list("2", "Keep", &["b1"]),
        ]);
        let mut manager = ListManager::new(&api);
        manager.reload().await.unwrap();

        assert!(manager.open_edit("1"));
        // The modal is pre-filled from the current fields.
        assert_eq!(manager.draft().unwrap().name, "A");

        manager.draft_mut().unwrap().name = "B".to_string();
        assert_eq!(manager.submit().await.unwrap(), SubmitOutcome::Saved);

        assert_eq!(manager.lists()[0].name, "B");
        assert_eq!(manager.lists()[1].name, "Keep");
        assert_eq!(manager.lists()[1].book_ids, vec!["b1".to_string()]);
        assert!(matches!(manager.modal(), Modal::Closed));
    }

    #[tokio::test]
    async fn edit_preserves_the_member_set() {
        let api = InMemoryCatalog::new().with_lists(vec![sample_list("1", "A", &["b1", "b2"])]);
        let mut manager = ListManager::new(&api);
        manager.reload().await.unwrap();

        manager.open_edit("1");
        manager.draft_mut().unwrap().name = "Renamed".to_string();
        manager.submit().await.unwrap();

        assert_eq!(
            manager.lists()[0].book_ids,
            vec!["b1".to_string(), "b2".to_string()]
        );
    }

    #[tokio::test]
    async fn delete_removes_matching_entry_and_closes_modal() {
        let api = InMemoryCatalog::new().with_lists(vec![
            sample_list("1", "A", &[]),
            sample_list("2", "B", &[]),
        ]);
        let mut manager = ListManager::new(&api);
        manager.reload().await.unwrap();

        manager.open_edit("1");
        assert_eq!(manager.delete_open().await.unwrap(), DeleteOutcome::Deleted);

        assert_eq!(manager.lists().len(), 1);
        assert_eq!(manager.lists()[0].id, "2");
        assert!(matches!(manager.modal(), Modal::Closed));
    }

    #[tokio::test]
    async fn delete_without_edit_modal_is_a_no_op() {
        let api = InMemoryCatalog::new().with_lists(vec![sample_list("1", "A", &[])]);
        let mut manager = ListManager::new(&api);
        manager.reload().await.unwrap();

        assert_eq!(manager.delete_open().await.unwrap(), DeleteOutcome::NoModal);
        assert_eq!(manager.lists().len(), 1);
        assert!(!api.calls().contains(&"delete reading list"));
    }

    #[tokio::test]
    async fn open_edit_of_unknown_id_is_rejected() {
        let api = InMemoryCatalog::new();
        let mut manager = ListManager::new(&api);

        assert!(!manager.open_edit("ghost"));
        assert!(matches!(manager.modal(), Modal::Closed));
    }

    #[tokio::test]
    async fn cancel_closes_without_saving() {
        let api = InMemoryCatalog::new();
        let mut manager = ListManager::new(&api);

        manager.open_create();
        manager.draft_mut().unwrap().name = "Draft".to_string();
        manager.cancel();

        assert!(matches!(manager.modal(), Modal::Closed));
        assert!(!api.calls().contains(&"create reading list"));
    }

    #[tokio::test]
    async fn reload_replaces_the_mirror() {
        let api = InMemoryCatalog::new().with_lists(vec![sample_list("1", "A", &[])]);
        let mut manager = ListManager::new(&api);
        manager.reload().await.unwrap();
        assert_eq!(manager.lists().len(), 1);

        api.replace_lists(vec![sample_list("2", "B", &[]), sample_list("3", "C", &[])]);
        manager.reload().await.unwrap();
        assert_eq!(manager.lists().len(), 2);
        assert_eq!(manager.lists()[0].id, "2");
    }
}
