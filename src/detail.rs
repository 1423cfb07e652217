//! Book detail view and the add-to-list flow.
//!
//! Opening the view fetches the book (an absent book is a non-error
//! "not found" outcome), its reviews, and the user's reading lists, with the
//! first list default-selected. Starting an add re-fetches the lists to
//! catch external changes; confirming applies the duplicate-prevention rules
//! before a single update call and mirrors the result locally.

use log::warn;

use crate::api::CatalogApi;
use crate::error::ApiError;
use crate::models::{Book, ReadingList, ReadingListUpdate, Review};

/// Result of confirming an add. Every rejection is surfaced to the user as
/// a blocking warning; only `Added` touched the network.
#[derive(Debug, PartialEq, Eq)]
pub enum AddOutcome {
    /// The id was appended and the mirror entry replaced with the server's
    /// copy; the picker closed.
    Added,
    /// No list is selected.
    NoSelection,
    /// The selected list is gone from the freshly fetched collection.
    ListMissing,
    /// The book is already in the target list's member set.
    Duplicate,
}

/// State of one book's detail view.
pub struct BookDetail<'a> {
    api: &'a dyn CatalogApi,
    book: Book,
    reviews: Vec<Review>,
    lists: Vec<ReadingList>,
    selected: Option<String>,
    picker_open: bool,
}

impl<'a> BookDetail<'a> {
    /// Loads the view. Returns `Ok(None)` when the book does not exist, the
    /// caller redirects to its not-found rendering.
    pub async fn open(
        api: &'a dyn CatalogApi,
        book_id: &str,
    ) -> Result<Option<BookDetail<'a>>, ApiError> {
        let Some(book) = api.get_book(book_id).await? else {
            return Ok(None);
        };

        // A failed review lookup is not fatal to the page.
        let reviews = match api.list_reviews(&book.id).await {
            Ok(reviews) => reviews,
            Err(e) => {
                warn!("{e}");
                Vec::new()
            }
        };

        let lists = api.list_reading_lists().await?;
        let selected = lists.first().map(|l| l.id.clone());

        Ok(Some(Self {
            api,
            book,
            reviews,
            lists,
            selected,
            picker_open: false,
        }))
    }

    pub fn book(&self) -> &Book {
        &self.book
    }

    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    /// The reading lists as last fetched; the local mirror for this view.
    pub fn lists(&self) -> &[ReadingList] {
        &self.lists
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn picker_open(&self) -> bool {
        self.picker_open
    }

    /// Opens the list picker, re-fetching the collection first so external
    /// changes are visible. The current selection is kept even if its list
    /// vanished; `confirm_add` re-checks it against the fresh collection.
    pub async fn begin_add(&mut self) -> Result<(), ApiError> {
        self.lists = self.api.list_reading_lists().await?;
        self.picker_open = true;
        Ok(())
    }

    pub fn select(&mut self, id: &str) {
        self.selected = Some(id.to_string());
    }

    /// Confirms the add against the selected list.
    pub async fn confirm_add(&mut self) -> Result<AddOutcome, ApiError> {
        let Some(selected) = self.selected.clone() else {
            return Ok(AddOutcome::NoSelection);
        };
        let Some(target) = self.lists.iter().find(|l| l.id == selected) else {
            return Ok(AddOutcome::ListMissing);
        };
        if target.contains_book(&self.book.id) {
            return Ok(AddOutcome::Duplicate);
        }

        let mut book_ids = target.book_ids.clone();
        book_ids.push(self.book.id.clone());

        let updated = self
            .api
            .update_reading_list(
                &selected,
                &ReadingListUpdate {
                    name: target.name.clone(),
                    description: target.description.clone(),
                    book_ids,
                },
            )
            .await?;

        if let Some(slot) = self.lists.iter_mut().find(|l| l.id == updated.id) {
            *slot = updated;
        }
        self.picker_open = false;
        Ok(AddOutcome::Added)
    }
}
