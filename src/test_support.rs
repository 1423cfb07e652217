//! In-memory [`CatalogApi`] fake and sample data for workflow tests.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::api::CatalogApi;
use crate::error::ApiError;
use crate::models::{
    Book, NewBook, NewReadingList, NewReview, ReadingList, ReadingListUpdate,
    RecommendationRequest, Review,
};

const TIMESTAMP: &str = "2024-01-01T00:00:00Z";

pub(crate) fn sample_book(id: &str) -> Book {
    Book {
        id: id.to_string(),
        title: format!("Book {id}"),
        author: "Author".to_string(),
        genre: "fiction".to_string(),
        description: String::new(),
        cover_image: String::new(),
        rating: 4.0,
        published_year: 2020,
        isbn: "0000000000000".to_string(),
    }
}

pub(crate) fn sample_list(id: &str, name: &str, book_ids: &[&str]) -> ReadingList {
    ReadingList {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        book_ids: book_ids.iter().map(|s| s.to_string()).collect(),
        created_at: TIMESTAMP.to_string(),
        updated_at: TIMESTAMP.to_string(),
    }
}

pub(crate) fn sample_review(id: &str, book_id: &str) -> Review {
    Review {
        id: id.to_string(),
        book_id: book_id.to_string(),
        user_id: "u1".to_string(),
        rating: 4,
        comment: "Good".to_string(),
        created_at: TIMESTAMP.to_string(),
    }
}

#[derive(Default)]
struct State {
    books: Vec<Book>,
    lists: Vec<ReadingList>,
    reviews: Vec<Review>,
    calls: Vec<&'static str>,
    next_id: u32,
    fail_reviews: bool,
}

/// A `CatalogApi` over plain vectors, recording which operations were
/// invoked so tests can assert that a rejection made no network call.
#[derive(Default)]
pub(crate) struct InMemoryCatalog {
    state: Mutex<State>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_books(self, books: Vec<Book>) -> Self {
        self.state.lock().unwrap().books = books;
        self
    }

    pub fn with_lists(self, lists: Vec<ReadingList>) -> Self {
        self.state.lock().unwrap().lists = lists;
        self
    }

    pub fn with_reviews(self, reviews: Vec<Review>) -> Self {
        self.state.lock().unwrap().reviews = reviews;
        self
    }

    /// Makes every review lookup fail.
    pub fn failing_reviews(self) -> Self {
        self.state.lock().unwrap().fail_reviews = true;
        self
    }

    /// Swaps the server-side list collection, simulating another editor.
    pub fn replace_lists(&self, lists: Vec<ReadingList>) {
        self.state.lock().unwrap().lists = lists;
    }

    pub fn lists_snapshot(&self) -> Vec<ReadingList> {
        self.state.lock().unwrap().lists.clone()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    fn record(&self, call: &'static str) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl CatalogApi for InMemoryCatalog {
    async fn list_books(&self) -> Result<Vec<Book>, ApiError> {
        self.record("fetch books");
        Ok(self.state.lock().unwrap().books.clone())
    }

    async fn get_book(&self, id: &str) -> Result<Option<Book>, ApiError> {
        if id.is_empty() {
            return Ok(None);
        }
        self.record("fetch book");
        Ok(self
            .state
            .lock()
            .unwrap()
            .books
            .iter()
            .find(|b| b.id == id)
            .cloned())
    }

    async fn create_book(&self, book: &NewBook) -> Result<Book, ApiError> {
        self.record("create book");
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let created = Book {
            id: format!("b{}", state.next_id),
            title: book.title.clone(),
            author: book.author.clone(),
            genre: book.genre.clone(),
            description: book.description.clone(),
            cover_image: book.cover_image.clone(),
            rating: book.rating,
            published_year: book.published_year,
            isbn: book.isbn.clone(),
        };
        state.books.push(created.clone());
        Ok(created)
    }

    async fn update_book(&self, id: &str, book: &NewBook) -> Result<Book, ApiError> {
        self.record("update book");
        let mut state = self.state.lock().unwrap();
        let slot = state
            .books
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| ApiError::Request("update book".to_string()))?;
        slot.title = book.title.clone();
        slot.author = book.author.clone();
        slot.genre = book.genre.clone();
        slot.description = book.description.clone();
        slot.cover_image = book.cover_image.clone();
        slot.rating = book.rating;
        slot.published_year = book.published_year;
        slot.isbn = book.isbn.clone();
        Ok(slot.clone())
    }

    async fn delete_book(&self, id: &str) -> Result<(), ApiError> {
        self.record("delete book");
        self.state.lock().unwrap().books.retain(|b| b.id != id);
        Ok(())
    }

    async fn recommend(&self, _request: &RecommendationRequest) -> Result<Vec<Book>, ApiError> {
        self.record("fetch recommendations");
        Ok(self.state.lock().unwrap().books.clone())
    }

    async fn list_reading_lists(&self) -> Result<Vec<ReadingList>, ApiError> {
        self.record("fetch reading lists");
        Ok(self.state.lock().unwrap().lists.clone())
    }

    async fn create_reading_list(&self, list: &NewReadingList) -> Result<ReadingList, ApiError> {
        self.record("create reading list");
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let created = ReadingList {
            id: format!("rl{}", state.next_id),
            name: list.name.clone(),
            description: list.description.clone(),
            book_ids: Vec::new(),
            created_at: TIMESTAMP.to_string(),
            updated_at: TIMESTAMP.to_string(),
        };
        state.lists.push(created.clone());
        Ok(created)
    }

    async fn update_reading_list(
        &self,
        id: &str,
        update: &ReadingListUpdate,
    ) -> Result<ReadingList, ApiError> {
        self.record("update reading list");
        let mut state = self.state.lock().unwrap();
        let slot = state
            .lists
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| ApiError::Request("update reading list".to_string()))?;
        slot.name = update.name.clone();
        slot.description = update.description.clone();
        slot.book_ids = update.book_ids.clone();
        slot.updated_at = "2024-01-02T00:00:00Z".to_string();
        Ok(slot.clone())
    }

    async fn delete_reading_list(&self, id: &str) -> Result<(), ApiError> {
        self.record("delete reading list");
        self.state.lock().unwrap().lists.retain(|l| l.id != id);
        Ok(())
    }

    async fn list_reviews(&self, book_id: &str) -> Result<Vec<Review>, ApiError> {
        self.record("fetch reviews");
        let state = self.state.lock().unwrap();
        if state.fail_reviews {
            return Err(ApiError::Request("fetch reviews".to_string()));
        }
        Ok(state
            .reviews
            .iter()
            .filter(|r| r.book_id == book_id)
            .cloned()
            .collect())
    }

    async fn create_review(&self, review: &NewReview) -> Result<Review, ApiError> {
        self.record("create review");
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let created = Review {
            id: format!("r{}", state.next_id),
            book_id: review.book_id.clone(),
            user_id: "u1".to_string(),
            rating: review.rating,
            comment: review.comment.clone(),
            created_at: TIMESTAMP.to_string(),
        };
        state.reviews.push(created.clone());
        Ok(created)
    }
}
