//! Typed access to the library-catalog backend.
//!
//! [`CatalogApi`] is the seam the workflow modules are written against;
//! [`HttpCatalogApi`] is the reqwest-backed implementation. Every call is
//! fire-once: no retries, no timeouts, no backoff. Failures collapse into
//! one generic [`ApiError`] per operation; the only status a caller can
//! distinguish is a 404 on a single-book lookup, which is a valid "absent"
//! result rather than an error.

use async_trait::async_trait;
use log::{info, warn};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::fmt::Display;

use crate::error::ApiError;
use crate::models::{
    Book, NewBook, NewReadingList, NewReview, ReadingList, ReadingListUpdate,
    RecommendationRequest, Review,
};

/// One function per resource operation on the catalog backend.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_books(&self) -> Result<Vec<Book>, ApiError>;

    /// Fetches a single book. Returns `Ok(None)` for an empty id (without
    /// issuing a request) and for an HTTP 404, distinguishing "absent" from
    /// "failed".
    async fn get_book(&self, id: &str) -> Result<Option<Book>, ApiError>;

    async fn create_book(&self, book: &NewBook) -> Result<Book, ApiError>;

    async fn update_book(&self, id: &str, book: &NewBook) -> Result<Book, ApiError>;

    async fn delete_book(&self, id: &str) -> Result<(), ApiError>;

    async fn recommend(&self, request: &RecommendationRequest) -> Result<Vec<Book>, ApiError>;

    async fn list_reading_lists(&self) -> Result<Vec<ReadingList>, ApiError>;

    async fn create_reading_list(&self, list: &NewReadingList) -> Result<ReadingList, ApiError>;

    async fn update_reading_list(
        &self,
        id: &str,
        update: &ReadingListUpdate,
    ) -> Result<ReadingList, ApiError>;

    async fn delete_reading_list(&self, id: &str) -> Result<(), ApiError>;

    async fn list_reviews(&self, book_id: &str) -> Result<Vec<Review>, ApiError>;

    async fn create_review(&self, review: &NewReview) -> Result<Review, ApiError>;
}

/// Logs the underlying cause, then collapses it into the generic per-operation
/// error.
fn failure(action: &str, cause: impl Display) -> ApiError {
    warn!("{action}: {cause}");
    ApiError::Request(action.to_string())
}

/// reqwest-backed [`CatalogApi`] over a configured base URL.
pub struct HttpCatalogApi {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpCatalogApi {
    /// Creates a client for the given base URL. When `token` is present it
    /// is attached as a bearer credential on every request; when absent the
    /// Authorization header is silently omitted (some endpoints are
    /// anonymous, the backend decides).
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check(
        &self,
        action: &'static str,
        request: RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        let response = request.send().await.map_err(|e| failure(action, e))?;

        info!("{} {}", response.url(), response.status());
        if !response.status().is_success() {
            return Err(failure(
                action,
                format!("backend returned {}", response.status()),
            ));
        }

        Ok(response)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        action: &'static str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.check(action, request).await?;
        response.json::<T>().await.map_err(|e| failure(action, e))
    }

    async fn send_no_body(
        &self,
        action: &'static str,
        request: RequestBuilder,
    ) -> Result<(), ApiError> {
        self.check(action, request).await.map(|_| ())
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogApi {
    async fn list_books(&self) -> Result<Vec<Book>, ApiError> {
        self.send("fetch books", self.request(Method::GET, "/books"))
            .await
    }

    async fn get_book(&self, id: &str) -> Result<Option<Book>, ApiError> {
        // An empty identifier is "absent" without a round-trip.
        if id.is_empty() {
            return Ok(None);
        }

        let action = "fetch book";
        let response = self
            .request(Method::GET, &format!("/books/{id}"))
            .send()
            .await
            .map_err(|e| failure(action, e))?;

        info!("{} {}", response.url(), response.status());
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(failure(
                action,
                format!("backend returned {}", response.status()),
            ));
        }

        let book = response
            .json::<Book>()
            .await
            .map_err(|e| failure(action, e))?;
        Ok(Some(book))
    }

    async fn create_book(&self, book: &NewBook) -> Result<Book, ApiError> {
        self.send(
            "create book",
            self.request(Method::POST, "/books").json(book),
        )
        .await
    }

    async fn update_book(&self, id: &str, book: &NewBook) -> Result<Book, ApiError> {
        self.send(
            "update book",
            self.request(Method::PUT, &format!("/books/{id}")).json(book),
        )
        .await
    }

    async fn delete_book(&self, id: &str) -> Result<(), ApiError> {
        self.send_no_body(
            "delete book",
            self.request(Method::DELETE, &format!("/books/{id}")),
        )
        .await
    }

    async fn recommend(&self, request: &RecommendationRequest) -> Result<Vec<Book>, ApiError> {
        self.send(
            "fetch recommendations",
            self.request(Method::POST, "/recommendations").json(request),
        )
        .await
    }

    async fn list_reading_lists(&self) -> Result<Vec<ReadingList>, ApiError> {
        self.send(
            "fetch reading lists",
            self.request(Method::GET, "/reading-lists"),
        )
        .await
    }

    async fn create_reading_list(&self, list: &NewReadingList) -> Result<ReadingList, ApiError> {
        self.send(
            "create reading list",
            self.request(Method::POST, "/reading-lists").json(list),
        )
        .await
    }

    async fn update_reading_list(
        &self,
        id: &str,
        update: &ReadingListUpdate,
    ) -> Result<ReadingList, ApiError> {
        self.send(
            "update reading list",
            self.request(Method::PUT, &format!("/reading-lists/{id}"))
                .json(update),
        )
        .await
    }

    async fn delete_reading_list(&self, id: &str) -> Result<(), ApiError> {
        self.send_no_body(
            "delete reading list",
            self.request(Method::DELETE, &format!("/reading-lists/{id}")),
        )
        .await
    }

    async fn list_reviews(&self, book_id: &str) -> Result<Vec<Review>, ApiError> {
        self.send(
            "fetch reviews",
            self.request(Method::GET, &format!("/books/{book_id}/reviews")),
        )
        .await
    }

    async fn create_review(&self, review: &NewReview) -> Result<Review, ApiError> {
        self.send(
            "create review",
            self.request(Method::POST, "/reviews").json(review),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    fn ok_json(body: &str) -> String {
        format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            body.len(),
            body
        )
    }

    fn status_only(status_line: &str) -> String {
        format!("HTTP/1.1 {status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
    }

    fn content_length(head: &str) -> usize {
        head.lines()
            .find_map(|line| {
                let lower = line.to_ascii_lowercase();
                let value = lower.strip_prefix("content-length:")?.trim().parse().ok()?;
                Some(value)
            })
            .unwrap_or(0)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut data = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            data.extend_from_slice(&buf[..n]);

            let text = String::from_utf8_lossy(&data).into_owned();
            if let Some(header_end) = text.find("\r\n\r\n") {
                if data.len() >= header_end + 4 + content_length(&text[..header_end]) {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&data).into_owned()
    }

    /// Serves exactly one connection with a canned response and hands the
    /// raw request text back for assertions.
    async fn one_shot_server(response: String) -> (String, oneshot::Receiver<String>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            let _ = tx.send(request);
        });

        (format!("http://{addr}"), rx)
    }

    #[tokio::test]
    async fn empty_book_id_is_absent_without_a_request() {
        // Port 9 is the discard service; nothing listens there in tests.
        // The call must short-circuit before any connection is attempted.
        let api = HttpCatalogApi::new("http://127.0.0.1:9", None);
        assert!(api.get_book("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_book_is_absent_not_an_error() {
        let (base, _rx) = one_shot_server(status_only("404 Not Found")).await;
        let api = HttpCatalogApi::new(&base, None);
        assert!(api.get_book("404id").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn server_error_on_get_book_is_still_an_error() {
        let (base, _rx) = one_shot_server(status_only("500 Internal Server Error")).await;
        let api = HttpCatalogApi::new(&base, None);
        let err = api.get_book("b1").await.unwrap_err();
        assert_eq!(err.to_string(), "failed to fetch book");
    }

    #[tokio::test]
    async fn backend_failure_collapses_to_one_message() {
        let (base, _rx) = one_shot_server(status_only("503 Service Unavailable")).await;
        let api = HttpCatalogApi::new(&base, None);
        let err = api.list_books().await.unwrap_err();
        assert_eq!(err.to_string(), "failed to fetch books");
    }

    #[tokio::test]
    async fn transport_failure_collapses_to_the_same_message() {
        // Bind then drop, so the port is free and the connection is refused.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = HttpCatalogApi::new(&format!("http://{addr}"), None);
        let err = api.delete_book("b1").await.unwrap_err();
        assert_eq!(err.to_string(), "failed to delete book");
    }

    #[tokio::test]
    async fn bearer_header_attached_when_token_present() {
        let (base, rx) = one_shot_server(ok_json("[]")).await;
        let api = HttpCatalogApi::new(&base, Some("session-token".to_string()));
        api.list_books().await.unwrap();

        let request = rx.await.unwrap().to_ascii_lowercase();
        assert!(request.contains("authorization: bearer session-token"));
    }

    #[tokio::test]
    async fn anonymous_requests_omit_the_header() {
        let (base, rx) = one_shot_server(ok_json("[]")).await;
        let api = HttpCatalogApi::new(&base, None);
        api.list_books().await.unwrap();

        let request = rx.await.unwrap().to_ascii_lowercase();
        assert!(!request.contains("authorization:"));
    }

    #[tokio::test]
    async fn list_books_parses_payload() {
        let body = r#"[{
            "id": "b1",
            "title": "Dune",
            "author": "Frank Herbert",
            "genre": "sci-fi",
            "publishedYear": 1965,
            "isbn": "9780441172719"
        }]"#;
        let (base, _rx) = one_shot_server(ok_json(body)).await;
        let api = HttpCatalogApi::new(&base, None);

        let books = api.list_books().await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Dune");
    }

    #[tokio::test]
    async fn create_reading_list_sends_camel_case_body() {
        let body = r#"{
            "id": "rl1",
            "name": "Summer",
            "bookIds": [],
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }"#;
        let (base, rx) = one_shot_server(ok_json(body)).await;
        let api = HttpCatalogApi::new(&base, None);

        let created = api
            .create_reading_list(&NewReadingList {
                name: "Summer".to_string(),
                description: None,
            })
            .await
            .unwrap();
        assert_eq!(created.id, "rl1");

        let request = rx.await.unwrap();
        assert!(request.starts_with("POST /reading-lists"));
        assert!(request.contains(r#"{"name":"Summer"}"#));
    }

    #[tokio::test]
    async fn undecodable_body_collapses_too() {
        let (base, _rx) = one_shot_server(ok_json("not json")).await;
        let api = HttpCatalogApi::new(&base, None);
        let err = api.list_reading_lists().await.unwrap_err();
        assert_eq!(err.to_string(), "failed to fetch reading lists");
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let api = HttpCatalogApi::new("http://localhost:4000/api/", None);
        assert_eq!(api.base_url, "http://localhost:4000/api");
    }
}
