//! Wire-format data model for the library-catalog backend.
//!
//! The backend speaks camelCase JSON; each type here mirrors one resource
//! payload. Identity types (`User`, `Role`) are never fetched from the
//! backend, they are derived from the decoded session token.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A catalog entry. Owned by the backend and cached transiently by views;
/// immutable from the client's perspective except through explicit update
/// calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub genre: String,
    #[serde(default)]
    pub description: String,
    /// Reference to the cover image (URL or backend asset key).
    #[serde(default)]
    pub cover_image: String,
    #[serde(default)]
    pub rating: f32,
    pub published_year: u16,
    pub isbn: String,
}

/// Payload for creating or replacing a catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub genre: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cover_image: String,
    #[serde(default)]
    pub rating: f32,
    pub published_year: u16,
    pub isbn: String,
}

/// A named, user-owned collection of book identifiers.
///
/// `book_ids` is an unordered member set; a given id appears at most once,
/// enforced client-side before submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingList {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub book_ids: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl ReadingList {
    /// Membership test for the list's book-identifier set (string compare).
    pub fn contains_book(&self, book_id: &str) -> bool {
        self.book_ids.iter().any(|id| id == book_id)
    }
}

/// Payload for creating a reading list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReadingList {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Payload for replacing a reading list's mutable fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingListUpdate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub book_ids: Vec<String>,
}

/// A reader's review of a single book.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub book_id: String,
    pub user_id: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    pub created_at: String,
}

/// Payload for posting a review. The backend attributes it to the bearer of
/// the request token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub book_id: String,
    pub rating: u8,
    pub comment: String,
}

/// Input for the recommendations endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub favorite_book_ids: Vec<String>,
}

/// Role asserted by the identity token's group membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::User => write!(f, "user"),
        }
    }
}

/// The identity asserted by a decoded session token. Not persisted by this
/// client or the backend.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_set_check() {
        let list = ReadingList {
            id: "1".to_string(),
            name: "Favourites".to_string(),
            description: None,
            book_ids: vec!["b1".to_string(), "b2".to_string()],
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        };

        assert!(list.contains_book("b1"));
        assert!(!list.contains_book("b3"));
        // Membership is an exact string compare, not a prefix match.
        assert!(!list.contains_book("b"));
    }

    #[test]
    fn test_reading_list_wire_format() {
        let json = r#"{
            "id": "1",
            "name": "Summer",
            "bookIds": ["b1"],
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-02T00:00:00Z"
        }"#;

        let list: ReadingList = serde_json::from_str(json).unwrap();
        assert_eq!(list.book_ids, vec!["b1".to_string()]);
        assert_eq!(list.description, None);
        assert_eq!(list.updated_at, "2024-01-02T00:00:00Z");
    }

    #[test]
    fn test_new_list_omits_missing_description() {
        let payload = NewReadingList {
            name: "Summer".to_string(),
            description: None,
        };

        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"name":"Summer"}"#);
    }

    #[test]
    fn test_recommendation_request_wire_format() {
        let request = RecommendationRequest {
            genres: vec!["mystery".to_string()],
            favorite_book_ids: vec!["b9".to_string()],
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"favoriteBookIds\":[\"b9\"]"));
    }

    #[test]
    fn test_book_wire_format() {
        let json = r#"{
            "id": "b1",
            "title": "Dune",
            "author": "Frank Herbert",
            "genre": "sci-fi",
            "coverImage": "covers/dune.jpg",
            "rating": 4.5,
            "publishedYear": 1965,
            "isbn": "9780441172719"
        }"#;

        let book: Book = serde_json::from_str(json).unwrap();
        assert_eq!(book.cover_image, "covers/dune.jpg");
        assert_eq!(book.published_year, 1965);
        assert_eq!(book.description, "");
    }
}
