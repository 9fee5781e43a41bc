//! Blog post model and persistence.
//!
//! A post is a title and a body of content. Posts are created once and never
//! updated or deleted; the store assigns each one a strictly increasing id.
//! All operations take a borrowed [`rusqlite::Connection`] so callers decide
//! where the connection comes from (a pool checkout in the server, a bare
//! in-memory connection in tests).

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message returned to clients when a create request lacks a field.
pub const MISSING_FIELDS_MESSAGE: &str = "Title and content are required";

/// Errors that can occur during post operations.
#[derive(Debug, Error)]
pub enum PostError {
    /// The title or content was missing or empty.
    #[error("{}", MISSING_FIELDS_MESSAGE)]
    MissingFields,
    /// The underlying store rejected the read or write.
    #[error("{0}")]
    Database(#[from] rusqlite::Error),
}

impl PostError {
    /// Returns `true` if the error was caused by the caller's input rather
    /// than by the store.
    pub fn is_client_error(&self) -> bool {
        matches!(self, PostError::MissingFields)
    }
}

/// A stored blog post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    /// Store-assigned id.
    pub id: i64,
    /// Post title.
    pub title: String,
    /// Post body.
    pub content: String,
}

/// A post that has passed validation and may be written to the store.
///
/// The only way to obtain one is [`NewPost::new`], so [`create_post`] never
/// sees an empty title or content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    title: String,
    content: String,
}

impl NewPost {
    /// Validates the raw request fields.
    ///
    /// Both fields must be present and non-empty. Whitespace is not trimmed;
    /// `" "` is a valid title.
    ///
    /// # Errors
    ///
    /// Returns `PostError::MissingFields` if either field is absent or empty.
    pub fn new(title: Option<String>, content: Option<String>) -> Result<Self, PostError> {
        match (title, content) {
            (Some(title), Some(content)) if !title.is_empty() && !content.is_empty() => {
                Ok(Self { title, content })
            }
            _ => Err(PostError::MissingFields),
        }
    }

    /// The validated title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The validated content.
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Inserts a post and returns the id the store assigned to it.
///
/// Exactly one row is written on success and none on failure.
pub fn create_post(conn: &Connection, post: &NewPost) -> Result<i64, PostError> {
    conn.execute(
        "INSERT INTO posts (title, content) VALUES (?1, ?2)",
        params![post.title, post.content],
    )?;
    let id = conn.last_insert_rowid();
    tracing::debug!(id, "post created");
    Ok(id)
}

/// Lists every stored post.
///
/// No ordering is imposed; rows come back in whatever order SQLite scans
/// them, which for this table is insertion order.
pub fn list_posts(conn: &Connection) -> Result<Vec<Post>, PostError> {
    let mut stmt = conn.prepare("SELECT id, title, content FROM posts")?;

    let rows = stmt.query_map([], map_row_to_post)?;
    let mut posts = Vec::new();
    for row in rows {
        posts.push(row?);
    }
    Ok(posts)
}

// Legacy databases may hold NULL title/content; they read back as "".
fn map_row_to_post(row: &Row) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        content: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().expect("should open in-memory db");
        conn.execute_batch(
            "CREATE TABLE posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT,
                content TEXT
            );",
        )
        .expect("should create posts table");
        conn
    }

    fn new_post(title: &str, content: &str) -> NewPost {
        NewPost::new(Some(title.to_string()), Some(content.to_string()))
            .expect("post should be valid")
    }

    #[test]
    fn new_post_requires_both_fields() {
        assert!(matches!(
            NewPost::new(None, Some("x".into())),
            Err(PostError::MissingFields)
        ));
        assert!(matches!(
            NewPost::new(Some("x".into()), None),
            Err(PostError::MissingFields)
        ));
        assert!(matches!(
            NewPost::new(Some(String::new()), Some("x".into())),
            Err(PostError::MissingFields)
        ));
        assert!(matches!(
            NewPost::new(Some("x".into()), Some(String::new())),
            Err(PostError::MissingFields)
        ));
        assert!(matches!(NewPost::new(None, None), Err(PostError::MissingFields)));
    }

    #[test]
    fn whitespace_is_not_empty() {
        let post = NewPost::new(Some(" ".into()), Some("\t".into())).expect("should be valid");
        assert_eq!(post.title(), " ");
        assert_eq!(post.content(), "\t");
    }

    #[test]
    fn missing_fields_message_matches_display() {
        assert_eq!(PostError::MissingFields.to_string(), MISSING_FIELDS_MESSAGE);
        assert!(PostError::MissingFields.is_client_error());
    }

    #[test]
    fn list_empty_store() {
        let conn = setup();
        assert!(list_posts(&conn).expect("list should succeed").is_empty());
    }

    #[test]
    fn create_then_list() {
        let conn = setup();
        let id = create_post(&conn, &new_post("Hello", "World")).expect("create should succeed");
        assert_eq!(id, 1);

        let posts = list_posts(&conn).expect("list should succeed");
        assert_eq!(
            posts,
            vec![Post {
                id: 1,
                title: "Hello".into(),
                content: "World".into(),
            }]
        );
    }

    #[test]
    fn ids_strictly_increase_and_keep_insertion_order() {
        let conn = setup();
        let ids: Vec<i64> = (0..5)
            .map(|i| {
                create_post(&conn, &new_post(&format!("t{i}"), &format!("c{i}")))
                    .expect("create should succeed")
            })
            .collect();

        assert!(ids.windows(2).all(|w| w[0] < w[1]), "ids: {ids:?}");

        let listed: Vec<i64> = list_posts(&conn)
            .expect("list should succeed")
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(listed, ids);
    }

    #[test]
    fn null_columns_read_as_empty() {
        let conn = setup();
        conn.execute("INSERT INTO posts (title, content) VALUES (NULL, 'body')", [])
            .expect("should insert legacy row");

        let posts = list_posts(&conn).expect("list should succeed");
        assert_eq!(posts[0].title, "");
        assert_eq!(posts[0].content, "body");
    }

    #[test]
    fn storage_failure_surfaces_sqlite_message() {
        let conn = Connection::open_in_memory().expect("should open in-memory db");

        let err = list_posts(&conn).expect_err("missing table should fail");
        assert!(!err.is_client_error());
        assert!(err.to_string().contains("no such table: posts"), "{err}");

        let err = create_post(&conn, &new_post("a", "b")).expect_err("missing table should fail");
        assert!(err.to_string().contains("no such table: posts"), "{err}");
    }

    #[test]
    fn post_serializes_with_wire_field_names() {
        let post = Post {
            id: 7,
            title: "t".into(),
            content: "c".into(),
        };
        let value = serde_json::to_value(&post).expect("should serialize");
        assert_eq!(
            value,
            serde_json::json!({ "id": 7, "title": "t", "content": "c" })
        );
    }
}
