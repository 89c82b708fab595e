use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Post entity - an authored content item belonging to one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub category_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post.
    pub fn new(author_id: Uuid, category_id: Uuid, title: String, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            category_id,
            title,
            content,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check that `user_id` is the author of this post.
    ///
    /// Lookup and authorization are two separate steps: callers first fetch
    /// the post (missing row is `NotFound`), then call this. A mismatch is
    /// `Forbidden`, which the HTTP boundary may still present as a 404.
    pub fn authorize_author(&self, user_id: Uuid) -> Result<(), DomainError> {
        if self.author_id == user_id {
            Ok(())
        } else {
            Err(DomainError::Forbidden)
        }
    }

    /// Apply an edit. Author and creation timestamp are immutable.
    pub fn apply_edit(&mut self, title: String, content: String, category_id: Uuid) {
        self.title = title;
        self.content = content;
        self.category_id = category_id;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_can_edit_own_post() {
        let author = Uuid::new_v4();
        let post = Post::new(author, Uuid::new_v4(), "title".into(), "content".into());

        assert!(post.authorize_author(author).is_ok());
    }

    #[test]
    fn non_author_is_forbidden() {
        let post = Post::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "title".into(),
            "content".into(),
        );

        let result = post.authorize_author(Uuid::new_v4());
        assert!(matches!(result, Err(DomainError::Forbidden)));
    }

    #[test]
    fn apply_edit_keeps_author_and_created_at() {
        let author = Uuid::new_v4();
        let mut post = Post::new(author, Uuid::new_v4(), "old".into(), "old".into());
        let created = post.created_at;
        let new_category = Uuid::new_v4();

        post.apply_edit("new".into(), "new body".into(), new_category);

        assert_eq!(post.author_id, author);
        assert_eq!(post.created_at, created);
        assert_eq!(post.title, "new");
        assert_eq!(post.category_id, new_category);
    }
}
