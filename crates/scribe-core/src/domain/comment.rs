use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Comment entity - visitor feedback attached to a post.
///
/// Comments carry an `active` moderation flag; public reads only return
/// active comments. Toggling the flag is an administrative concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub name: String,
    pub email: String,
    pub body: String,
    pub created_on: DateTime<Utc>,
    pub active: bool,
}

impl Comment {
    /// Create a new comment, active by default.
    pub fn new(post_id: Uuid, name: String, email: String, body: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            name,
            email,
            body,
            created_on: Utc::now(),
            active: true,
        }
    }
}
