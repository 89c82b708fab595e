use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity - an account identified by its email address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub password_hash: String,
    /// Inactive accounts cannot authenticate.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new active user with generated ID and timestamps.
    pub fn new(
        email: String,
        first_name: String,
        last_name: String,
        date_of_birth: Option<NaiveDate>,
        password_hash: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            first_name,
            last_name,
            date_of_birth,
            password_hash,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a profile edit. Password and active flag are untouched.
    pub fn apply_profile(
        &mut self,
        email: String,
        first_name: String,
        last_name: String,
        date_of_birth: Option<NaiveDate>,
    ) {
        self.email = email;
        self.first_name = first_name;
        self.last_name = last_name;
        self.date_of_birth = date_of_birth;
        self.updated_at = Utc::now();
    }
}
