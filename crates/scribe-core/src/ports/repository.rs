use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Category, Comment, Paginated, Post, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
///
/// IDs are assigned by the domain layer, so create and edit are distinct
/// operations: `insert` fails on an existing row, `update` on a missing one.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Persist changes to an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}

/// Category repository.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    /// All categories, name ascending, for the listing filter.
    async fn list_all(&self) -> Result<Vec<Category>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// All posts by one author, newest first.
    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError>;

    /// One page of posts, newest first, optionally filtered to a category.
    ///
    /// `page` is 1-based and clamped to the valid range; an unknown
    /// category yields an empty page rather than an error.
    async fn list_recent(
        &self,
        category_id: Option<Uuid>,
        page: u64,
    ) -> Result<Paginated<Post>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Active comments on a post, oldest first.
    async fn list_active_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;
}
