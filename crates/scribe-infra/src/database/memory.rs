//! In-memory repository implementations.
//!
//! Used as the fallback when no database is configured, and as the store
//! behind handler-level tests. All four repositories share one
//! `InMemoryStore` so cross-entity behavior (the comment cascade on post
//! delete) matches what the relational schema enforces.
//! Note: data is lost on process restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use scribe_core::domain::{Category, Comment, POSTS_PER_PAGE, Paginated, Post, User, clamp_page};
use scribe_core::error::RepoError;
use scribe_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, PostRepository, UserRepository,
};

/// Shared backing store for the in-memory repositories.
#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    categories: RwLock<HashMap<Uuid, Category>>,
    posts: RwLock<HashMap<Uuid, Post>>,
    comments: RwLock<HashMap<Uuid, Comment>>,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

/// In-memory user repository.
pub struct InMemoryUserRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryUserRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.users.read().await.get(&id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut users = self.store.users.write().await;
        if users.contains_key(&user.id) || users.values().any(|u| u.email == user.email) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut users = self.store.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(RepoError::NotFound);
        }
        if users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut users = self.store.users.write().await;
        users.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let users = self.store.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }
}

/// In-memory category repository.
pub struct InMemoryCategoryRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryCategoryRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BaseRepository<Category, Uuid> for InMemoryCategoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(self.store.categories.read().await.get(&id).cloned())
    }

    async fn insert(&self, category: Category) -> Result<Category, RepoError> {
        let mut categories = self.store.categories.write().await;
        if categories.contains_key(&category.id)
            || categories.values().any(|c| c.name == category.name)
        {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update(&self, category: Category) -> Result<Category, RepoError> {
        let mut categories = self.store.categories.write().await;
        if !categories.contains_key(&category.id) {
            return Err(RepoError::NotFound);
        }
        categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut categories = self.store.categories.write().await;
        categories
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn list_all(&self) -> Result<Vec<Category>, RepoError> {
        let categories = self.store.categories.read().await;
        let mut all: Vec<Category> = categories.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }
}

/// In-memory post repository.
pub struct InMemoryPostRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryPostRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.posts.read().await.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        // Referential integrity the schema would enforce.
        if !self
            .store
            .categories
            .read()
            .await
            .contains_key(&post.category_id)
        {
            return Err(RepoError::Constraint("Unknown category".to_string()));
        }
        if !self.store.users.read().await.contains_key(&post.author_id) {
            return Err(RepoError::Constraint("Unknown author".to_string()));
        }
        let mut posts = self.store.posts.write().await;
        if posts.contains_key(&post.id) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut posts = self.store.posts.write().await;
        if !posts.contains_key(&post.id) {
            return Err(RepoError::NotFound);
        }
        posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut posts = self.store.posts.write().await;
        posts.remove(&id).ok_or(RepoError::NotFound)?;

        // Cascade, as the comments.post_id foreign key does in Postgres.
        let mut comments = self.store.comments.write().await;
        comments.retain(|_, c| c.post_id != id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let posts = self.store.posts.read().await;
        let mut authored: Vec<Post> = posts
            .values()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect();
        authored.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(authored)
    }

    async fn list_recent(
        &self,
        category_id: Option<Uuid>,
        page: u64,
    ) -> Result<Paginated<Post>, RepoError> {
        let posts = self.store.posts.read().await;
        let mut matching: Vec<Post> = posts
            .values()
            .filter(|p| category_id.is_none_or(|c| p.category_id == c))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total_items = matching.len() as u64;
        let total_pages = total_items.div_ceil(POSTS_PER_PAGE);
        let page = clamp_page(page, total_pages);

        let start = ((page - 1) * POSTS_PER_PAGE) as usize;
        let items: Vec<Post> = matching
            .into_iter()
            .skip(start)
            .take(POSTS_PER_PAGE as usize)
            .collect();

        Ok(Paginated {
            items,
            page,
            page_size: POSTS_PER_PAGE,
            total_items,
            total_pages,
        })
    }
}

/// In-memory comment repository.
pub struct InMemoryCommentRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryCommentRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryCommentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.store.comments.read().await.get(&id).cloned())
    }

    async fn insert(&self, comment: Comment) -> Result<Comment, RepoError> {
        if !self.store.posts.read().await.contains_key(&comment.post_id) {
            return Err(RepoError::Constraint("Unknown post".to_string()));
        }
        let mut comments = self.store.comments.write().await;
        if comments.contains_key(&comment.id) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut comments = self.store.comments.write().await;
        if !comments.contains_key(&comment.id) {
            return Err(RepoError::NotFound);
        }
        comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut comments = self.store.comments.write().await;
        comments.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn list_active_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let comments = self.store.comments.read().await;
        let mut active: Vec<Comment> = comments
            .values()
            .filter(|c| c.post_id == post_id && c.active)
            .cloned()
            .collect();
        active.sort_by(|a, b| a.created_on.cmp(&b.created_on));
        Ok(active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    async fn seed_user(store: &Arc<InMemoryStore>) -> User {
        let repo = InMemoryUserRepository::new(store.clone());
        let user = User::new(
            "testuser@example.com".into(),
            "Test".into(),
            "User".into(),
            None,
            "hash".into(),
        );
        repo.insert(user).await.unwrap()
    }

    async fn seed_category(store: &Arc<InMemoryStore>, name: &str) -> Category {
        let repo = InMemoryCategoryRepository::new(store.clone());
        repo.insert(Category::new(name.into())).await.unwrap()
    }

    /// A post whose created_at is shifted so ordering is deterministic.
    async fn seed_post(
        store: &Arc<InMemoryStore>,
        author: &User,
        category: &Category,
        title: &str,
        age_minutes: i64,
    ) -> Post {
        let repo = InMemoryPostRepository::new(store.clone());
        let mut post = Post::new(author.id, category.id, title.into(), "Test Content".into());
        post.created_at = Utc::now() - Duration::minutes(age_minutes);
        repo.insert(post).await.unwrap()
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = InMemoryStore::new();
        let repo = InMemoryUserRepository::new(store.clone());
        seed_user(&store).await;

        let dup = User::new(
            "testuser@example.com".into(),
            "Other".into(),
            "User".into(),
            None,
            "hash".into(),
        );
        assert!(matches!(
            repo.insert(dup).await,
            Err(RepoError::Constraint(_))
        ));
    }

    #[tokio::test]
    async fn list_recent_orders_newest_first_and_pages_by_five() {
        let store = InMemoryStore::new();
        let user = seed_user(&store).await;
        let category = seed_category(&store, "Test Category").await;
        for i in 0..7 {
            seed_post(&store, &user, &category, &format!("Post {i}"), i).await;
        }

        let repo = InMemoryPostRepository::new(store.clone());
        let first = repo.list_recent(None, 1).await.unwrap();
        assert_eq!(first.total_items, 7);
        assert_eq!(first.total_pages, 2);
        assert_eq!(first.items.len(), 5);
        assert_eq!(first.items[0].title, "Post 0");
        assert!(first.has_next());

        let second = repo.list_recent(None, 2).await.unwrap();
        assert_eq!(second.items.len(), 2);
        assert_eq!(second.items[0].title, "Post 5");
    }

    #[tokio::test]
    async fn list_recent_clamps_out_of_range_pages() {
        let store = InMemoryStore::new();
        let user = seed_user(&store).await;
        let category = seed_category(&store, "Test Category").await;
        for i in 0..6 {
            seed_post(&store, &user, &category, &format!("Post {i}"), i).await;
        }

        let repo = InMemoryPostRepository::new(store.clone());
        let clamped = repo.list_recent(None, 99).await.unwrap();
        assert_eq!(clamped.page, 2);
        assert_eq!(clamped.items.len(), 1);
    }

    #[tokio::test]
    async fn list_recent_filters_by_category() {
        let store = InMemoryStore::new();
        let user = seed_user(&store).await;
        let rust = seed_category(&store, "Rust").await;
        let other = seed_category(&store, "Other").await;
        seed_post(&store, &user, &rust, "Rust post", 1).await;
        seed_post(&store, &user, &other, "Other post", 2).await;

        let repo = InMemoryPostRepository::new(store.clone());
        let filtered = repo.list_recent(Some(rust.id), 1).await.unwrap();
        assert_eq!(filtered.items.len(), 1);
        assert_eq!(filtered.items[0].title, "Rust post");

        // Unknown category id: empty page, not an error.
        let unknown = repo.list_recent(Some(Uuid::new_v4()), 1).await.unwrap();
        assert!(unknown.items.is_empty());
        assert_eq!(unknown.page, 1);
    }

    #[tokio::test]
    async fn deleting_a_post_cascades_to_its_comments() {
        let store = InMemoryStore::new();
        let user = seed_user(&store).await;
        let category = seed_category(&store, "Test Category").await;
        let post = seed_post(&store, &user, &category, "Test Title", 1).await;

        let comments = InMemoryCommentRepository::new(store.clone());
        let comment = comments
            .insert(Comment::new(
                post.id,
                "Commenter".into(),
                "commenter@example.com".into(),
                "Test Comment".into(),
            ))
            .await
            .unwrap();

        let posts = InMemoryPostRepository::new(store.clone());
        posts.delete(post.id).await.unwrap();

        assert!(comments.find_by_id(comment.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn inactive_comments_are_excluded_and_order_is_oldest_first() {
        let store = InMemoryStore::new();
        let user = seed_user(&store).await;
        let category = seed_category(&store, "Test Category").await;
        let post = seed_post(&store, &user, &category, "Test Title", 1).await;

        let repo = InMemoryCommentRepository::new(store.clone());
        let mut first = Comment::new(
            post.id,
            "Commenter".into(),
            "commenter@example.com".into(),
            "first".into(),
        );
        first.created_on = Utc::now() - Duration::minutes(10);
        repo.insert(first).await.unwrap();

        let mut hidden = Comment::new(
            post.id,
            "Spammer".into(),
            "spam@example.com".into(),
            "spam".into(),
        );
        hidden.created_on = Utc::now() - Duration::minutes(5);
        hidden.active = false;
        repo.insert(hidden).await.unwrap();

        let second = Comment::new(
            post.id,
            "Commenter".into(),
            "commenter@example.com".into(),
            "second".into(),
        );
        repo.insert(second).await.unwrap();

        let visible = repo.list_active_for_post(post.id).await.unwrap();
        let bodies: Vec<&str> = visible.iter().map(|c| c.body.as_str()).collect();
        assert_eq!(bodies, vec!["first", "second"]);
    }
}
