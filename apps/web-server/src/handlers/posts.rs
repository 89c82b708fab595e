//! Post listing, detail, comment submission, and authoring handlers.

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use scribe_core::domain::{Comment, POSTS_PER_PAGE, Paginated, Post};
use scribe_core::error::DomainError;
use scribe_core::forms::{CommentForm, PostForm, ValidationErrors};
use scribe_core::ports::{BaseRepository, CategoryRepository, CommentRepository, PostRepository};
use scribe_shared::ApiResponse;
use scribe_shared::dto::{CommentRequest, PostDetailResponse, PostListResponse, PostRequest};

use crate::handlers::convert::{category_response, comment_response, post_response};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Query parameters for the post listing.
///
/// Both parameters are free-form strings: an unparsable `category` means
/// an unknown category (empty page) and an unparsable `page` means page 1,
/// neither is a client error.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    category: Option<String>,
    page: Option<String>,
}

/// GET /
///
/// Paginated post listing, newest first, optionally filtered by category.
pub async fn latest(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    let page = query
        .page
        .as_deref()
        .and_then(|p| p.parse().ok())
        .unwrap_or(1);

    let selected = query.category.as_deref().filter(|c| !c.is_empty());
    let (paginated, selected_category) = match selected {
        None => (state.posts.list_recent(None, page).await?, None),
        Some(raw) => match Uuid::parse_str(raw) {
            Ok(id) => (state.posts.list_recent(Some(id), page).await?, Some(id)),
            Err(_) => (Paginated::empty(POSTS_PER_PAGE), None),
        },
    };

    let categories = state.categories.list_all().await?;

    let response = PostListResponse {
        posts: paginated.items.iter().map(post_response).collect(),
        categories: categories.iter().map(category_response).collect(),
        selected_category,
        page: paginated.page,
        page_size: paginated.page_size,
        total_items: paginated.total_items,
        total_pages: paginated.total_pages,
        has_previous: paginated.has_previous(),
        has_next: paginated.has_next(),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::ok(response)))
}

/// GET /post/{id}
///
/// Post detail with its active comments, oldest first.
pub async fn detail(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Post", post_id))?;
    let comments = state.comments.list_active_for_post(post.id).await?;

    let response = PostDetailResponse {
        post: post_response(&post),
        comments: comments.iter().map(comment_response).collect(),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::ok(response)))
}

/// POST /post/{id}
///
/// Submit a comment on a post. Open to unauthenticated visitors.
pub async fn submit_comment(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let req = body.into_inner();

    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Post", post_id))?;

    CommentForm {
        name: &req.name,
        email: &req.email,
        body: &req.body,
    }
    .validate()?;

    let comment = Comment::new(post.id, req.name, req.email, req.body);
    let saved = state.comments.insert(comment).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        comment_response(&saved),
        "Your comment has been added!",
    )))
}

/// POST /post/create
///
/// The post's author is always the authenticated identity; the request
/// carries no author field at all.
pub async fn create(
    identity: Identity,
    state: web::Data<AppState>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    validate_post_request(&state, &req).await?;

    let post = Post::new(identity.user_id, req.category_id, req.title, req.content);
    let saved = state.posts.insert(post).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(post_response(&saved))))
}

/// GET /post/edit/{id}
///
/// Current values of an owned post, for form pre-fill.
pub async fn edit_prefill(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = find_owned_post(&state, path.into_inner(), &identity).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(&post))))
}

/// POST /post/edit/{id}
pub async fn edit(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let mut post = find_owned_post(&state, path.into_inner(), &identity).await?;

    validate_post_request(&state, &req).await?;

    post.apply_edit(req.title, req.content, req.category_id);
    let saved = state.posts.update(post).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(&saved))))
}

/// Two-step lookup: fetch, then check ownership. A missing post is
/// NotFound; someone else's post is Forbidden, which the error boundary
/// presents as 404.
async fn find_owned_post(
    state: &AppState,
    post_id: Uuid,
    identity: &Identity,
) -> Result<Post, AppError> {
    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Post", post_id))?;
    post.authorize_author(identity.user_id)?;
    Ok(post)
}

/// Field checks plus the category existence check a form's choice field
/// would do.
async fn validate_post_request(state: &AppState, req: &PostRequest) -> Result<(), AppError> {
    PostForm {
        title: &req.title,
        content: &req.content,
    }
    .validate()?;

    if state
        .categories
        .find_by_id(req.category_id)
        .await?
        .is_none()
    {
        let mut errors = ValidationErrors::default();
        errors.push("category_id", "Select a valid category");
        return Err(errors.into());
    }

    Ok(())
}
