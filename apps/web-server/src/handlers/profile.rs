//! Profile handlers: the user's own page and profile editing.

use actix_web::{HttpResponse, web};

use scribe_core::error::DomainError;
use scribe_core::forms::ProfileForm;
use scribe_core::ports::{BaseRepository, PostRepository, UserRepository};
use scribe_shared::ApiResponse;
use scribe_shared::dto::{ProfileResponse, UpdateProfileRequest};

use crate::handlers::convert::{post_response, user_response};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /profile
///
/// The authenticated user's account and their posts, newest first.
pub async fn show(identity: Identity, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| DomainError::not_found("User", identity.user_id))?;
    let posts = state.posts.find_by_author(user.id).await?;

    let response = ProfileResponse {
        user: user_response(&user),
        posts: posts.iter().map(post_response).collect(),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::ok(response)))
}

/// GET /profile/edit
///
/// Current profile values, for form pre-fill.
pub async fn edit_prefill(
    identity: Identity,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| DomainError::not_found("User", identity.user_id))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(user_response(&user))))
}

/// POST /profile/edit
pub async fn edit(
    identity: Identity,
    state: web::Data<AppState>,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    ProfileForm {
        email: &req.email,
        first_name: &req.first_name,
        last_name: &req.last_name,
    }
    .validate()?;

    let mut user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| DomainError::not_found("User", identity.user_id))?;

    // A changed email must stay unique
    if req.email != user.email && state.users.find_by_email(&req.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    user.apply_profile(req.email, req.first_name, req.last_name, req.date_of_birth);
    let saved = state.users.update(user).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(user_response(&saved))))
}
