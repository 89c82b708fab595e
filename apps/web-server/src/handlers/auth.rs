//! Account handlers: registration, login, logout.

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use scribe_core::domain::User;
use scribe_core::forms::RegisterForm;
use scribe_core::ports::{BaseRepository, PasswordService, TokenService, UserRepository};
use scribe_shared::ApiResponse;
use scribe_shared::dto::{AuthResponse, LoginRequest, RegisterRequest};

use crate::handlers::convert::user_response;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /register
///
/// Creates an active account. Does not auto-login; the client is expected
/// to call `/login` next.
pub async fn register(
    state: web::Data<AppState>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    RegisterForm {
        email: &req.email,
        first_name: &req.first_name,
        last_name: &req.last_name,
        password: &req.password,
        password_confirm: &req.password_confirm,
    }
    .validate()?;

    // Check if the email is already taken
    if state.users.find_by_email(&req.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password_hash = password_service.hash(&req.password)?;

    let user = User::new(
        req.email,
        req.first_name,
        req.last_name,
        req.date_of_birth,
        password_hash,
    );
    let saved_user = state.users.insert(user).await?;

    let message = format!("Your account has been created! {}", saved_user.first_name);
    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        user_response(&saved_user),
        message,
    )))
}

/// POST /login
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // Find user by email
    let user = state
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    // Inactive accounts cannot authenticate
    if !user.is_active {
        return Err(AppError::InvalidCredentials);
    }

    // Verify password
    let valid = password_service.verify(&req.password, &user.password_hash)?;
    if !valid {
        return Err(AppError::InvalidCredentials);
    }

    // Generate token
    let token = token_service
        .generate_token(user.id, &user.email)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: token_service.expiration_seconds() as u64,
    }))
}

/// GET /logout
///
/// Tokens are stateless; there is no server-side session to terminate.
/// The route exists so clients have a uniform logout call.
pub async fn logout(identity: Identity) -> AppResult<HttpResponse> {
    tracing::debug!(user_id = %identity.user_id, "User logged out");
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message((), "You have been logged out")))
}
