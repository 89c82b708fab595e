//! Handler-level tests over the in-memory repositories.
//!
//! Each test assembles the same App the binary builds, seeded through the
//! repository ports.

use std::sync::Arc;

use actix_web::http::header;
use actix_web::{App, test, web};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use uuid::Uuid;

use scribe_core::domain::{Category, Comment, Post, User};
use scribe_core::ports::{
    BaseRepository, CommentRepository, PasswordService, TokenService, UserRepository,
};
use scribe_infra::auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
use scribe_server::handlers;
use scribe_server::state::AppState;

fn test_services() -> (AppState, Arc<dyn TokenService>, Arc<dyn PasswordService>) {
    let state = AppState::in_memory();
    let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(JwtConfig {
        secret: "test-secret-key".to_string(),
        expiration_hours: 1,
        issuer: "test-issuer".to_string(),
    }));
    let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());
    (state, tokens, passwords)
}

macro_rules! test_app {
    ($state:expr, $tokens:expr, $passwords:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .app_data(web::Data::new($tokens.clone()))
                .app_data(web::Data::new($passwords.clone()))
                .configure(handlers::configure_routes),
        )
        .await
    };
}

async fn seed_user(
    state: &AppState,
    passwords: &Arc<dyn PasswordService>,
    email: &str,
) -> User {
    let hash = passwords.hash("password123").unwrap();
    state
        .users
        .insert(User::new(
            email.to_string(),
            "Test".to_string(),
            "User".to_string(),
            None,
            hash,
        ))
        .await
        .unwrap()
}

async fn seed_category(state: &AppState, name: &str) -> Category {
    state
        .categories
        .insert(Category::new(name.to_string()))
        .await
        .unwrap()
}

/// Seed a post with a shifted creation time so listing order is
/// deterministic.
async fn seed_post(
    state: &AppState,
    author: &User,
    category: &Category,
    title: &str,
    age_minutes: i64,
) -> Post {
    let mut post = Post::new(
        author.id,
        category.id,
        title.to_string(),
        "Test Content".to_string(),
    );
    post.created_at = Utc::now() - Duration::minutes(age_minutes);
    state.posts.insert(post).await.unwrap()
}

fn bearer(tokens: &Arc<dyn TokenService>, user: &User) -> (header::HeaderName, String) {
    let token = tokens.generate_token(user.id, &user.email).unwrap();
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

#[actix_web::test]
async fn register_then_login_then_profile() {
    let (state, tokens, passwords) = test_services();
    let app = test_app!(state, tokens, passwords);

    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({
            "email": "testuser@example.com",
            "first_name": "Test",
            "last_name": "User",
            "date_of_birth": "1990-01-01",
            "password": "password123",
            "password_confirm": "password123",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Your account has been created! Test");
    // Registration returns no token
    assert!(body["data"]["access_token"].is_null());

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({
            "email": "testuser@example.com",
            "password": "password123",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    let token = body["access_token"].as_str().unwrap().to_string();
    assert_eq!(body["token_type"], "Bearer");

    let req = test::TestRequest::get()
        .uri("/profile")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["user"]["email"], "testuser@example.com");
}

#[actix_web::test]
async fn register_rejects_password_mismatch_and_persists_nothing() {
    let (state, tokens, passwords) = test_services();
    let app = test_app!(state, tokens, passwords);

    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({
            "email": "testuser@example.com",
            "first_name": "Test",
            "last_name": "User",
            "password": "password123",
            "password_confirm": "password124",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 422);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errors"][0]["field"], "password_confirm");

    let user = state
        .users
        .find_by_email("testuser@example.com")
        .await
        .unwrap();
    assert!(user.is_none());
}

#[actix_web::test]
async fn register_rejects_duplicate_email() {
    let (state, tokens, passwords) = test_services();
    seed_user(&state, &passwords, "testuser@example.com").await;
    let app = test_app!(state, tokens, passwords);

    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({
            "email": "testuser@example.com",
            "first_name": "Other",
            "last_name": "User",
            "password": "password123",
            "password_confirm": "password123",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 409);
}

#[actix_web::test]
async fn login_with_wrong_password_is_unauthorized() {
    let (state, tokens, passwords) = test_services();
    seed_user(&state, &passwords, "testuser@example.com").await;
    let app = test_app!(state, tokens, passwords);

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({
            "email": "testuser@example.com",
            "password": "wrong-password",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Username or password is incorrect");
}

#[actix_web::test]
async fn listing_contains_seeded_post() {
    let (state, tokens, passwords) = test_services();
    let user = seed_user(&state, &passwords, "testuser@example.com").await;
    let category = seed_category(&state, "Test Category").await;
    seed_post(&state, &user, &category, "Test Title", 1).await;
    let app = test_app!(state, tokens, passwords);

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body = test::read_body(resp).await;
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("Test Title"));
    assert!(text.contains("Test Category"));
}

#[actix_web::test]
async fn listing_filters_by_category_and_paginates() {
    let (state, tokens, passwords) = test_services();
    let user = seed_user(&state, &passwords, "testuser@example.com").await;
    let rust = seed_category(&state, "Rust").await;
    let other = seed_category(&state, "Other").await;
    for i in 0..7 {
        seed_post(&state, &user, &rust, &format!("Rust {i}"), i).await;
    }
    seed_post(&state, &user, &other, "Elsewhere", 10).await;
    let app = test_app!(state, tokens, passwords);

    // Filtered, first page: 5 of 7, newest first
    let req = test::TestRequest::get()
        .uri(&format!("/?category={}", rust.id))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let data = &body["data"];
    assert_eq!(data["total_items"], 7);
    assert_eq!(data["total_pages"], 2);
    assert_eq!(data["posts"].as_array().unwrap().len(), 5);
    assert_eq!(data["posts"][0]["title"], "Rust 0");
    assert_eq!(data["selected_category"], rust.id.to_string());

    // Second page holds the remaining 2
    let req = test::TestRequest::get()
        .uri(&format!("/?category={}&page=2", rust.id))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["data"]["posts"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["posts"][0]["title"], "Rust 5");

    // Out-of-range page clamps to the last page
    let req = test::TestRequest::get()
        .uri(&format!("/?category={}&page=99", rust.id))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["data"]["page"], 2);

    // Unfiltered listing sees all 8
    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["data"]["total_items"], 8);
}

#[actix_web::test]
async fn listing_with_unknown_category_is_an_empty_page() {
    let (state, tokens, passwords) = test_services();
    let user = seed_user(&state, &passwords, "testuser@example.com").await;
    let category = seed_category(&state, "Test Category").await;
    seed_post(&state, &user, &category, "Test Title", 1).await;
    let app = test_app!(state, tokens, passwords);

    // A valid but unknown id
    let req = test::TestRequest::get()
        .uri(&format!("/?category={}", Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["total_items"], 0);
    assert!(body["data"]["posts"].as_array().unwrap().is_empty());

    // A value that is not an id at all
    let req = test::TestRequest::get()
        .uri("/?category=not-a-category")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["data"]["posts"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn create_post_forces_author_to_identity() {
    let (state, tokens, passwords) = test_services();
    let user = seed_user(&state, &passwords, "testuser@example.com").await;
    let category = seed_category(&state, "Test Category").await;
    let app = test_app!(state, tokens, passwords);

    let req = test::TestRequest::post()
        .uri("/post/create")
        .insert_header(bearer(&tokens, &user))
        .set_json(json!({
            "title": "Test Title",
            "content": "Test Content",
            "category_id": category.id,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["author_id"], user.id.to_string());

    // Unauthenticated creation is rejected
    let req = test::TestRequest::post()
        .uri("/post/create")
        .set_json(json!({
            "title": "Test Title",
            "content": "Test Content",
            "category_id": category.id,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn create_post_with_unknown_category_fails_validation() {
    let (state, tokens, passwords) = test_services();
    let user = seed_user(&state, &passwords, "testuser@example.com").await;
    let app = test_app!(state, tokens, passwords);

    let req = test::TestRequest::post()
        .uri("/post/create")
        .insert_header(bearer(&tokens, &user))
        .set_json(json!({
            "title": "Test Title",
            "content": "Test Content",
            "category_id": Uuid::new_v4(),
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 422);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errors"][0]["field"], "category_id");
}

#[actix_web::test]
async fn editing_someone_elses_post_is_not_found() {
    let (state, tokens, passwords) = test_services();
    let author = seed_user(&state, &passwords, "author@example.com").await;
    let intruder = seed_user(&state, &passwords, "intruder@example.com").await;
    let category = seed_category(&state, "Test Category").await;
    let post = seed_post(&state, &author, &category, "Test Title", 1).await;
    let app = test_app!(state, tokens, passwords);

    // Not the author: masked as 404, on both the pre-fill and the edit
    let req = test::TestRequest::get()
        .uri(&format!("/post/edit/{}", post.id))
        .insert_header(bearer(&tokens, &intruder))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);

    let req = test::TestRequest::post()
        .uri(&format!("/post/edit/{}", post.id))
        .insert_header(bearer(&tokens, &intruder))
        .set_json(json!({
            "title": "Hijacked",
            "content": "Hijacked",
            "category_id": category.id,
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);

    // The post is untouched
    let unchanged = state.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(unchanged.title, "Test Title");

    // The author can edit
    let req = test::TestRequest::post()
        .uri(&format!("/post/edit/{}", post.id))
        .insert_header(bearer(&tokens, &author))
        .set_json(json!({
            "title": "Updated Title",
            "content": "Updated Content",
            "category_id": category.id,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["title"], "Updated Title");
    assert_eq!(body["data"]["author_id"], author.id.to_string());
}

#[actix_web::test]
async fn comment_submission_persists_and_acknowledges() {
    let (state, tokens, passwords) = test_services();
    let user = seed_user(&state, &passwords, "testuser@example.com").await;
    let category = seed_category(&state, "Test Category").await;
    let post = seed_post(&state, &user, &category, "Test Title", 1).await;
    let app = test_app!(state, tokens, passwords);

    let req = test::TestRequest::post()
        .uri(&format!("/post/{}", post.id))
        .set_json(json!({
            "name": "Commenter",
            "email": "commenter@example.com",
            "body": "Test Comment",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Your comment has been added!");

    let comments = state.comments.list_active_for_post(post.id).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].body, "Test Comment");
    assert!(comments[0].active);
}

#[actix_web::test]
async fn invalid_comment_creates_no_rows() {
    let (state, tokens, passwords) = test_services();
    let user = seed_user(&state, &passwords, "testuser@example.com").await;
    let category = seed_category(&state, "Test Category").await;
    let post = seed_post(&state, &user, &category, "Test Title", 1).await;
    let app = test_app!(state, tokens, passwords);

    let req = test::TestRequest::post()
        .uri(&format!("/post/{}", post.id))
        .set_json(json!({
            "name": "Commenter",
            "email": "not-an-email",
            "body": "",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 422);

    let comments = state.comments.list_active_for_post(post.id).await.unwrap();
    assert!(comments.is_empty());
}

#[actix_web::test]
async fn post_detail_returns_active_comments_oldest_first() {
    let (state, tokens, passwords) = test_services();
    let user = seed_user(&state, &passwords, "testuser@example.com").await;
    let category = seed_category(&state, "Test Category").await;
    let post = seed_post(&state, &user, &category, "Test Title", 1).await;

    let mut first = Comment::new(
        post.id,
        "Commenter".to_string(),
        "commenter@example.com".to_string(),
        "first".to_string(),
    );
    first.created_on = Utc::now() - Duration::minutes(10);
    state.comments.insert(first).await.unwrap();

    let mut hidden = Comment::new(
        post.id,
        "Spammer".to_string(),
        "spam@example.com".to_string(),
        "spam".to_string(),
    );
    hidden.active = false;
    state.comments.insert(hidden).await.unwrap();

    state
        .comments
        .insert(Comment::new(
            post.id,
            "Commenter".to_string(),
            "commenter@example.com".to_string(),
            "second".to_string(),
        ))
        .await
        .unwrap();

    let app = test_app!(state, tokens, passwords);

    let req = test::TestRequest::get()
        .uri(&format!("/post/{}", post.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    let comments = body["data"]["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["body"], "first");
    assert_eq!(comments[1]["body"], "second");
}

#[actix_web::test]
async fn unknown_post_detail_is_not_found() {
    let (state, tokens, passwords) = test_services();
    let app = test_app!(state, tokens, passwords);

    let req = test::TestRequest::get()
        .uri(&format!("/post/{}", Uuid::new_v4()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);
}

#[actix_web::test]
async fn profile_edit_updates_the_user() {
    let (state, tokens, passwords) = test_services();
    let user = seed_user(&state, &passwords, "testuser@example.com").await;
    let app = test_app!(state, tokens, passwords);

    // Pre-fill carries current values
    let req = test::TestRequest::get()
        .uri("/profile/edit")
        .insert_header(bearer(&tokens, &user))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["data"]["email"], "testuser@example.com");

    let req = test::TestRequest::post()
        .uri("/profile/edit")
        .insert_header(bearer(&tokens, &user))
        .set_json(json!({
            "email": "newemail@example.com",
            "first_name": "New",
            "last_name": "Name",
            "date_of_birth": "1990-01-01",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let updated = state.users.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(updated.email, "newemail@example.com");
    assert_eq!(updated.first_name, "New");
    assert_eq!(updated.last_name, "Name");
}

#[actix_web::test]
async fn profile_edit_rejects_taken_email() {
    let (state, tokens, passwords) = test_services();
    let user = seed_user(&state, &passwords, "testuser@example.com").await;
    seed_user(&state, &passwords, "taken@example.com").await;
    let app = test_app!(state, tokens, passwords);

    let req = test::TestRequest::post()
        .uri("/profile/edit")
        .insert_header(bearer(&tokens, &user))
        .set_json(json!({
            "email": "taken@example.com",
            "first_name": "Test",
            "last_name": "User",
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 409);
}

#[actix_web::test]
async fn logout_requires_a_token_and_acknowledges() {
    let (state, tokens, passwords) = test_services();
    let user = seed_user(&state, &passwords, "testuser@example.com").await;
    let app = test_app!(state, tokens, passwords);

    let req = test::TestRequest::get().uri("/logout").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 401);

    let req = test::TestRequest::get()
        .uri("/logout")
        .insert_header(bearer(&tokens, &user))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "You have been logged out");
}
