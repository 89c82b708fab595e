//! HTTP handlers and route configuration.

mod auth;
mod convert;
mod health;
mod posts;
mod profile;

use actix_web::web;

/// Configure all application routes.
///
/// Literal segments are registered before `{id}` routes so `/post/create`
/// never parses as a post id.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(posts::latest))
        .route("/health", web::get().to(health::health_check))
        // Account routes
        .route("/register", web::post().to(auth::register))
        .route("/login", web::post().to(auth::login))
        .route("/logout", web::get().to(auth::logout))
        .service(
            web::scope("/profile")
                .route("", web::get().to(profile::show))
                .route("/edit", web::get().to(profile::edit_prefill))
                .route("/edit", web::post().to(profile::edit)),
        )
        // Post routes
        .service(
            web::scope("/post")
                .route("/create", web::post().to(posts::create))
                .route("/edit/{id}", web::get().to(posts::edit_prefill))
                .route("/edit/{id}", web::post().to(posts::edit))
                .route("/{id}", web::get().to(posts::detail))
                .route("/{id}", web::post().to(posts::submit_comment)),
        );
}
