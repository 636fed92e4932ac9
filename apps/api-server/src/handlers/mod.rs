//! HTTP handlers and route configuration.

mod auth;
mod bookmarks;
mod health;
mod posts;
mod profile;
mod users;
mod verification;
mod views;

#[cfg(test)]
mod tests;

use actix_web::web;

use agora_core::domain::User;

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            .service(
                web::resource("/profile")
                    .route(web::get().to(profile::get_profile))
                    .route(web::put().to(profile::update_profile))
                    .route(web::delete().to(profile::delete_account)),
            )
            .route("/profile/handle", web::put().to(profile::set_handle))
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::feed))
                    .route("", web::post().to(posts::create))
                    .route("/user/{user_id}", web::get().to(posts::by_user))
                    .route("/{id}", web::get().to(posts::get))
                    .route("/{id}", web::put().to(posts::update))
                    .route("/{id}", web::delete().to(posts::delete))
                    .route("/{id}/withdraw", web::post().to(posts::withdraw))
                    .route("/{id}/repost", web::post().to(posts::repost))
                    .route("/{id}/report", web::post().to(posts::report)),
            )
            .service(
                web::scope("/bookmarks")
                    .route("", web::get().to(bookmarks::list))
                    .route("/{post_id}", web::post().to(bookmarks::toggle)),
            )
            .service(
                web::scope("/users")
                    .route("", web::get().to(users::list))
                    .route("/level-options", web::get().to(users::level_options))
                    .route("/level/{level}", web::get().to(users::at_level))
                    .route("/{id}/level", web::put().to(users::set_level)),
            )
            .service(
                web::scope("/verification")
                    .route("/request-code", web::post().to(verification::request_code))
                    .route("/check-code", web::post().to(verification::check_code))
                    .route("/action", web::post().to(verification::action)),
            ),
    );
}

/// Load the caller's account. Levels can change between requests, so the
/// token alone is not trusted for privilege checks.
async fn acting_user(state: &AppState, identity: &Identity) -> AppResult<User> {
    match state.users.profile(identity.user_id).await {
        Ok(user) => Ok(user),
        Err(agora_core::DomainError::NotFound { .. }) => {
            tracing::warn!(user_id = %identity.user_id, "Token for unknown user");
            Err(AppError::Unauthorized)
        }
        Err(e) => Err(e.into()),
    }
}
