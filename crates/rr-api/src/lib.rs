//! # rr-api
//!
//! The web routing and orchestration layer for Rusty-Reddit.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod pagination;

use actix_web::web;
use rr_core::error::AppError;

use crate::error::ApiError;
use crate::handlers::{accounts, comments, communities, posts, rules, views, votes};

pub use crate::handlers::{ApiOptions, AppState};

/// Payload extractor configs that report failures as `{"message": ...}`.
fn extractor_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::bad_request(err.to_string()).into()),
    )
    .app_data(
        web::FormConfig::default()
            .error_handler(|err, _req| ApiError::bad_request(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::bad_request(err.to_string()).into()),
    )
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        ApiError(AppError::NotFound("Resource".into(), err.to_string())).into()
    }));
}

/// Configures the JSON API under `/api` and the form views at the root.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    extractor_config(cfg);

    cfg.service(
        web::scope("/api")
            // Accounts
            .route("/register", web::post().to(accounts::register))
            .route("/login", web::post().to(accounts::login))
            .route("/refresh", web::post().to(accounts::refresh))
            .service(
                web::resource("/profile")
                    .route(web::get().to(accounts::get_profile))
                    .route(web::put().to(accounts::update_profile))
                    .route(web::patch().to(accounts::update_profile))
                    .route(web::delete().to(accounts::delete_profile)),
            )
            .route("/users", web::get().to(accounts::list_users))
            // Subreddits
            .service(
                web::resource("/subreddit")
                    .route(web::get().to(communities::list))
                    .route(web::post().to(communities::create)),
            )
            .service(
                web::resource("/subreddit/{id}")
                    .route(web::get().to(communities::retrieve))
                    .route(web::put().to(communities::update))
                    .route(web::patch().to(communities::partial_update))
                    .route(web::delete().to(communities::destroy)),
            )
            .route("/subreddit/{id}/image", web::put().to(communities::upload_image))
            .service(
                web::resource("/subreddit/{id}/subscribe")
                    .route(web::post().to(communities::subscribe))
                    .route(web::delete().to(communities::unsubscribe)),
            )
            .route("/subreddit/{id}/moderators", web::post().to(communities::add_moderator))
            .route(
                "/subreddit/{id}/moderators/{user_id}",
                web::delete().to(communities::remove_moderator),
            )
            // Posts
            .service(
                web::resource("/post")
                    .route(web::get().to(posts::list))
                    .route(web::post().to(posts::create)),
            )
            .service(
                web::resource("/post/{id}")
                    .route(web::get().to(posts::retrieve))
                    .route(web::put().to(posts::update))
                    .route(web::patch().to(posts::partial_update))
                    .route(web::delete().to(posts::destroy)),
            )
            .service(
                web::resource("/post/{id}/vote")
                    .route(web::post().to(votes::vote_post))
                    .route(web::delete().to(votes::unvote_post)),
            )
            // Comments
            .service(
                web::resource("/comment")
                    .route(web::get().to(comments::list))
                    .route(web::post().to(comments::create)),
            )
            .service(
                web::resource("/comment/{id}")
                    .route(web::get().to(comments::retrieve))
                    .route(web::put().to(comments::update))
                    .route(web::patch().to(comments::update))
                    .route(web::delete().to(comments::destroy)),
            )
            .service(
                web::resource("/comment/{id}/vote")
                    .route(web::post().to(votes::vote_comment))
                    .route(web::delete().to(votes::unvote_comment)),
            )
            // Rules
            .service(
                web::resource("/rules")
                    .route(web::get().to(rules::list))
                    .route(web::post().to(rules::create)),
            )
            .service(
                web::resource("/rules/{id}")
                    .route(web::get().to(rules::retrieve))
                    .route(web::put().to(rules::update))
                    .route(web::patch().to(rules::partial_update))
                    .route(web::delete().to(rules::destroy)),
            ),
    );

    cfg.route("/", web::get().to(views::home))
        .service(
            web::resource("/login")
                .route(web::get().to(views::login_form))
                .route(web::post().to(views::login_submit)),
        )
        .service(
            web::resource("/logout")
                .route(web::get().to(views::logout))
                .route(web::post().to(views::logout)),
        )
        .service(
            web::resource("/register")
                .route(web::get().to(views::register_form))
                .route(web::post().to(views::register_submit)),
        );
}
