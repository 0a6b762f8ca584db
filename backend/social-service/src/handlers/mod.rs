/// HTTP handlers for social-service
///
/// - Feed: home feed reads
/// - Posts: composer uploads and engagement actions
/// - Profiles: profile reads/updates, follows, trending users, analytics
/// - Navigation and session: menu model and sign-out
pub mod feed;
pub mod navigation;
pub mod posts;
pub mod profiles;
pub mod session;

use actix_web::web;

/// Register every `/api/v1` route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/feed", web::get().to(feed::get_feed))
            .route("/posts", web::post().to(posts::create_post))
            .route(
                "/posts/{post_id}/{action}",
                web::post().to(posts::post_action),
            )
            .route("/profiles/me", web::patch().to(profiles::update_me))
            .route("/profiles/{user_id}", web::get().to(profiles::get_profile))
            .route(
                "/profiles/{user_id}/posts",
                web::get().to(profiles::get_user_posts),
            )
            .route(
                "/profiles/{user_id}/tabs",
                web::get().to(profiles::get_profile_tabs),
            )
            .route(
                "/profiles/{user_id}/analytics",
                web::get().to(profiles::get_analytics),
            )
            .route(
                "/profiles/{user_id}/follow",
                web::post().to(profiles::follow_user),
            )
            .route(
                "/profiles/{user_id}/follow",
                web::delete().to(profiles::unfollow_user),
            )
            .route("/users/trending", web::get().to(profiles::trending_users))
            .route("/navigation", web::get().to(navigation::get_navigation))
            .route("/session", web::get().to(session::get_session))
            .route("/session/sign-out", web::post().to(session::sign_out)),
    );
}
