/// Profile handlers - profiles, follows, trending users and analytics
use crate::error::{AppError, Result};
use crate::middleware::{AuthenticatedUser, MaybeUser};
use crate::notify::{Notice, WithNotice};
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    /// Empty string clears the bio
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    pub limit: Option<i64>,
}

pub async fn get_profile(
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let profile = state.profiles.get_profile(user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// Update the caller's own bio and/or avatar
pub async fn update_me(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();
    let owner = user.0.id;

    let mut profile = None;
    if let Some(bio) = req.bio.as_deref() {
        profile = Some(state.profiles.update_bio(owner, Some(bio)).await?);
    }
    if let Some(avatar_url) = req.avatar_url.as_deref() {
        profile = Some(state.profiles.update_avatar(owner, avatar_url).await?);
    }

    let profile = profile.ok_or_else(|| AppError::Validation("Nothing to update".to_string()))?;
    Ok(HttpResponse::Ok().json(WithNotice::new(
        profile,
        Notice::success("Profile updated"),
    )))
}

pub async fn get_user_posts(
    state: web::Data<AppState>,
    viewer: MaybeUser,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let posts = state
        .profiles
        .user_posts(user_id.into_inner(), viewer.id())
        .await?;
    Ok(HttpResponse::Ok().json(posts))
}

pub async fn get_profile_tabs(
    state: web::Data<AppState>,
    viewer: MaybeUser,
    user_id: web::Path<Uuid>,
) -> HttpResponse {
    HttpResponse::Ok().json(state.profiles.profile_tabs(user_id.into_inner(), viewer.id()))
}

/// Analytics of the caller's own profile
pub async fn get_analytics(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let view = state.analytics.view(user_id.into_inner(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn follow_user(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let outcome = state.profiles.follow(user.0.id, user_id.into_inner()).await?;
    let notice = outcome.notice();
    Ok(HttpResponse::Ok().json(WithNotice::new(json!({ "outcome": outcome }), notice)))
}

pub async fn unfollow_user(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let removed = state.profiles.unfollow(user.0.id, user_id.into_inner()).await?;
    let notice = if removed {
        Notice::success("You have unfollowed this user")
    } else {
        Notice::error("You are not following this user")
    };
    Ok(HttpResponse::Ok().json(WithNotice::new(json!({ "removed": removed }), notice)))
}

pub async fn trending_users(
    state: web::Data<AppState>,
    query: web::Query<TrendingQuery>,
) -> Result<HttpResponse> {
    let profiles = state.profiles.trending_users(query.limit).await?;
    Ok(HttpResponse::Ok().json(profiles))
}
