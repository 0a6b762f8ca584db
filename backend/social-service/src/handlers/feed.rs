use crate::error::Result;
use crate::middleware::MaybeUser;
use crate::state::AppState;
use actix_web::{web, HttpResponse};

/// Home feed, newest first
pub async fn get_feed(state: web::Data<AppState>, user: MaybeUser) -> Result<HttpResponse> {
    let posts = state.feed.home_feed(user.id()).await?;
    Ok(HttpResponse::Ok().json(posts))
}
