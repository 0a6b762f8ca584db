use crate::navigation::menu_for;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct NavigationQuery {
    pub path: Option<String>,
}

pub async fn get_navigation(query: web::Query<NavigationQuery>) -> HttpResponse {
    let path = query.path.as_deref().unwrap_or("/dashboard");
    HttpResponse::Ok().json(menu_for(path))
}
