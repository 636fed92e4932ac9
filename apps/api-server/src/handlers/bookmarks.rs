use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use agora_shared::dto::BookmarkToggleResponse;

use super::{acting_user, views};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/bookmarks
pub async fn list(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = acting_user(&state, &identity).await?;
    let posts = state.bookmarks.list(&user, Utc::now()).await?;

    let body: Vec<_> = posts.into_iter().map(views::post_response).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /api/bookmarks/{post_id} - toggle.
pub async fn toggle(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let user = acting_user(&state, &identity).await?;
    let post_id = path.into_inner();

    let bookmarked = state.bookmarks.toggle(&user, post_id, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(BookmarkToggleResponse {
        post_id,
        bookmarked,
    }))
}
