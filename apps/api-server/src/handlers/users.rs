//! User management handlers.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use agora_core::domain::Level;
use agora_shared::dto::{LevelOptionsResponse, SetLevelRequest};

use super::{acting_user, views};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/users
pub async fn list(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let actor = acting_user(&state, &identity).await?;
    let users = state.users.list_users(&actor).await?;

    let body: Vec<_> = users.iter().map(views::user_response).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/users/level/{level}
pub async fn at_level(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i16>,
) -> AppResult<HttpResponse> {
    let level = Level::new(path.into_inner())?;
    let actor = acting_user(&state, &identity).await?;
    let users = state.users.users_at_level(&actor, level).await?;

    let body: Vec<_> = users.iter().map(views::user_response).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// PUT /api/users/{id}/level
pub async fn set_level(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<SetLevelRequest>,
) -> AppResult<HttpResponse> {
    let actor = acting_user(&state, &identity).await?;
    let updated = state
        .users
        .set_level(&actor, path.into_inner(), body.level, Utc::now())
        .await?;
    Ok(HttpResponse::Ok().json(views::user_response(&updated)))
}

/// GET /api/users/level-options - levels the caller may hand out.
pub async fn level_options(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let actor = acting_user(&state, &identity).await?;
    let assignable = state.users.level_options(&actor)?;

    Ok(HttpResponse::Ok().json(LevelOptionsResponse {
        current_level: actor.level,
        assignable,
    }))
}
