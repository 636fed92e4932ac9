use actix_web::{HttpResponse, web};
use chrono::Utc;

use agora_shared::dto::{SetHandleRequest, UpdateProfileRequest};

use super::{acting_user, views};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/profile - the caller with their capability set.
pub async fn get_profile(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = acting_user(&state, &identity).await?;
    Ok(HttpResponse::Ok().json(views::profile_response(&user)?))
}

/// PUT /api/profile
pub async fn update_profile(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let user = acting_user(&state, &identity).await?;
    let updated = state
        .users
        .update_profile(&user, body.into_inner().display_name, Utc::now())
        .await?;
    Ok(HttpResponse::Ok().json(views::profile_response(&updated)?))
}

/// PUT /api/profile/handle
pub async fn set_handle(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<SetHandleRequest>,
) -> AppResult<HttpResponse> {
    let user = acting_user(&state, &identity).await?;
    let updated = state.users.set_handle(&user, &body.handle, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(views::profile_response(&updated)?))
}

/// DELETE /api/profile - removes the account, its posts and bookmarks.
/// Outstanding tokens stop working because the account no longer loads.
pub async fn delete_account(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = acting_user(&state, &identity).await?;
    state.users.delete_account(&user).await?;
    Ok(HttpResponse::NoContent().finish())
}
