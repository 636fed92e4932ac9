//! Post handlers. Every response is classified for the caller.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use agora_shared::ApiResponse;
use agora_shared::dto::{CreatePostRequest, ReportRequest, RepostRequest, UpdatePostRequest};

use super::{acting_user, views};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/posts
pub async fn feed(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let viewer = acting_user(&state, &identity).await?;
    let posts = state.posts.feed(&viewer, Utc::now()).await?;

    let body: Vec<_> = posts.into_iter().map(views::post_response).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/posts/user/{user_id}
pub async fn by_user(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let viewer = acting_user(&state, &identity).await?;
    let posts = state
        .posts
        .posts_by_user(&viewer, path.into_inner(), Utc::now())
        .await?;

    let body: Vec<_> = posts.into_iter().map(views::post_response).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/posts/{id}
pub async fn get(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let viewer = acting_user(&state, &identity).await?;
    let post = state.posts.get(&viewer, path.into_inner(), Utc::now()).await?;
    Ok(HttpResponse::Ok().json(views::post_response(post)))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let author = acting_user(&state, &identity).await?;
    let req = body.into_inner();
    let now = Utc::now();

    let post = state.posts.create(&author, req.content, req.publish, now).await?;
    let view = state.posts.get(&author, post.id, now).await?;
    Ok(HttpResponse::Created().json(views::post_response(view)))
}

/// PUT /api/posts/{id} - edit a draft.
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let actor = acting_user(&state, &identity).await?;
    let now = Utc::now();

    let post = state
        .posts
        .edit(&actor, path.into_inner(), body.into_inner().content, now)
        .await?;
    let view = state.posts.get(&actor, post.id, now).await?;
    Ok(HttpResponse::Ok().json(views::post_response(view)))
}

/// DELETE /api/posts/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let actor = acting_user(&state, &identity).await?;
    state.posts.delete(&actor, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/posts/{id}/withdraw
pub async fn withdraw(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let actor = acting_user(&state, &identity).await?;
    let now = Utc::now();

    let post = state.posts.withdraw(&actor, path.into_inner(), now).await?;
    let view = state.posts.get(&actor, post.id, now).await?;
    Ok(HttpResponse::Ok().json(views::post_response(view)))
}

/// POST /api/posts/{id}/repost - withdrawn post back to draft.
pub async fn repost(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<RepostRequest>,
) -> AppResult<HttpResponse> {
    let actor = acting_user(&state, &identity).await?;
    let now = Utc::now();

    let post = state
        .posts
        .repost(&actor, path.into_inner(), body.into_inner().content, now)
        .await?;
    let view = state.posts.get(&actor, post.id, now).await?;

    let mut body = views::post_response(view);
    body.is_repost = true;
    Ok(HttpResponse::Ok().json(body))
}

/// POST /api/posts/{id}/report
pub async fn report(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: Option<web::Json<ReportRequest>>,
) -> AppResult<HttpResponse> {
    let actor = acting_user(&state, &identity).await?;
    let reason = body.and_then(|b| b.into_inner().reason);

    state
        .posts
        .report(&actor, path.into_inner(), reason.as_deref())
        .await?;
    Ok(HttpResponse::Accepted().json(ApiResponse::ok_with_message((), "Report received")))
}
