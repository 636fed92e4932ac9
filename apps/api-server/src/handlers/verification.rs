//! Peer verification handlers.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use agora_core::domain::VerificationDecision;
use agora_shared::dto::{
    CheckCodeRequest, RequestCodeRequest, VerificationActionRequest, VerificationCodeResponse,
    VerificationDecisionRequest,
};

use super::{acting_user, views};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/verification/request-code
pub async fn request_code(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<RequestCodeRequest>,
) -> AppResult<HttpResponse> {
    let requester = acting_user(&state, &identity).await?;
    let issued = state
        .verification
        .request_code(&requester, body.verifier_id, Utc::now())
        .await?;

    Ok(HttpResponse::Created().json(VerificationCodeResponse {
        code: issued.code,
        verifier_id: issued.verifier_id,
        expires_in: state.verification.code_ttl().as_secs(),
    }))
}

/// POST /api/verification/check-code
pub async fn check_code(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CheckCodeRequest>,
) -> AppResult<HttpResponse> {
    let verifier = acting_user(&state, &identity).await?;
    let requester = state.verification.check_code(&verifier, &body.code).await?;
    Ok(HttpResponse::Ok().json(views::user_response(&requester)))
}

/// POST /api/verification/action
pub async fn action(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<VerificationActionRequest>,
) -> AppResult<HttpResponse> {
    let verifier = acting_user(&state, &identity).await?;
    let req = body.into_inner();
    let decision = match req.decision {
        VerificationDecisionRequest::Approve => VerificationDecision::Approve,
        VerificationDecisionRequest::Reject => VerificationDecision::Reject,
    };

    let user = state
        .verification
        .apply_decision(&verifier, req.user_id, decision, Utc::now())
        .await?;
    Ok(HttpResponse::Ok().json(views::user_response(&user)))
}
