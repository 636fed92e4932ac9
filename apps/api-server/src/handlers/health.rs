use actix_web::HttpResponse;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
    time: DateTime<Utc>,
}

/// GET /api/health. Liveness only; storage is not checked.
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        time: Utc::now(),
    })
}
