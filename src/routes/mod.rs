//! Thin JSON handlers over the service layer.

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, error, web};
use serde::Serialize;

use crate::repository::DieselRepository;
use crate::services::ServiceError;
use crate::services::clock::SystemClock;
use crate::services::sync::SyncLocks;
use crate::source::shopify::ShopifyAdapter;

pub mod admin;
pub mod merchants;

/// Shared handles every handler may use.
pub struct AppState {
    pub repo: DieselRepository,
    pub source: ShopifyAdapter,
    pub locks: SyncLocks,
    pub clock: SystemClock,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Render a service failure as `{"error": "..."}` with its mapped status.
pub fn error_response(err: &ServiceError) -> HttpResponse {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status).json(ErrorBody {
        error: err.to_string(),
    })
}

/// Render a service result as JSON.
pub fn json_response<T: Serialize>(result: Result<T, ServiceError>) -> HttpResponse {
    match result {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(err) => error_response(&err),
    }
}

fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> error::Error {
    let response = error_response(&ServiceError::BadRequest(err.to_string()));
    error::InternalError::from_response(err, response).into()
}

fn query_error_handler(err: error::QueryPayloadError, _req: &HttpRequest) -> error::Error {
    let response = error_response(&ServiceError::BadRequest(err.to_string()));
    error::InternalError::from_response(err, response).into()
}

/// Register every route under `/api`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .service(
            web::scope("/api")
                .service(merchants::sync_merchant)
                .service(merchants::merchant_stats)
                .service(merchants::merchant_products)
                .service(merchants::merchant_staging)
                .service(merchants::merchant_issues)
                .service(merchants::resync_product)
                .service(admin::admin_stats)
                .service(admin::review_queue)
                .service(admin::search_master_products)
                .service(admin::list_master_products)
                .service(admin::list_master_variants)
                .service(admin::variant_matches)
                .service(admin::staging_detail)
                .service(admin::submit_decision),
        );
}
