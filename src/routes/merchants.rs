use actix_web::{HttpResponse, Responder, get, post, web};
use serde::Deserialize;

use crate::routes::{AppState, json_response};
use crate::services::{staging as staging_service, sync as sync_service};

#[derive(Deserialize, Debug)]
struct ProductsQueryParams {
    tab: Option<String>,
    q: Option<String>,
    page: Option<usize>,
}

#[derive(Deserialize, Debug)]
struct PageQueryParams {
    page: Option<usize>,
}

#[post("/merchants/{merchant_id}/sync")]
pub async fn sync_merchant(
    merchant_id: web::Path<i32>,
    state: web::Data<AppState>,
) -> impl Responder {
    let result = sync_service::sync_merchant(
        merchant_id.into_inner(),
        &state.repo,
        &state.source,
        &state.locks,
        &state.clock,
    )
    .await;
    json_response(result)
}

#[get("/merchants/{merchant_id}/stats")]
pub async fn merchant_stats(
    merchant_id: web::Path<i32>,
    state: web::Data<AppState>,
) -> impl Responder {
    json_response(staging_service::merchant_stats(
        merchant_id.into_inner(),
        &state.repo,
    ))
}

#[get("/merchants/{merchant_id}/products")]
pub async fn merchant_products(
    merchant_id: web::Path<i32>,
    params: web::Query<ProductsQueryParams>,
    state: web::Data<AppState>,
) -> impl Responder {
    let tab = staging_service::ProductTab::parse(params.tab.as_deref());
    json_response(staging_service::list_tab(
        merchant_id.into_inner(),
        tab,
        params.q.as_deref(),
        params.page.unwrap_or(1),
        &state.repo,
    ))
}

#[get("/merchants/{merchant_id}/staging")]
pub async fn merchant_staging(
    merchant_id: web::Path<i32>,
    params: web::Query<PageQueryParams>,
    state: web::Data<AppState>,
) -> impl Responder {
    json_response(staging_service::list_staging(
        merchant_id.into_inner(),
        params.page.unwrap_or(1),
        &state.repo,
    ))
}

#[get("/merchants/{merchant_id}/issues")]
pub async fn merchant_issues(
    merchant_id: web::Path<i32>,
    params: web::Query<PageQueryParams>,
    state: web::Data<AppState>,
) -> impl Responder {
    json_response(staging_service::list_issues(
        merchant_id.into_inner(),
        params.page.unwrap_or(1),
        &state.repo,
    ))
}

#[post("/merchants/{merchant_id}/products/{staging_id}/resync")]
pub async fn resync_product(
    path: web::Path<(i32, i32)>,
    state: web::Data<AppState>,
) -> impl Responder {
    let (merchant_id, staging_id) = path.into_inner();
    match staging_service::mark_pending_sync(merchant_id, staging_id, &state.repo, &state.clock) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => crate::routes::error_response(&err),
    }
}
