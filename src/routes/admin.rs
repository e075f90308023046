use actix_web::{Responder, get, post, web};
use serde::Deserialize;

use crate::forms::review::ReviewDecisionForm;
use crate::routes::{AppState, json_response};
use crate::services::{admin as admin_service, review as review_service};

#[derive(Deserialize, Debug)]
struct QueueQueryParams {
    status: Option<String>,
    page: Option<usize>,
}

#[derive(Deserialize, Debug)]
struct PageQueryParams {
    page: Option<usize>,
}

#[derive(Deserialize, Debug)]
struct SearchQueryParams {
    q: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct MatchQueryParams {
    target_master_id: i32,
}

#[get("/admin/stats")]
pub async fn admin_stats(state: web::Data<AppState>) -> impl Responder {
    json_response(admin_service::admin_stats(&state.repo, &state.clock))
}

#[get("/admin/queue")]
pub async fn review_queue(
    params: web::Query<QueueQueryParams>,
    state: web::Data<AppState>,
) -> impl Responder {
    json_response(admin_service::review_queue(
        params.status.as_deref(),
        params.page.unwrap_or(1),
        &state.repo,
    ))
}

#[get("/admin/review/{staging_id}")]
pub async fn staging_detail(
    staging_id: web::Path<i32>,
    state: web::Data<AppState>,
) -> impl Responder {
    json_response(admin_service::staging_detail(
        staging_id.into_inner(),
        &state.repo,
    ))
}

#[get("/admin/review/{staging_id}/variants/match")]
pub async fn variant_matches(
    staging_id: web::Path<i32>,
    params: web::Query<MatchQueryParams>,
    state: web::Data<AppState>,
) -> impl Responder {
    json_response(admin_service::variant_match_suggestions(
        staging_id.into_inner(),
        params.target_master_id,
        &state.repo,
    ))
}

#[post("/admin/review/{staging_id}/decision")]
pub async fn submit_decision(
    staging_id: web::Path<i32>,
    form: web::Json<ReviewDecisionForm>,
    state: web::Data<AppState>,
) -> impl Responder {
    json_response(review_service::submit_decision(
        staging_id.into_inner(),
        form.into_inner(),
        &state.repo,
        &state.clock,
    ))
}

#[get("/admin/products")]
pub async fn list_master_products(
    params: web::Query<PageQueryParams>,
    state: web::Data<AppState>,
) -> impl Responder {
    json_response(admin_service::list_master_products(
        params.page.unwrap_or(1),
        &state.repo,
    ))
}

#[get("/admin/products/search")]
pub async fn search_master_products(
    params: web::Query<SearchQueryParams>,
    state: web::Data<AppState>,
) -> impl Responder {
    json_response(admin_service::search_master_products(
        params.q.as_deref(),
        &state.repo,
    ))
}

#[get("/admin/products/{product_id}/variants")]
pub async fn list_master_variants(
    product_id: web::Path<i32>,
    state: web::Data<AppState>,
) -> impl Responder {
    json_response(admin_service::list_master_variants(
        product_id.into_inner(),
        &state.repo,
    ))
}
