use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use beacon_dns_domain::{DomainError, RecordTable};
use beacon_dns_infrastructure::providers::ApiProvider;
use tracing::{info, warn};

use crate::dto::record::{AcmeChallengeBody, RecordBody};
use crate::errors::ApiError;
use crate::state::AppState;

pub fn routes(provider_enabled: bool) -> Router<AppState> {
    let records = if provider_enabled {
        get(get_records).post(add_record).delete(delete_record)
    } else {
        get(get_records)
    };

    let mut router = Router::new().route("/records", records);
    if provider_enabled {
        router = router
            .route("/records/present", post(present))
            .route("/records/cleanup", post(cleanup));
    }
    router
}

async fn get_records(State(state): State<AppState>) -> Json<RecordTable> {
    Json(state.records.load().as_ref().clone())
}

async fn add_record(
    State(state): State<AppState>,
    body: Result<Json<RecordBody>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let record = parse_body(body)?.into_record();
    let provider = push_provider(&state)?;

    provider.add_record(record.clone()).await.map_err(log_rejection)?;

    info!(name = %record.name, record_type = %record.rtype, "record added via push API");
    Ok(StatusCode::CREATED)
}

async fn delete_record(
    State(state): State<AppState>,
    body: Result<Json<RecordBody>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let record = parse_body(body)?.into_record();
    let provider = push_provider(&state)?;

    provider
        .delete_record(record.clone())
        .await
        .map_err(log_rejection)?;

    info!(name = %record.name, record_type = %record.rtype, "record deleted via push API");
    Ok(StatusCode::OK)
}

async fn present(
    State(state): State<AppState>,
    body: Result<Json<AcmeChallengeBody>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let body = parse_body(body)?;
    let provider = push_provider(&state)?;

    provider
        .present(body.fqdn.clone(), body.value)
        .await
        .map_err(log_rejection)?;

    info!(fqdn = %body.fqdn, "challenge record published");
    Ok(StatusCode::CREATED)
}

async fn cleanup(
    State(state): State<AppState>,
    body: Result<Json<AcmeChallengeBody>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let body = parse_body(body)?;
    let provider = push_provider(&state)?;

    provider
        .cleanup(body.fqdn.clone(), body.value)
        .await
        .map_err(log_rejection)?;

    info!(fqdn = %body.fqdn, "challenge record removed");
    Ok(StatusCode::OK)
}

fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match body {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            warn!(error = %rejection, "did not receive record data");
            Err(ApiError(DomainError::Parse(rejection.body_text())))
        }
    }
}

fn push_provider(state: &AppState) -> Result<Arc<ApiProvider>, ApiError> {
    state
        .provider
        .clone()
        .ok_or(ApiError(DomainError::ChannelClosed))
}

fn log_rejection(err: DomainError) -> ApiError {
    warn!(%err, "push API mutation rejected");
    ApiError(err)
}
