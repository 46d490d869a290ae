use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use shared::{
    responses::{ApiResponse, EmptyApiResponse},
    types::CalendarEntry,
};
use uuid::Uuid;

use crate::{
    api::state::AvailabilityAppState,
    domain::availability::{
        AssignDates, AssignRange, CalendarQuery, ConflictCheck, RangeQuery, RemovedEntries,
        ReserveRange, WrittenDays,
    },
    error::AvailabilityServiceError,
};

#[utoipa::path(
    post,
    path = "/api/v1/workers/{id}/calendar",
    tag = "Calendar",
    operation_id = "provision_calendar",
    params(
        ("id" = Uuid, Path, description = "Worker ID")
    ),
    responses(
        (status = 200, description = "Empty calendar provisioned", body = EmptyApiResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn provision(
    State(state): State<Arc<AvailabilityAppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AvailabilityServiceError> {
    state.availability_service.provision(id).await?;

    Ok(Json(ApiResponse::ok(())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/workers/{id}/calendar",
    tag = "Calendar",
    operation_id = "destroy_calendar",
    params(
        ("id" = Uuid, Path, description = "Worker ID")
    ),
    responses(
        (status = 200, description = "Calendar and entries removed", body = EmptyApiResponse),
        (status = 404, description = "Calendar not found")
    )
)]
#[tracing::instrument(skip(state))]
pub async fn destroy(
    State(state): State<Arc<AvailabilityAppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AvailabilityServiceError> {
    state.availability_service.destroy(id).await?;

    Ok(Json(ApiResponse::ok(())))
}

#[utoipa::path(
    get,
    path = "/api/v1/workers/{id}/calendar",
    tag = "Calendar",
    operation_id = "query_calendar",
    params(
        ("id" = Uuid, Path, description = "Worker ID"),
        CalendarQuery
    ),
    responses(
        (status = 200, description = "Entries matching all filters, ascending by date", body = ApiResponse<Vec<CalendarEntry>>),
        (status = 404, description = "Calendar not found")
    )
)]
#[tracing::instrument(skip(state, filter))]
pub async fn query(
    State(state): State<Arc<AvailabilityAppState>>,
    Path(id): Path<Uuid>,
    Query(filter): Query<CalendarQuery>,
) -> Result<Json<ApiResponse<Vec<CalendarEntry>>>, AvailabilityServiceError> {
    let output = state.availability_service.query(id, filter).await?;

    Ok(Json(ApiResponse::ok(output)))
}

#[utoipa::path(
    put,
    path = "/api/v1/workers/{id}/calendar/range",
    tag = "Calendar",
    operation_id = "assign_range",
    params(
        ("id" = Uuid, Path, description = "Worker ID")
    ),
    request_body = AssignRange,
    responses(
        (status = 200, description = "Every day in the range overwritten", body = ApiResponse<WrittenDays>),
        (status = 400, description = "Invalid range"),
        (status = 404, description = "Calendar not found")
    )
)]
#[tracing::instrument(skip(state, req))]
pub async fn assign_range(
    State(state): State<Arc<AvailabilityAppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<AssignRange>,
) -> Result<Json<ApiResponse<WrittenDays>>, AvailabilityServiceError> {
    let days_written = state.availability_service.assign_range(id, req).await?;

    Ok(Json(ApiResponse::ok(WrittenDays { days_written })))
}

#[utoipa::path(
    put,
    path = "/api/v1/workers/{id}/calendar/dates",
    tag = "Calendar",
    operation_id = "assign_dates",
    params(
        ("id" = Uuid, Path, description = "Worker ID")
    ),
    request_body = AssignDates,
    responses(
        (status = 200, description = "Every listed day overwritten", body = ApiResponse<WrittenDays>),
        (status = 400, description = "Empty date list"),
        (status = 404, description = "Calendar not found")
    )
)]
#[tracing::instrument(skip(state, req))]
pub async fn assign_dates(
    State(state): State<Arc<AvailabilityAppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<AssignDates>,
) -> Result<Json<ApiResponse<WrittenDays>>, AvailabilityServiceError> {
    let days_written = state.availability_service.assign_dates(id, req).await?;

    Ok(Json(ApiResponse::ok(WrittenDays { days_written })))
}

#[utoipa::path(
    delete,
    path = "/api/v1/workers/{id}/calendar/range",
    tag = "Calendar",
    operation_id = "delete_range",
    params(
        ("id" = Uuid, Path, description = "Worker ID"),
        RangeQuery
    ),
    responses(
        (status = 200, description = "Entries in the range removed", body = ApiResponse<RemovedEntries>),
        (status = 400, description = "Invalid range"),
        (status = 404, description = "Calendar not found")
    )
)]
#[tracing::instrument(skip(state, range))]
pub async fn delete_range(
    State(state): State<Arc<AvailabilityAppState>>,
    Path(id): Path<Uuid>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<ApiResponse<RemovedEntries>>, AvailabilityServiceError> {
    let entries_removed = state
        .availability_service
        .delete_range(id, range.start_date, range.end_date)
        .await?;

    Ok(Json(ApiResponse::ok(RemovedEntries { entries_removed })))
}

#[utoipa::path(
    get,
    path = "/api/v1/workers/{id}/calendar/conflicts",
    tag = "Calendar",
    operation_id = "check_conflicts",
    params(
        ("id" = Uuid, Path, description = "Worker ID"),
        RangeQuery
    ),
    responses(
        (status = 200, description = "Whether the range is free of booked days", body = ApiResponse<ConflictCheck>),
        (status = 400, description = "Invalid range"),
        (status = 404, description = "Calendar not found")
    )
)]
#[tracing::instrument(skip(state, range))]
pub async fn check_conflicts(
    State(state): State<Arc<AvailabilityAppState>>,
    Path(id): Path<Uuid>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<ApiResponse<ConflictCheck>>, AvailabilityServiceError> {
    let is_available = state
        .availability_service
        .check_conflict(id, range.start_date, range.end_date)
        .await?;

    Ok(Json(ApiResponse::ok(ConflictCheck { is_available })))
}

#[utoipa::path(
    post,
    path = "/api/v1/workers/{id}/calendar/reservations",
    tag = "Calendar",
    operation_id = "reserve_range",
    params(
        ("id" = Uuid, Path, description = "Worker ID")
    ),
    request_body = ReserveRange,
    responses(
        (status = 201, description = "Booking committed, days marked occupied", body = ApiResponse<WrittenDays>),
        (status = 404, description = "Calendar not found"),
        (status = 409, description = "A day in the range is already booked")
    )
)]
#[tracing::instrument(skip(state, req))]
pub async fn reserve(
    State(state): State<Arc<AvailabilityAppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReserveRange>,
) -> Result<impl IntoResponse, AvailabilityServiceError> {
    let days_written = state.availability_service.reserve_range(id, req).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(WrittenDays { days_written })),
    ))
}
