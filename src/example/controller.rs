//! HTTP handlers for `/{namespace}/examples`.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tracing::Span;
use uuid::Uuid;

use crate::example::entity::{ExampleRequest, ExampleResource};
use crate::example::service::ExampleService;
use crate::http::response::{ApiError, Envelope};
use crate::query::{ListParams, QueryHandler};

#[derive(Debug)]
pub struct ExampleController {
    service: Arc<ExampleService>,
    query: Arc<QueryHandler>,
    span: Span,
}

impl ExampleController {
    pub fn new(service: Arc<ExampleService>, query: Arc<QueryHandler>, span: Span) -> Self {
        Self { service, query, span }
    }

    /// Routes relative to the mount point.
    pub fn routes(self: &Arc<Self>) -> Router {
        Router::new()
            .route("/", get(list).post(create))
            .route("/{id}", get(detail).patch(update).delete(remove))
            .with_state(Arc::clone(self))
    }
}

async fn list(
    State(ctrl): State<Arc<ExampleController>>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let query = ctrl.query.resolve(params);
    let page = ctrl.service.list(&query).await?;

    let meta = json!({
        "paging": { "limit": page.limit, "offset": page.offset, "total": page.total }
    });
    let data: Vec<ExampleResource> = page.items.into_iter().map(Into::into).collect();
    Ok(Json(Envelope::with_meta(data, meta)))
}

async fn detail(
    State(ctrl): State<Arc<ExampleController>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let entity = ctrl.service.detail(id).await?;
    Ok(Json(Envelope::data(ExampleResource::from(entity))))
}

async fn create(
    State(ctrl): State<Arc<ExampleController>>,
    Json(body): Json<ExampleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let entity = ctrl.service.create(&body).await?;
    ctrl.span
        .in_scope(|| tracing::debug!(id = %entity.id, "create handled"));
    Ok((StatusCode::CREATED, Json(Envelope::data(ExampleResource::from(entity)))))
}

async fn update(
    State(ctrl): State<Arc<ExampleController>>,
    Path(id): Path<Uuid>,
    Json(body): Json<ExampleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let entity = ctrl.service.update(id, &body).await?;
    Ok(Json(Envelope::data(ExampleResource::from(entity))))
}

async fn remove(
    State(ctrl): State<Arc<ExampleController>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    ctrl.service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
