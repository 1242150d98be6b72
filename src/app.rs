//! Active dashboard HTTP API.

use crate::app_state::{AppState, SharedAppState};
use crate::cli::CommandLineArgs;
use crate::dashboards::{
    self, AdminDashboard, InnovatorDashboard, MinistryDashboard, VillageDashboard,
};
use crate::dataset::Dataset;
use crate::error::DashboardError;
use crate::metrics::{metrics_handler, record_response_metrics, request_counter};
use crate::models::Schema;
use crate::operation::Operation;
use crate::operations;
use crate::validated_json::ValidatedJson;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode, Uri},
    routing::{delete, get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info_span, warn};

/// Initialise the application.
///
/// Builds the global Rayon thread pool when aggregations run on Rayon.
pub fn init(args: &CommandLineArgs) {
    if args.use_rayon {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(threads) = args.thread_limit {
            builder = builder.num_threads(threads);
        }
        if let Err(err) = builder.build_global() {
            warn!("failed to configure the Rayon thread pool: {err}");
        }
    }
}

/// Returns an [axum::Router] for the dashboard API
///
/// The router is populated with all routes as well as the following middleware:
///
/// * a [tower_http::trace::TraceLayer] for tracing requests and responses, tagging each request
///   with a request ID and recording Prometheus metrics
///
/// # Arguments
///
/// * `state`: Shared application state
pub fn router(state: SharedAppState) -> Router {
    fn v1() -> Router<SharedAppState> {
        Router::new()
            .route("/rank", post(operation_handler::<operations::Rank>))
            .route(
                "/top/villages",
                post(operation_handler::<operations::TopVillages>),
            )
            .route(
                "/top/innovations",
                post(operation_handler::<operations::TopInnovations>),
            )
            .route(
                "/top/innovators",
                post(operation_handler::<operations::TopInnovators>),
            )
            .route("/provinces", post(operation_handler::<operations::Provinces>))
            .route("/years", post(operation_handler::<operations::Years>))
            .route(
                "/categories",
                post(operation_handler::<operations::Categories>),
            )
            .route("/claims", post(operation_handler::<operations::Claims>))
            .route("/dashboard/admin", get(admin_dashboard))
            .route("/dashboard/ministry", get(ministry_dashboard))
            .route("/dashboard/innovator/:id", get(innovator_dashboard))
            .route("/dashboard/village/:id", get(village_dashboard))
            .route("/cache", delete(clear_cache))
    }

    Router::new()
        .route("/.well-known/desa-dashboard-schema", get(schema))
        .route("/metrics", get(metrics_handler))
        .nest("/v1", v1())
        .fallback(unsupported)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|_request: &Request<Body>| {
                    info_span!("http-request", request_id = %uuid::Uuid::new_v4())
                })
                .on_request(request_counter)
                .on_response(record_response_metrics),
        )
        .with_state(state)
}

/// The dashboard service type.
pub type Service = NormalizePath<Router>;

/// Returns a [crate::app::Service] for the dashboard API
///
/// The service is populated with all routes as well as the following middleware:
///
/// * a [tower_http::normalize_path::NormalizePathLayer] for trimming trailing slashes from
///   requests
///
/// # Arguments
///
/// * `args`: Command line arguments
pub fn service(args: &CommandLineArgs) -> Result<Service, DashboardError> {
    let state = Arc::new(AppState::new(args)?);
    Ok(wrap(router(state)))
}

/// Apply the service-level middleware to a router.
fn wrap(router: Router) -> Service {
    NormalizePathLayer::trim_trailing_slash().layer(router)
}

/// Describe the API.
async fn schema() -> Json<Schema> {
    Json(Schema {
        version: env!("CARGO_PKG_VERSION"),
        operations: operations::NAMES.to_vec(),
        dashboards: dashboards::NAMES.to_vec(),
    })
}

/// Handler for requests to unknown paths.
async fn unsupported(uri: Uri) -> DashboardError {
    DashboardError::UnsupportedOperation {
        operation: uri.path().to_string(),
    }
}

/// Run an aggregation over a dataset.
///
/// A task permit is held while the aggregation runs, on the Rayon thread pool if enabled.
async fn aggregate<F, R>(state: &AppState, dataset: Dataset, f: F) -> Result<R, DashboardError>
where
    F: FnOnce(&Dataset) -> Result<R, DashboardError> + Send + 'static,
    R: Send + 'static,
{
    let _task_permit = state.resource_manager.task().await?;
    if state.args.use_rayon {
        tokio_rayon::spawn(move || f(&dataset)).await
    } else {
        f(&dataset)
    }
}

/// Load the full dataset from the document store.
async fn dataset(state: &AppState) -> Result<Dataset, DashboardError> {
    let dataset = state
        .document_store
        .dataset(&state.resource_manager)
        .await?;
    debug!(
        villages = dataset.villages.len(),
        innovators = dataset.innovators.len(),
        innovations = dataset.innovations.len(),
        claims = dataset.claims.len(),
        memory = dataset.memory(),
        "loaded dataset"
    );
    Ok(dataset)
}

/// Handler for dashboard operations
///
/// Loads the dataset and executes the requested operation on it. The response is the JSON output
/// of the operation.
///
/// # Arguments
///
/// * `state`: Shared application state
/// * `request`: Validated request data of the operation
async fn operation_handler<T: Operation>(
    State(state): State<SharedAppState>,
    ValidatedJson(request): ValidatedJson<T::Request>,
) -> Result<Json<T::Output>, DashboardError> {
    debug!(operation = T::NAME, "executing operation");
    let dataset = dataset(&state).await?;
    let output = aggregate(&state, dataset, move |dataset| {
        T::execute(&request, dataset)
    })
    .await?;
    Ok(Json(output))
}

async fn admin_dashboard(
    State(state): State<SharedAppState>,
) -> Result<Json<AdminDashboard>, DashboardError> {
    let dataset = dataset(&state).await?;
    let dashboard = aggregate(&state, dataset, |dataset| Ok(dashboards::admin(dataset))).await?;
    Ok(Json(dashboard))
}

async fn ministry_dashboard(
    State(state): State<SharedAppState>,
) -> Result<Json<MinistryDashboard>, DashboardError> {
    let dataset = dataset(&state).await?;
    let dashboard =
        aggregate(&state, dataset, |dataset| Ok(dashboards::ministry(dataset))).await?;
    Ok(Json(dashboard))
}

/// Dashboard of an innovator, built from the documents reachable from it only.
async fn innovator_dashboard(
    State(state): State<SharedAppState>,
    Path(id): Path<String>,
) -> Result<Json<InnovatorDashboard>, DashboardError> {
    let dataset =
        dashboards::innovator_dataset(&state.document_store, &state.resource_manager, &id).await?;
    let dashboard = aggregate(&state, dataset, move |dataset| {
        dashboards::innovator(dataset, &id)
    })
    .await?;
    Ok(Json(dashboard))
}

/// Dashboard of a village. Ranking the village needs every village, so the full dataset is loaded.
async fn village_dashboard(
    State(state): State<SharedAppState>,
    Path(id): Path<String>,
) -> Result<Json<VillageDashboard>, DashboardError> {
    let dataset = dataset(&state).await?;
    let dashboard = aggregate(&state, dataset, move |dataset| {
        dashboards::village(dataset, &id)
    })
    .await?;
    Ok(Json(dashboard))
}

/// Drop all cached source responses.
async fn clear_cache(State(state): State<SharedAppState>) -> StatusCode {
    state.document_store.clear_cache();
    StatusCode::NO_CONTENT
}
