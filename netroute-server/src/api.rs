//! HTTP handlers and error mapping

use std::{sync::Arc, time::Duration};

use axum::{
    Json, Router,
    error_handling::HandleErrorLayer,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use geojson::FeatureCollection;
use netroute_core::{
    Coordinate, Error, RouteResult, RouterConfig, route_network, source::fetch_network,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower::{BoxError, ServiceBuilder};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::catalog::CatalogSource;

#[derive(Clone, Default)]
pub struct AppState {
    /// Used when a request carries no `options`
    pub router: RouterConfig,
    pub catalog: Option<Arc<CatalogSource>>,
}

#[derive(Debug, Deserialize)]
pub struct RouteBody {
    pub waypoints: Vec<Coordinate>,
    pub network: FeatureCollection,
    #[serde(default)]
    pub options: Option<RouterConfig>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogRouteBody {
    pub waypoints: Vec<Coordinate>,
    /// Feature types to read from the catalogue, e.g. `["water"]`
    pub classes: Vec<String>,
    /// Accepted `class` property values, replacing the catalogue's own list.
    /// An empty list keeps every feature.
    #[serde(default)]
    pub feature_classes: Option<Vec<String>>,
    #[serde(default)]
    pub options: Option<RouterConfig>,
}

#[derive(Debug, Serialize)]
pub struct RouteResponse {
    #[serde(flatten)]
    pub result: RouteResult,
    pub total_distance_km: f64,
    pub complete: bool,
    pub geojson: FeatureCollection,
}

impl RouteResponse {
    fn new(result: RouteResult) -> Result<Self, ApiError> {
        let geojson = result.to_geojson()?;
        Ok(Self {
            total_distance_km: result.total_distance_km(),
            complete: result.is_complete(),
            result,
            geojson,
        })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Routing(#[from] Error),
    #[error("No network catalogue is configured")]
    CatalogUnavailable,
    #[error("Routing task failed: {0}")]
    Task(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Routing(Error::NoWaypoints | Error::InvalidData(_) | Error::UnknownVertex(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Routing(Error::UpstreamRetrieval(_)) => StatusCode::BAD_GATEWAY,
            ApiError::CatalogUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, status = status.as_u16(), "request failed");
        } else {
            warn!(error = %self, status = status.as_u16(), "request rejected");
        }
        let body = json!({ "error": self.to_string(), "status": status.as_u16() });
        (status, Json(body)).into_response()
    }
}

pub fn app(state: AppState, timeout: Duration, max_concurrent_requests: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/route", post(route_handler))
        .route("/route/catalog", post(catalog_route_handler))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(timeout)
                .concurrency_limit(max_concurrent_requests.max(1)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn handle_middleware_error(err: BoxError) -> (StatusCode, Json<serde_json::Value>) {
    let status = if err.is::<tower::timeout::error::Elapsed>() {
        StatusCode::REQUEST_TIMEOUT
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (
        status,
        Json(json!({ "error": err.to_string(), "status": status.as_u16() })),
    )
}

async fn health() -> &'static str {
    "ok"
}

/// Graph building and search are CPU bound and run on the blocking pool.
async fn route_blocking(
    network: FeatureCollection,
    waypoints: Vec<Coordinate>,
    config: RouterConfig,
) -> Result<Json<RouteResponse>, ApiError> {
    let result = tokio::task::spawn_blocking(move || route_network(&network, &waypoints, &config))
        .await
        .map_err(|e| ApiError::Task(e.to_string()))??;

    info!(
        segments = result.segments.len(),
        failed = result.failed.len(),
        unsnapped = result.unsnapped.len(),
        "route computed"
    );
    Ok(Json(RouteResponse::new(result)?))
}

async fn route_handler(
    State(state): State<AppState>,
    Json(body): Json<RouteBody>,
) -> Result<Json<RouteResponse>, ApiError> {
    info!(
        waypoints = body.waypoints.len(),
        features = body.network.features.len(),
        "handling route request"
    );
    let config = body.options.unwrap_or(state.router);
    route_blocking(body.network, body.waypoints, config).await
}

async fn catalog_route_handler(
    State(state): State<AppState>,
    Json(body): Json<CatalogRouteBody>,
) -> Result<Json<RouteResponse>, ApiError> {
    let Some(catalog) = state.catalog else {
        return Err(ApiError::CatalogUnavailable);
    };
    let catalog = match body.feature_classes {
        Some(feature_classes) => catalog.with_feature_classes(feature_classes),
        None => catalog.as_ref().clone(),
    };
    info!(
        waypoints = body.waypoints.len(),
        classes = ?body.classes,
        feature_classes = ?catalog.feature_classes(),
        release = catalog.release_version(),
        "handling catalogue route request"
    );

    let config = body.options.unwrap_or(state.router);
    let network = fetch_network(
        &catalog,
        &body.waypoints,
        &body.classes,
        catalog.margin_deg(),
    )
    .await?;
    route_blocking(network, body.waypoints, config).await
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::Request,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::catalog::tests::write_catalogue;

    fn test_app(state: AppState) -> Router {
        app(state, Duration::from_secs(5), 4)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, bytes) = send(app, request).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn river() -> Value {
        json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"class": "river"},
                "geometry": {"type": "LineString",
                             "coordinates": [[0.0, 0.0], [0.01, 0.0], [0.02, 0.0]]}
            }]
        })
    }

    #[tokio::test]
    async fn health_answers_ok() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(test_app(AppState::default()), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"ok");
    }

    #[tokio::test]
    async fn routes_over_posted_network() {
        let (status, body) = post_json(
            test_app(AppState::default()),
            "/route",
            json!({"waypoints": [[0.0, 0.0], [0.02, 0.0]], "network": river()}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["segments"].as_array().unwrap().len(), 1);
        assert_eq!(
            body["segments"][0]["coordinates"],
            json!([[0.0, 0.0], [0.01, 0.0], [0.02, 0.0]])
        );
        assert_eq!(body["complete"], json!(true));
        assert_eq!(body["geojson"]["type"], "FeatureCollection");
    }

    #[tokio::test]
    async fn request_options_replace_server_defaults() {
        let (status, body) = post_json(
            test_app(AppState::default()),
            "/route",
            json!({
                "waypoints": [[0.0, 0.0], [0.02, 0.0]],
                "network": river(),
                "options": {"route": {"densify_spacing_m": 500.0}}
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        // About 2.2 km at 500 m spacing gives several consecutive pairs.
        assert!(body["segments"].as_array().unwrap().len() > 1);
    }

    #[tokio::test]
    async fn empty_waypoints_are_a_bad_request() {
        let (status, body) = post_json(
            test_app(AppState::default()),
            "/route",
            json!({"waypoints": [], "network": river()}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);
    }

    #[tokio::test]
    async fn sub_meter_densify_spacing_is_a_bad_request() {
        let (status, body) = post_json(
            test_app(AppState::default()),
            "/route",
            json!({
                "waypoints": [[0.0, 0.0], [0.02, 0.0]],
                "network": river(),
                "options": {"route": {"densify_spacing_m": 1e-300}}
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);
    }

    #[tokio::test]
    async fn catalogue_route_needs_a_catalogue() {
        let (status, _) = post_json(
            test_app(AppState::default()),
            "/route/catalog",
            json!({"waypoints": [[0.1, 0.0], [0.3, 0.0]], "classes": ["water"]}),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn routes_over_catalogue_network() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState {
            catalog: Some(Arc::new(write_catalogue(dir.path()))),
            ..AppState::default()
        };

        let (status, body) = post_json(
            test_app(state),
            "/route/catalog",
            json!({"waypoints": [[0.1, 0.0], [0.3, 0.0]], "classes": ["water"]}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["segments"][0]["coordinates"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn request_feature_classes_replace_the_catalogue_default() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState {
            catalog: Some(Arc::new(write_catalogue(dir.path()))),
            ..AppState::default()
        };
        let waypoints = json!([[0.1, 0.0005], [0.3, 0.0005]]);

        let (status, body) = post_json(
            test_app(state.clone()),
            "/route/catalog",
            json!({"waypoints": waypoints, "classes": ["water"], "feature_classes": ["canal"]}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["segments"][0]["coordinates"],
            json!([[0.1, 0.0005], [0.3, 0.0005]])
        );

        // The default classes drop the canal, leaving only the river 55 m away.
        let (status, body) = post_json(
            test_app(state),
            "/route/catalog",
            json!({"waypoints": waypoints, "classes": ["water"]}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["segments"][0]["coordinates"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn unreadable_catalogue_file_is_a_bad_gateway() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState {
            catalog: Some(Arc::new(write_catalogue(dir.path()))),
            ..AppState::default()
        };

        let (status, _) = post_json(
            test_app(state),
            "/route/catalog",
            json!({"waypoints": [[-0.5, 0.0], [-0.2, 0.0]], "classes": ["water"]}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }
}
