//! Router assembly from the HTTP contract snapshot.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::routing::{MethodFilter, MethodRouter, get};
use axum::{Json, Router};
use serde_json::{Map, Value, json};
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use console_core::ServiceRegistry;
use console_protocols::http::{HttpContract, HttpMethod};
use console_protocols::service::ServiceArgs;

use crate::error::ApiError;

/// Path of the built-in health route.
pub const HEALTH_PATH: &str = "/health";

#[derive(Clone)]
struct GatewayState {
    services: Arc<ServiceRegistry>,
    routes: usize,
}

/// Build a router serving `contracts` through `services`.
///
/// Contracts sharing a path are merged into one method router. A contract
/// whose path axum cannot mount, or that shadows `GET /health`, is skipped.
pub fn build_router(contracts: &[HttpContract], services: Arc<ServiceRegistry>) -> Router {
    let mut by_path: BTreeMap<String, MethodRouter<GatewayState>> = BTreeMap::new();
    by_path.insert(HEALTH_PATH.to_string(), get(health));

    let mut mounted = 0;
    for contract in contracts {
        if contract.path == HEALTH_PATH && contract.method == HttpMethod::Get {
            warn!(service = %contract.service, "Contract shadows the health route, skipped");
            continue;
        }
        if !is_mountable(&contract.path) {
            warn!(path = %contract.path, service = %contract.service, "Unmountable contract path, skipped");
            continue;
        }

        let service = contract.service.clone();
        let handler = move |State(state): State<GatewayState>,
                            params: Option<Path<HashMap<String, String>>>,
                            Query(query): Query<HashMap<String, String>>,
                            body: Bytes| {
            let service = service.clone();
            async move {
                let params = params.map(|Path(p)| p).unwrap_or_default();
                dispatch(&state, &service, params, query, &body).await
            }
        };

        let method_router = by_path
            .remove(&contract.path)
            .unwrap_or_else(MethodRouter::new)
            .on(method_filter(contract.method), handler);
        by_path.insert(contract.path.clone(), method_router);

        debug!(method = %contract.method, path = %contract.path, service = %contract.service, "Route mounted");
        mounted += 1;
    }

    let mut router = Router::new();
    for (path, method_router) in by_path {
        router = router.route(&path, method_router);
    }

    router
        .layer(TraceLayer::new_for_http())
        .with_state(GatewayState {
            services,
            routes: mounted,
        })
}

fn method_filter(method: HttpMethod) -> MethodFilter {
    match method {
        HttpMethod::Get => MethodFilter::GET,
        HttpMethod::Post => MethodFilter::POST,
        HttpMethod::Put => MethodFilter::PUT,
        HttpMethod::Patch => MethodFilter::PATCH,
        HttpMethod::Delete => MethodFilter::DELETE,
    }
}

/// Whether axum accepts `path`: parameters only as whole `{name}` segments.
fn is_mountable(path: &str) -> bool {
    path.starts_with('/')
        && path.split('/').skip(1).all(|segment| {
            if segment.starts_with(':') || segment.starts_with('*') {
                return false;
            }
            let opens = segment.matches('{').count();
            let closes = segment.matches('}').count();
            match (opens, closes) {
                (0, 0) => true,
                (1, 1) => {
                    segment.len() > 2
                        && segment.starts_with('{')
                        && segment.ends_with('}')
                        && !segment[1..].starts_with('*')
                }
                _ => false,
            }
        })
}

/// Merge request parts into keyword arguments and call the service.
///
/// Path parameters override query parameters, which override body fields.
async fn dispatch(
    state: &GatewayState,
    service: &str,
    params: HashMap<String, String>,
    query: HashMap<String, String>,
    body: &Bytes,
) -> Result<Json<Value>, ApiError> {
    let mut kwargs = parse_body(body)?;
    for (key, value) in query.into_iter().chain(params) {
        kwargs.insert(key, Value::String(value));
    }

    let result = state
        .services
        .call(service, ServiceArgs::from_kwargs(kwargs))
        .await?;
    Ok(Json(result))
}

fn parse_body(body: &Bytes) -> Result<Map<String, Value>, ApiError> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Map::new());
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))?;
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err(ApiError::BadRequest(
            "Request body must be a JSON object".to_string(),
        )),
    }
}

async fn health(State(state): State<GatewayState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "routes": state.routes,
        "services": state.services.len(),
    }))
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
