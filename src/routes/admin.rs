//! Admin routes built from the registry.
//! Paths are registered literally per model and operation, so excluded operations
//! have no route at all and fall through to 404.

use crate::extractors::{run_guards, Guards};
use crate::handlers::{dispatch, index, listing, op_view_get, op_view_post};
use crate::model::ModelDescriptor;
use crate::state::{AppState, ModelState, OperationState};
use axum::{middleware, routing::get, Router};
use std::sync::Arc;

fn model_routes(state: &AppState, model: &Arc<ModelDescriptor>) -> Router {
    let settings = &state.settings;
    let listing_path = settings.url(&format!("/{}", model.name()));
    let api_path = settings.url(&format!("/api/{}", model.name()));

    let ms = ModelState {
        app: state.clone(),
        model: model.clone(),
    };
    let mut router: Router = Router::new()
        .route(&format!("{}/", listing_path), get(listing))
        .route(&listing_path, get(listing))
        .route(
            &api_path,
            get(dispatch).post(dispatch).put(dispatch).delete(dispatch),
        )
        .with_state(ms);

    for op in model.operations() {
        let path = settings.url(&format!("/{}", model.operation(op).route()));
        tracing::info!(
            endpoint = %model.operation(op).endpoint_with(&settings.name),
            path = %path,
            "registered operation view"
        );
        let os = OperationState {
            app: state.clone(),
            model: model.clone(),
            operation: op,
        };
        router = router.merge(
            Router::new()
                .route(&path, get(op_view_get).post(op_view_post))
                .with_state(os),
        );
    }
    tracing::info!(model = %model.name(), path = %api_path, "registered api");

    if model.guards().is_empty() {
        return router;
    }
    let guards: Guards = model.guards().iter().cloned().collect();
    router.route_layer(middleware::from_fn_with_state(guards, run_guards))
}

/// Index, listing, operation views and JSON API for every registered model.
pub fn admin_routes(state: AppState) -> Router {
    let prefix = state.settings.url_prefix.clone();
    let mut router = Router::new().route(&format!("{}/", prefix), get(index));
    if !prefix.is_empty() {
        router = router.route(&prefix, get(index));
    }
    let mut router: Router = router.with_state(state.clone());
    for model in state.registry.models() {
        router = router.merge(model_routes(&state, model));
    }
    router
}
