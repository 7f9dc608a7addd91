use std::sync::Arc;

use axum::routing::post;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::context::ServerContext;

pub mod campaigns;
pub mod credentials;
pub mod error;
pub mod send;

pub use error::ApiError;

pub fn router(ctx: Arc<ServerContext>) -> Router {
    Router::new()
        .route("/api/mensajes/send", post(send::enviar))
        .route("/api/mensajes/send-bulk", post(send::enviar_masivo))
        .route("/api/campanas/{id}/ejecutar", post(campaigns::ejecutar))
        .route("/api/credenciales/invalidar", post(credentials::invalidar))
        .with_state(ctx)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
