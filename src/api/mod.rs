use std::sync::Arc;
use axum::Extension;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::filter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
pub use error::ApiError;
use crate::client::VitrineClient;
use crate::config::VitrineConfig;
use crate::storage::FileStorage;

mod controllers;
mod error;

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

#[derive(Clone)]
pub struct ApiContext {
    pub cfg: Arc<VitrineConfig>,
    pub client: Arc<RwLock<VitrineClient<FileStorage>>>,
}

pub async fn serve(config: VitrineConfig) {
    let tracing_layer = tracing_subscriber::fmt::layer();
    let filter = filter::Targets::new()
        .with_target("tower_http::trace::on_response", Level::DEBUG)
        .with_target("tower_http::trace::make_span", Level::DEBUG)
        .with_default(Level::INFO);
    tracing_subscriber::registry()
        .with(tracing_layer)
        .with(filter)
        .init();

    info!("{:?}", &config);

    let storage = FileStorage::new(config.db_path.clone()).expect("failed to open storage");
    let mut client = VitrineClient::new(storage);
    client.init().await.expect("failed to replay operation log");

    let listen_addr = config.listen_addr.clone();
    let ctx = ApiContext {
        cfg: Arc::new(config),
        client: Arc::new(RwLock::new(client)),
    };

    let app = controllers::router()
        .layer(CorsLayer::new().allow_methods(Any).allow_headers(Any).allow_origin(Any))
        .layer(ServiceBuilder::new().layer(Extension(ctx)).layer(TraceLayer::new_for_http()));

    let listener = tokio::net::TcpListener::bind(&listen_addr).await.expect("failed to bind to address");
    info!("listening on {}", &listen_addr);
    axum::serve(listener, app).await.expect("error running HTTP server");
}
