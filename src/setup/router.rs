use std::{net::SocketAddr, sync::Arc};

use axum::{Extension, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    config::AuthConfig,
    lifecycle::CredentialLifecycle,
    routes,
    services::{database::CredentialStore, email::Notifier},
    utils::{clock::SystemClock, crypto::Argon2Hasher},
};

pub fn build_lifecycle(
    store: Arc<dyn CredentialStore>,
    notifier: Arc<dyn Notifier>,
    config: AuthConfig,
) -> CredentialLifecycle {
    CredentialLifecycle::new(
        store,
        notifier,
        Arc::new(Argon2Hasher::new()),
        Arc::new(SystemClock),
        config,
    )
}

pub fn build_router(lifecycle: CredentialLifecycle) -> Router {
    routes::main_router()
        .layer(Extension(lifecycle))
        .layer(TraceLayer::new_for_http())
}

pub async fn setup_api_router(
    lifecycle: CredentialLifecycle,
    bind: SocketAddr,
) -> std::io::Result<(Router, TcpListener)> {
    let app = build_router(lifecycle);

    let listener = TcpListener::bind(bind).await?;
    tracing::info!(%bind, "Listening");

    Ok((app, listener))
}
