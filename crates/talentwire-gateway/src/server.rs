//! Webhook gateway server.

use crate::bootstrap::AppState;
use crate::handlers;
use crate::Result;
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use talentwire_core::config::{BindMode, GatewaySettings};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// The HTTP gateway server.
pub struct Gateway {
    settings: GatewaySettings,
    state: Arc<AppState>,
}

impl Gateway {
    /// Create a gateway over prepared state.
    pub fn new(settings: GatewaySettings, state: Arc<AppState>) -> Self {
        Self { settings, state }
    }

    /// Build the axum router.
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .route("/health", get(handlers::health::health))
            .route(
                "/webhooks/whatsapp/:unit",
                get(handlers::whatsapp::verify).post(handlers::whatsapp::receive),
            )
            .route("/webhooks/telegram/:unit", post(handlers::telegram::receive))
            .route(
                "/webhooks/messenger/:unit",
                get(handlers::messenger::verify).post(handlers::messenger::receive),
            )
            .route("/api/notify", post(handlers::notify::notify))
            .route("/api/notify/bulk", post(handlers::notify::notify_bulk))
            .route("/api/deliveries", get(handlers::notify::recent_deliveries))
            .route("/api/contacts/:unit", get(handlers::notify::list_contacts))
            .route("/api/contacts", post(handlers::notify::upsert_contact))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http());

        if self.settings.cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers(Any);
            router = router.layer(cors);
        }

        router
    }

    /// Bind address derived from the configured bind mode.
    pub fn bind_addr(&self) -> SocketAddr {
        let ip = match self.settings.bind {
            BindMode::Loopback => IpAddr::V4(Ipv4Addr::LOCALHOST),
            BindMode::Lan => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        SocketAddr::new(ip, self.settings.port)
    }

    /// Run the server until the process is stopped.
    pub async fn serve(self) -> Result<()> {
        let addr = self.bind_addr();
        if self.settings.bind == BindMode::Lan {
            warn!("binding to all interfaces; webhook endpoints are exposed to the network");
        }

        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(%addr, "gateway listening");

        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}
