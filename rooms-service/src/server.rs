use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tokio::net::TcpListener;

use crate::{
    api::handlers,
    config::AppConfig,
    services::RoomServiceImpl,
    storage::memory::MemoryStorage,
    utils::errors::{Result, RoomsServiceError},
};

pub struct Server {
    config: AppConfig,
    app: Router,
}

impl Server {
    pub fn new(config: AppConfig) -> Self {
        let storage = Arc::new(MemoryStorage::new());
        let room_service = Arc::new(RoomServiceImpl::new(storage, config.rooms.clone()));

        let app_state = handlers::AppState {
            room_service,
            config: config.clone(),
        };

        let app = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/rooms", post(handlers::create_room))
            .route(
                "/rooms/{room_id}",
                get(handlers::get_room)
                    .patch(handlers::update_room)
                    .delete(handlers::delete_room),
            )
            .route("/rooms/{room_id}/participants", get(handlers::get_participants))
            // participants:add, participants:update, participants:remove
            .route("/rooms/{room_id}/{action}", post(handlers::participants_action))
            .with_state(app_state)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(CorsLayer::permissive()),
            );

        Self { config, app }
    }

    pub fn router(&self) -> Router {
        self.app.clone()
    }

    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| RoomsServiceError::Internal(e.into()))?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!("Starting rooms service on {}", addr);
        }

        axum::serve(listener, self.app)
            .await
            .map_err(|e| RoomsServiceError::Internal(e.into()))?;

        Ok(())
    }
}
