use axum::{routing::get, Router};
use std::error::Error;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use routes::transfer;

pub mod domain;
pub mod errors;
pub mod routes;
pub mod services;
pub mod utils;
pub mod validation;

pub fn app_router() -> Router {
    Router::new()
        .route("/api/auth/transfer", get(transfer))
        .fallback_service(ServeDir::new("assets"))
}

// This struct encapsulates our application-related logic.
pub struct Application {
    listener: TcpListener,
    router: Router,
    // address is exposed as a public field,
    // so we have access to it in tests.
    pub address: String,
}

impl Application {
    pub async fn build(address: &str) -> Result<Self, Box<dyn Error>> {
        let router = app_router();
        let listener = TcpListener::bind(address).await?;
        let address = format!("http://{}", listener.local_addr()?);

        Ok(Self {
            listener,
            router,
            address,
        })
    }

    pub async fn run(self) -> Result<(), std::io::Error> {
        log::info!("listening on {}", &self.address);
        axum::serve(self.listener, self.router).await
    }
}
