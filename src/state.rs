use std::sync::Arc;

use crate::server::Server;

#[derive(Clone)]
pub struct AppState {
    pub server: Arc<Server>,
}

impl AppState {
    pub fn new(server: Server) -> Self {
        Self {
            server: Arc::new(server),
        }
    }
}
