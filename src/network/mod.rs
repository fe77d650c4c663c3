pub mod handlers;
pub mod response;
pub mod routes;
pub mod server;

use crate::{scene::SceneDirectory, storage::Storage};

pub use routes::routes;
pub use server::{Server, ServerBuilder};

/// Read-only state shared by every request.
#[derive(Debug, Clone)]
pub struct AppState {
    pub storage: Storage,
    pub scenes: SceneDirectory,
}
