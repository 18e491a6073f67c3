pub mod api_client;
pub mod auth_backend;
pub mod comments;
pub mod memory_session_store;
pub mod posts;
pub mod session_manager;

pub use api_client::*;
pub use auth_backend::*;
pub use comments::*;
pub use memory_session_store::*;
pub use posts::*;
pub use session_manager::*;
