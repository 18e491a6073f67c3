mod api;
mod session;
mod transfer;

pub use api::*;
pub use session::*;
pub use transfer::*;
