pub mod clock;
pub mod comment;
pub mod post;
pub mod session;
pub mod session_store;
mod user;

pub use clock::*;
pub use comment::*;
pub use post::*;
pub use session::*;
pub use session_store::*;
pub use user::*;
