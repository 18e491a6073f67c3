pub mod config;
pub mod consts;
pub mod token;

pub use config::Config;
pub use consts::*;
pub use token::*;
