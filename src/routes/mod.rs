pub(crate) mod transfer;

// re-export items from sub-modules
pub use transfer::*;
