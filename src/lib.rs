pub mod chain;
pub mod error;
pub mod lightning;
pub mod logging;
pub mod swap;

pub use error::SwapError;
