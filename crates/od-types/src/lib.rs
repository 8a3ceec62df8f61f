pub mod config;
pub mod errors;
pub mod gene;
pub mod result;

pub use config::*;
pub use errors::*;
pub use gene::*;
pub use result::*;
