pub mod config;
pub mod device;
pub mod error;
pub mod metrics;
pub mod session;
pub mod storage;

pub use config::*;
pub use device::*;
pub use error::*;
pub use metrics::*;
pub use session::*;
pub use storage::*;
