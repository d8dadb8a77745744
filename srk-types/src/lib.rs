pub mod error;
pub mod frame;
pub mod header;
pub mod identity;
pub mod record;
pub mod sample;
pub mod timestamp;

pub use error::*;
pub use frame::*;
pub use header::*;
pub use identity::*;
pub use record::*;
pub use sample::*;
pub use timestamp::*;
