pub mod clock;
pub mod error;
pub mod event;
pub mod snapshot;

pub use clock::*;
pub use error::*;
pub use event::*;
pub use snapshot::*;
