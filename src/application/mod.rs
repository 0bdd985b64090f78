pub mod reconciler;
pub mod session;

pub use reconciler::*;
pub use session::*;
