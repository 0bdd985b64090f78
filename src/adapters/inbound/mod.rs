pub mod protocol;
pub mod websocket;

pub use protocol::*;
pub use websocket::*;
