pub mod engine;
pub mod ports;

pub use engine::*;
pub use ports::*;
