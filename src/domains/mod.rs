pub mod agent;
pub mod logger;
pub mod motion;

pub use agent::*;
pub use logger::*;
pub use motion::*;
