pub mod buffered_logger;
pub mod console_logger;
pub mod file_logger;
pub mod messages;
pub mod multi_logger;
pub mod noop_logger;
pub mod path_requester;

pub use buffered_logger::*;
pub use console_logger::*;
pub use file_logger::*;
pub use messages::*;
pub use multi_logger::*;
pub use noop_logger::*;
pub use path_requester::*;
