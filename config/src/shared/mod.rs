mod base;
mod connection;
mod monitor;
mod retry;

pub use base::*;
pub use connection::*;
pub use monitor::*;
pub use retry::*;
