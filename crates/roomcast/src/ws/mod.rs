//! Transport listener glue and the command dispatcher.

mod dispatch;
mod handler;

pub use dispatch::dispatch_frame;
pub use handler::ws_handler;
