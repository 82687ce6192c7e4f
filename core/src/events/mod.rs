pub mod handler;
pub mod signal;

pub use handler::SignalHandler;
pub use signal::{ActionUsage, CoreSignal, HostEvent, PullSource};
