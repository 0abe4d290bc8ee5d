use std::time::Duration;

pub mod decode;
pub mod event;
pub mod idle;
pub mod sniff;

pub use capture::{open, offline};
pub use config::{Config, Select};
pub use decode::classify;
pub use event::{Event, Protocol};
pub use idle::Idle;
pub use sniff::Sniffer;
pub use source::{spawn, Frame};

pub const TIMEOUT: Duration = Duration::from_secs(10);
pub const POLL:    Duration = Duration::from_millis(500);

mod capture;
mod config;
mod source;

#[cfg(test)]
mod test;
