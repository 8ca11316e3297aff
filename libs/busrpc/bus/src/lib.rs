//! The glue contracts the client and server engines consume from their
//! collaborators: the message bus, the timer/reactor source, and the
//! configuration surface — plus one in-memory bus implementation used to
//! exercise the engines without a real transport.

mod bus;
mod config;
mod loopback;
mod timer;
mod user_address;

pub use bus::{BusObserver, MessageBus};
pub use config::{parse_kv, ClientConfig, ConfigError, ServerConfig};
pub use loopback::LoopbackBus;
pub use timer::{TimerId, TimerObserver, TimerSource, TokioTimerSource};
pub use user_address::UserAddress;
