//! The server-side dispatch engine: per-client serialized worker queues,
//! bounded pending-work admission control with a `SERVER_BUSY` reply, and
//! arrival-timestamp discard of work that expires before it is executed.

mod engine;
mod error;
mod observer;

pub use engine::ServerEngine;
pub use error::ServerError;
pub use observer::ServerObserver;
