//! The transport itself: wire codec, sliding windows, the protocol engine,
//! and the carrier abstraction it sits on top of.

pub mod adapters;
pub mod carrier;
pub mod config;
pub mod engine;
pub mod error;
pub mod loopback;
pub mod packet;
pub mod time;
pub mod window;

pub use carrier::Carrier;
pub use config::TransportConfig;
pub use engine::Connection;
pub use error::{CarrierError, RecvError};
pub use loopback::LoopbackCarrier;
pub use packet::Packet;
