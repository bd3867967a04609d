//! A reliable, ordered, bidirectional byte-stream transport layered on top of
//! an unreliable datagram carrier.
//!
//! The crate is split along the same lines as the wire protocol it implements:
//!
//! - [`util::ByteBuf`], cursor-based big-endian codec primitives and the
//!   folded checksum shared by every frame.
//! - [`net::Packet`], the wire frame and its encode/decode.
//! - [`net::window`], the sender and receiver sliding windows.
//! - [`net::Connection`], the protocol engine tying the above together
//!   behind `send`/`recv`/`flush`/`close`.
//! - [`net::Carrier`], the abstraction over the unreliable datagram layer
//!   below, plus [`net::adapters`] for testing against loss, corruption, and
//!   reordering.
//!
//! Binding a concrete socket, framing a CLI around this, and persisting
//! connection state are all left to callers; see the module docs under
//! [`net`] for the exact boundary.

pub mod net;
pub mod util;
