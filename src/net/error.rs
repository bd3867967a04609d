//! Error types surfaced across the carrier/codec boundary.
//!
//! Most failure modes (a malformed frame, a carrier that would block) are
//! absorbed silently inside the engine and never reach these types. Only
//! carrier fatality and post-close use are surfaced.

use std::io;

/// A fatal failure from the underlying carrier, propagated to the caller.
///
/// `WouldBlock` is deliberately not a variant here: the carrier contract (see
/// [`crate::net::carrier::Carrier`]) reports "no data right now" by returning
/// `Ok(None)`, not by raising an error, so there is nothing to wrap.
#[derive(Debug, thiserror::Error)]
#[error("carrier error: {0}")]
pub struct CarrierError(#[from] io::Error);

/// Failure of [`crate::net::engine::Connection::recv`].
#[derive(Debug, thiserror::Error)]
pub enum RecvError {
    /// The connection is closed, either because a close sentinel was received
    /// or because [`crate::net::engine::Connection::close`] was called locally.
    #[error("connection reset")]
    ConnectionReset,
    /// The carrier failed for a reason other than "no data available".
    #[error(transparent)]
    Carrier(#[from] CarrierError),
}

/// Reserved for a future tagged-extension wire format; unreachable from the
/// current single-shape decoder, which has no packet kind left to be unknown.
#[allow(unused)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownPacketKind(pub i32);
