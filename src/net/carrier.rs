//! The carrier abstraction: the only thing the engine knows about the world
//! below it. Binding addresses, blocking semantics, and concrete sockets are
//! all external collaborators, the engine only ever sees this trait.

use crate::net::error::CarrierError;

/// An unreliable datagram carrier, consumed by [`crate::net::engine::Connection`].
///
/// Implementations are expected to be **non-blocking**: a [`Carrier::recv`]
/// that has nothing to deliver returns `Ok(None)` rather than parking the
/// calling thread.
pub trait Carrier {
    /// Transmit one datagram. Fire-and-forget: there is no delivery confirmation
    /// at this layer.
    fn send(&mut self, data: &[u8]) -> Result<(), CarrierError>;

    /// Return one datagram if immediately available, `Ok(None)` if the carrier
    /// would otherwise block, or `Err` for a genuine I/O failure.
    fn recv(&mut self) -> Result<Option<Vec<u8>>, CarrierError>;
}
