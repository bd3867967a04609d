//! The protocol engine: drives send/receive, generates ACKs, retransmits
//! on timeout, handles close, and chunks application payloads into segments.
//!
//! There is no background thread here. [`Connection::recv`] *is* the tick: one
//! carrier read, one dispatch, one possible retransmission pass, one
//! reassembly attempt. [`Connection::flush`] is just a polling loop of ticks
//! plus a sleep, used by the sender side to drain until everything is acked.

use std::time::Duration;

use tracing::{debug, instrument, trace};

use crate::net::carrier::Carrier;
use crate::net::config::TransportConfig;
use crate::net::error::{CarrierError, RecvError};
use crate::net::packet::Packet;
use crate::net::time::{Clock, SystemClock};
use crate::net::window::{ReceiverWindow, SenderWindow};

/// A reliable, ordered, bidirectional byte-stream connection layered over `C`.
///
/// Single-threaded cooperative: all engine state is mutated only by calls on
/// the owning `Connection`. The carrier is owned exclusively by this value
/// for the lifetime of the connection; sharing one across threads is the
/// caller's problem, not this type's (it is `Send` but not required to be `Sync`).
pub struct Connection<C, K = SystemClock> {
    send_window: SenderWindow,
    recv_window: ReceiverWindow,
    carrier: C,
    clock: K,
    open: bool,
    last_ack_time: std::time::Instant,
    resend_timeout: Duration,
    segment_size: usize,
    /// A logical name for this endpoint, carried into every trace/debug event.
    label: String,
}

impl<C: Carrier> Connection<C, SystemClock> {
    /// Build a connection over `carrier` using the real system clock.
    pub fn new(carrier: C, config: TransportConfig, label: impl Into<String>) -> Self {
        Self::with_clock(carrier, config, SystemClock, label)
    }
}

impl<C: Carrier, K: Clock> Connection<C, K> {
    /// Build a connection over `carrier`, driven by an injected clock. Tests
    /// use this with [`crate::net::time::FrozenClock`] to exercise the
    /// retransmission timer deterministically.
    pub fn with_clock(carrier: C, config: TransportConfig, clock: K, label: impl Into<String>) -> Self {
        let now = clock.now();
        Self {
            send_window: SenderWindow::new(config.get_window_capacity()),
            recv_window: ReceiverWindow::new(config.get_window_capacity()),
            carrier,
            clock,
            open: true,
            last_ack_time: now,
            resend_timeout: config.get_resend_timeout(),
            segment_size: config.get_segment_size(),
            label: label.into(),
        }
    }

    /// Whether the connection is still open (no close sentinel sent or received).
    #[inline]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Segment `data` into chunks of at most `segment_size` and buffer each as
    /// a data packet in the sender window. Non-blocking: never touches the carrier.
    ///
    /// Panics if buffering would push more than the window's capacity worth
    /// of unacknowledged packets in flight, rather than silently wrapping the
    /// ring over live data.
    pub fn send(&mut self, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        for chunk in data.chunks(self.segment_size) {
            let outstanding = self.send_window.write() - self.send_window.confirmed();
            assert!(
                (outstanding as usize) < self.send_window.capacity(),
                "send window overflow: more than {} packets unacknowledged",
                self.send_window.capacity(),
            );
            let packet = self.send_window.put_packet(Packet::data(chunk.to_vec()));
            trace!(label = %self.label, seq = packet.seq_num, len = chunk.len(), "buffered segment");
        }
    }

    /// One tick: try to hand back an already-reassembled payload; otherwise
    /// read the carrier once, dispatch whatever arrived, maybe retransmit on
    /// timeout, then try reassembly again.
    #[instrument(level = "trace", skip(self), fields(label = %self.label))]
    pub fn recv(&mut self) -> Result<Option<Vec<u8>>, RecvError> {
        if !self.open {
            return Err(RecvError::ConnectionReset);
        }

        if let Some(payload) = self.try_receive() {
            return Ok(Some(payload));
        }

        match self.carrier.recv() {
            Ok(Some(data)) => {
                if let Some(packet) = Packet::decode(&data) {
                    self.dispatch(packet)?;
                } else {
                    trace!(label = %self.label, "dropped malformed frame");
                }
            }
            Ok(None) => {}
            Err(err) => return Err(RecvError::Carrier(err)),
        }

        if !self.open {
            return Ok(None);
        }

        if self.clock.now().duration_since(self.last_ack_time) > self.resend_timeout {
            self.last_ack_time = self.clock.now();
            self.retransmit()?;
        }

        Ok(self.try_receive())
    }

    /// Blocking drain: retransmit, spin-read the carrier until it has nothing
    /// more to offer, then sleep one `resend_timeout` and repeat, until every
    /// buffered segment has been acknowledged.
    pub fn flush(&mut self) -> Result<(), RecvError> {
        while self.open && self.send_window.confirmed() < self.send_window.write() {
            self.retransmit()?;

            while self.open && self.send_window.confirmed() < self.send_window.write() {
                match self.carrier.recv() {
                    Ok(Some(data)) => {
                        if let Some(packet) = Packet::decode(&data) {
                            self.dispatch(packet)?;
                        }
                    }
                    Ok(None) => break,
                    Err(err) => return Err(RecvError::Carrier(err)),
                }
            }

            if self.open && self.send_window.confirmed() < self.send_window.write() {
                std::thread::sleep(self.resend_timeout);
            }
        }
        Ok(())
    }

    /// Send the close sentinel and mark the connection closed locally. No
    /// retry: losing this datagram is accepted.
    pub fn close(&mut self) -> Result<(), CarrierError> {
        debug!(label = %self.label, "closing connection");
        self.send_raw(Packet::close(self.recv_window.confirmed()))?;
        self.open = false;
        Ok(())
    }

    /// Emit one ACK-only packet carrying the current confirmed cursor, then
    /// re-emit every outstanding slot in ascending sequence order.
    fn retransmit(&mut self) -> Result<(), RecvError> {
        trace!(
            label = %self.label,
            confirmed = self.send_window.confirmed(),
            write = self.send_window.write(),
            "retransmission pass"
        );
        self.send_raw(Packet::ack(self.recv_window.confirmed()))
            .map_err(RecvError::Carrier)?;

        for seq in (self.send_window.confirmed() + 1)..=self.send_window.write() {
            if let Some(packet) = self.send_window.get_packet(seq) {
                let packet = packet.clone();
                self.send_raw(packet).map_err(RecvError::Carrier)?;
            }
        }
        Ok(())
    }

    /// Dispatch one decoded packet: close sentinel, ack update, and/or payload insertion.
    fn dispatch(&mut self, packet: Packet) -> Result<(), RecvError> {
        if packet.is_close() {
            debug!(label = %self.label, "received close sentinel");
            self.open = false;
            return Ok(());
        }

        self.send_window.update_confirmed(packet.ack_num);
        self.last_ack_time = self.clock.now();

        if !packet.payload.is_empty() {
            trace!(label = %self.label, seq = packet.seq_num, len = packet.payload.len(), "received data segment");
            self.recv_window.put_packet(packet);
            self.send_raw(Packet::ack(self.recv_window.confirmed()))
                .map_err(RecvError::Carrier)?;
        }

        Ok(())
    }

    /// If a contiguous, non-empty payload is ready, hand it back.
    fn try_receive(&mut self) -> Option<Vec<u8>> {
        loop {
            let packet = self.recv_window.get_packet()?;
            if !packet.payload.is_empty() {
                return Some(packet.payload);
            }
        }
    }

    /// Stamp `ack_num` from the current confirmed cursor and hand the encoded
    /// frame to the carrier.
    fn send_raw(&mut self, mut packet: Packet) -> Result<(), CarrierError> {
        packet.ack_num = self.recv_window.confirmed();
        let encoded = packet.encode();
        trace!(label = %self.label, seq = packet.seq_num, ack = packet.ack_num, len = encoded.len(), "sending frame");
        self.carrier.send(&encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::loopback::LoopbackCarrier;
    use crate::net::time::FrozenClock;

    fn pair() -> (
        Connection<LoopbackCarrier, FrozenClock>,
        Connection<LoopbackCarrier, FrozenClock>,
    ) {
        let (a, b) = LoopbackCarrier::pair();
        let config = TransportConfig::new().resend_timeout(Duration::from_millis(1));
        (
            Connection::with_clock(a, config, FrozenClock::new(), "a"),
            Connection::with_clock(b, config, FrozenClock::new(), "b"),
        )
    }

    /// Tick `conn` up to `ticks` times, collecting every payload handed back.
    /// `recv()` processes one inbound frame per call (see its doc comment),
    /// so a leading ack-only frame ahead of a data frame in the same
    /// retransmission pass costs one empty tick before a payload appears.
    fn drain_payloads<C: Carrier, K: Clock>(conn: &mut Connection<C, K>, ticks: usize) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        for _ in 0..ticks {
            if let Some(payload) = conn.recv().unwrap() {
                out.push(payload);
            }
        }
        out
    }

    // Lossless round-trip.
    #[test]
    fn lossless_round_trip() {
        let (mut sender, mut receiver) = pair();
        sender.send(b"hello, world");

        // Drain the sender's outstanding segment into the carrier without
        // the real-time sleep inside flush(): one manual retransmission pass
        // plus dispatching the receiver's ack is enough here.
        sender.flush_once_for_test();

        let payloads = drain_payloads(&mut receiver, 8);
        assert_eq!(payloads, vec![b"hello, world".to_vec()]);
        assert!(drain_payloads(&mut receiver, 4).is_empty());
    }

    // Segmentation.
    #[test]
    fn segmentation_preserves_order_and_sizes() {
        let (mut sender, mut receiver) = pair();
        let payload = vec![7u8; 1200];
        sender.send(&payload);
        sender.flush_once_for_test();

        let chunks = drain_payloads(&mut receiver, 16);
        let lens: Vec<usize> = chunks.iter().map(Vec::len).collect();
        assert_eq!(lens, vec![512, 512, 176]);
        assert_eq!(chunks.concat(), payload);
    }

    // Close.
    #[test]
    fn close_resets_peer() {
        let (mut a, mut b) = pair();
        a.close().unwrap();
        assert!(!a.is_open());

        // b's first tick dispatches the sentinel and flips `open`, but still
        // reports `Ok(None)` for that call; only the next call surfaces the reset.
        assert!(matches!(b.recv(), Ok(None)));
        assert!(matches!(b.recv(), Err(RecvError::ConnectionReset)));
    }

    impl<C: Carrier, K: Clock> Connection<C, K> {
        /// Test-only helper: one retransmission pass without the real sleep
        /// that a full `flush()` would perform between passes.
        fn flush_once_for_test(&mut self) {
            self.retransmit().unwrap();
        }
    }

    // Reordering. Bypass the sender side entirely and hand the receiver's
    // carrier two crafted frames directly, out of sequence order.
    #[test]
    fn reordered_frames_are_delivered_in_sequence_order() {
        let (mut a, b) = LoopbackCarrier::pair();
        let config = TransportConfig::new();
        let mut receiver = Connection::with_clock(b, config, FrozenClock::new(), "receiver");

        let mut p1 = Packet::data(b"second".to_vec());
        p1.seq_num = 1;
        let mut p0 = Packet::data(b"first".to_vec());
        p0.seq_num = 0;
        a.send(&p1.encode()).unwrap();
        a.send(&p0.encode()).unwrap();

        assert!(receiver.recv().unwrap().is_none());
        assert_eq!(receiver.recv().unwrap().as_deref(), Some(&b"first"[..]));
        assert_eq!(receiver.recv().unwrap().as_deref(), Some(&b"second"[..]));
    }

    /// Drops exactly the first *data* datagram handed to [`Carrier::send`]
    /// (an ack-only or close frame passes through untouched), so loss
    /// recovery can be tested deterministically regardless of how many
    /// control frames `retransmit` interleaves ahead of it.
    struct DropFirstDataPacketCarrier {
        inner: LoopbackCarrier,
        dropped: bool,
    }

    impl Carrier for DropFirstDataPacketCarrier {
        fn send(&mut self, data: &[u8]) -> Result<(), CarrierError> {
            if !self.dropped && Packet::decode(data).is_some_and(|p| !p.payload.is_empty()) {
                self.dropped = true;
                return Ok(());
            }
            self.inner.send(data)
        }

        fn recv(&mut self) -> Result<Option<Vec<u8>>, CarrierError> {
            self.inner.recv()
        }
    }

    // Loss recovery. The first data packet never reaches the wire; a second
    // retransmission pass (as `flush` would perform after sleeping one
    // `resend_timeout`) successfully delivers it.
    #[test]
    fn lost_packet_is_recovered_by_retransmission() {
        let (a, b) = LoopbackCarrier::pair();
        let config = TransportConfig::new();
        let mut sender = Connection::with_clock(
            DropFirstDataPacketCarrier { inner: a, dropped: false },
            config,
            FrozenClock::new(),
            "sender",
        );
        let mut receiver = Connection::with_clock(b, config, FrozenClock::new(), "receiver");

        sender.send(b"resend me");
        sender.flush_once_for_test(); // ack-only passes, data packet dropped.
        assert!(drain_payloads(&mut receiver, 4).is_empty());

        sender.flush_once_for_test(); // second pass: the drop flag is already spent.
        assert_eq!(drain_payloads(&mut receiver, 8), vec![b"resend me".to_vec()]);
    }

    /// Flips the last byte of the first *data* datagram handed to
    /// [`Carrier::send`] only, to deterministically trigger a checksum
    /// mismatch once regardless of interleaved control frames.
    struct CorruptFirstDataPacketCarrier {
        inner: LoopbackCarrier,
        corrupted: bool,
    }

    impl Carrier for CorruptFirstDataPacketCarrier {
        fn send(&mut self, data: &[u8]) -> Result<(), CarrierError> {
            if !self.corrupted && Packet::decode(data).is_some_and(|p| !p.payload.is_empty()) {
                self.corrupted = true;
                let mut data = data.to_vec();
                let last = data.len() - 1;
                data[last] ^= 0x01;
                return self.inner.send(&data);
            }
            self.inner.send(data)
        }

        fn recv(&mut self) -> Result<Option<Vec<u8>>, CarrierError> {
            self.inner.recv()
        }
    }

    // Corruption. The first data packet arrives with a flipped bit, fails its
    // checksum, and is silently dropped; retransmission then delivers the
    // correct bytes.
    #[test]
    fn corrupted_packet_is_rejected_then_recovered() {
        let (a, b) = LoopbackCarrier::pair();
        let config = TransportConfig::new();
        let mut sender = Connection::with_clock(
            CorruptFirstDataPacketCarrier { inner: a, corrupted: false },
            config,
            FrozenClock::new(),
            "sender",
        );
        let mut receiver = Connection::with_clock(b, config, FrozenClock::new(), "receiver");

        sender.send(b"abcdef");
        sender.flush_once_for_test(); // ack-only (unaffected) + corrupted data packet.
        assert!(drain_payloads(&mut receiver, 4).is_empty());

        sender.flush_once_for_test(); // retransmission carries the uncorrupted bytes.
        assert_eq!(drain_payloads(&mut receiver, 8), vec![b"abcdef".to_vec()]);
    }
}
