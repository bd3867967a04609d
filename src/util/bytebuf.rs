//! [`ByteBuf`], the cursor-based reader/writer backing the packet codec.

use byteorder::{ByteOrder, BigEndian};

/// Default initial capacity.
const DEFAULT_CAPACITY: usize = 8192;

/// A linear byte buffer with independent `read` and `write` cursors.
///
/// Writes past the current length grow the backing storage. Reads never grow
/// the buffer: reading past `write` is a programmer error and panics, since
/// the codec that drives this type never issues such a read on a well-formed
/// frame. Untrusted wire data is validated with [`ByteBuf::remaining`] and
/// [`ByteBuf::peek_int`] before being read, never by racing the panic.
#[derive(Clone)]
pub struct ByteBuf {
    buf: Vec<u8>,
    read: usize,
    write: usize,
}

impl ByteBuf {
    /// Create an empty buffer ready for writing.
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
            read: 0,
            write: 0,
        }
    }

    /// Wrap existing bytes for reading; `read` starts at zero, `write` at the end.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        let buf = data.into();
        let write = buf.len();
        Self { buf, read: 0, write }
    }

    #[inline]
    fn ensure_capacity(&mut self, end: usize) {
        if end > self.buf.len() {
            self.buf.resize(end, 0);
        }
    }

    /// Number of unread bytes remaining before the write cursor.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.write - self.read
    }

    /// Read the next big-endian signed 32-bit integer without advancing the cursor.
    ///
    /// Panics if fewer than 4 bytes remain; callers touching untrusted data should
    /// check [`ByteBuf::remaining`] first.
    pub fn peek_int(&self) -> i32 {
        assert!(self.remaining() >= 4, "ByteBuf::peek_int: fewer than 4 bytes remain");
        BigEndian::read_i32(&self.buf[self.read..self.read + 4])
    }

    /// Append a big-endian signed 32-bit integer and advance the write cursor by 4.
    pub fn write_int(&mut self, value: i32) {
        let end = self.write + 4;
        self.ensure_capacity(end);
        BigEndian::write_i32(&mut self.buf[self.write..end], value);
        self.write = end;
    }

    /// Read a big-endian signed 32-bit integer and advance the read cursor by 4.
    ///
    /// Panics if fewer than 4 bytes remain before `write`.
    pub fn read_int(&mut self) -> i32 {
        let end = self.read + 4;
        assert!(end <= self.write, "ByteBuf::read_int: read past write cursor");
        let value = BigEndian::read_i32(&self.buf[self.read..end]);
        self.read = end;
        value
    }

    /// Write a 4-byte signed length prefix followed by `data`.
    pub fn write_data(&mut self, data: &[u8]) {
        self.write_int(data.len() as i32);
        let end = self.write + data.len();
        self.ensure_capacity(end);
        self.buf[self.write..end].copy_from_slice(data);
        self.write = end;
    }

    /// Read a 4-byte length prefix, then that many bytes.
    ///
    /// Panics if the declared length runs past `write`.
    pub fn read_data(&mut self) -> Vec<u8> {
        let len = self.read_int() as usize;
        let end = self.read + len;
        assert!(end <= self.write, "ByteBuf::read_data: declared length past write cursor");
        let data = self.buf[self.read..end].to_vec();
        self.read = end;
        data
    }

    /// Snapshot the bytes between `read` and `write`, without consuming them.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[self.read..self.write]
    }

    /// Fold the bytes in `[read, write)` into a 16-bit checksum.
    ///
    /// This exact arithmetic must be reproduced bit-for-bit with the reference
    /// implementation's multiplicative accumulator: for each byte `b`,
    /// `sum = sum * 256 + b; sum = ((sum >> 16) + sum) & 0xFFFF`.
    pub fn checksum(&self) -> u16 {
        let mut sum: u32 = 0;
        for &b in &self.buf[self.read..self.write] {
            sum = sum.wrapping_mul(256).wrapping_add(b as u32);
            sum = (sum >> 16).wrapping_add(sum) & 0xFFFF;
        }
        (sum & 0xFFFF) as u16
    }
}

impl Default for ByteBuf {
    fn default() -> Self {
        Self::new()
    }
}
