//! Low level byte-buffer primitives shared by the packet codec.

mod bytebuf;

pub use bytebuf::ByteBuf;
