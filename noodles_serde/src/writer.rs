//! A reusable-allocation writer, mirroring the split-off-as-`Bytes` pattern
//! used by the teacher's packet writer so that framed messages can be
//! handed to the transport without an extra copy.
use bytes::{BufMut, Bytes, BytesMut};
use std::io::{Result, Write};

use crate::error::EncodeError;
use crate::varint::varint_len;

#[derive(Debug)]
pub struct Writer(BytesMut);

impl Writer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self(BytesMut::with_capacity(capacity))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Split off everything written so far as an independent [`Bytes`],
    /// retaining the underlying allocation for reuse.
    pub fn split(&mut self) -> Bytes {
        self.0.split().freeze()
    }

    pub fn reset(&mut self) {
        self.0.clear();
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::with_capacity(64)
    }
}

impl Write for Writer {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

pub trait WriteInteger: Write {
    #[inline]
    fn write_u8(&mut self, n: u8) -> Result<()> {
        self.write_all(&[n])
    }
    #[inline]
    fn write_u16(&mut self, n: u16) -> Result<()> {
        self.write_all(&n.to_be_bytes())
    }
    #[inline]
    fn write_u32(&mut self, n: u32) -> Result<()> {
        self.write_all(&n.to_be_bytes())
    }
    #[inline]
    fn write_u64(&mut self, n: u64) -> Result<()> {
        self.write_all(&n.to_be_bytes())
    }
    #[inline]
    fn write_i64(&mut self, n: i64) -> Result<()> {
        self.write_u64(n as u64)
    }
    #[inline]
    fn write_f64(&mut self, n: f64) -> Result<()> {
        self.write_u64(n.to_bits())
    }
    #[inline]
    fn write_bool(&mut self, b: bool) -> Result<()> {
        self.write_u8(b as u8)
    }

    /// Write a variable-length integer, in network byte order.
    fn write_varint(&mut self, value: u64) -> Result<()> {
        match varint_len(value) {
            1 => self.write_u8(value as u8),
            2 => self.write_u16((value as u16) | 0x4000),
            4 => self.write_u32((value as u32) | 0x8000_0000),
            8 => self.write_u64(value | 0xc000_0000_0000_0000),
            _ => unreachable!(),
        }
    }

    fn write_bytes_framed(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_varint(bytes.len() as u64)?;
        self.write_all(bytes)
    }
}

impl<T: Write> WriteInteger for T {}

/// Look up the wire code for a component kind label. Used by the `AnyVar`
/// codec to encode `AnyId` values; the table is the single source of truth
/// shared with [`crate::kinds::code_to_kind`].
pub fn kind_to_code(label: &'static str) -> std::result::Result<u8, EncodeError> {
    crate::kinds::KIND_TABLE
        .iter()
        .position(|&l| l == label)
        .map(|i| i as u8)
        .ok_or(EncodeError::UnknownKind(label))
}
