//! Cursor over a received frame. Mirrors the teacher's `Reader`: a thin
//! wrapper over `std::io::Cursor<Bytes>` so slices can be split off without
//! copying.
use bytes::Bytes;
use std::io::{Cursor, Read, Result, Seek, SeekFrom};

use crate::error::DecodeError;
use crate::varint::varint_parse_len;

#[derive(Clone)]
pub struct Reader(Cursor<Bytes>);

impl From<Bytes> for Reader {
    fn from(value: Bytes) -> Self {
        Self(Cursor::new(value))
    }
}

impl From<Vec<u8>> for Reader {
    fn from(value: Vec<u8>) -> Self {
        Self(Cursor::new(value.into()))
    }
}

impl Seek for Reader {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        self.0.seek(pos)
    }
}

impl Read for Reader {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.0.read(buf)
    }
}

impl Reader {
    pub fn remaining(&self) -> usize {
        let len = self.0.get_ref().len() as u64;
        let pos = self.0.position();
        if pos >= len {
            0
        } else {
            (len - pos) as usize
        }
    }

    pub fn has_remaining(&self) -> bool {
        self.remaining() > 0
    }

    /// Split off the next `len` bytes as an independent [`Bytes`] without
    /// copying; used for the bulk-numeric packed lists and for opaque
    /// buffer payloads.
    pub fn split_len(&mut self, len: usize) -> std::result::Result<Bytes, DecodeError> {
        if self.remaining() < len {
            return Err(DecodeError::Eof);
        }
        let pos = self.0.position() as usize;
        let bytes = self.0.get_ref().slice(pos..pos + len);
        self.0.set_position((pos + len) as u64);
        Ok(bytes)
    }
}

pub trait ReadInteger: Read {
    #[inline]
    fn read_u8(&mut self) -> std::result::Result<u8, DecodeError> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf).map_err(|_| DecodeError::Eof)?;
        Ok(buf[0])
    }
    #[inline]
    fn read_u16(&mut self) -> std::result::Result<u16, DecodeError> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf).map_err(|_| DecodeError::Eof)?;
        Ok(u16::from_be_bytes(buf))
    }
    #[inline]
    fn read_u32(&mut self) -> std::result::Result<u32, DecodeError> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf).map_err(|_| DecodeError::Eof)?;
        Ok(u32::from_be_bytes(buf))
    }
    #[inline]
    fn read_u64(&mut self) -> std::result::Result<u64, DecodeError> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf).map_err(|_| DecodeError::Eof)?;
        Ok(u64::from_be_bytes(buf))
    }
    #[inline]
    fn read_i64(&mut self) -> std::result::Result<i64, DecodeError> {
        Ok(self.read_u64()? as i64)
    }
    #[inline]
    fn read_f64(&mut self) -> std::result::Result<f64, DecodeError> {
        Ok(f64::from_bits(self.read_u64()?))
    }
    #[inline]
    fn read_bool(&mut self) -> std::result::Result<bool, DecodeError> {
        Ok(self.read_u8()? != 0)
    }

    fn read_varint(&mut self) -> std::result::Result<u64, DecodeError>;
}

impl ReadInteger for Reader {
    fn read_varint(&mut self) -> std::result::Result<u64, DecodeError> {
        let first = {
            // peek without consuming so we know the width up front
            let pos = self.0.position();
            let b = self.read_u8()?;
            self.0.set_position(pos);
            b
        };
        let len = varint_parse_len(first);
        let value = match len {
            1 => self.read_u8()? as u64,
            2 => (self.read_u16()? & 0x3fff) as u64,
            4 => (self.read_u32()? & 0x3fff_ffff) as u64,
            8 => self.read_u64()? & 0x3fff_ffff_ffff_ffff,
            _ => unreachable!(),
        };
        Ok(value)
    }
}

impl Reader {
    pub fn read_bytes_framed(&mut self) -> std::result::Result<Bytes, DecodeError> {
        let len = self.read_varint()? as usize;
        self.split_len(len)
    }

    pub fn read_string_framed(&mut self) -> std::result::Result<String, DecodeError> {
        let bytes = self.read_bytes_framed()?;
        String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8)
    }
}
