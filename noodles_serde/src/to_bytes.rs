//! The `ToBytes` trait every wire type implements: a total encode plus a
//! fallible decode, with a cheap `bytes_len` so callers can size buffers
//! ahead of time. Mirrors `lightyear_serde::ToBytes`.
use crate::error::DecodeError;
use crate::reader::Reader;
use crate::writer::Writer;

pub trait ToBytes: Sized {
    fn bytes_len(&self) -> usize;

    fn to_bytes(&self, writer: &mut Writer) -> std::io::Result<()>;

    fn from_bytes(reader: &mut Reader) -> Result<Self, DecodeError>;

    fn encode(&self) -> bytes::Bytes {
        let mut writer = Writer::with_capacity(self.bytes_len());
        self.to_bytes(&mut writer)
            .expect("encoding to an in-memory buffer never fails");
        writer.split()
    }

    fn decode(bytes: bytes::Bytes) -> Result<Self, DecodeError> {
        let mut reader = Reader::from(bytes);
        Self::from_bytes(&mut reader)
    }
}
