//! `ToBytes` for [`AnyVar`]: a tag byte followed by the variant's payload.
//! Tag values are local to this codec (distinct from the message tags in
//! `crate::tags`, which address the §6 wire table).
use std::io::Write;

use noodles_core::anyvar::AnyId;
use noodles_core::AnyVar;

use crate::error::DecodeError;
use crate::kinds::code_to_kind;
use crate::reader::{ReadInteger, Reader};
use crate::to_bytes::ToBytes;
use crate::writer::{kind_to_code, WriteInteger, Writer};

const TAG_NULL: u8 = 0;
const TAG_BOOL: u8 = 1;
const TAG_INT: u8 = 2;
const TAG_REAL: u8 = 3;
const TAG_TEXT: u8 = 4;
const TAG_BYTES: u8 = 5;
const TAG_ID: u8 = 6;
const TAG_LIST: u8 = 7;
const TAG_MAP: u8 = 8;
const TAG_PACKED_I64: u8 = 9;
const TAG_PACKED_F64: u8 = 10;

impl ToBytes for AnyVar {
    fn bytes_len(&self) -> usize {
        // Exact size isn't load-bearing (the writer grows), a rough
        // estimate keeps the first allocation close to right-sized.
        1 + match self {
            AnyVar::Null => 0,
            AnyVar::Bool(_) => 1,
            AnyVar::Int(_) | AnyVar::Real(_) => 8,
            AnyVar::Text(s) => 8 + s.len(),
            AnyVar::Bytes(b) => 8 + b.len(),
            AnyVar::Id(_) => 9,
            AnyVar::List(items) => items.iter().map(ToBytes::bytes_len).sum::<usize>() + 8,
            AnyVar::Map(entries) => {
                entries
                    .iter()
                    .map(|(k, v)| 8 + k.len() + v.bytes_len())
                    .sum::<usize>()
                    + 8
            }
            AnyVar::PackedI64(v) => 8 + v.len() * 8,
            AnyVar::PackedF64(v) => 8 + v.len() * 8,
        }
    }

    fn to_bytes(&self, writer: &mut Writer) -> std::io::Result<()> {
        match self {
            AnyVar::Null => writer.write_u8(TAG_NULL),
            AnyVar::Bool(b) => {
                writer.write_u8(TAG_BOOL)?;
                writer.write_bool(*b)
            }
            AnyVar::Int(v) => {
                writer.write_u8(TAG_INT)?;
                writer.write_i64(*v)
            }
            AnyVar::Real(v) => {
                writer.write_u8(TAG_REAL)?;
                writer.write_f64(*v)
            }
            AnyVar::Text(s) => {
                writer.write_u8(TAG_TEXT)?;
                writer.write_bytes_framed(s.as_bytes())
            }
            AnyVar::Bytes(b) => {
                writer.write_u8(TAG_BYTES)?;
                writer.write_bytes_framed(b)
            }
            AnyVar::Id(id) => {
                writer.write_u8(TAG_ID)?;
                let code = kind_to_code(id.kind)
                    .map_err(|e| std::io::Error::other(e.to_string()))?;
                writer.write_u8(code)?;
                writer.write_u32(id.slot)?;
                writer.write_u32(id.gen)
            }
            AnyVar::List(items) => {
                writer.write_u8(TAG_LIST)?;
                writer.write_varint(items.len() as u64)?;
                for item in items {
                    item.to_bytes(writer)?;
                }
                Ok(())
            }
            AnyVar::Map(entries) => {
                writer.write_u8(TAG_MAP)?;
                writer.write_varint(entries.len() as u64)?;
                for (k, v) in entries {
                    writer.write_bytes_framed(k.as_bytes())?;
                    v.to_bytes(writer)?;
                }
                Ok(())
            }
            AnyVar::PackedI64(items) => {
                writer.write_u8(TAG_PACKED_I64)?;
                writer.write_varint(items.len() as u64)?;
                for v in items {
                    writer.write_i64(*v)?;
                }
                Ok(())
            }
            AnyVar::PackedF64(items) => {
                writer.write_u8(TAG_PACKED_F64)?;
                writer.write_varint(items.len() as u64)?;
                for v in items {
                    writer.write_f64(*v)?;
                }
                Ok(())
            }
        }
    }

    fn from_bytes(reader: &mut Reader) -> Result<Self, DecodeError> {
        let tag = reader.read_u8()?;
        match tag {
            TAG_NULL => Ok(AnyVar::Null),
            TAG_BOOL => Ok(AnyVar::Bool(reader.read_bool()?)),
            TAG_INT => Ok(AnyVar::Int(reader.read_i64()?)),
            TAG_REAL => Ok(AnyVar::Real(reader.read_f64()?)),
            TAG_TEXT => Ok(AnyVar::Text(reader.read_string_framed()?)),
            TAG_BYTES => Ok(AnyVar::Bytes(reader.read_bytes_framed()?.to_vec())),
            TAG_ID => {
                let code = reader.read_u8()?;
                let kind = code_to_kind(code)?;
                let slot = reader.read_u32()?;
                let gen = reader.read_u32()?;
                Ok(AnyVar::Id(AnyId { kind, slot, gen }))
            }
            TAG_LIST => {
                let len = reader.read_varint()? as usize;
                let mut items = Vec::with_capacity(len.min(4096));
                for _ in 0..len {
                    items.push(AnyVar::from_bytes(reader)?);
                }
                Ok(AnyVar::List(items))
            }
            TAG_MAP => {
                let len = reader.read_varint()? as usize;
                let mut map = std::collections::BTreeMap::new();
                for _ in 0..len {
                    let key = reader.read_string_framed()?;
                    let value = AnyVar::from_bytes(reader)?;
                    map.insert(key, value);
                }
                Ok(AnyVar::Map(map))
            }
            TAG_PACKED_I64 => {
                let len = reader.read_varint()? as usize;
                // The raw run of bytes is sliced out of the shared buffer in
                // one shot (no per-element copy of the *source* bytes);
                // only the owned `Vec<i64>` destination allocates.
                let raw = reader.split_len(len * 8)?;
                let mut items = Vec::with_capacity(len);
                for chunk in raw.chunks_exact(8) {
                    let mut buf = [0u8; 8];
                    buf.copy_from_slice(chunk);
                    items.push(i64::from_be_bytes(buf));
                }
                Ok(AnyVar::PackedI64(items))
            }
            TAG_PACKED_F64 => {
                let len = reader.read_varint()? as usize;
                let raw = reader.split_len(len * 8)?;
                let mut items = Vec::with_capacity(len);
                for chunk in raw.chunks_exact(8) {
                    let mut buf = [0u8; 8];
                    buf.copy_from_slice(chunk);
                    items.push(f64::from_bits(u64::from_be_bytes(buf)));
                }
                Ok(AnyVar::PackedF64(items))
            }
            other => Err(DecodeError::UnknownTag(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn round_trip(v: AnyVar) {
        let bytes = v.encode();
        let decoded = AnyVar::decode(bytes).unwrap();
        assert_eq!(v, decoded);
    }

    #[test]
    fn round_trips_scalars() {
        round_trip(AnyVar::Null);
        round_trip(AnyVar::Bool(true));
        round_trip(AnyVar::Int(-42));
        round_trip(AnyVar::Real(3.5));
        round_trip(AnyVar::Text("hello".into()));
        round_trip(AnyVar::Bytes(vec![1, 2, 3]));
    }

    #[test]
    fn round_trips_nested_map_with_packed_lists() {
        let mut map = BTreeMap::new();
        map.insert(
            "a".to_string(),
            AnyVar::List(vec![
                AnyVar::Int(1),
                AnyVar::Real(2.5),
                AnyVar::PackedI64(vec![3, 4, 5]),
            ]),
        );
        round_trip(AnyVar::Map(map));
    }

    #[test]
    fn packed_i64_list_stays_packed_after_round_trip() {
        let v = AnyVar::PackedI64(vec![1, 2, 3]);
        let decoded = AnyVar::decode(v.encode()).unwrap();
        assert!(matches!(decoded, AnyVar::PackedI64(_)));
    }
}
