//! The message envelope: "one transport frame = a sequence of `(tag, body)`
//! pairs" (spec.md §4.2/§4.4). `body` is always an `AnyVar::Map` describing
//! the message's fields; individual message structs in `noodles_registry`
//! and `noodles_session` convert to/from that map.
use bytes::Bytes;
use noodles_core::AnyVar;

use crate::error::DecodeError;
use crate::reader::{ReadInteger, Reader};
use crate::tags::MessageTag;
use crate::to_bytes::ToBytes;
use crate::writer::{WriteInteger, Writer};

/// One `(tag, body)` entry within a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub tag: MessageTag,
    pub body: AnyVar,
}

impl Envelope {
    pub fn new(tag: MessageTag, body: AnyVar) -> Self {
        Self { tag, body }
    }
}

/// Encode a full logical batch (e.g. catch-up, or one loop tick's worth of
/// broadcasts) as a single transport frame.
pub fn encode_frame(entries: &[Envelope]) -> Bytes {
    let mut writer = Writer::with_capacity(128);
    writer
        .write_varint(entries.len() as u64)
        .expect("writing to an in-memory buffer never fails");
    for entry in entries {
        writer
            .write_varint(u32::from(entry.tag) as u64)
            .expect("writing to an in-memory buffer never fails");
        entry
            .body
            .to_bytes(&mut writer)
            .expect("writing to an in-memory buffer never fails");
    }
    writer.split()
}

pub fn decode_frame(bytes: Bytes) -> Result<Vec<Envelope>, DecodeError> {
    let mut reader = Reader::from(bytes);
    let count = reader.read_varint()? as usize;
    let mut out = Vec::with_capacity(count.min(4096));
    for _ in 0..count {
        let tag_raw = reader.read_varint()? as u32;
        let tag = MessageTag::try_from(tag_raw)?;
        let body = AnyVar::from_bytes(&mut reader)?;
        out.push(Envelope::new(tag, body));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn round_trips_a_batch_of_messages() {
        let mut body = BTreeMap::new();
        body.insert("id".to_string(), AnyVar::Int(7));
        let entries = vec![
            Envelope::new(MessageTag::BufferCreate, AnyVar::Map(body.clone())),
            Envelope::new(MessageTag::BufferViewCreate, AnyVar::Map(body.clone())),
            Envelope::new(MessageTag::GeometryCreate, AnyVar::Map(body)),
        ];
        let bytes = encode_frame(&entries);
        let decoded = decode_frame(bytes).unwrap();
        assert_eq!(decoded, entries);
    }

    #[test]
    fn preserves_relative_order() {
        let tags = [
            MessageTag::BufferCreate,
            MessageTag::BufferViewCreate,
            MessageTag::GeometryCreate,
            MessageTag::EntityCreate,
        ];
        let entries: Vec<_> = tags
            .iter()
            .map(|&t| Envelope::new(t, AnyVar::Null))
            .collect();
        let decoded = decode_frame(encode_frame(&entries)).unwrap();
        let decoded_tags: Vec<_> = decoded.iter().map(|e| e.tag).collect();
        assert_eq!(decoded_tags, tags);
    }
}
