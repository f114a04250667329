//! `Buffer`: a raw byte payload, inline or fetched out-of-band over the
//! HTTP asset sideband (spec.md §3, §6).
#[derive(Debug, Clone, PartialEq)]
pub enum BufferSource {
    Inline(Vec<u8>),
    Uri { uri: String, size: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Buffer {
    pub size: u64,
    pub source: BufferSource,
}

impl Buffer {
    pub fn inline(bytes: Vec<u8>) -> Self {
        Self {
            size: bytes.len() as u64,
            source: BufferSource::Inline(bytes),
        }
    }

    pub fn uri(uri: impl Into<String>, size: u64) -> Self {
        Self {
            size,
            source: BufferSource::Uri {
                uri: uri.into(),
                size,
            },
        }
    }
}
