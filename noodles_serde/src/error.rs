//! Decode/encode failures from the wire codec.

/// Malformed wire input. Per spec.md §7: the server closes the session on
/// this error; the client drops the message and logs.
#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("unexpected end of input")]
    Eof,
    #[error("unknown type tag {0}")]
    UnknownTag(u8),
    #[error("unknown component kind code {0}")]
    UnknownKind(u8),
    #[error("string was not valid utf-8")]
    InvalidUtf8,
    #[error("message tag {0} is not a known message type")]
    UnknownMessageTag(u32),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Encode failures are a programmer bug: the in-memory value was built in a
/// way the codec cannot represent (e.g. an `AnyId` with a kind label not in
/// the fixed kind table). Spec.md §4.10 treats this as a panic in debug and
/// an internal error in release; this crate always surfaces it as a
/// `Result` and lets the caller decide.
#[derive(thiserror::Error, Debug)]
pub enum EncodeError {
    #[error("unknown component kind label `{0}`")]
    UnknownKind(&'static str),
}
