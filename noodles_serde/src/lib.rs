//! The NOODLES wire codec: varint/integer primitives, the [`ToBytes`]
//! trait, `AnyVar` (en/de)coding, and the message frame format.

mod anyvar;
pub mod error;
pub mod kinds;
pub mod message;
pub mod reader;
pub mod tags;
pub mod to_bytes;
pub mod varint;
pub mod writer;

pub use error::{DecodeError, EncodeError};
pub use message::{decode_frame, encode_frame, Envelope};
pub use reader::Reader;
pub use tags::MessageTag;
pub use to_bytes::ToBytes;
pub use writer::Writer;
