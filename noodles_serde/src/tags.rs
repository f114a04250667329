//! The closed message tag enum from spec.md §6. Tag ids are stable wire
//! constants sent in both directions.
use crate::error::DecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum MessageTag {
    MethodCreate = 0,
    MethodDelete = 1,
    SignalCreate = 2,
    SignalDelete = 3,
    EntityCreate = 4,
    EntityUpdate = 5,
    EntityDelete = 6,
    PlotCreate = 7,
    PlotUpdate = 8,
    PlotDelete = 9,
    BufferCreate = 10,
    BufferDelete = 11,
    BufferViewCreate = 12,
    BufferViewDelete = 13,
    MaterialCreate = 14,
    MaterialUpdate = 15,
    MaterialDelete = 16,
    ImageCreate = 17,
    ImageDelete = 18,
    TextureCreate = 19,
    TextureDelete = 20,
    SamplerCreate = 21,
    SamplerDelete = 22,
    LightCreate = 23,
    LightUpdate = 24,
    LightDelete = 25,
    GeometryCreate = 26,
    GeometryDelete = 27,
    TableCreate = 28,
    TableUpdate = 29,
    TableDelete = 30,
    DocumentUpdate = 31,
    DocumentReset = 32,
    SignalInvoke = 33,
    MethodReply = 34,
    /// Client -> Server
    Introduction = 50,
    /// Client -> Server
    MethodInvoke = 51,
}

impl MessageTag {
    pub fn is_client_to_server(self) -> bool {
        matches!(self, MessageTag::Introduction | MessageTag::MethodInvoke)
    }

    pub fn is_server_to_client(self) -> bool {
        !self.is_client_to_server()
    }
}

impl TryFrom<u32> for MessageTag {
    type Error = DecodeError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        use MessageTag::*;
        Ok(match value {
            0 => MethodCreate,
            1 => MethodDelete,
            2 => SignalCreate,
            3 => SignalDelete,
            4 => EntityCreate,
            5 => EntityUpdate,
            6 => EntityDelete,
            7 => PlotCreate,
            8 => PlotUpdate,
            9 => PlotDelete,
            10 => BufferCreate,
            11 => BufferDelete,
            12 => BufferViewCreate,
            13 => BufferViewDelete,
            14 => MaterialCreate,
            15 => MaterialUpdate,
            16 => MaterialDelete,
            17 => ImageCreate,
            18 => ImageDelete,
            19 => TextureCreate,
            20 => TextureDelete,
            21 => SamplerCreate,
            22 => SamplerDelete,
            23 => LightCreate,
            24 => LightUpdate,
            25 => LightDelete,
            26 => GeometryCreate,
            27 => GeometryDelete,
            28 => TableCreate,
            29 => TableUpdate,
            30 => TableDelete,
            31 => DocumentUpdate,
            32 => DocumentReset,
            33 => SignalInvoke,
            34 => MethodReply,
            50 => Introduction,
            51 => MethodInvoke,
            other => return Err(DecodeError::UnknownMessageTag(other)),
        })
    }
}

impl From<MessageTag> for u32 {
    fn from(tag: MessageTag) -> Self {
        tag as u32
    }
}
