#[derive(PartialEq, Clone, Copy, Debug)]
pub enum MessageType {
    Disconnect,
    Ignore,
    Unimplemented,
    Debug,
    ServiceRequest,
    ServiceAccept,
    KexInit,
    NewKeys,
    KexDhInit,
    KexDhReply,
    KeyExchange(u8),
    Unknown,
}

impl From<u8> for MessageType {
    fn from(id: u8) -> Self {
        use self::MessageType::*;
        match id {
            1 => Disconnect,
            2 => Ignore,
            3 => Unimplemented,
            4 => Debug,
            5 => ServiceRequest,
            6 => ServiceAccept,
            20 => KexInit,
            21 => NewKeys,
            30 => KexDhInit,
            31 => KexDhReply,
            32...49 => KeyExchange(id),
            _ => Unknown,
        }
    }
}

impl Into<u8> for MessageType {
    fn into(self) -> u8 {
        use self::MessageType::*;
        match self {
            Disconnect => 1,
            Ignore => 2,
            Unimplemented => 3,
            Debug => 4,
            ServiceRequest => 5,
            ServiceAccept => 6,
            KexInit => 20,
            NewKeys => 21,
            KexDhInit => 30,
            KexDhReply => 31,
            KeyExchange(id) => id,
            Unknown => 255,
        }
    }
}
