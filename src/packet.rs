use std::fmt;
use std::io::{self, BufReader, Read, Result, Write};
use std::str::{self, FromStr};
use std::string::ToString;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use message::MessageType;
use num_bigint::BigInt;

/// Maximum accepted packet length, per RFC 4253 section 6.1.
const MAX_PACKET_SIZE: usize = 35000;

/// An unencrypted SSH binary packet: the message type tag followed by the
/// message payload. Framing (length, padding) is added on `write_to` and
/// stripped on `read_from`.
pub struct Packet {
    payload: Vec<u8>,
}

impl Packet {
    pub fn new(msg_type: MessageType) -> Packet {
        Packet { payload: (&[msg_type.into()]).to_vec() }
    }

    pub fn msg_type(&self) -> MessageType {
        self.payload[0].into()
    }

    /// The whole payload, message type tag included.
    pub fn data(&self) -> &[u8] {
        self.payload.as_slice()
    }

    /// An owned copy of the payload, for retention across the handshake.
    pub fn payload(&self) -> Vec<u8> {
        self.payload.clone()
    }

    pub fn read_from<R: io::Read>(stream: &mut R) -> Result<Packet> {
        let packet_len = stream.read_u32::<BigEndian>()? as usize;
        let padding_len = stream.read_u8()? as usize;

        if packet_len > MAX_PACKET_SIZE || packet_len < padding_len + 2 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "invalid packet length",
            ));
        }

        let payload_len = packet_len - padding_len - 1;

        let mut payload = Vec::with_capacity(payload_len);
        let mut padding = Vec::with_capacity(padding_len);

        stream.take(payload_len as u64).read_to_end(&mut payload)?;
        stream.take(padding_len as u64).read_to_end(&mut padding)?;

        if payload.len() != payload_len || padding.len() != padding_len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "truncated packet",
            ));
        }

        Ok(Packet { payload: payload })
    }

    pub fn write_to<W: io::Write>(&self, stream: &mut W) -> Result<()> {
        let padding_len = self.padding_len();
        let packet_len = self.payload.len() + padding_len + 1;

        stream.write_u32::<BigEndian>(packet_len as u32)?;
        stream.write_u8(padding_len as u8)?;
        stream.write_all(&self.payload)?;
        stream.write_all(&[0u8; 255][..padding_len])?;
        stream.flush()?;

        Ok(())
    }

    /// A reader over the payload, positioned past the message type tag.
    pub fn reader<'a>(&'a self) -> BufReader<&'a [u8]> {
        BufReader::new(&self.payload.as_slice()[1..])
    }

    pub fn padding_len(&self) -> usize {
        // Calculate the padding to reach a multiple of 8 bytes
        let padding_len = 8 - ((self.payload.len() + 5) % 8);

        // The padding has to be at least 4 bytes long
        if padding_len < 4 {
            padding_len + 8
        }
        else {
            padding_len
        }
    }
}

impl io::Write for Packet {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.payload.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

pub trait ReadPacketExt: ReadBytesExt {
    fn read_string(&mut self) -> Result<Vec<u8>> {
        let len = self.read_u32::<BigEndian>()?;
        self.read_bytes(len as usize)
    }

    fn read_mpint(&mut self) -> Result<BigInt> {
        let len = self.read_u32::<BigEndian>()?;
        let bytes = self.read_bytes(len as usize)?;
        Ok(BigInt::from_signed_bytes_be(bytes.as_slice()))
    }

    fn read_uint32(&mut self) -> Result<u32> {
        Ok(self.read_u32::<BigEndian>()?)
    }

    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buffer = Vec::with_capacity(len);
        self.take(len as u64).read_to_end(&mut buffer)?;

        if buffer.len() != len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "truncated field",
            ));
        }
        Ok(buffer)
    }

    fn read_utf8(&mut self) -> Result<String> {
        let bytes = self.read_string()?;
        str::from_utf8(bytes.as_slice())
            .map(|s| s.to_owned())
            .or(Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "invalid utf-8 string",
            )))
    }

    fn read_bool(&mut self) -> Result<bool> {
        self.read_u8().map(|i| i != 0)
    }

    fn read_enum_list<T: FromStr>(&mut self) -> Result<Vec<T>> {
        let string = self.read_utf8()?;
        Ok(
            string
                .split(",")
                .filter_map(|l| T::from_str(&l).ok())
                .collect(),
        )
    }

    fn read_name_list(&mut self) -> Result<Vec<String>> {
        let string = self.read_utf8()?;
        Ok(
            string
                .split(",")
                .filter(|l| !l.is_empty())
                .map(|l| l.to_owned())
                .collect(),
        )
    }
}

impl<R: ReadBytesExt> ReadPacketExt for R {}

pub trait WritePacketExt: WriteBytesExt {
    fn write_string(&mut self, s: &str) -> Result<()> {
        let bytes = s.as_bytes();
        self.write_bytes(bytes)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_uint32(bytes.len() as u32)?;
        self.write_all(bytes)
    }

    fn write_raw_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_all(bytes)
    }

    fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_u8(if value { 1 } else { 0 })
    }

    fn write_mpint(&mut self, value: &BigInt) -> Result<()> {
        // The signed representation carries the sign-disambiguating
        // leading zero whenever the top bit of the magnitude is set.
        let bytes = value.to_signed_bytes_be();
        self.write_bytes(bytes.as_slice())
    }

    fn write_uint32(&mut self, value: u32) -> Result<()> {
        self.write_u32::<BigEndian>(value as u32)
    }

    fn write_list<T: ToString>(&mut self, list: &[T]) -> Result<()> {
        let mut string = String::new();
        let mut iter = list.iter();

        while let Some(item) = iter.next() {
            if !string.is_empty() {
                string += ",";
            }
            string += &*item.to_string();
        }
        self.write_string(&*string)
    }
}

impl<W: WriteBytesExt + ?Sized> WritePacketExt for W {}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Packet({:?}, {} bytes)",
            self.msg_type(),
            self.payload.len()
        )
    }
}
