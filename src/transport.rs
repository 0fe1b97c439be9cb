use std::io::{self, Read, Write};
use std::str;

use error::{ConnectionError, ConnectionResult};
use message::MessageType;
use packet::Packet;

/// Packet delivery for one session.
///
/// `wait_for_packet` blocks until a packet of the requested type arrives or
/// the transport's own timeout elapses; the matched packet is then handed
/// out once through `get_packet`.
pub trait Transport {
    fn send_packet(&mut self, packet: &Packet) -> ConnectionResult<()>;

    fn wait_for_packet(&mut self, msg_type: MessageType)
        -> ConnectionResult<()>;

    fn get_packet(&mut self) -> ConnectionResult<Packet>;
}

/// Blocking transport over any byte stream.
///
/// Timeouts are the stream's business: a socket with a read timeout makes
/// `wait_for_packet` fail with `ConnectionError::Timeout` when it elapses.
pub struct StreamTransport<S: Read + Write> {
    stream: S,
    received: Option<Packet>,
    local_id: Option<String>,
    remote_id: Option<String>,
}

impl<S: Read + Write> StreamTransport<S> {
    pub fn new(stream: S) -> StreamTransport<S> {
        StreamTransport {
            stream: stream,
            received: None,
            local_id: None,
            remote_id: None,
        }
    }

    pub fn send_id(&mut self) -> io::Result<()> {
        let id = format!("SSH-2.0-SshKex_{}", env!("CARGO_PKG_VERSION"));
        info!("Identifying as {:?}", id);

        self.stream.write_all(id.as_bytes())?;
        self.stream.write_all(b"\r\n")?;
        self.stream.flush()?;

        self.local_id = Some(id);

        Ok(())
    }

    pub fn read_id(&mut self) -> io::Result<()> {
        let mut line = Vec::new();
        let mut byte = [0; 1];

        // One byte at a time, so no packet bytes after the line are eaten
        while line.len() < 255 {
            self.stream.read_exact(&mut byte)?;
            if byte[0] == b'\n' {
                break;
            }
            line.push(byte[0]);
        }

        let id = str::from_utf8(line.as_slice()).map(str::trim).or(Err(
            io::Error::new(io::ErrorKind::InvalidData, "invalid id"),
        ))?;

        if id.starts_with("SSH-") {
            info!("Peer identifies as {:?}", id);
            self.remote_id = Some(id.to_owned());
            Ok(())
        }
        else {
            Err(io::Error::new(io::ErrorKind::InvalidData, "invalid id"))
        }
    }

    /// The identification string sent by `send_id`, kept for the exchange
    /// hash.
    pub fn local_id(&self) -> Option<&str> {
        self.local_id.as_ref().map(|s| s.as_str())
    }

    /// The identification string read by `read_id`, kept for the exchange
    /// hash.
    pub fn remote_id(&self) -> Option<&str> {
        self.remote_id.as_ref().map(|s| s.as_str())
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Read + Write> Transport for StreamTransport<S> {
    fn send_packet(&mut self, packet: &Packet) -> ConnectionResult<()> {
        debug!("Sending packet: {:?}", packet);
        packet.write_to(&mut self.stream)?;
        Ok(())
    }

    fn wait_for_packet(&mut self, msg_type: MessageType)
        -> ConnectionResult<()> {
        loop {
            let packet = match Packet::read_from(&mut self.stream) {
                Ok(packet) => packet,
                Err(ref err) if err.kind() == io::ErrorKind::WouldBlock ||
                    err.kind() == io::ErrorKind::TimedOut => {
                    return Err(ConnectionError::Timeout);
                }
                Err(err) => return Err(ConnectionError::IoError(err)),
            };

            debug!("Packet received: {:?}", packet);

            match packet.msg_type()
            {
                t if t == msg_type => {
                    self.received = Some(packet);
                    return Ok(());
                }
                MessageType::Ignore | MessageType::Debug => continue,
                MessageType::Disconnect => {
                    warn!("Peer disconnected while waiting for {:?}",
                          msg_type);
                    return Err(ConnectionError::ProtocolError);
                }
                _ => {
                    warn!("Unexpected packet while waiting for {:?}: {:?}",
                          msg_type, packet);
                    return Err(ConnectionError::ProtocolError);
                }
            }
        }
    }

    fn get_packet(&mut self) -> ConnectionResult<Packet> {
        self.received.take().ok_or(ConnectionError::ProtocolError)
    }
}
