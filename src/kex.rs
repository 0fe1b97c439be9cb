use rand;

use algorithm::{negotiate, AlgorithmCatalog, CompressionAlgorithm,
                EncryptionAlgorithm, KeyExchangeAlgorithm, MacAlgorithm,
                PublicKeyAlgorithm};
use crypto::Crypto;
use error::{ConnectionError, ConnectionResult};
use message::MessageType;
use packet::{Packet, ReadPacketExt, WritePacketExt};
use transport::Transport;

/// The client side of the SSH key exchange: announces the local algorithm
/// lists, negotiates one algorithm per category against the server's
/// KEXINIT, and opens the Diffie-Hellman exchange.
///
/// One `Kex` drives one handshake at a time; `send_init` resets its state
/// for a new round. The raw KEXINIT payloads of both sides and the public
/// value sent in KEXDH_INIT are retained for the exchange hash, which the
/// crypto layer computes once the server's reply is in.
pub struct Kex<T: Transport, C: Crypto> {
    transport: T,
    crypto: C,
    algorithms: AlgorithmCatalog,
    local_kexinit: Option<Vec<u8>>,
    remote_kexinit: Option<Vec<u8>>,
    offered_encryption: Vec<EncryptionAlgorithm>,
    offered_mac: Vec<MacAlgorithm>,
    public_key: Option<Vec<u8>>,
}

impl<T: Transport, C: Crypto> Kex<T, C> {
    pub fn new(transport: T, crypto: C, algorithms: AlgorithmCatalog)
        -> Kex<T, C> {
        Kex {
            transport: transport,
            crypto: crypto,
            algorithms: algorithms,
            local_kexinit: None,
            remote_kexinit: None,
            offered_encryption: Vec::new(),
            offered_mac: Vec::new(),
            public_key: None,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn crypto(&self) -> &C {
        &self.crypto
    }

    /// The payload of the last KEXINIT this side sent.
    pub fn local_kexinit(&self) -> Option<&[u8]> {
        self.local_kexinit.as_ref().map(|v| v.as_slice())
    }

    /// The payload of the last KEXINIT the peer sent.
    pub fn remote_kexinit(&self) -> Option<&[u8]> {
        self.remote_kexinit.as_ref().map(|v| v.as_slice())
    }

    /// The public value sent in KEXDH_INIT, as unsigned big-endian bytes.
    pub fn public_key(&self) -> Option<&[u8]> {
        self.public_key.as_ref().map(|v| v.as_slice())
    }

    /// Hand back the collaborators once the handshake is over.
    pub fn into_parts(self) -> (T, C) {
        (self.transport, self.crypto)
    }

    /// Build the local KEXINIT with a fresh cookie, discarding any state
    /// from a previous round.
    pub fn construct_local_kexinit(&mut self) -> ConnectionResult<Packet> {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        let cookie: Vec<u8> = rng.gen_iter::<u8>().take(16).collect();

        let offered_encryption = self.algorithms.offered_encryption();
        let offered_mac = self.algorithms.offered_mac();

        let mut packet = Packet::new(MessageType::KexInit);
        packet.write_raw_bytes(cookie.as_slice())?;
        packet.write_list(self.algorithms.key_exchange.as_slice())?;
        packet.write_list(self.algorithms.host_key.as_slice())?;
        packet.write_list(offered_encryption.as_slice())?;
        packet.write_list(offered_encryption.as_slice())?;
        packet.write_list(offered_mac.as_slice())?;
        packet.write_list(offered_mac.as_slice())?;
        packet.write_list(self.algorithms.compression.as_slice())?;
        packet.write_list(self.algorithms.compression.as_slice())?;
        packet.write_string("")?;
        packet.write_string("")?;
        packet.write_bool(false)?;
        packet.write_uint32(0)?;

        self.local_kexinit = Some(packet.data().to_vec());
        self.remote_kexinit = None;
        self.offered_encryption = offered_encryption;
        self.offered_mac = offered_mac;
        self.public_key = None;

        Ok(packet)
    }

    /// Announce the local algorithm lists and block until the peer's
    /// KEXINIT arrives.
    pub fn send_init(&mut self) -> ConnectionResult<()> {
        let packet = self.construct_local_kexinit()?;

        self.transport.send_packet(&packet)?;
        self.transport.wait_for_packet(MessageType::KexInit)?;

        Ok(())
    }

    /// Negotiate all eight algorithm categories from the received KEXINIT.
    ///
    /// Categories resolve in wire order and each choice is committed into
    /// the crypto layer before the next list is read; the first mismatch,
    /// short read or rejected commit aborts the handshake with the later
    /// categories untouched.
    pub fn handle_init(&mut self) -> ConnectionResult<()> {
        let packet = self.transport.get_packet()?;

        if packet.msg_type() != MessageType::KexInit {
            return Err(ConnectionError::ProtocolError);
        }

        // Save the payload for hash generation
        self.remote_kexinit = Some(packet.payload());

        let mut reader = packet.reader();
        let _cookie = reader.read_bytes(16)?;

        let kex_algos = reader.read_enum_list::<KeyExchangeAlgorithm>()?;
        let kex_algo =
            negotiate(self.algorithms.key_exchange.as_slice(),
                      kex_algos.as_slice())?;
        self.crypto.negotiated_kex(kex_algo)?;
        debug!("Negotiated Kex Algorithm: {:?}", kex_algo);

        let host_key_algos = reader.read_enum_list::<PublicKeyAlgorithm>()?;
        let host_key_algo =
            negotiate(self.algorithms.host_key.as_slice(),
                      host_key_algos.as_slice())?;
        self.crypto.negotiated_host_key(host_key_algo)?;
        debug!("Negotiated Host Key Algorithm: {:?}", host_key_algo);

        let enc_algos_c2s = reader.read_enum_list::<EncryptionAlgorithm>()?;
        let enc_algo_c2s =
            negotiate(self.offered_encryption.as_slice(),
                      enc_algos_c2s.as_slice())?;
        self.crypto.negotiated_encryption_c2s(enc_algo_c2s)?;
        debug!("Negotiated Encryption Algorithm (c2s): {:?}", enc_algo_c2s);

        let enc_algos_s2c = reader.read_enum_list::<EncryptionAlgorithm>()?;
        let enc_algo_s2c =
            negotiate(self.offered_encryption.as_slice(),
                      enc_algos_s2c.as_slice())?;
        self.crypto.negotiated_encryption_s2c(enc_algo_s2c)?;
        debug!("Negotiated Encryption Algorithm (s2c): {:?}", enc_algo_s2c);

        let mac_algos_c2s = reader.read_enum_list::<MacAlgorithm>()?;
        let mac_algo_c2s =
            negotiate(self.offered_mac.as_slice(), mac_algos_c2s.as_slice())?;
        self.crypto.negotiated_mac_c2s(mac_algo_c2s)?;
        debug!("Negotiated Mac Algorithm (c2s): {:?}", mac_algo_c2s);

        let mac_algos_s2c = reader.read_enum_list::<MacAlgorithm>()?;
        let mac_algo_s2c =
            negotiate(self.offered_mac.as_slice(), mac_algos_s2c.as_slice())?;
        self.crypto.negotiated_mac_s2c(mac_algo_s2c)?;
        debug!("Negotiated Mac Algorithm (s2c): {:?}", mac_algo_s2c);

        let comp_algos_c2s = reader.read_enum_list::<CompressionAlgorithm>()?;
        let comp_algo_c2s =
            negotiate(self.algorithms.compression.as_slice(),
                      comp_algos_c2s.as_slice())?;
        self.crypto.negotiated_compression_c2s(comp_algo_c2s)?;
        debug!("Negotiated Comp Algorithm (c2s): {:?}", comp_algo_c2s);

        let comp_algos_s2c = reader.read_enum_list::<CompressionAlgorithm>()?;
        let comp_algo_s2c =
            negotiate(self.algorithms.compression.as_slice(),
                      comp_algos_s2c.as_slice())?;
        self.crypto.negotiated_compression_s2c(comp_algo_s2c)?;
        debug!("Negotiated Comp Algorithm (s2c): {:?}", comp_algo_s2c);

        // The trailing fields are parsed off the reader rather than trimmed
        // by a fixed offset, so non-empty language lists don't shift the
        // name-list region.
        let _langs_c2s = reader.read_name_list()?;
        let _langs_s2c = reader.read_name_list()?;

        if reader.read_bool()? {
            debug!("Peer sent a guessed kex packet, ignoring");
        }
        let _reserved = reader.read_uint32()?;

        Ok(())
    }

    /// Send KEXDH_INIT with a fresh ephemeral public value and block until
    /// the server's KEXDH_REPLY arrives.
    pub fn send_kexdh_init(&mut self) -> ConnectionResult<()> {
        let public_key = self.crypto.kex_public()?;

        let mut packet = Packet::new(MessageType::KexDhInit);
        packet.write_mpint(&public_key)?;

        // Keep e in canonical unsigned form for hash generation
        self.public_key = Some(public_key.to_bytes_be().1);

        self.transport.send_packet(&packet)?;
        self.transport.wait_for_packet(MessageType::KexDhReply)?;

        Ok(())
    }
}
