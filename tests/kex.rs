extern crate num_bigint;
extern crate ssh_kex;

use std::collections::VecDeque;
use std::io;

use num_bigint::BigInt;
use ssh_kex::algorithm::{AlgorithmCatalog, CompressionAlgorithm,
                         EncryptionAlgorithm, KeyExchangeAlgorithm,
                         MacAlgorithm, PublicKeyAlgorithm};
use ssh_kex::crypto::Crypto;
use ssh_kex::error::{ConnectionError, ConnectionResult};
use ssh_kex::kex::Kex;
use ssh_kex::message::MessageType;
use ssh_kex::packet::{Packet, ReadPacketExt, WritePacketExt};
use ssh_kex::transport::Transport;

#[derive(Default)]
struct MockTransport {
    sent: Vec<Vec<u8>>,
    incoming: VecDeque<Packet>,
    received: Option<Packet>,
    time_out: bool,
    refuse_send: bool,
}

impl Transport for MockTransport {
    fn send_packet(&mut self, packet: &Packet) -> ConnectionResult<()> {
        if self.refuse_send {
            return Err(ConnectionError::IoError(
                io::Error::new(io::ErrorKind::BrokenPipe, "send refused"),
            ));
        }
        self.sent.push(packet.data().to_vec());
        Ok(())
    }

    fn wait_for_packet(&mut self, msg_type: MessageType)
        -> ConnectionResult<()> {
        if self.time_out {
            return Err(ConnectionError::Timeout);
        }

        let packet =
            self.incoming.pop_front().ok_or(ConnectionError::Timeout)?;
        if packet.msg_type() != msg_type {
            return Err(ConnectionError::ProtocolError);
        }

        self.received = Some(packet);
        Ok(())
    }

    fn get_packet(&mut self) -> ConnectionResult<Packet> {
        self.received.take().ok_or(ConnectionError::ProtocolError)
    }
}

#[derive(Default)]
struct MockCrypto {
    kex: Option<KeyExchangeAlgorithm>,
    host_key: Option<PublicKeyAlgorithm>,
    encryption_c2s: Option<EncryptionAlgorithm>,
    encryption_s2c: Option<EncryptionAlgorithm>,
    mac_c2s: Option<MacAlgorithm>,
    mac_s2c: Option<MacAlgorithm>,
    compression_c2s: Option<CompressionAlgorithm>,
    compression_s2c: Option<CompressionAlgorithm>,
    public: Option<BigInt>,
    reject_mac: bool,
}

impl Crypto for MockCrypto {
    fn negotiated_kex(&mut self, algorithm: KeyExchangeAlgorithm)
        -> ConnectionResult<()> {
        self.kex = Some(algorithm);
        Ok(())
    }

    fn negotiated_host_key(&mut self, algorithm: PublicKeyAlgorithm)
        -> ConnectionResult<()> {
        self.host_key = Some(algorithm);
        Ok(())
    }

    fn negotiated_encryption_c2s(&mut self, algorithm: EncryptionAlgorithm)
        -> ConnectionResult<()> {
        self.encryption_c2s = Some(algorithm);
        Ok(())
    }

    fn negotiated_encryption_s2c(&mut self, algorithm: EncryptionAlgorithm)
        -> ConnectionResult<()> {
        self.encryption_s2c = Some(algorithm);
        Ok(())
    }

    fn negotiated_mac_c2s(&mut self, algorithm: MacAlgorithm)
        -> ConnectionResult<()> {
        if self.reject_mac {
            return Err(ConnectionError::UnsupportedAlgorithm);
        }
        self.mac_c2s = Some(algorithm);
        Ok(())
    }

    fn negotiated_mac_s2c(&mut self, algorithm: MacAlgorithm)
        -> ConnectionResult<()> {
        self.mac_s2c = Some(algorithm);
        Ok(())
    }

    fn negotiated_compression_c2s(&mut self, algorithm: CompressionAlgorithm)
        -> ConnectionResult<()> {
        self.compression_c2s = Some(algorithm);
        Ok(())
    }

    fn negotiated_compression_s2c(&mut self, algorithm: CompressionAlgorithm)
        -> ConnectionResult<()> {
        self.compression_s2c = Some(algorithm);
        Ok(())
    }

    fn kex_public(&mut self) -> ConnectionResult<BigInt> {
        self.public.clone().ok_or(ConnectionError::KeyExchangeError)
    }
}

/// A server KEXINIT with the given comma-joined offers, written through
/// the codec the same way a peer would.
fn server_kexinit(kex: &str, host_key: &str, enc: &str, mac: &str,
                  comp: &str) -> Packet {
    let mut packet = Packet::new(MessageType::KexInit);
    packet.write_raw_bytes(&[0x2a; 16]).unwrap();
    packet.write_string(kex).unwrap();
    packet.write_string(host_key).unwrap();
    packet.write_string(enc).unwrap();
    packet.write_string(enc).unwrap();
    packet.write_string(mac).unwrap();
    packet.write_string(mac).unwrap();
    packet.write_string(comp).unwrap();
    packet.write_string(comp).unwrap();
    packet.write_string("").unwrap();
    packet.write_string("").unwrap();
    packet.write_bool(false).unwrap();
    packet.write_uint32(0).unwrap();
    packet
}

#[test]
fn full_handshake_negotiates_all_categories() {
    let mut transport = MockTransport::default();
    let packet = server_kexinit(
        "diffie-hellman-group14-sha1,diffie-hellman-group1-sha1",
        "ssh-ed25519",
        "aes128-ctr,aes256-ctr",
        "hmac-sha2-256",
        "none,zlib",
    );
    let remote_payload = packet.data().to_vec();
    transport.incoming.push_back(packet);

    let mut kex = Kex::new(
        transport,
        MockCrypto::default(),
        AlgorithmCatalog::default(),
    );

    kex.send_init().unwrap();
    kex.handle_init().unwrap();

    assert_eq!(kex.transport().sent.len(), 1);
    assert_eq!(kex.transport().sent[0][0], 20);

    assert_eq!(kex.crypto().kex,
               Some(KeyExchangeAlgorithm::DH_GROUP14_SHA1));
    assert_eq!(kex.crypto().host_key, Some(PublicKeyAlgorithm::SSH_ED25519));
    assert_eq!(kex.crypto().encryption_c2s,
               Some(EncryptionAlgorithm::AES256_CTR));
    assert_eq!(kex.crypto().encryption_s2c,
               Some(EncryptionAlgorithm::AES256_CTR));
    assert_eq!(kex.crypto().mac_c2s, Some(MacAlgorithm::HMAC_SHA2_256));
    assert_eq!(kex.crypto().mac_s2c, Some(MacAlgorithm::HMAC_SHA2_256));
    assert_eq!(kex.crypto().compression_c2s,
               Some(CompressionAlgorithm::None));
    assert_eq!(kex.crypto().compression_s2c,
               Some(CompressionAlgorithm::None));

    assert!(kex.local_kexinit().is_some());
    assert_eq!(kex.remote_kexinit(), Some(remote_payload.as_slice()));
}

#[test]
fn preference_order_decides_the_kex_algorithm() {
    let mut transport = MockTransport::default();
    transport.incoming.push_back(server_kexinit(
        "diffie-hellman-group1-sha1,diffie-hellman-group14-sha1",
        "ssh-ed25519",
        "aes128-ctr",
        "hmac-sha2-256",
        "none",
    ));

    let mut algorithms = AlgorithmCatalog::default();
    algorithms.key_exchange =
        vec![KeyExchangeAlgorithm::DH_GROUP14_SHA1];

    let mut kex = Kex::new(transport, MockCrypto::default(), algorithms);

    kex.send_init().unwrap();
    kex.handle_init().unwrap();

    assert_eq!(kex.crypto().kex,
               Some(KeyExchangeAlgorithm::DH_GROUP14_SHA1));
}

#[test]
fn cipher_mismatch_aborts_negotiation() {
    let mut transport = MockTransport::default();
    transport.incoming.push_back(server_kexinit(
        "diffie-hellman-group14-sha1",
        "ssh-ed25519",
        "3des-cbc",
        "hmac-sha2-256",
        "none",
    ));

    let mut algorithms = AlgorithmCatalog::default();
    algorithms.preferred_encryption =
        Some(vec![EncryptionAlgorithm::AES128_CTR]);

    let mut kex = Kex::new(transport, MockCrypto::default(), algorithms);

    kex.send_init().unwrap();
    match kex.handle_init() {
        Err(ConnectionError::NegotiationError) => {}
        other => panic!("expected negotiation error, got {:?}", other),
    }

    // Categories before the failing one stay committed, later ones are
    // never attempted
    assert_eq!(kex.crypto().kex,
               Some(KeyExchangeAlgorithm::DH_GROUP14_SHA1));
    assert_eq!(kex.crypto().host_key, Some(PublicKeyAlgorithm::SSH_ED25519));
    assert_eq!(kex.crypto().encryption_c2s, None);
    assert_eq!(kex.crypto().mac_c2s, None);
    assert_eq!(kex.crypto().compression_c2s, None);
}

#[test]
fn setter_rejection_aborts_negotiation() {
    let mut transport = MockTransport::default();
    transport.incoming.push_back(server_kexinit(
        "diffie-hellman-group14-sha1",
        "ssh-ed25519",
        "aes128-ctr",
        "hmac-sha2-256",
        "none",
    ));

    let mut crypto = MockCrypto::default();
    crypto.reject_mac = true;

    let mut kex = Kex::new(transport, crypto, AlgorithmCatalog::default());

    kex.send_init().unwrap();
    match kex.handle_init() {
        Err(ConnectionError::UnsupportedAlgorithm) => {}
        other => panic!("expected unsupported algorithm, got {:?}", other),
    }

    assert_eq!(kex.crypto().encryption_s2c,
               Some(EncryptionAlgorithm::AES128_CTR));
    assert_eq!(kex.crypto().mac_c2s, None);
    assert_eq!(kex.crypto().mac_s2c, None);
    assert_eq!(kex.crypto().compression_c2s, None);
}

#[test]
fn truncated_kexinit_aborts_negotiation() {
    let mut packet = Packet::new(MessageType::KexInit);
    packet.write_raw_bytes(&[0x2a; 16]).unwrap();
    packet.write_string("diffie-hellman-group14-sha1").unwrap();
    packet.write_string("ssh-ed25519").unwrap();
    // Encryption lists and everything after them are missing

    let mut transport = MockTransport::default();
    transport.incoming.push_back(packet);

    let mut kex = Kex::new(
        transport,
        MockCrypto::default(),
        AlgorithmCatalog::default(),
    );

    kex.send_init().unwrap();
    match kex.handle_init() {
        Err(ConnectionError::IoError(_)) => {}
        other => panic!("expected io error, got {:?}", other),
    }

    assert_eq!(kex.crypto().kex,
               Some(KeyExchangeAlgorithm::DH_GROUP14_SHA1));
    assert_eq!(kex.crypto().encryption_c2s, None);
}

#[test]
fn handle_init_rejects_other_message_types() {
    let mut transport = MockTransport::default();
    transport.received = Some(Packet::new(MessageType::NewKeys));

    let mut kex = Kex::new(
        transport,
        MockCrypto::default(),
        AlgorithmCatalog::default(),
    );

    match kex.handle_init() {
        Err(ConnectionError::ProtocolError) => {}
        other => panic!("expected protocol error, got {:?}", other),
    }
    assert!(kex.remote_kexinit().is_none());
}

#[test]
fn local_kexinit_round_trips_through_the_codec() {
    let mut algorithms = AlgorithmCatalog::default();
    algorithms.preferred_encryption =
        Some(vec![EncryptionAlgorithm::AES128_CTR]);

    let mut kex = Kex::new(
        MockTransport::default(),
        MockCrypto::default(),
        algorithms.clone(),
    );

    let packet = kex.construct_local_kexinit().unwrap();
    assert_eq!(packet.msg_type(), MessageType::KexInit);
    assert_eq!(kex.local_kexinit(), Some(packet.data()));

    let mut reader = packet.reader();
    assert_eq!(reader.read_bytes(16).unwrap().len(), 16);

    assert_eq!(reader.read_enum_list::<KeyExchangeAlgorithm>().unwrap(),
               algorithms.key_exchange);
    assert_eq!(reader.read_enum_list::<PublicKeyAlgorithm>().unwrap(),
               algorithms.host_key);
    assert_eq!(reader.read_enum_list::<EncryptionAlgorithm>().unwrap(),
               vec![EncryptionAlgorithm::AES128_CTR]);
    assert_eq!(reader.read_enum_list::<EncryptionAlgorithm>().unwrap(),
               vec![EncryptionAlgorithm::AES128_CTR]);
    assert_eq!(reader.read_enum_list::<MacAlgorithm>().unwrap(),
               algorithms.mac);
    assert_eq!(reader.read_enum_list::<MacAlgorithm>().unwrap(),
               algorithms.mac);
    assert_eq!(reader.read_enum_list::<CompressionAlgorithm>().unwrap(),
               algorithms.compression);
    assert_eq!(reader.read_enum_list::<CompressionAlgorithm>().unwrap(),
               algorithms.compression);

    assert!(reader.read_name_list().unwrap().is_empty());
    assert!(reader.read_name_list().unwrap().is_empty());
    assert_eq!(reader.read_bool().unwrap(), false);
    assert_eq!(reader.read_uint32().unwrap(), 0);
}

#[test]
fn each_round_regenerates_the_cookie() {
    let mut kex = Kex::new(
        MockTransport::default(),
        MockCrypto::default(),
        AlgorithmCatalog::default(),
    );

    let first = kex.construct_local_kexinit().unwrap();
    let second = kex.construct_local_kexinit().unwrap();

    assert_eq!(kex.local_kexinit(), Some(second.data()));
    assert_ne!(first.data()[1..17], second.data()[1..17]);
}

#[test]
fn send_init_fails_on_timeout() {
    let mut transport = MockTransport::default();
    transport.time_out = true;

    let mut kex = Kex::new(
        transport,
        MockCrypto::default(),
        AlgorithmCatalog::default(),
    );

    match kex.send_init() {
        Err(ConnectionError::Timeout) => {}
        other => panic!("expected timeout, got {:?}", other),
    }

    // The announcement itself went out
    assert_eq!(kex.transport().sent.len(), 1);
}

#[test]
fn send_init_fails_on_transport_error() {
    let mut transport = MockTransport::default();
    transport.refuse_send = true;

    let mut kex = Kex::new(
        transport,
        MockCrypto::default(),
        AlgorithmCatalog::default(),
    );

    assert!(kex.send_init().is_err());
    assert!(kex.transport().sent.is_empty());
}

#[test]
fn kexdh_init_aborts_without_a_public_value() {
    let mut kex = Kex::new(
        MockTransport::default(),
        MockCrypto::default(),
        AlgorithmCatalog::default(),
    );

    match kex.send_kexdh_init() {
        Err(ConnectionError::KeyExchangeError) => {}
        other => panic!("expected key exchange error, got {:?}", other),
    }

    assert!(kex.transport().sent.is_empty());
    assert!(kex.public_key().is_none());
}

#[test]
fn kexdh_init_frames_the_public_value() {
    let mut transport = MockTransport::default();
    transport.incoming.push_back(Packet::new(MessageType::KexDhReply));

    let mut crypto = MockCrypto::default();
    crypto.public = Some(BigInt::from(128));

    let mut kex = Kex::new(transport, crypto, AlgorithmCatalog::default());

    kex.send_kexdh_init().unwrap();

    // Tag, then mpint with the sign-disambiguating leading zero
    assert_eq!(kex.transport().sent,
               vec![vec![30, 0, 0, 0, 2, 0x00, 0x80]]);
    // Retained in canonical unsigned form
    assert_eq!(kex.public_key(), Some(&[0x80][..]));
}

#[test]
fn kexdh_init_fails_when_the_reply_never_comes() {
    let mut transport = MockTransport::default();
    transport.time_out = true;

    let mut crypto = MockCrypto::default();
    crypto.public = Some(BigInt::from(2));

    let mut kex = Kex::new(transport, crypto, AlgorithmCatalog::default());

    match kex.send_kexdh_init() {
        Err(ConnectionError::Timeout) => {}
        other => panic!("expected timeout, got {:?}", other),
    }
    assert_eq!(kex.transport().sent.len(), 1);
}
