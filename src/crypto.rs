use algorithm::{CompressionAlgorithm, EncryptionAlgorithm,
                KeyExchangeAlgorithm, MacAlgorithm, PublicKeyAlgorithm};
use error::ConnectionResult;
use num_bigint::BigInt;

/// The cryptographic side of a session.
///
/// The kex engine commits negotiated algorithms through the setters, one
/// per category, and requests the ephemeral public value for the
/// Diffie-Hellman exchange. A setter may reject an algorithm that parses
/// but is not usable in this build.
pub trait Crypto {
    fn negotiated_kex(&mut self, algorithm: KeyExchangeAlgorithm)
        -> ConnectionResult<()>;

    fn negotiated_host_key(&mut self, algorithm: PublicKeyAlgorithm)
        -> ConnectionResult<()>;

    fn negotiated_encryption_c2s(&mut self, algorithm: EncryptionAlgorithm)
        -> ConnectionResult<()>;

    fn negotiated_encryption_s2c(&mut self, algorithm: EncryptionAlgorithm)
        -> ConnectionResult<()>;

    fn negotiated_mac_c2s(&mut self, algorithm: MacAlgorithm)
        -> ConnectionResult<()>;

    fn negotiated_mac_s2c(&mut self, algorithm: MacAlgorithm)
        -> ConnectionResult<()>;

    fn negotiated_compression_c2s(&mut self, algorithm: CompressionAlgorithm)
        -> ConnectionResult<()>;

    fn negotiated_compression_s2c(&mut self, algorithm: CompressionAlgorithm)
        -> ConnectionResult<()>;

    /// Generate the ephemeral key pair for the negotiated kex algorithm
    /// and return the public value.
    fn kex_public(&mut self) -> ConnectionResult<BigInt>;
}
