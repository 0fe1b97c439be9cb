extern crate byteorder;
extern crate num_bigint;
extern crate rand;
#[macro_use]
extern crate log;

pub mod algorithm;
pub mod crypto;
pub mod error;
pub mod kex;
pub mod message;
pub mod packet;
pub mod transport;

pub use self::algorithm::AlgorithmCatalog;
pub use self::crypto::Crypto;
pub use self::kex::Kex;
pub use self::transport::{StreamTransport, Transport};
