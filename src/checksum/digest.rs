// Digest engines and algorithm registry
// Maps algorithm names to cached file digesters

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, Mutex};

use ::digest::consts::{U16, U20, U28, U32, U48, U64, U128};
use ::digest::Digest;
use tracing::debug;

use super::cksum::{Crc32, PosixCksum};
use super::error::ChecksumError;
use super::keccak::KeccakSponge;

/// Trait for hash algorithm implementations
pub trait Hasher: Send {
    /// Update the hasher with new data
    fn update(&mut self, data: &[u8]);

    /// Finalize the hash and return the result
    fn finalize(self: Box<Self>) -> Vec<u8>;

    /// Get the output size in bytes
    fn output_size(&self) -> usize;
}

/// Adapter from any RustCrypto `Digest` to [`Hasher`]
pub struct DigestWrapper<D>(D);

impl<D> Hasher for DigestWrapper<D>
where
    D: Digest + Send,
{
    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.0, data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        Digest::finalize(self.0).to_vec()
    }

    fn output_size(&self) -> usize {
        <D as Digest>::output_size()
    }
}

/// Constructor for a fresh hasher; every calculation gets its own state
pub type HasherFactory = fn() -> Box<dyn Hasher>;

fn wrap<D: Digest + Send + 'static>() -> Box<dyn Hasher> {
    Box::new(DigestWrapper(D::new()))
}

fn cksum() -> Box<dyn Hasher> {
    Box::new(PosixCksum::new())
}

fn crc32() -> Box<dyn Hasher> {
    Box::new(Crc32::new())
}

fn keccak288() -> Box<dyn Hasher> {
    Box::new(KeccakSponge::keccak288())
}

/// How the raw digest bytes are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestFormat {
    /// Lowercase hexadecimal, two characters per byte
    Hex,
    /// Big-endian 32-bit value printed in base 10
    Decimal,
}

struct Engine {
    name: &'static str,
    factory: HasherFactory,
    format: DigestFormat,
    salted: bool,
}

const fn hex(name: &'static str, factory: HasherFactory) -> Engine {
    Engine {
        name,
        factory,
        format: DigestFormat::Hex,
        salted: false,
    }
}

/// Every supported algorithm with its canonical name
static ENGINES: &[Engine] = &[
    Engine {
        name: "Cksum",
        factory: cksum,
        format: DigestFormat::Decimal,
        salted: false,
    },
    Engine {
        name: "CRC32",
        factory: crc32,
        format: DigestFormat::Decimal,
        salted: true,
    },
    hex("BLAKE2B-160", wrap::<blake2::Blake2b<U20>>),
    hex("BLAKE2B-256", wrap::<blake2::Blake2b<U32>>),
    hex("BLAKE2B-384", wrap::<blake2::Blake2b<U48>>),
    hex("BLAKE2B-512", wrap::<blake2::Blake2b512>),
    hex("GOST3411", wrap::<gost94::Gost94CryptoPro>),
    hex("GOST3411-2012-256", wrap::<streebog::Streebog256>),
    hex("GOST3411-2012-512", wrap::<streebog::Streebog512>),
    hex("KECCAK-224", wrap::<sha3::Keccak224>),
    hex("KECCAK-256", wrap::<sha3::Keccak256>),
    hex("KECCAK-288", keccak288),
    hex("KECCAK-384", wrap::<sha3::Keccak384>),
    hex("KECCAK-512", wrap::<sha3::Keccak512>),
    hex("MD2", wrap::<md2::Md2>),
    hex("MD4", wrap::<md4::Md4>),
    hex("MD5", wrap::<md5::Md5>),
    hex("RIPEMD128", wrap::<ripemd::Ripemd128>),
    hex("RIPEMD160", wrap::<ripemd::Ripemd160>),
    hex("RIPEMD256", wrap::<ripemd::Ripemd256>),
    hex("RIPEMD320", wrap::<ripemd::Ripemd320>),
    hex("SHA", wrap::<sha1::Sha1>),
    hex("SHA-1", wrap::<sha1::Sha1>),
    hex("SHA-224", wrap::<sha2::Sha224>),
    hex("SHA-256", wrap::<sha2::Sha256>),
    hex("SHA3-224", wrap::<sha3::Sha3_224>),
    hex("SHA3-256", wrap::<sha3::Sha3_256>),
    hex("SHA3-384", wrap::<sha3::Sha3_384>),
    hex("SHA3-512", wrap::<sha3::Sha3_512>),
    hex("SHA-384", wrap::<sha2::Sha384>),
    hex("SHA-512", wrap::<sha2::Sha512>),
    hex("SHA-512/224", wrap::<sha2::Sha512_224>),
    hex("SHA-512/256", wrap::<sha2::Sha512_256>),
    hex("SKEIN-1024-1024", wrap::<skein::Skein1024<U128>>),
    hex("SKEIN-1024-384", wrap::<skein::Skein1024<U48>>),
    hex("SKEIN-1024-512", wrap::<skein::Skein1024<U64>>),
    hex("SKEIN-256-128", wrap::<skein::Skein256<U16>>),
    hex("SKEIN-256-160", wrap::<skein::Skein256<U20>>),
    hex("SKEIN-256-224", wrap::<skein::Skein256<U28>>),
    hex("SKEIN-256-256", wrap::<skein::Skein256<U32>>),
    hex("SKEIN-512-128", wrap::<skein::Skein512<U16>>),
    hex("SKEIN-512-160", wrap::<skein::Skein512<U20>>),
    hex("SKEIN-512-224", wrap::<skein::Skein512<U28>>),
    hex("SKEIN-512-256", wrap::<skein::Skein512<U32>>),
    hex("SKEIN-512-384", wrap::<skein::Skein512<U48>>),
    hex("SKEIN-512-512", wrap::<skein::Skein512<U64>>),
    hex("SM3", wrap::<sm3::Sm3>),
    hex("TIGER", wrap::<tiger::Tiger>),
    hex("WHIRLPOOL", wrap::<whirlpool::Whirlpool>),
];

/// Algorithms used when a caller does not choose any
pub const DEFAULT_ALGORITHMS: [&str; 2] = ["MD5", "SHA-1"];

/// Canonical names of every supported algorithm, in registry order
pub fn supported_algorithms() -> Vec<&'static str> {
    ENGINES.iter().map(|engine| engine.name).collect()
}

// Read size used when streaming files through a hasher
const STREAMING_BUFFER_SIZE: usize = 32 * 1024;

/// Computes the digest of a file for one algorithm
///
/// A digester holds no per-file state: each calculation builds a fresh hasher,
/// so a single instance can be shared by every target and execution.
pub struct FileDigester {
    algorithm: &'static str,
    factory: HasherFactory,
    format: DigestFormat,
    salted: bool,
}

impl std::fmt::Debug for FileDigester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileDigester")
            .field("algorithm", &self.algorithm)
            .field("format", &self.format)
            .finish()
    }
}

impl FileDigester {
    fn from_engine(engine: &Engine) -> Self {
        Self {
            algorithm: engine.name,
            factory: engine.factory,
            format: engine.format,
            salted: engine.salted,
        }
    }

    /// Canonical algorithm name
    pub fn algorithm(&self) -> &'static str {
        self.algorithm
    }

    /// Extension of files holding this digest, e.g. `.sha256` for SHA-256
    pub fn file_extension(&self) -> String {
        format!(".{}", self.algorithm.to_lowercase().replace('-', ""))
    }

    pub fn format(&self) -> DigestFormat {
        self.format
    }

    /// Whether a salt passed to [`calculate_salted`](Self::calculate_salted) is used
    pub fn accepts_salt(&self) -> bool {
        self.salted
    }

    /// Digest output size in bits
    pub fn output_bits(&self) -> usize {
        (self.factory)().output_size() * 8
    }

    /// Compute the digest of a file
    pub fn calculate(&self, path: &Path) -> Result<String, ChecksumError> {
        self.calculate_salted(path, None)
    }

    /// Compute the digest of a file, appending `salt` to the content first
    ///
    /// Engines that do not accept a salt ignore it.
    pub fn calculate_salted(&self, path: &Path, salt: Option<&[u8]>) -> Result<String, ChecksumError> {
        let mut hasher = (self.factory)();

        let mut file = File::open(path).map_err(|e| {
            ChecksumError::from_io_error(e, "reading", Some(path.to_path_buf()))
        })?;

        let mut buffer = vec![0u8; STREAMING_BUFFER_SIZE];
        loop {
            let bytes_read = file.read(&mut buffer).map_err(|e| {
                ChecksumError::from_io_error(e, "reading", Some(path.to_path_buf()))
            })?;

            if bytes_read == 0 {
                break;
            }

            hasher.update(&buffer[..bytes_read]);
        }

        match salt {
            Some(salt) if self.salted && !salt.is_empty() => hasher.update(salt),
            Some(salt) if !salt.is_empty() => {
                debug!("{} does not use a salt, ignoring it", self.algorithm);
            }
            _ => {}
        }

        Ok(self.render(&hasher.finalize()))
    }

    /// Recompute the digest of a file and compare it to `expected`, ignoring case
    pub fn verify(&self, path: &Path, expected: &str) -> Result<(), ChecksumError> {
        let actual = self.calculate(path)?;
        if actual.eq_ignore_ascii_case(expected.trim()) {
            Ok(())
        } else {
            Err(ChecksumError::ChecksumMismatch {
                path: path.to_path_buf(),
                algorithm: self.algorithm.to_string(),
                expected: expected.to_string(),
                actual,
            })
        }
    }

    fn render(&self, bytes: &[u8]) -> String {
        match self.format {
            DigestFormat::Hex => bytes_to_hex(bytes),
            DigestFormat::Decimal => bytes
                .iter()
                .fold(0u64, |value, &b| (value << 8) | u64::from(b))
                .to_string(),
        }
    }
}

/// Information about a hash algorithm
#[derive(Debug, Clone, serde::Serialize)]
pub struct AlgorithmInfo {
    pub name: String,
    pub extension: String,
    pub output_bits: usize,
    pub cryptographic: bool,
}

/// Registry for digest engines
///
/// Lookups are case-insensitive. The first lookup of an algorithm builds its
/// digester; later lookups, under any casing, return the same instance.
#[derive(Debug, Default)]
pub struct DigesterRegistry {
    digesters: Mutex<HashMap<&'static str, Arc<FileDigester>>>,
}

impl DigesterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn engine(algorithm: &str) -> Option<&'static Engine> {
        ENGINES
            .iter()
            .find(|engine| engine.name.eq_ignore_ascii_case(algorithm.trim()))
    }

    /// Canonical spelling of `algorithm`, if it is supported
    pub fn canonical_name(algorithm: &str) -> Option<&'static str> {
        Self::engine(algorithm).map(|engine| engine.name)
    }

    /// Check if an algorithm name is supported
    pub fn is_supported(algorithm: &str) -> bool {
        Self::canonical_name(algorithm).is_some()
    }

    /// Get the digester for the specified algorithm
    pub fn get(&self, algorithm: &str) -> Result<Arc<FileDigester>, ChecksumError> {
        let engine = Self::engine(algorithm).ok_or_else(|| ChecksumError::UnsupportedAlgorithm {
                algorithm: algorithm.to_string(),
            })?;

        let mut digesters = self
            .digesters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let digester = digesters
            .entry(engine.name)
            .or_insert_with(|| Arc::new(FileDigester::from_engine(engine)));

        Ok(Arc::clone(digester))
    }

    /// List all available algorithms
    pub fn list_algorithms() -> Vec<AlgorithmInfo> {
        ENGINES
            .iter()
            .map(|engine| {
                let digester = FileDigester::from_engine(engine);
                AlgorithmInfo {
                    name: engine.name.to_string(),
                    extension: digester.file_extension(),
                    output_bits: digester.output_bits(),
                    cryptographic: engine.format == DigestFormat::Hex,
                }
            })
            .collect()
    }
}

/// Convert bytes to lowercase hexadecimal string
fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
