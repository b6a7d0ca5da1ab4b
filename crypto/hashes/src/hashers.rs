use crate::Hash;
use sha2::Digest;

pub trait HasherBase {
    fn update<A: AsRef<[u8]>>(&mut self, data: A) -> &mut Self;
}

pub trait Hasher: HasherBase + Clone + Default {
    fn finalize(self) -> Hash;
    fn reset(&mut self);
    #[inline(always)]
    fn hash<A: AsRef<[u8]>>(data: A) -> Hash {
        let mut hasher = Self::default();
        hasher.update(data);
        hasher.finalize()
    }
}

/// Single SHA-256
#[derive(Clone, Default)]
pub struct Sha256(sha2::Sha256);

impl Sha256 {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }
}

impl HasherBase for Sha256 {
    #[inline(always)]
    fn update<A: AsRef<[u8]>>(&mut self, data: A) -> &mut Self {
        self.0.update(data);
        self
    }
}

impl Hasher for Sha256 {
    #[inline(always)]
    fn finalize(self) -> Hash {
        Hash::from_bytes(self.0.finalize().into())
    }

    #[inline(always)]
    fn reset(&mut self) {
        self.0.reset();
    }
}

/// Double SHA-256, used for transaction ids and legacy signature hashes
#[derive(Clone, Default)]
pub struct TransactionHash(sha2::Sha256);

impl TransactionHash {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }
}

impl HasherBase for TransactionHash {
    #[inline(always)]
    fn update<A: AsRef<[u8]>>(&mut self, data: A) -> &mut Self {
        self.0.update(data);
        self
    }
}

impl Hasher for TransactionHash {
    #[inline(always)]
    fn finalize(self) -> Hash {
        let first = self.0.finalize();
        Hash::from_bytes(sha2::Sha256::digest(first).into())
    }

    #[inline(always)]
    fn reset(&mut self) {
        self.0.reset();
    }
}

#[inline]
pub fn sha256(data: &[u8]) -> [u8; 32] {
    sha2::Sha256::digest(data).into()
}

#[inline]
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    TransactionHash::hash(data).as_bytes()
}

#[inline]
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    ripemd::Ripemd160::digest(data).into()
}

#[inline]
pub fn sha1(data: &[u8]) -> [u8; 20] {
    ::sha1::Sha1::digest(data).into()
}

/// RIPEMD-160 of SHA-256
#[inline]
pub fn hash160(data: &[u8]) -> [u8; 20] {
    ripemd160(&sha256(data))
}
