pub const SIG_HASH_ALL: SigHashType = SigHashType(0b00000001);
pub const SIG_HASH_NONE: SigHashType = SigHashType(0b00000010);
pub const SIG_HASH_SINGLE: SigHashType = SigHashType(0b00000011);
pub const SIG_HASH_ANY_ONE_CAN_PAY: SigHashType = SigHashType(0b10000000);

/// SIG_HASH_MASK selects the bits of the hash type which identify which outputs are signed.
/// Any other value in these bits signs like SIG_HASH_ALL.
pub const SIG_HASH_MASK: u8 = 0b00011111;

const DEFINED_SIG_HASH_TYPES_VALUES: [u8; 6] = [
    SIG_HASH_ALL.0,
    SIG_HASH_NONE.0,
    SIG_HASH_SINGLE.0,
    SIG_HASH_ALL.0 | SIG_HASH_ANY_ONE_CAN_PAY.0,
    SIG_HASH_NONE.0 | SIG_HASH_ANY_ONE_CAN_PAY.0,
    SIG_HASH_SINGLE.0 | SIG_HASH_ANY_ONE_CAN_PAY.0,
];

/// The trailing byte of a legacy signature.
///
/// Consensus accepts every value; only `NONE`, `SINGLE` and the
/// `ANYONECANPAY` bit change what is signed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SigHashType(pub(crate) u8);

impl SigHashType {
    pub fn is_sighash_all(self) -> bool {
        !self.is_sighash_none() && !self.is_sighash_single()
    }

    pub fn is_sighash_none(self) -> bool {
        self.0 & SIG_HASH_MASK == SIG_HASH_NONE.0
    }

    pub fn is_sighash_single(self) -> bool {
        self.0 & SIG_HASH_MASK == SIG_HASH_SINGLE.0
    }

    pub fn is_sighash_anyone_can_pay(self) -> bool {
        self.0 & SIG_HASH_ANY_ONE_CAN_PAY.0 == SIG_HASH_ANY_ONE_CAN_PAY.0
    }

    /// Whether this is one of the six standard hash types
    pub fn is_defined(self) -> bool {
        DEFINED_SIG_HASH_TYPES_VALUES.contains(&self.0)
    }

    pub fn to_u8(self) -> u8 {
        self.0
    }

    pub fn from_u8(val: u8) -> Self {
        Self(val)
    }
}
