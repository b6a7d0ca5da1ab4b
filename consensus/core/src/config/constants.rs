pub mod consensus {
    //!
    //! A module for constants which directly impact script validation.
    //!

    //
    // ~~~~~~~~~~~~~~~~~~~~~~~~~ Script limits ~~~~~~~~~~~~~~~~~~~~~~~~~
    //

    /// Maximum number of non-push operations per script
    pub const MAX_OPS_PER_SCRIPT: usize = 201;

    /// Maximum number of items on the primary and alternate stacks combined
    pub const MAX_STACK_SIZE: usize = 1000;

    /// Maximum number of public keys in a single multisig check
    pub const MAX_PUB_KEYS_PER_MULTISIG: usize = 20;

    /// Maximum number of bytes pushable to the stack
    pub const MAX_SCRIPT_ELEMENT_SIZE: usize = 520;

    /// Maximum script length in bytes
    pub const MAX_SCRIPT_SIZE: usize = 10_000;

    /// Maximum byte length of a number operand for arithmetic opcodes
    pub const MAX_SCRIPT_NUMBER_SIZE: usize = 4;

    /// Lock-time operands (BIP65, BIP112) may use one extra byte
    pub const MAX_LOCK_TIME_NUMBER_SIZE: usize = 5;

    //
    // ~~~~~~~~~~~~~~~~~~~~~~~~~ Lock times ~~~~~~~~~~~~~~~~~~~~~~~~~
    //

    /// Lock times below this value are block heights, otherwise unix timestamps
    pub const LOCKTIME_THRESHOLD: u32 = 500_000_000;

    //
    // ~~~~~~~~~~~~~~~~~~~~~~~~~ Mainnet activation heights ~~~~~~~~~~~~~~~~~~~~~~~~~
    //

    pub const BIP16_ACTIVATION_HEIGHT: u32 = 173_805;
    pub const BIP66_ACTIVATION_HEIGHT: u32 = 363_725;
    pub const BIP65_ACTIVATION_HEIGHT: u32 = 388_381;
    pub const BIP112_ACTIVATION_HEIGHT: u32 = 419_328;
    pub const NULL_DUMMY_ACTIVATION_HEIGHT: u32 = 481_824;
}
