use thiserror::Error;

#[derive(Error, PartialEq, Eq, Debug, Clone)]
pub enum TxScriptError {
    #[error("opcode requires {0} bytes, but script only has {1} remaining")]
    MalformedPush(usize, usize),
    #[error("transaction input index {0} >= {1}")]
    InvalidIndex(usize, usize),
    #[error("combined stack size {0} > max allowed {1}")]
    StackSizeExceeded(usize, usize),
    #[error("attempt to execute invalid opcode {0}")]
    InvalidOpcode(String),
    #[error("attempt to execute reserved opcode {0}")]
    OpcodeReserved(String),
    #[error("attempt to execute disabled opcode {0}")]
    OpcodeDisabled(String),
    #[error("attempt to read from empty stack")]
    EmptyStack,
    #[error("false stack entry at end of script execution")]
    EvalFalse,
    #[error("script returned early")]
    EarlyReturn,
    #[error("script ran, but verification failed")]
    VerifyError,
    #[error("encountered invalid state while running script: {0}")]
    InvalidState(String),
    #[error("exceeded max operation limit of {0}")]
    TooManyOperations(usize),
    #[error("Engine is not running on a transaction input")]
    NotATransactionInput,
    #[error("element size {0} exceeds max allowed size {1}")]
    ElementTooBig(usize, usize),
    #[error("push encoding is not minimal: {0}")]
    NotMinimalData(String),
    #[error("Unsatisfied lock time: {0}")]
    UnsatisfiedLockTime(String),
    #[error("negative lock time: {0}")]
    NegativeLockTime(i64),
    #[error("Number too big: {0}")]
    NumberTooBig(String),
    #[error("invalid signature count: {0}")]
    InvalidSignatureCount(String),
    #[error("invalid pubkey count: {0}")]
    InvalidPubKeyCount(String),
    #[error("signature is not strictly DER encoded")]
    SigDer,
    #[error("extra multisig argument is not empty")]
    SigNullDummy,
    #[error("signature script is not push only")]
    SignatureScriptNotPushOnly,
    #[error("end of script reached in conditional execution")]
    ErrUnbalancedConditional,
    #[error("opcode requires at least {0} but stack has only {1}")]
    InvalidStackOperation(usize, usize),
    #[error("stack index {0} is negative")]
    NegativeStackIndex(i32),
    #[error("jump target {0} is outside of the script's {1} operations")]
    InvalidJump(usize, usize),
    #[error("script of size {0} exceeded maximum allowed size of {1}")]
    ScriptSize(usize, usize),
}

/// Coarse classification of script failures.
///
/// Only `SemanticFailure` is an ordinary "this input does not authorize the
/// spend" outcome; every other kind means the script is structurally broken or
/// exceeded a resource bound.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum ErrorKind {
    MalformedScript,
    ResourceLimit,
    InvalidStackAccess,
    UnbalancedConditional,
    SemanticFailure,
}

impl TxScriptError {
    pub fn kind(&self) -> ErrorKind {
        use TxScriptError::*;
        match self {
            MalformedPush(..)
            | InvalidIndex(..)
            | InvalidOpcode(_)
            | OpcodeReserved(_)
            | OpcodeDisabled(_)
            | InvalidState(_)
            | ElementTooBig(..)
            | NotMinimalData(_)
            | NumberTooBig(_)
            | SignatureScriptNotPushOnly
            | InvalidJump(..) => ErrorKind::MalformedScript,

            StackSizeExceeded(..) | TooManyOperations(_) | InvalidSignatureCount(_) | InvalidPubKeyCount(_) | ScriptSize(..) => {
                ErrorKind::ResourceLimit
            }

            EmptyStack | InvalidStackOperation(..) | NegativeStackIndex(_) => ErrorKind::InvalidStackAccess,

            ErrUnbalancedConditional => ErrorKind::UnbalancedConditional,

            EvalFalse
            | EarlyReturn
            | VerifyError
            | NotATransactionInput
            | UnsatisfiedLockTime(_)
            | NegativeLockTime(_)
            | SigDer
            | SigNullDummy => ErrorKind::SemanticFailure,
        }
    }

    pub fn is_semantic_failure(&self) -> bool {
        self.kind() == ErrorKind::SemanticFailure
    }
}
