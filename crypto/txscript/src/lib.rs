pub mod caches;
pub mod cond_stack;
mod data_stack;
pub mod number;
pub mod opcodes;
pub mod script;
pub mod script_builder;
pub mod signature;
pub mod standard;

use crate::cond_stack::ConditionStack;
use crate::data_stack::DataStack;
use crate::signature::check_signature_encoding;
use bitscript_consensus_core::{config::ScriptLimits, forks::Forks, tx::Transaction};
use log::{debug, trace};
use number::{bool_bytes, stack_bool};
use std::mem;

pub use bitscript_txscript_errors::{ErrorKind, TxScriptError};
pub use caches::Cache;
pub use data_stack::Stack;
pub use number::ScriptNum;
pub use script::{Operation, Script};

pub mod prelude {
    pub use super::standard::*;
}
pub use standard::*;

/// A signature check that has already been performed
#[derive(Clone, Hash, PartialEq, Eq)]
pub struct SigCacheKey {
    signature: secp256k1::ecdsa::Signature,
    pub_key: secp256k1::PublicKey,
    message: secp256k1::Message,
}

/// Outcomes of signature checks, shared between engines
pub type SigCache = Cache<SigCacheKey, bool>;

#[derive(Clone, Copy)]
enum ScriptSource<'a> {
    TxInput { tx: &'a Transaction, idx: usize },
    StandAlone,
}

/// The execution context of a single script.
///
/// Owns the primary, alternate and condition stacks together with the
/// operation counter and the jump register (the operation index following the
/// last executed `OP_CODESEPARATOR`). Everything else is borrowed: the script,
/// the transaction being validated and the signature cache.
pub struct TxScriptEngine<'a> {
    script: Option<&'a Script>,
    script_source: ScriptSource<'a>,
    forks: Forks,
    limits: ScriptLimits,
    sig_cache: Option<&'a SigCache>,

    pub(crate) dstack: Stack,
    astack: Stack,
    cond_stack: ConditionStack,

    num_ops: usize,
    jump: usize,
}

impl Default for TxScriptEngine<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> TxScriptEngine<'a> {
    /// An engine with no script and no transaction, for executing single operations
    pub fn new() -> Self {
        Self {
            script: None,
            script_source: ScriptSource::StandAlone,
            forks: Forks::empty(),
            limits: ScriptLimits::default(),
            sig_cache: None,
            dstack: Vec::new(),
            astack: Vec::new(),
            cond_stack: ConditionStack::new(),
            num_ops: 0,
            jump: 0,
        }
    }

    /// An engine running `script` outside of any transaction. Opcodes that
    /// need the transaction fail with `NotATransactionInput`.
    pub fn from_script(script: &'a Script, forks: Forks) -> Self {
        Self { script: Some(script), forks, limits: ScriptLimits::for_forks(forks), ..Self::new() }
    }

    pub fn from_transaction_input(script: &'a Script, tx: &'a Transaction, input_index: usize, forks: Forks) -> Self {
        Self { script_source: ScriptSource::TxInput { tx, idx: input_index }, ..Self::from_script(script, forks) }
    }

    /// Runs `script` on a copy of `parent`'s primary stack, leaving `parent` untouched
    pub fn from_prevout(script: &'a Script, parent: &TxScriptEngine<'a>) -> Self {
        Self::inherit(script, parent, parent.dstack.clone())
    }

    /// Runs `script` on `parent`'s primary stack, consuming `parent`
    pub fn from_p2sh(script: &'a Script, mut parent: TxScriptEngine<'a>) -> Self {
        let dstack = parent.take_stack();
        Self::inherit(script, &parent, dstack)
    }

    fn inherit(script: &'a Script, parent: &TxScriptEngine<'a>, dstack: Stack) -> Self {
        Self {
            script: Some(script),
            script_source: parent.script_source,
            forks: parent.forks,
            limits: parent.limits,
            sig_cache: parent.sig_cache,
            dstack,
            ..Self::new()
        }
    }

    pub fn with_limits(mut self, limits: ScriptLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_sig_cache(mut self, sig_cache: &'a SigCache) -> Self {
        self.sig_cache = Some(sig_cache);
        self
    }

    /// Moves the primary stack out, leaving it empty
    pub fn take_stack(&mut self) -> Stack {
        mem::take(&mut self.dstack)
    }

    pub fn script(&self) -> Option<&'a Script> {
        self.script
    }

    pub fn forks(&self) -> Forks {
        self.forks
    }

    pub fn limits(&self) -> &ScriptLimits {
        &self.limits
    }

    #[inline]
    pub fn is_enabled(&self, fork: Forks) -> bool {
        self.forks.contains(fork)
    }

    /// False when the script is oversized or holds a push that is truncated or
    /// larger than the element limit. Such a script fails whatever the branch state.
    pub fn is_valid(&self) -> bool {
        self.script.is_none_or(|script| {
            script.len() <= self.limits.max_script_size
                && script.operations().iter().all(|op| op.is_valid() && !op.is_oversized(self.limits.max_script_element_size))
        })
    }

    /// The transaction and input index this engine validates
    pub fn tx_input(&self) -> Result<(&'a Transaction, usize), TxScriptError> {
        match self.script_source {
            ScriptSource::TxInput { tx, idx } if idx < tx.inputs.len() => Ok((tx, idx)),
            ScriptSource::TxInput { tx, idx } => Err(TxScriptError::InvalidIndex(idx, tx.inputs.len())),
            ScriptSource::StandAlone => Err(TxScriptError::NotATransactionInput),
        }
    }

    // Evaluation.

    /// Executes the whole script, failing only on structural errors. The
    /// final stack is not inspected.
    pub fn run(&mut self) -> Result<(), TxScriptError> {
        let Some(script) = self.script else {
            return Err(TxScriptError::InvalidState("no script is bound to the engine".to_string()));
        };
        if script.len() > self.limits.max_script_size {
            return Err(TxScriptError::ScriptSize(script.len(), self.limits.max_script_size));
        }

        for op in script.operations() {
            self.evaluate_op(op).inspect_err(|err| {
                debug!("script failed at offset {} ({}): {err}", op.offset(), opcodes::name(op.code()));
            })?;
        }

        if !self.cond_stack.closed() {
            return Err(TxScriptError::ErrUnbalancedConditional);
        }
        Ok(())
    }

    /// Runs the script and requires a true value on top of the stack
    pub fn evaluate(&mut self) -> Result<(), TxScriptError> {
        self.run()?;
        match self.stack_true() {
            true => Ok(()),
            false => Err(TxScriptError::EvalFalse),
        }
    }

    /// Executes one operation, skipping it when it sits in an unexecuted
    /// branch unless it is flow control.
    pub fn evaluate_op(&mut self, op: &Operation) -> Result<(), TxScriptError> {
        if !op.is_valid() {
            let (required, remaining) = op.truncation();
            return Err(TxScriptError::MalformedPush(required, remaining));
        }
        if op.is_oversized(self.limits.max_script_element_size) {
            return Err(TxScriptError::ElementTooBig(op.data().len(), self.limits.max_script_element_size));
        }
        if op.is_disabled() {
            return Err(TxScriptError::OpcodeDisabled(format!("OP_{}", opcodes::name(op.code()))));
        }
        if op.is_always_illegal() {
            return Err(TxScriptError::OpcodeReserved(format!("OP_{}", opcodes::name(op.code()))));
        }
        self.increment_operation_count(op)?;

        if !self.if_(op) {
            return Ok(());
        }
        trace!("executing {} at offset {}", opcodes::name(op.code()), op.offset());
        opcodes::run_op(op, self)?;

        if self.is_stack_overflow() {
            return Err(TxScriptError::StackSizeExceeded(self.dstack.len() + self.astack.len(), self.limits.max_stack_size));
        }
        Ok(())
    }

    // Registers.

    pub fn operation_count(&self) -> usize {
        self.num_ops
    }

    /// Counts a non-push operation against the per-script limit
    pub fn increment_operation_count(&mut self, op: &Operation) -> Result<(), TxScriptError> {
        if op.is_counted() {
            self.num_ops += 1;
            if self.num_ops > self.limits.max_ops_per_script {
                return Err(TxScriptError::TooManyOperations(self.limits.max_ops_per_script));
            }
        }
        Ok(())
    }

    /// Validates the key count of a multisig and adds it to the operation count
    pub fn increment_multisig_public_key_count(&mut self, count: i32) -> Result<(), TxScriptError> {
        let max = self.limits.max_pub_keys_per_multisig;
        if count < 0 || count as usize > max {
            return Err(TxScriptError::InvalidPubKeyCount(format!("number of pubkeys {count} is outside of [0, {max}]")));
        }
        self.num_ops += count as usize;
        if self.num_ops > self.limits.max_ops_per_script {
            return Err(TxScriptError::TooManyOperations(self.limits.max_ops_per_script));
        }
        Ok(())
    }

    pub fn jump(&self) -> usize {
        self.jump
    }

    /// Points the jump register `offset` operations past `op`, which must be
    /// an operation of the running script. The target may be one past the end.
    pub fn set_jump_register(&mut self, op: &Operation, offset: isize) -> Result<(), TxScriptError> {
        let operations = self.script.map(Script::operations).unwrap_or_default();
        let index = self.script.and_then(|script| script.operation_index(op.offset()));
        let target = index.and_then(|index| index.checked_add_signed(offset));
        match target {
            Some(target) if target <= operations.len() => {
                self.jump = target;
                Ok(())
            }
            _ => Err(TxScriptError::InvalidJump(target.unwrap_or(op.offset()), operations.len())),
        }
    }

    /// The part of the script signed by signature checks: everything after
    /// the last executed code separator
    pub fn subscript(&self) -> Script {
        self.script.map(|script| script.subscript_from(self.jump)).unwrap_or_default()
    }

    // Primary stack.

    pub fn push(&mut self, item: Vec<u8>) {
        self.dstack.push(item);
    }

    pub fn push_copy(&mut self, item: &[u8]) {
        self.dstack.push(item.to_vec());
    }

    pub fn push_bool(&mut self, value: bool) {
        self.dstack.push(bool_bytes(value));
    }

    pub fn push_number(&mut self, number: ScriptNum) {
        self.dstack.push(number.to_bytes());
    }

    pub fn pop(&mut self) -> Result<Vec<u8>, TxScriptError> {
        self.dstack.pop().ok_or(TxScriptError::EmptyStack)
    }

    pub fn pop_bool(&mut self) -> Result<bool, TxScriptError> {
        Ok(stack_bool(&self.pop()?))
    }

    /// Pops a number of at most `max_size` bytes
    pub fn pop_number(&mut self, max_size: usize) -> Result<ScriptNum, TxScriptError> {
        let number = self.peek_number(max_size)?;
        self.dstack.pop();
        Ok(number)
    }

    /// Pops an arithmetic operand
    pub fn pop_script_num(&mut self) -> Result<ScriptNum, TxScriptError> {
        self.pop_number(self.limits.max_script_number_size)
    }

    /// Pops a count or an index, saturated into `i32`
    pub fn pop_i32(&mut self) -> Result<i32, TxScriptError> {
        Ok(self.pop_script_num()?.to_i32())
    }

    /// Decodes the top item without removing it
    pub fn peek_number(&self, max_size: usize) -> Result<ScriptNum, TxScriptError> {
        let [top] = self.dstack.peek_raw::<1>()?;
        ScriptNum::from_bytes(top, max_size, self.is_enabled(Forks::MINIMAL_DATA))
    }

    /// Pops two operands, top first. Nothing is popped unless both decode.
    pub fn pop_binary(&mut self) -> Result<(ScriptNum, ScriptNum), TxScriptError> {
        let [second, first] = self.decode_top::<2>()?;
        self.dstack.truncate(self.dstack.len() - 2);
        Ok((first, second))
    }

    /// Pops three operands, top first. Nothing is popped unless all decode.
    pub fn pop_ternary(&mut self) -> Result<(ScriptNum, ScriptNum, ScriptNum), TxScriptError> {
        let [third, second, first] = self.decode_top::<3>()?;
        self.dstack.truncate(self.dstack.len() - 3);
        Ok((first, second, third))
    }

    fn decode_top<const SIZE: usize>(&self) -> Result<[ScriptNum; SIZE], TxScriptError> {
        let items = self.dstack.peek_raw::<SIZE>()?;
        let require_minimal = self.is_enabled(Forks::MINIMAL_DATA);
        let mut numbers = [ScriptNum::new(0); SIZE];
        // Decoded top down so the first failure reported is the top operand's
        for (number, item) in numbers.iter_mut().zip(items).rev() {
            *number = ScriptNum::from_bytes(item, self.limits.max_script_number_size, require_minimal)?;
        }
        Ok(numbers)
    }

    /// Pops a depth operand (0 is the item below it) and returns the vector
    /// position it designates in the remaining stack
    pub fn pop_position(&mut self) -> Result<usize, TxScriptError> {
        let depth = self.pop_i32()?;
        if depth < 0 {
            return Err(TxScriptError::NegativeStackIndex(depth));
        }
        self.position(depth as usize)
    }

    /// Pops `count` items, returned top first
    pub fn pop_section(&mut self, count: i32) -> Result<Vec<Vec<u8>>, TxScriptError> {
        if count < 0 {
            return Err(TxScriptError::NegativeStackIndex(count));
        }
        let count = count as usize;
        let len = self.dstack.len();
        if count > len {
            return Err(TxScriptError::InvalidStackOperation(count, len));
        }
        let mut section = self.dstack.split_off(len - count);
        section.reverse();
        Ok(section)
    }

    /// The item `index` places below the top
    pub fn item(&self, index: usize) -> Result<&[u8], TxScriptError> {
        let position = self.position(index)?;
        Ok(&self.dstack[position])
    }

    /// Converts a depth from the top into a vector position
    pub fn position(&self, index: usize) -> Result<usize, TxScriptError> {
        let len = self.dstack.len();
        match index < len {
            true => Ok(len - 1 - index),
            false => Err(TxScriptError::InvalidStackOperation(index + 1, len)),
        }
    }

    /// Pushes a copy of the item `index` places below the top
    pub fn duplicate(&mut self, index: usize) -> Result<(), TxScriptError> {
        let item = self.item(index)?.to_vec();
        self.dstack.push(item);
        Ok(())
    }

    /// Exchanges two items given by depth
    pub fn swap(&mut self, left: usize, right: usize) -> Result<(), TxScriptError> {
        let (left, right) = (self.position(left)?, self.position(right)?);
        self.dstack.swap(left, right);
        Ok(())
    }

    /// Removes the item at vector `position`, keeping the order of the rest
    pub fn erase(&mut self, position: usize) -> Result<Vec<u8>, TxScriptError> {
        let len = self.dstack.len();
        match position < len {
            true => Ok(self.dstack.remove(position)),
            false => Err(TxScriptError::InvalidStackOperation(position + 1, len)),
        }
    }

    /// Removes vector positions `first..last`
    pub fn erase_range(&mut self, first: usize, last: usize) -> Result<(), TxScriptError> {
        let len = self.dstack.len();
        if first > last || last > len {
            return Err(TxScriptError::InvalidStackOperation(last, len));
        }
        self.dstack.drain(first..last);
        Ok(())
    }

    pub fn size(&self) -> usize {
        self.dstack.len()
    }

    pub fn is_stack_empty(&self) -> bool {
        self.dstack.is_empty()
    }

    pub fn stack(&self) -> &Stack {
        &self.dstack
    }

    /// Whether the top item is true. An empty stack is not.
    pub fn stack_true(&self) -> bool {
        self.dstack.last().is_some_and(|top| stack_bool(top))
    }

    pub fn stack_false(&self) -> bool {
        !self.stack_true()
    }

    /// The primary and alternate stacks together exceed the limit
    pub fn is_stack_overflow(&self) -> bool {
        self.dstack.len() + self.astack.len() > self.limits.max_stack_size
    }

    // Alternate stack.

    pub fn push_alternate(&mut self, item: Vec<u8>) {
        self.astack.push(item);
    }

    pub fn pop_alternate(&mut self) -> Result<Vec<u8>, TxScriptError> {
        self.astack.pop().ok_or(TxScriptError::EmptyStack)
    }

    pub fn alternate_size(&self) -> usize {
        self.astack.len()
    }

    // Condition stack.

    pub fn open(&mut self, taken: bool) {
        self.cond_stack.open(taken);
    }

    pub fn negate(&mut self) -> Result<(), TxScriptError> {
        self.cond_stack.negate()
    }

    pub fn close(&mut self) -> Result<(), TxScriptError> {
        self.cond_stack.close()
    }

    pub fn closed(&self) -> bool {
        self.cond_stack.closed()
    }

    /// Whether every open branch is taken
    pub fn succeeded(&self) -> bool {
        self.cond_stack.succeeded()
    }

    /// Whether `op` executes in the current branch state
    pub fn if_(&self, op: &Operation) -> bool {
        op.is_conditional() || self.succeeded()
    }

    // Signature opcodes.

    pub(crate) fn op_check_sig(&mut self) -> Result<bool, TxScriptError> {
        let [sig, pub_key] = self.dstack.pop_raw::<2>()?;
        check_signature_encoding(&sig, self.forks)?;
        if sig.is_empty() {
            return Ok(false);
        }

        let (tx, input_index) = self.tx_input()?;
        let script_code = self.subscript().find_and_delete(&sig).strip_code_separators();
        Ok(signature::check_ecdsa(&sig, &pub_key, &script_code, tx, input_index, self.forks, self.sig_cache))
    }

    /// Stack layout, top first: key count, keys, signature count, signatures,
    /// and one extra item that is consumed unused.
    pub(crate) fn op_check_multisig(&mut self) -> Result<bool, TxScriptError> {
        let key_count = self.pop_i32()?;
        self.increment_multisig_public_key_count(key_count)?;
        let pub_keys = self.pop_section(key_count)?;

        let sig_count = self.pop_i32()?;
        if sig_count < 0 || sig_count > key_count {
            return Err(TxScriptError::InvalidSignatureCount(format!(
                "number of signatures {sig_count} is outside of [0, {key_count}]"
            )));
        }
        let signatures = self.pop_section(sig_count)?;

        let dummy = self.pop()?;
        if self.is_enabled(Forks::NULL_DUMMY) && !dummy.is_empty() {
            return Err(TxScriptError::SigNullDummy);
        }
        if signatures.is_empty() {
            return Ok(true);
        }

        let (tx, input_index) = self.tx_input()?;
        let script_code =
            signatures.iter().fold(self.subscript(), |script_code, sig| script_code.find_and_delete(sig)).strip_code_separators();

        // Signatures must match keys in order; each key is tried once
        let (mut sig_index, mut key_index) = (0, 0);
        while sig_index < signatures.len() {
            let sig = &signatures[sig_index];
            check_signature_encoding(sig, self.forks)?;
            if signature::check_ecdsa(sig, &pub_keys[key_index], &script_code, tx, input_index, self.forks, self.sig_cache) {
                sig_index += 1;
            }
            key_index += 1;
            if signatures.len() - sig_index > pub_keys.len() - key_index {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Verifies input `input_index` of `tx` against the script of the output
    /// it spends.
    ///
    /// The signature script runs first. The output script then runs on a copy
    /// of the resulting stack and must leave a true value. When BIP16 is
    /// active and the output script is pay-to-script-hash, the signature
    /// script must be push only, and its last push is run as the redeem script
    /// on the remaining stack.
    pub fn verify_input_with(
        tx: &Transaction,
        input_index: usize,
        prevout_script: &[u8],
        forks: Forks,
        limits: ScriptLimits,
        sig_cache: Option<&SigCache>,
    ) -> Result<(), TxScriptError> {
        let input = tx.inputs.get(input_index).ok_or(TxScriptError::InvalidIndex(input_index, tx.inputs.len()))?;
        let signature_script = Script::new(input.signature_script.clone());
        let prevout_script = Script::new(prevout_script.to_vec());
        trace!("verifying input {input_index} of {} under {forks:?}", tx.id());

        let mut input_engine = TxScriptEngine::from_transaction_input(&signature_script, tx, input_index, forks).with_limits(limits);
        input_engine.sig_cache = sig_cache;
        input_engine.run()?;

        TxScriptEngine::from_prevout(&prevout_script, &input_engine).evaluate()?;

        if forks.contains(Forks::BIP16) && prevout_script.is_pay_to_script_hash() {
            if !signature_script.is_push_only() {
                return Err(TxScriptError::SignatureScriptNotPushOnly);
            }
            let redeem_script = Script::new(input_engine.pop()?);
            TxScriptEngine::from_p2sh(&redeem_script, input_engine).evaluate()?;
        }
        Ok(())
    }
}

/// Verifies input `input_index` of `tx` against `prevout_script` with the
/// limits of `forks` and no signature cache
pub fn verify_input(tx: &Transaction, input_index: usize, prevout_script: &[u8], forks: Forks) -> Result<(), TxScriptError> {
    TxScriptEngine::verify_input_with(tx, input_index, prevout_script, forks, ScriptLimits::for_forks(forks), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcodes::codes::*;
    use crate::script_builder::ScriptBuilder;
    use crate::signature::tests::{BLOCK_9_COINBASE_SPK, BLOCK_170_TX};
    use crate::standard::test_helpers::create_spending_transaction;
    use bitscript_consensus_core::{
        hashing::{
            sighash::calc_legacy_signature_hash,
            sighash_type::{SIG_HASH_ALL, SIG_HASH_NONE, SigHashType},
        },
        tx::{SEQUENCE_FINAL, SEQUENCE_LOCKTIME_DISABLE_FLAG, SEQUENCE_LOCKTIME_TYPE_FLAG},
    };
    use bitscript_hashes::hash160;
    use secp256k1::{Message, PublicKey, SECP256K1, SecretKey};
    use std::iter::once;

    struct ScriptTestCase {
        script: &'static [u8],
        expected_result: Result<(), TxScriptError>,
    }

    fn run_test_script_cases(test_cases: Vec<ScriptTestCase>) {
        let sig_cache = Cache::new(10_000);

        for test in test_cases {
            let script = Script::new(test.script.to_vec());
            let tx = create_spending_transaction(vec![], &script);
            let mut vm = TxScriptEngine::from_transaction_input(&script, &tx, 0, Forks::all()).with_sig_cache(&sig_cache);
            assert_eq!(vm.evaluate(), test.expected_result, "{script}");
        }
    }

    fn evaluate_bytes(bytes: Vec<u8>, forks: Forks) -> Result<(), TxScriptError> {
        let script = Script::new(bytes);
        TxScriptEngine::from_script(&script, forks).evaluate()
    }

    #[test]
    fn test_check_error_condition() {
        let test_cases = vec![
            ScriptTestCase { script: &[OpTrue], expected_result: Ok(()) },
            ScriptTestCase { script: &[OpNop], expected_result: Err(TxScriptError::EvalFalse) },
            ScriptTestCase { script: &[OpTrue, OpTrue], expected_result: Ok(()) },
            ScriptTestCase { script: &[OpFalse], expected_result: Err(TxScriptError::EvalFalse) },
            // Negative zero
            ScriptTestCase { script: &[OpData1, 0x80], expected_result: Err(TxScriptError::EvalFalse) },
            ScriptTestCase { script: &[], expected_result: Err(TxScriptError::EvalFalse) },
        ];

        run_test_script_cases(test_cases)
    }

    #[test]
    fn test_check_opif() {
        let test_cases = vec![
            ScriptTestCase { script: &[OpIf], expected_result: Err(TxScriptError::ErrUnbalancedConditional) },
            ScriptTestCase { script: &[OpTrue, OpIf], expected_result: Err(TxScriptError::ErrUnbalancedConditional) },
            ScriptTestCase { script: &[OpTrue, OpIf, OpTrue, OpEndIf], expected_result: Ok(()) },
            ScriptTestCase { script: &[OpFalse, OpIf, OpTrue, OpEndIf], expected_result: Err(TxScriptError::EvalFalse) },
            // Any true value takes the branch
            ScriptTestCase { script: &[Op2, OpIf, OpTrue, OpEndIf], expected_result: Ok(()) },
            ScriptTestCase { script: &[OpTrue, OpNotIf, OpFalse, OpElse, OpTrue, OpEndIf], expected_result: Ok(()) },
        ];

        run_test_script_cases(test_cases)
    }

    #[test]
    fn test_check_opelse() {
        let test_cases = vec![
            ScriptTestCase { script: &[OpElse], expected_result: Err(TxScriptError::ErrUnbalancedConditional) },
            ScriptTestCase { script: &[OpEndIf], expected_result: Err(TxScriptError::ErrUnbalancedConditional) },
            ScriptTestCase { script: &[OpFalse, OpIf, OpFalse, OpElse, OpTrue, OpEndIf], expected_result: Ok(()) },
            ScriptTestCase { script: &[OpTrue, OpIf, OpElse, OpElse, OpTrue, OpEndIf], expected_result: Ok(()) },
            ScriptTestCase {
                script: &[OpFalse, OpIf, OpTrue, OpIf, OpElse, OpEndIf, OpEndIf, OpTrue],
                expected_result: Ok(()),
            },
            ScriptTestCase {
                script: &[OpTrue, OpTrue, OpIf, OpIf, OpTrue, OpElse, OpFalse, OpEndIf, OpEndIf],
                expected_result: Ok(()),
            },
        ];

        run_test_script_cases(test_cases)
    }

    #[test]
    fn test_unexecuted_opcodes() {
        let test_cases = vec![
            ScriptTestCase {
                script: &[OpFalse, OpIf, OpCat, OpEndIf, OpTrue],
                expected_result: Err(TxScriptError::OpcodeDisabled("OP_CAT".to_string())),
            },
            ScriptTestCase {
                script: &[OpFalse, OpIf, OpVerIf, OpEndIf, OpTrue],
                expected_result: Err(TxScriptError::OpcodeReserved("OP_VERIF".to_string())),
            },
            ScriptTestCase { script: &[OpFalse, OpIf, OpReserved, OpVer, 0xba, OpEndIf, OpTrue], expected_result: Ok(()) },
            ScriptTestCase { script: &[OpReserved], expected_result: Err(TxScriptError::OpcodeReserved("OP_RESERVED".to_string())) },
            ScriptTestCase { script: &[OpVer], expected_result: Err(TxScriptError::OpcodeReserved("OP_VER".to_string())) },
            ScriptTestCase { script: &[0xba], expected_result: Err(TxScriptError::InvalidOpcode("OP_UNKNOWN186".to_string())) },
            ScriptTestCase { script: &[OpTrue, OpReturn], expected_result: Err(TxScriptError::EarlyReturn) },
            ScriptTestCase { script: &[OpFalse, OpIf, OpReturn, OpEndIf, OpTrue], expected_result: Ok(()) },
            ScriptTestCase { script: &[OpTrue, OpNop1, OpNop4, OpNop10], expected_result: Ok(()) },
        ];

        run_test_script_cases(test_cases)
    }

    #[test]
    fn test_arithmetic() {
        let test_cases = vec![
            ScriptTestCase { script: &[Op2, Op3, OpSub, Op1Negate, OpNumEqual], expected_result: Ok(()) },
            ScriptTestCase { script: &[Op2, Op3, OpAdd, Op5, OpEqual], expected_result: Ok(()) },
            ScriptTestCase { script: &[Op1Negate, OpAbs, Op1, OpNumEqual], expected_result: Ok(()) },
            ScriptTestCase { script: &[Op5, OpNegate, OpData1, 0x85, OpEqual], expected_result: Ok(()) },
            ScriptTestCase { script: &[Op2, Op3, OpLessThan], expected_result: Ok(()) },
            ScriptTestCase { script: &[Op3, Op2, OpLessThan], expected_result: Err(TxScriptError::EvalFalse) },
            ScriptTestCase { script: &[Op2, Op1, Op3, OpWithin], expected_result: Ok(()) },
            ScriptTestCase { script: &[Op3, Op1, Op3, OpWithin], expected_result: Err(TxScriptError::EvalFalse) },
            ScriptTestCase { script: &[Op5, Op3, OpMin, Op3, OpNumEqual], expected_result: Ok(()) },
            ScriptTestCase { script: &[Op5, Op3, OpMax, Op5, OpNumEqualVerify, OpTrue], expected_result: Ok(()) },
            ScriptTestCase { script: &[OpFalse, OpNot], expected_result: Ok(()) },
            ScriptTestCase { script: &[Op2, OpNot], expected_result: Err(TxScriptError::EvalFalse) },
            // Results may outgrow the operand size
            ScriptTestCase {
                script: &[OpData4, 0xff, 0xff, 0xff, 0x7f, Op1Add, OpData5, 0x00, 0x00, 0x00, 0x80, 0x00, OpEqual],
                expected_result: Ok(()),
            },
            // But may not be used as operands again
            ScriptTestCase {
                script: &[OpData5, 0x00, 0x00, 0x00, 0x80, 0x00, Op1Add],
                expected_result: Err(TxScriptError::NumberTooBig(
                    "numeric value encoded as [0, 0, 0, 80, 0] is 5 bytes which exceeds the max allowed of 4".to_string(),
                )),
            },
            ScriptTestCase {
                script: &[OpData2, 0x01, 0x00, Op1, OpNumEqual],
                expected_result: Err(TxScriptError::NotMinimalData("numeric value encoded as [1, 0] is not minimally encoded".to_string())),
            },
            ScriptTestCase { script: &[Op1, OpNumEqualVerify], expected_result: Err(TxScriptError::InvalidStackOperation(2, 1)) },
        ];

        run_test_script_cases(test_cases)
    }

    #[test]
    fn test_stack_opcodes() {
        let test_cases = vec![
            ScriptTestCase {
                script: &[Op1, Op2, Op3, Op2, OpPick, Op1, OpEqualVerify, Op2Drop, OpDrop, OpTrue],
                expected_result: Ok(()),
            },
            ScriptTestCase {
                script: &[Op1, Op2, Op3, Op2, OpRoll, Op1, OpEqualVerify, Op3, OpEqualVerify, Op2, OpEqual],
                expected_result: Ok(()),
            },
            ScriptTestCase { script: &[Op1, Op1, OpPick], expected_result: Err(TxScriptError::InvalidStackOperation(2, 1)) },
            ScriptTestCase {
                script: &[Op1, Op1Negate, OpPick],
                expected_result: Err(TxScriptError::NegativeStackIndex(-1)),
            },
            ScriptTestCase {
                script: &[Op1, Op2, OpTuck, Op2, OpEqualVerify, Op1, OpEqualVerify, Op2, OpEqual],
                expected_result: Ok(()),
            },
            ScriptTestCase { script: &[Op1, Op2, OpNip, Op2, OpEqual], expected_result: Ok(()) },
            ScriptTestCase { script: &[Op1, OpNip], expected_result: Err(TxScriptError::InvalidStackOperation(2, 1)) },
            ScriptTestCase {
                script: &[Op1, Op2, OpOver, Op1, OpEqualVerify, Op2, OpEqualVerify, Op1, OpEqual],
                expected_result: Ok(()),
            },
            ScriptTestCase { script: &[Op1, Op2, OpSwap, Op1, OpEqualVerify, Op2, OpEqual], expected_result: Ok(()) },
            ScriptTestCase { script: &[OpFalse, OpIfDup, OpDepth, Op1, OpEqualVerify, OpNot], expected_result: Ok(()) },
            ScriptTestCase { script: &[Op2, OpIfDup, OpDepth, Op2, OpEqual], expected_result: Ok(()) },
            ScriptTestCase {
                script: &[OpData2, 0xaa, 0xbb, OpSize, Op2, OpEqualVerify, OpDrop, OpTrue],
                expected_result: Ok(()),
            },
            ScriptTestCase { script: &[OpSize], expected_result: Err(TxScriptError::InvalidStackOperation(1, 0)) },
            ScriptTestCase { script: &[OpDup], expected_result: Err(TxScriptError::InvalidStackOperation(1, 0)) },
            ScriptTestCase { script: &[OpDrop], expected_result: Err(TxScriptError::InvalidStackOperation(1, 0)) },
            ScriptTestCase { script: &[Op1, OpToAltStack, OpFromAltStack], expected_result: Ok(()) },
            ScriptTestCase { script: &[OpFromAltStack], expected_result: Err(TxScriptError::EmptyStack) },
            ScriptTestCase { script: &[Op1, OpToAltStack], expected_result: Err(TxScriptError::EvalFalse) },
            ScriptTestCase { script: &[OpVerify], expected_result: Err(TxScriptError::EmptyStack) },
            ScriptTestCase { script: &[OpFalse, OpVerify, OpTrue], expected_result: Err(TxScriptError::VerifyError) },
        ];

        run_test_script_cases(test_cases)
    }

    #[test]
    fn test_stack_access_kinds() {
        let tests: Vec<(&[u8], TxScriptError)> = vec![
            (&[Op1, Op1Negate, OpPick], TxScriptError::NegativeStackIndex(-1)),
            (&[Op1, Op1Negate, OpRoll], TxScriptError::NegativeStackIndex(-1)),
            (&[Op1, Op2, OpPick], TxScriptError::InvalidStackOperation(3, 1)),
            (&[OpDrop], TxScriptError::InvalidStackOperation(1, 0)),
        ];

        for (bytes, expected) in tests {
            let script = Script::new(bytes.to_vec());
            let err = TxScriptEngine::from_script(&script, Forks::all()).run().unwrap_err();
            assert_eq!(err, expected, "{script}");
            assert_eq!(err.kind(), ErrorKind::InvalidStackAccess, "{script}");
        }
    }

    #[test]
    fn test_hash_opcodes() {
        struct Test {
            script: &'static str,
            expected_result: Result<(), TxScriptError>,
        }

        let tests = vec![
            Test { script: "0 SHA256 [e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855] EQUAL", expected_result: Ok(()) },
            Test { script: "0 HASH160 [b472a266d0bd89c13706a4132ccfb16f7c3b9fcb] EQUAL", expected_result: Ok(()) },
            Test {
                script: "0 HASH256 [5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456] EQUAL",
                expected_result: Ok(()),
            },
            Test { script: "0 RIPEMD160 [9c1185a5c5e9fc54612808977ee8f548b2258d31] EQUAL", expected_result: Ok(()) },
            Test { script: "0 SHA1 [da39a3ee5e6b4b0d3255bfef95601890afd80709] EQUAL", expected_result: Ok(()) },
            Test { script: "'abc' SHA1 [da39a3ee5e6b4b0d3255bfef95601890afd80709] EQUAL", expected_result: Err(TxScriptError::EvalFalse) },
            Test { script: "SHA256", expected_result: Err(TxScriptError::EmptyStack) },
        ];

        for test in tests {
            let script: Script = test.script.parse().unwrap();
            assert_eq!(TxScriptEngine::from_script(&script, Forks::all()).evaluate(), test.expected_result, "{}", test.script);
        }
    }

    #[test]
    fn test_operation_limit() {
        let nops = |count: usize| vec![OpNop; count].into_iter().chain(once(OpTrue)).collect::<Vec<_>>();
        assert_eq!(evaluate_bytes(nops(201), Forks::empty()), Ok(()));
        assert_eq!(evaluate_bytes(nops(202), Forks::empty()), Err(TxScriptError::TooManyOperations(201)));

        // Operations in unexecuted branches count too
        let branch = |count: usize| [OpFalse, OpIf].into_iter().chain(vec![OpNop; count]).chain([OpEndIf, OpTrue]).collect::<Vec<_>>();
        assert_eq!(evaluate_bytes(branch(199), Forks::empty()), Ok(()));
        assert_eq!(evaluate_bytes(branch(200), Forks::empty()), Err(TxScriptError::TooManyOperations(201)));

        // Pushes and small integers do not
        let pushes = vec![OpTrue; 300].into_iter().chain(vec![OpNop; 201]).collect::<Vec<_>>();
        assert_eq!(evaluate_bytes(pushes, Forks::empty()), Ok(()));

        // The keys of a multisig are added to the count
        let multisig = |count: usize| {
            let mut bytes = vec![OpNop; count];
            bytes.extend([OpFalse, OpFalse]);
            bytes.extend([OpFalse; 16]);
            bytes.extend([Op16, OpCheckMultiSig]);
            bytes
        };
        assert_eq!(evaluate_bytes(multisig(184), Forks::empty()), Ok(()));
        assert_eq!(evaluate_bytes(multisig(185), Forks::empty()), Err(TxScriptError::TooManyOperations(201)));
    }

    #[test]
    fn test_stack_limit() {
        assert_eq!(evaluate_bytes(vec![OpTrue; 1000], Forks::empty()), Ok(()));
        assert_eq!(evaluate_bytes(vec![OpTrue; 1001], Forks::empty()), Err(TxScriptError::StackSizeExceeded(1001, 1000)));

        // The alternate stack shares the limit
        let mut bytes = vec![OpTrue; 1000];
        bytes.push(OpToAltStack);
        assert_eq!(evaluate_bytes(bytes.clone(), Forks::empty()), Ok(()));
        bytes.push(OpTrue);
        assert_eq!(evaluate_bytes(bytes, Forks::empty()), Err(TxScriptError::StackSizeExceeded(1001, 1000)));

        let limits = ScriptLimits { max_stack_size: 2, ..Default::default() };
        let script = Script::new(vec![OpTrue, OpTrue, OpTrue]);
        let mut vm = TxScriptEngine::from_script(&script, Forks::empty()).with_limits(limits);
        assert_eq!(vm.evaluate(), Err(TxScriptError::StackSizeExceeded(3, 2)));
    }

    #[test]
    fn test_size_limits() {
        // Checked before any operation runs, or the op count would fail first
        assert_eq!(evaluate_bytes(vec![OpNop; 10_001], Forks::empty()), Err(TxScriptError::ScriptSize(10_001, 10_000)));

        let push = |len: usize| ScriptBuilder::new().add_data_unchecked(&vec![0xaa; len]).drain();
        let bytes = push(520).into_iter().chain([OpDrop, OpTrue]).collect::<Vec<_>>();
        assert_eq!(evaluate_bytes(bytes, Forks::all()), Ok(()));
        let bytes = push(521).into_iter().chain([OpDrop, OpTrue]).collect::<Vec<_>>();
        assert_eq!(evaluate_bytes(bytes, Forks::all()), Err(TxScriptError::ElementTooBig(521, 520)));

        // Oversized pushes fail even when skipped
        let bytes = [OpFalse, OpIf].into_iter().chain(push(521)).chain([OpEndIf, OpTrue]).collect::<Vec<_>>();
        let script = Script::new(bytes);
        let mut vm = TxScriptEngine::from_script(&script, Forks::empty());
        assert!(!vm.is_valid());
        assert_eq!(vm.evaluate(), Err(TxScriptError::ElementTooBig(521, 520)));
    }

    #[test]
    fn test_malformed_push() {
        let script = Script::new(vec![OpTrue, OpData2, 0xaa]);
        let mut vm = TxScriptEngine::from_script(&script, Forks::empty());
        assert!(!vm.is_valid());
        assert_eq!(vm.evaluate(), Err(TxScriptError::MalformedPush(2, 1)));

        assert_eq!(evaluate_bytes(vec![OpTrue, OpPushData1], Forks::empty()), Err(TxScriptError::MalformedPush(1, 0)));
        assert!(TxScriptEngine::from_script(&Script::new(vec![OpTrue]), Forks::empty()).is_valid());
    }

    #[test]
    fn test_pop_operands() {
        let mut vm = TxScriptEngine::new();
        for value in 1..=3 {
            vm.push_number(ScriptNum::new(value));
        }
        assert_eq!(vm.pop_ternary(), Ok((ScriptNum::new(3), ScriptNum::new(2), ScriptNum::new(1))));
        assert!(vm.is_stack_empty());

        vm.push_number(ScriptNum::new(4));
        vm.push_number(ScriptNum::new(5));
        assert_eq!(vm.pop_binary(), Ok((ScriptNum::new(5), ScriptNum::new(4))));

        // A failed decode pops nothing
        vm.push_number(ScriptNum::new(1));
        vm.push(vec![1, 2, 3, 4, 5]);
        assert!(matches!(vm.pop_binary(), Err(TxScriptError::NumberTooBig(_))));
        assert_eq!(vm.size(), 2);
        assert_eq!(vm.pop_ternary(), Err(TxScriptError::InvalidStackOperation(3, 2)));
        assert_eq!(vm.size(), 2);

        assert_eq!(vm.peek_number(5), Ok(ScriptNum::new(0x0504030201)));
        assert_eq!(vm.pop_number(5), Ok(ScriptNum::new(0x0504030201)));
        assert_eq!(vm.pop_i32(), Ok(1));
        assert_eq!(vm.pop(), Err(TxScriptError::EmptyStack));
        assert_eq!(vm.pop_bool(), Err(TxScriptError::EmptyStack));
    }

    #[test]
    fn test_stack_primitives() {
        let mut vm = TxScriptEngine::new();
        for item in [1, 2, 3] {
            vm.push(vec![item]);
        }
        assert_eq!(vm.item(0), Ok(&[3u8][..]));
        assert_eq!(vm.item(2), Ok(&[1u8][..]));
        assert_eq!(vm.item(3), Err(TxScriptError::InvalidStackOperation(4, 3)));
        assert_eq!(vm.position(0), Ok(2));

        vm.duplicate(2).unwrap();
        assert_eq!(vm.stack(), &vec![vec![1], vec![2], vec![3], vec![1]]);
        vm.swap(0, 1).unwrap();
        assert_eq!(vm.stack(), &vec![vec![1], vec![2], vec![1], vec![3]]);
        assert_eq!(vm.swap(0, 4), Err(TxScriptError::InvalidStackOperation(5, 4)));

        assert_eq!(vm.erase(0), Ok(vec![1]));
        assert_eq!(vm.stack(), &vec![vec![2], vec![1], vec![3]]);
        assert_eq!(vm.erase(3), Err(TxScriptError::InvalidStackOperation(4, 3)));
        vm.erase_range(0, 2).unwrap();
        assert_eq!(vm.stack(), &vec![vec![3]]);
        assert_eq!(vm.erase_range(1, 3), Err(TxScriptError::InvalidStackOperation(3, 1)));

        vm.push(vec![4]);
        vm.push(vec![5]);
        assert_eq!(vm.pop_section(2), Ok(vec![vec![5], vec![4]]));
        assert_eq!(vm.pop_section(2), Err(TxScriptError::InvalidStackOperation(2, 1)));
        assert_eq!(vm.pop_section(-1), Err(TxScriptError::NegativeStackIndex(-1)));
        assert_eq!(vm.pop_section(-1).unwrap_err().kind(), ErrorKind::InvalidStackAccess);
        assert_eq!(vm.pop_section(0), Ok(vec![]));

        // Depth 0 is the item right below the popped operand
        vm.push(vec![6]);
        vm.push_number(ScriptNum::new(1));
        assert_eq!(vm.pop_position(), Ok(0));
        vm.push_number(ScriptNum::new(2));
        assert_eq!(vm.pop_position(), Err(TxScriptError::InvalidStackOperation(3, 2)));

        vm.push_copy(&[0x00, 0x80]);
        assert!(vm.stack_false());
        vm.push_bool(true);
        assert!(vm.stack_true());
    }

    #[test]
    fn test_alternate_and_condition_stacks() {
        let mut vm = TxScriptEngine::new();
        assert_eq!(vm.pop_alternate(), Err(TxScriptError::EmptyStack));
        vm.push_alternate(vec![7]);
        vm.push(vec![1]);
        assert_eq!(vm.alternate_size(), 1);
        assert_eq!(vm.size(), 1);
        assert_eq!(vm.pop_alternate(), Ok(vec![7]));

        let nop = Operation::new(OpNop);
        let endif = Operation::new(OpEndIf);
        assert!(vm.closed() && vm.succeeded());
        vm.open(true);
        vm.open(false);
        assert!(!vm.closed() && !vm.succeeded());
        assert!(!vm.if_(&nop));
        assert!(vm.if_(&endif));
        vm.negate().unwrap();
        assert!(vm.succeeded());
        vm.close().unwrap();
        vm.close().unwrap();
        assert!(vm.closed());
        assert_eq!(vm.negate(), Err(TxScriptError::ErrUnbalancedConditional));
        assert_eq!(vm.close(), Err(TxScriptError::ErrUnbalancedConditional));
    }

    #[test]
    fn test_registers() {
        let mut vm = TxScriptEngine::new();
        assert!(matches!(vm.increment_multisig_public_key_count(-1), Err(TxScriptError::InvalidPubKeyCount(_))));
        assert!(matches!(vm.increment_multisig_public_key_count(21), Err(TxScriptError::InvalidPubKeyCount(_))));
        assert_eq!(vm.increment_multisig_public_key_count(20), Ok(()));
        assert_eq!(vm.operation_count(), 20);
        assert_eq!(vm.increment_operation_count(&Operation::new(OpTrue)), Ok(()));
        assert_eq!(vm.operation_count(), 20);
        assert_eq!(vm.increment_operation_count(&Operation::new(OpNop)), Ok(()));
        assert_eq!(vm.operation_count(), 21);

        // No script to jump in
        assert_eq!(vm.set_jump_register(&Operation::new(OpCodeSeparator), 1), Err(TxScriptError::InvalidJump(0, 0)));
        assert_eq!(vm.run(), Err(TxScriptError::InvalidState("no script is bound to the engine".to_string())));

        let script: Script = "1 CODESEPARATOR 2".parse().unwrap();
        let ops = script.operations();
        let mut vm = TxScriptEngine::from_script(&script, Forks::empty());
        assert_eq!(vm.subscript(), script);
        vm.set_jump_register(&ops[1], 1).unwrap();
        assert_eq!(vm.jump(), 2);
        assert_eq!(vm.subscript().to_string(), "2");
        vm.set_jump_register(&ops[2], 1).unwrap();
        assert!(vm.subscript().is_empty());
        assert_eq!(vm.set_jump_register(&ops[2], 2), Err(TxScriptError::InvalidJump(4, 3)));
        assert_eq!(vm.set_jump_register(&ops[0], -1), Err(TxScriptError::InvalidJump(0, 3)));

        // Executing the separator moves the register
        let mut vm = TxScriptEngine::from_script(&script, Forks::empty());
        vm.evaluate().unwrap();
        assert_eq!(vm.jump(), 2);
        assert_eq!(vm.operation_count(), 1);
    }

    #[test]
    fn test_prevout_copies_and_p2sh_moves() {
        let first: Script = "1 2".parse().unwrap();
        let second: Script = "3".parse().unwrap();

        let mut parent = TxScriptEngine::from_script(&first, Forks::BIP16 | Forks::BIP66);
        parent.run().unwrap();
        parent.push_alternate(vec![9]);

        let mut copy = TxScriptEngine::from_prevout(&second, &parent);
        copy.run().unwrap();
        assert_eq!(copy.size(), 3);
        assert_eq!(copy.alternate_size(), 0);
        assert_eq!(copy.forks(), parent.forks());
        assert_eq!(parent.size(), 2);

        let mut moved = TxScriptEngine::from_p2sh(&second, parent);
        assert_eq!(moved.size(), 2);
        assert_eq!(moved.operation_count(), 0);
        moved.run().unwrap();
        assert_eq!(moved.stack(), &vec![vec![1], vec![2], vec![3]]);

        let mut source = TxScriptEngine::from_script(&first, Forks::empty());
        source.run().unwrap();
        assert_eq!(source.take_stack().len(), 2);
        assert!(source.is_stack_empty());
    }

    #[test]
    fn test_tx_input() {
        let script = Script::new(vec![OpTrue]);
        assert_eq!(TxScriptEngine::new().tx_input().err(), Some(TxScriptError::NotATransactionInput));

        let tx = create_spending_transaction(vec![], &script);
        let vm = TxScriptEngine::from_transaction_input(&script, &tx, 5, Forks::empty());
        assert_eq!(vm.tx_input().err(), Some(TxScriptError::InvalidIndex(5, 1)));

        // Lock time checks need the transaction
        let script: Script = "0 CHECKLOCKTIMEVERIFY".parse().unwrap();
        let mut vm = TxScriptEngine::from_script(&script, Forks::BIP65);
        assert_eq!(vm.evaluate(), Err(TxScriptError::NotATransactionInput));
    }

    #[test]
    fn test_verify_block_170() {
        let mut tx = Transaction::deserialize(&hex::decode(BLOCK_170_TX).unwrap()).unwrap();
        let prevout_script = hex::decode(BLOCK_9_COINBASE_SPK).unwrap();

        for forks in [Forks::empty(), Forks::active_at(170), Forks::active_at(800_000), Forks::all()] {
            assert_eq!(verify_input(&tx, 0, &prevout_script, forks), Ok(()), "{forks:?}");
        }
        assert_eq!(verify_input(&tx, 1, &prevout_script, Forks::all()), Err(TxScriptError::InvalidIndex(1, 1)));

        let cache: SigCache = Cache::new(16);
        for _ in 0..2 {
            let result = TxScriptEngine::verify_input_with(&tx, 0, &prevout_script, Forks::all(), ScriptLimits::default(), Some(&cache));
            assert_eq!(result, Ok(()));
        }
        assert_eq!(cache.len(), 1);

        tx.outputs[0].value += 1;
        assert_eq!(verify_input(&tx, 0, &prevout_script, Forks::all()), Err(TxScriptError::EvalFalse));
    }

    fn key_pair(seed: u8) -> (SecretKey, [u8; 33]) {
        let secret_key = SecretKey::from_slice(&[seed; 32]).unwrap();
        let pub_key = PublicKey::from_secret_key(SECP256K1, &secret_key).serialize();
        (secret_key, pub_key)
    }

    fn sign(tx: &Transaction, script_code: &Script, secret_key: &SecretKey, hash_type: SigHashType) -> Vec<u8> {
        let sig_hash = calc_legacy_signature_hash(tx, 0, script_code.as_bytes(), hash_type);
        let signature = SECP256K1.sign_ecdsa(&Message::from_digest(sig_hash.as_bytes()), secret_key);
        signature.serialize_der().iter().copied().chain(once(hash_type.to_u8())).collect()
    }

    #[test]
    fn test_pay_to_pubkey_hash() {
        let (secret_key, pub_key) = key_pair(0x11);
        let prevout_script = pay_to_pubkey_hash(&hash160(&pub_key));
        let mut tx = create_spending_transaction(vec![], &prevout_script);
        let sig = sign(&tx, &prevout_script, &secret_key, SIG_HASH_ALL);

        tx.inputs[0].signature_script = pay_to_pubkey_hash_signature_script(&sig, &pub_key).unwrap();
        assert_eq!(verify_input(&tx, 0, prevout_script.as_bytes(), Forks::all()), Ok(()));

        // The key does not hash to the committed hash
        let (_, other_key) = key_pair(0x22);
        tx.inputs[0].signature_script = pay_to_pubkey_hash_signature_script(&sig, &other_key).unwrap();
        assert_eq!(verify_input(&tx, 0, prevout_script.as_bytes(), Forks::all()), Err(TxScriptError::VerifyError));

        // The hash type is part of the signed message
        let mut wrong_hash_type = sig.clone();
        *wrong_hash_type.last_mut().unwrap() = SIG_HASH_NONE.to_u8();
        tx.inputs[0].signature_script = pay_to_pubkey_hash_signature_script(&wrong_hash_type, &pub_key).unwrap();
        assert_eq!(verify_input(&tx, 0, prevout_script.as_bytes(), Forks::all()), Err(TxScriptError::EvalFalse));
    }

    #[test]
    fn test_code_separator_signing() {
        let (secret_key, pub_key) = key_pair(0x33);
        let prevout_script = Script::from_operations([
            Operation::new(OpNop),
            Operation::new(OpCodeSeparator),
            Operation::push(pub_key.to_vec()),
            Operation::new(OpCheckSig),
        ]);
        let mut tx = create_spending_transaction(vec![], &prevout_script);

        let subscript = Script::new(prevout_script.as_bytes()[2..].to_vec());
        let sig = sign(&tx, &subscript, &secret_key, SIG_HASH_ALL);
        tx.inputs[0].signature_script = ScriptBuilder::new().add_data(&sig).unwrap().drain();
        assert_eq!(verify_input(&tx, 0, prevout_script.as_bytes(), Forks::all()), Ok(()));

        let sig = sign(&tx, &prevout_script, &secret_key, SIG_HASH_ALL);
        tx.inputs[0].signature_script = ScriptBuilder::new().add_data(&sig).unwrap().drain();
        assert_eq!(verify_input(&tx, 0, prevout_script.as_bytes(), Forks::all()), Err(TxScriptError::EvalFalse));
    }

    #[test]
    fn test_pay_to_script_hash_multisig() {
        let keys = (1..=3).map(key_pair).collect::<Vec<_>>();
        let pub_keys = keys.iter().map(|(_, pub_key)| *pub_key).collect::<Vec<_>>();
        let redeem_script = multisig_redeem_script(&pub_keys, 2).unwrap();
        let prevout_script = pay_to_script_hash(&redeem_script);
        let mut tx = create_spending_transaction(vec![], &prevout_script);

        let sig1 = sign(&tx, &redeem_script, &keys[0].0, SIG_HASH_ALL);
        let sig3 = sign(&tx, &redeem_script, &keys[2].0, SIG_HASH_ALL);
        let spend = |sigs: &[&[u8]], dummy: u8, extra: Option<u8>| {
            let mut builder = ScriptBuilder::new();
            builder.add_op(dummy).unwrap();
            for sig in sigs {
                builder.add_data(sig).unwrap();
            }
            if let Some(op) = extra {
                builder.add_op(op).unwrap();
            }
            pay_to_script_hash_signature_script(&redeem_script, builder.drain()).unwrap()
        };
        let verify = |tx: &Transaction, forks| verify_input(tx, 0, prevout_script.as_bytes(), forks);

        tx.inputs[0].signature_script = spend(&[&sig1, &sig3], OpFalse, None);
        assert_eq!(verify(&tx, Forks::all()), Ok(()));

        // Signatures must follow the key order
        tx.inputs[0].signature_script = spend(&[&sig3, &sig1], OpFalse, None);
        assert_eq!(verify(&tx, Forks::all()), Err(TxScriptError::EvalFalse));

        tx.inputs[0].signature_script = spend(&[&sig1, &sig3], OpTrue, None);
        assert_eq!(verify(&tx, Forks::all()), Err(TxScriptError::SigNullDummy));
        assert_eq!(verify(&tx, Forks::active_at(400_000)), Ok(()));

        tx.inputs[0].signature_script = spend(&[&sig1, &sig3], OpFalse, Some(OpNop));
        assert_eq!(verify(&tx, Forks::all()), Err(TxScriptError::SignatureScriptNotPushOnly));
        // Before BIP16 only the hash is checked
        assert_eq!(verify(&tx, Forks::empty()), Ok(()));

        // One signature short, so the dummy slot is taken by a signature
        tx.inputs[0].signature_script = spend(&[&sig1], OpFalse, None);
        assert_eq!(verify(&tx, Forks::all()), Err(TxScriptError::EmptyStack));
    }

    #[test]
    fn test_lock_time_verify() {
        let prevout_script = ScriptBuilder::new()
            .add_lock_time(500)
            .unwrap()
            .add_ops(&[OpCheckLockTimeVerify, OpDrop, OpTrue])
            .unwrap()
            .build();
        let verify = |lock_time: u32, sequence: u32, forks: Forks| {
            let mut tx = create_spending_transaction(vec![], &prevout_script);
            tx.lock_time = lock_time;
            tx.inputs[0].sequence = sequence;
            verify_input(&tx, 0, prevout_script.as_bytes(), forks)
        };

        assert_eq!(verify(600, 0, Forks::all()), Ok(()));
        assert_eq!(verify(500, 0, Forks::all()), Ok(()));
        assert!(matches!(verify(400, 0, Forks::all()), Err(TxScriptError::UnsatisfiedLockTime(_))));
        assert!(matches!(verify(600, SEQUENCE_FINAL, Forks::all()), Err(TxScriptError::UnsatisfiedLockTime(_))));
        // Heights do not compare to timestamps
        assert!(matches!(verify(500_000_001, 0, Forks::all()), Err(TxScriptError::UnsatisfiedLockTime(_))));
        // A no-op before BIP65
        assert_eq!(verify(400, SEQUENCE_FINAL, Forks::empty()), Ok(()));
    }

    #[test]
    fn test_sequence_verify() {
        let prevout_script = ScriptBuilder::new()
            .add_sequence(10)
            .unwrap()
            .add_ops(&[OpCheckSequenceVerify, OpDrop, OpTrue])
            .unwrap()
            .build();
        let verify = |version: i32, sequence: u32, forks: Forks| {
            let mut tx = create_spending_transaction(vec![], &prevout_script);
            tx.version = version;
            tx.inputs[0].sequence = sequence;
            verify_input(&tx, 0, prevout_script.as_bytes(), forks)
        };

        assert_eq!(verify(2, 20, Forks::all()), Ok(()));
        assert!(matches!(verify(1, 20, Forks::all()), Err(TxScriptError::UnsatisfiedLockTime(_))));
        assert!(matches!(verify(2, 5, Forks::all()), Err(TxScriptError::UnsatisfiedLockTime(_))));
        assert!(matches!(verify(2, 20 | SEQUENCE_LOCKTIME_TYPE_FLAG, Forks::all()), Err(TxScriptError::UnsatisfiedLockTime(_))));
        assert!(matches!(verify(2, 20 | SEQUENCE_LOCKTIME_DISABLE_FLAG, Forks::all()), Err(TxScriptError::UnsatisfiedLockTime(_))));
        assert_eq!(verify(1, 5, Forks::empty()), Ok(()));
    }
}

#[cfg(test)]
mod bitcoind_tests {
    use serde::Deserialize;
    use std::fs::File;
    use std::io::BufReader;
    use std::path::Path;

    use super::*;
    use crate::script::ScriptTextError;
    use crate::standard::test_helpers::create_spending_transaction;

    #[derive(PartialEq, Eq, Debug, Clone)]
    enum UnifiedError {
        TxScriptError(TxScriptError),
        ScriptTextError(ScriptTextError),
    }

    #[derive(PartialEq, Eq, Debug, Clone)]
    struct TestError {
        expected_result: String,
        result: Result<(), UnifiedError>,
    }

    #[allow(dead_code)]
    #[derive(Deserialize, Debug, Clone)]
    #[serde(untagged)]
    enum JsonTestRow {
        Test(String, String, String, String),
        TestWithComment(String, String, String, String, String),
        Comment((String,)),
    }

    impl JsonTestRow {
        fn test_row(&self) -> Result<(), TestError> {
            let (sig_script, script_pub_key, flags, expected_result) = match self.clone() {
                JsonTestRow::Test(sig_script, script_pub_key, flags, expected_result) => {
                    (sig_script, script_pub_key, flags, expected_result)
                }
                JsonTestRow::TestWithComment(sig_script, script_pub_key, flags, expected_result, _) => {
                    (sig_script, script_pub_key, flags, expected_result)
                }
                JsonTestRow::Comment(_) => {
                    return Ok(());
                }
            };

            let result = Self::run_test(&sig_script, &script_pub_key, parse_flags(&flags));

            match Self::result_name(result.clone()).contains(&expected_result.as_str()) {
                true => Ok(()),
                false => Err(TestError { expected_result, result }),
            }
        }

        fn run_test(sig_script: &str, script_pub_key: &str, forks: Forks) -> Result<(), UnifiedError> {
            let sig_script: Script = sig_script.parse().map_err(UnifiedError::ScriptTextError)?;
            let script_pub_key: Script = script_pub_key.parse().map_err(UnifiedError::ScriptTextError)?;

            let tx = create_spending_transaction(sig_script.into_bytes(), &script_pub_key);
            verify_input(&tx, 0, script_pub_key.as_bytes(), forks).map_err(UnifiedError::TxScriptError)
        }

        fn result_name(result: Result<(), UnifiedError>) -> Vec<&'static str> {
            match result {
                Ok(_) => vec!["OK"],
                Err(UnifiedError::TxScriptError(e)) => match e {
                    TxScriptError::EvalFalse => vec!["EVAL_FALSE"],
                    TxScriptError::EmptyStack => vec!["INVALID_STACK_OPERATION", "INVALID_ALTSTACK_OPERATION"],
                    TxScriptError::InvalidStackOperation(_, _) => vec!["INVALID_STACK_OPERATION"],
                    TxScriptError::NegativeStackIndex(_) => vec!["INVALID_STACK_OPERATION"],
                    TxScriptError::ErrUnbalancedConditional => vec!["UNBALANCED_CONDITIONAL"],
                    TxScriptError::OpcodeReserved(_) => vec!["BAD_OPCODE"],
                    TxScriptError::InvalidOpcode(_) => vec!["BAD_OPCODE"],
                    TxScriptError::MalformedPush(_, _) => vec!["BAD_OPCODE"],
                    TxScriptError::OpcodeDisabled(_) => vec!["DISABLED_OPCODE"],
                    TxScriptError::EarlyReturn => vec!["OP_RETURN"],
                    TxScriptError::VerifyError => vec!["VERIFY", "EQUALVERIFY"],
                    TxScriptError::NumberTooBig(_) => vec!["UNKNOWN_ERROR"],
                    TxScriptError::NotMinimalData(_) => vec!["MINIMALDATA", "UNKNOWN_ERROR"],
                    TxScriptError::ElementTooBig(_, _) => vec!["PUSH_SIZE"],
                    TxScriptError::TooManyOperations(_) => vec!["OP_COUNT"],
                    TxScriptError::StackSizeExceeded(_, _) => vec!["STACK_SIZE"],
                    TxScriptError::ScriptSize(_, _) => vec!["SCRIPT_SIZE"],
                    TxScriptError::InvalidPubKeyCount(_) => vec!["PUBKEY_COUNT"],
                    TxScriptError::InvalidSignatureCount(_) => vec!["SIG_COUNT"],
                    TxScriptError::SigDer => vec!["SIG_DER"],
                    TxScriptError::SigNullDummy => vec!["SIG_NULLDUMMY"],
                    TxScriptError::SignatureScriptNotPushOnly => vec!["SIG_PUSHONLY"],
                    TxScriptError::NegativeLockTime(_) => vec!["NEGATIVE_LOCKTIME"],
                    TxScriptError::UnsatisfiedLockTime(_) => vec!["UNSATISFIED_LOCKTIME"],
                    _ => vec![],
                },
                Err(UnifiedError::ScriptTextError(_)) => vec![],
            }
        }
    }

    /// Maps the reference flag names onto forks
    fn parse_flags(flags: &str) -> Forks {
        flags.split(',').map(str::trim).filter(|flag| !flag.is_empty() && *flag != "NONE").fold(Forks::empty(), |forks, flag| {
            forks
                | match flag {
                    "P2SH" => Forks::BIP16,
                    "CHECKLOCKTIMEVERIFY" => Forks::BIP65,
                    "DERSIG" => Forks::BIP66,
                    "CHECKSEQUENCEVERIFY" => Forks::BIP112,
                    "MINIMALDATA" => Forks::MINIMAL_DATA,
                    "NULLDUMMY" => Forks::NULL_DUMMY,
                    other => panic!("unknown script flag {other}"),
                }
        })
    }

    #[test]
    fn test_bitcoind_tests() {
        bitscript_core::log::try_init_test_logger();
        let file =
            File::open(Path::new(env!("CARGO_MANIFEST_DIR")).join("test-data").join("script_tests.json")).expect("Could not find test file");
        let reader = BufReader::new(file);

        let tests: Vec<JsonTestRow> = serde_json::from_reader(reader).expect("Failed parsing script_tests.json");
        for row in tests {
            if let Err(error) = row.test_row() {
                panic!("Test: {:?} failed: {:?}", row.clone(), error);
            }
        }
    }
}
