#[macro_use]
mod macros;

use crate::{
    TxScriptEngine, TxScriptError,
    data_stack::DataStack,
    number::{ScriptNum, stack_bool},
    script::Operation,
};
use bitscript_consensus_core::{
    config::constants::consensus::{LOCKTIME_THRESHOLD, MAX_LOCK_TIME_NUMBER_SIZE},
    forks::Forks,
    tx::{SEQUENCE_FINAL, SEQUENCE_LOCKTIME_DISABLE_FLAG, SEQUENCE_LOCKTIME_MASK, SEQUENCE_LOCKTIME_TYPE_FLAG, Transaction},
};
use bitscript_hashes::{hash160, ripemd160, sha1, sha256, sha256d};

type OpCodeResult = Result<(), TxScriptError>;

/// Pushes and small integers; these do not count towards the operation limit
#[inline]
pub fn is_push(code: u8) -> bool {
    code <= codes::Op16
}

/// Opcodes carrying an immediate data payload
#[inline]
pub fn is_data_push(code: u8) -> bool {
    code <= codes::OpPushData4
}

#[inline]
pub fn is_counted(code: u8) -> bool {
    code > codes::Op16
}

/// Disabled opcodes fail a script even inside an unexecuted branch
#[inline]
pub fn is_disabled(code: u8) -> bool {
    matches!(
        code,
        codes::OpCat
            | codes::OpSubStr
            | codes::OpLeft
            | codes::OpRight
            | codes::OpInvert
            | codes::OpAnd
            | codes::OpOr
            | codes::OpXor
            | codes::Op2Mul
            | codes::Op2Div
            | codes::OpMul
            | codes::OpDiv
            | codes::OpMod
            | codes::OpLShift
            | codes::OpRShift
    )
}

/// Flow control opcodes, which run regardless of the branch state
#[inline]
pub fn is_conditional(code: u8) -> bool {
    (codes::OpIf..=codes::OpEndIf).contains(&code)
}

#[inline]
pub fn is_always_illegal(code: u8) -> bool {
    matches!(code, codes::OpVerIf | codes::OpVerNotIf)
}

/// Resolves a mnemonic, with or without the `OP_` prefix and in any case.
/// Data pushes have no name form.
pub fn from_name(token: &str) -> Option<u8> {
    let upper = token.to_ascii_uppercase();
    let bare = upper.strip_prefix("OP_").unwrap_or(&upper);
    match bare {
        "FALSE" => Some(codes::OpFalse),
        "TRUE" => Some(codes::OpTrue),
        "NOP2" => Some(codes::OpNop2),
        "NOP3" => Some(codes::OpNop3),
        _ => (0..=u8::MAX).find(|&code| (code == codes::OpFalse || !is_data_push(code)) && name(code) == bare),
    }
}

// Helpers for opcodes with shared bodies
#[inline]
fn push_data(op: &Operation, vm: &mut TxScriptEngine) -> OpCodeResult {
    if vm.is_enabled(Forks::MINIMAL_DATA) {
        op.check_minimal_data_push().map_err(TxScriptError::NotMinimalData)?;
    }
    vm.push(op.data().to_vec());
    Ok(())
}

#[inline]
fn push_number(number: i64, vm: &mut TxScriptEngine) -> OpCodeResult {
    vm.push_number(ScriptNum::new(number));
    Ok(())
}

#[inline]
fn verify(result: bool) -> OpCodeResult {
    match result {
        true => Ok(()),
        false => Err(TxScriptError::VerifyError),
    }
}

fn reserved(op: &Operation) -> OpCodeResult {
    Err(TxScriptError::OpcodeReserved(format!("OP_{}", name(op.code()))))
}

fn disabled(op: &Operation) -> OpCodeResult {
    Err(TxScriptError::OpcodeDisabled(format!("OP_{}", name(op.code()))))
}

fn unknown(op: &Operation) -> OpCodeResult {
    Err(TxScriptError::InvalidOpcode(format!("OP_{}", name(op.code()))))
}

#[inline]
fn unary(vm: &mut TxScriptEngine, f: impl FnOnce(i64) -> i64) -> OpCodeResult {
    let value = vm.pop_script_num()?;
    push_number(f(value.value()), vm)
}

/// Applies `f` to the two top items in push order, i.e. `f(second, top)`
#[inline]
fn binary(vm: &mut TxScriptEngine, f: impl FnOnce(i64, i64) -> i64) -> OpCodeResult {
    let (first, second) = vm.pop_binary()?;
    push_number(f(second.value(), first.value()), vm)
}

#[inline]
fn hash_top<const N: usize>(vm: &mut TxScriptEngine, f: fn(&[u8]) -> [u8; N]) -> OpCodeResult {
    let item = vm.pop()?;
    vm.push(f(&item).to_vec());
    Ok(())
}

fn check_lock_time(tx: &Transaction, input_index: usize, lock_time: i64) -> OpCodeResult {
    let tx_lock_time = tx.lock_time as i64;
    let threshold = LOCKTIME_THRESHOLD as i64;

    // Heights and timestamps are not comparable
    if (tx_lock_time < threshold) != (lock_time < threshold) {
        return Err(TxScriptError::UnsatisfiedLockTime(format!(
            "mismatched locktime types -- tx locktime {tx_lock_time}, stack locktime {lock_time}"
        )));
    }
    if lock_time > tx_lock_time {
        return Err(TxScriptError::UnsatisfiedLockTime(format!(
            "locktime requirement not satisfied -- locktime is greater than the transaction locktime: {lock_time} > {tx_lock_time}"
        )));
    }

    // A final input would let the transaction bypass its lock time altogether
    if tx.inputs[input_index].sequence == SEQUENCE_FINAL {
        return Err(TxScriptError::UnsatisfiedLockTime("transaction input is finalized".to_string()));
    }
    Ok(())
}

fn check_sequence(tx: &Transaction, input_index: usize, sequence: i64) -> OpCodeResult {
    let tx_sequence = tx.inputs[input_index].sequence as i64;

    if tx.version < 2 {
        return Err(TxScriptError::UnsatisfiedLockTime(format!(
            "transaction version {} does not support relative lock times",
            tx.version
        )));
    }
    if tx_sequence & SEQUENCE_LOCKTIME_DISABLE_FLAG as i64 != 0 {
        return Err(TxScriptError::UnsatisfiedLockTime(format!(
            "transaction sequence has sequence locktime disabled bit set: {tx_sequence:#x}"
        )));
    }

    // Only the type flag and the value take part in the comparison
    let mask = (SEQUENCE_LOCKTIME_TYPE_FLAG | SEQUENCE_LOCKTIME_MASK) as i64;
    let type_flag = SEQUENCE_LOCKTIME_TYPE_FLAG as i64;
    let (tx_masked, stack_masked) = (tx_sequence & mask, sequence & mask);
    if (tx_masked < type_flag) != (stack_masked < type_flag) {
        return Err(TxScriptError::UnsatisfiedLockTime(format!(
            "mismatched sequence types -- tx sequence {tx_masked:#x}, stack sequence {stack_masked:#x}"
        )));
    }
    if stack_masked > tx_masked {
        return Err(TxScriptError::UnsatisfiedLockTime(format!(
            "sequence requirement not satisfied -- {stack_masked:#x} > {tx_masked:#x}"
        )));
    }
    Ok(())
}

/*
The opcode table. Every code from 0x00 to 0xff has exactly one entry:

```
opcode OpCodeName<code, "MNEMONIC">(op, vm) expression
// or, for an opcode known under a second name
opcode |OpCodeAlias| OpCodeName<code, "MNEMONIC">(op, vm) expression
```

`op` is the executing operation and `vm` the engine. The engine loop has
already rejected oversized pushes and disabled opcodes, counted the operation
and skipped it if it sits in an unexecuted branch (flow control excepted).

Implementation details in `opcodes/macros.rs`.
*/
opcode_list! {

    // Data push opcodes.
    opcode |Op0| OpFalse<0x00, "0">(op, vm) push_data(op, vm)
    opcode OpData1<0x01, "DATA_1">(op, vm) push_data(op, vm)
    opcode OpData2<0x02, "DATA_2">(op, vm) push_data(op, vm)
    opcode OpData3<0x03, "DATA_3">(op, vm) push_data(op, vm)
    opcode OpData4<0x04, "DATA_4">(op, vm) push_data(op, vm)
    opcode OpData5<0x05, "DATA_5">(op, vm) push_data(op, vm)
    opcode OpData6<0x06, "DATA_6">(op, vm) push_data(op, vm)
    opcode OpData7<0x07, "DATA_7">(op, vm) push_data(op, vm)
    opcode OpData8<0x08, "DATA_8">(op, vm) push_data(op, vm)
    opcode OpData9<0x09, "DATA_9">(op, vm) push_data(op, vm)
    opcode OpData10<0x0a, "DATA_10">(op, vm) push_data(op, vm)
    opcode OpData11<0x0b, "DATA_11">(op, vm) push_data(op, vm)
    opcode OpData12<0x0c, "DATA_12">(op, vm) push_data(op, vm)
    opcode OpData13<0x0d, "DATA_13">(op, vm) push_data(op, vm)
    opcode OpData14<0x0e, "DATA_14">(op, vm) push_data(op, vm)
    opcode OpData15<0x0f, "DATA_15">(op, vm) push_data(op, vm)
    opcode OpData16<0x10, "DATA_16">(op, vm) push_data(op, vm)
    opcode OpData17<0x11, "DATA_17">(op, vm) push_data(op, vm)
    opcode OpData18<0x12, "DATA_18">(op, vm) push_data(op, vm)
    opcode OpData19<0x13, "DATA_19">(op, vm) push_data(op, vm)
    opcode OpData20<0x14, "DATA_20">(op, vm) push_data(op, vm)
    opcode OpData21<0x15, "DATA_21">(op, vm) push_data(op, vm)
    opcode OpData22<0x16, "DATA_22">(op, vm) push_data(op, vm)
    opcode OpData23<0x17, "DATA_23">(op, vm) push_data(op, vm)
    opcode OpData24<0x18, "DATA_24">(op, vm) push_data(op, vm)
    opcode OpData25<0x19, "DATA_25">(op, vm) push_data(op, vm)
    opcode OpData26<0x1a, "DATA_26">(op, vm) push_data(op, vm)
    opcode OpData27<0x1b, "DATA_27">(op, vm) push_data(op, vm)
    opcode OpData28<0x1c, "DATA_28">(op, vm) push_data(op, vm)
    opcode OpData29<0x1d, "DATA_29">(op, vm) push_data(op, vm)
    opcode OpData30<0x1e, "DATA_30">(op, vm) push_data(op, vm)
    opcode OpData31<0x1f, "DATA_31">(op, vm) push_data(op, vm)
    opcode OpData32<0x20, "DATA_32">(op, vm) push_data(op, vm)
    opcode OpData33<0x21, "DATA_33">(op, vm) push_data(op, vm)
    opcode OpData34<0x22, "DATA_34">(op, vm) push_data(op, vm)
    opcode OpData35<0x23, "DATA_35">(op, vm) push_data(op, vm)
    opcode OpData36<0x24, "DATA_36">(op, vm) push_data(op, vm)
    opcode OpData37<0x25, "DATA_37">(op, vm) push_data(op, vm)
    opcode OpData38<0x26, "DATA_38">(op, vm) push_data(op, vm)
    opcode OpData39<0x27, "DATA_39">(op, vm) push_data(op, vm)
    opcode OpData40<0x28, "DATA_40">(op, vm) push_data(op, vm)
    opcode OpData41<0x29, "DATA_41">(op, vm) push_data(op, vm)
    opcode OpData42<0x2a, "DATA_42">(op, vm) push_data(op, vm)
    opcode OpData43<0x2b, "DATA_43">(op, vm) push_data(op, vm)
    opcode OpData44<0x2c, "DATA_44">(op, vm) push_data(op, vm)
    opcode OpData45<0x2d, "DATA_45">(op, vm) push_data(op, vm)
    opcode OpData46<0x2e, "DATA_46">(op, vm) push_data(op, vm)
    opcode OpData47<0x2f, "DATA_47">(op, vm) push_data(op, vm)
    opcode OpData48<0x30, "DATA_48">(op, vm) push_data(op, vm)
    opcode OpData49<0x31, "DATA_49">(op, vm) push_data(op, vm)
    opcode OpData50<0x32, "DATA_50">(op, vm) push_data(op, vm)
    opcode OpData51<0x33, "DATA_51">(op, vm) push_data(op, vm)
    opcode OpData52<0x34, "DATA_52">(op, vm) push_data(op, vm)
    opcode OpData53<0x35, "DATA_53">(op, vm) push_data(op, vm)
    opcode OpData54<0x36, "DATA_54">(op, vm) push_data(op, vm)
    opcode OpData55<0x37, "DATA_55">(op, vm) push_data(op, vm)
    opcode OpData56<0x38, "DATA_56">(op, vm) push_data(op, vm)
    opcode OpData57<0x39, "DATA_57">(op, vm) push_data(op, vm)
    opcode OpData58<0x3a, "DATA_58">(op, vm) push_data(op, vm)
    opcode OpData59<0x3b, "DATA_59">(op, vm) push_data(op, vm)
    opcode OpData60<0x3c, "DATA_60">(op, vm) push_data(op, vm)
    opcode OpData61<0x3d, "DATA_61">(op, vm) push_data(op, vm)
    opcode OpData62<0x3e, "DATA_62">(op, vm) push_data(op, vm)
    opcode OpData63<0x3f, "DATA_63">(op, vm) push_data(op, vm)
    opcode OpData64<0x40, "DATA_64">(op, vm) push_data(op, vm)
    opcode OpData65<0x41, "DATA_65">(op, vm) push_data(op, vm)
    opcode OpData66<0x42, "DATA_66">(op, vm) push_data(op, vm)
    opcode OpData67<0x43, "DATA_67">(op, vm) push_data(op, vm)
    opcode OpData68<0x44, "DATA_68">(op, vm) push_data(op, vm)
    opcode OpData69<0x45, "DATA_69">(op, vm) push_data(op, vm)
    opcode OpData70<0x46, "DATA_70">(op, vm) push_data(op, vm)
    opcode OpData71<0x47, "DATA_71">(op, vm) push_data(op, vm)
    opcode OpData72<0x48, "DATA_72">(op, vm) push_data(op, vm)
    opcode OpData73<0x49, "DATA_73">(op, vm) push_data(op, vm)
    opcode OpData74<0x4a, "DATA_74">(op, vm) push_data(op, vm)
    opcode OpData75<0x4b, "DATA_75">(op, vm) push_data(op, vm)
    opcode OpPushData1<0x4c, "PUSHDATA1">(op, vm) push_data(op, vm)
    opcode OpPushData2<0x4d, "PUSHDATA2">(op, vm) push_data(op, vm)
    opcode OpPushData4<0x4e, "PUSHDATA4">(op, vm) push_data(op, vm)

    opcode Op1Negate<0x4f, "-1">(op, vm) push_number(-1, vm)

    opcode OpReserved<0x50, "RESERVED">(op, vm) reserved(op)

    opcode |Op1| OpTrue<0x51, "1">(op, vm) push_number(1, vm)
    opcode Op2<0x52, "2">(op, vm) push_number(2, vm)
    opcode Op3<0x53, "3">(op, vm) push_number(3, vm)
    opcode Op4<0x54, "4">(op, vm) push_number(4, vm)
    opcode Op5<0x55, "5">(op, vm) push_number(5, vm)
    opcode Op6<0x56, "6">(op, vm) push_number(6, vm)
    opcode Op7<0x57, "7">(op, vm) push_number(7, vm)
    opcode Op8<0x58, "8">(op, vm) push_number(8, vm)
    opcode Op9<0x59, "9">(op, vm) push_number(9, vm)
    opcode Op10<0x5a, "10">(op, vm) push_number(10, vm)
    opcode Op11<0x5b, "11">(op, vm) push_number(11, vm)
    opcode Op12<0x5c, "12">(op, vm) push_number(12, vm)
    opcode Op13<0x5d, "13">(op, vm) push_number(13, vm)
    opcode Op14<0x5e, "14">(op, vm) push_number(14, vm)
    opcode Op15<0x5f, "15">(op, vm) push_number(15, vm)
    opcode Op16<0x60, "16">(op, vm) push_number(16, vm)

    // Control opcodes.
    opcode OpNop<0x61, "NOP">(op, vm) Ok(())
    opcode OpVer<0x62, "VER">(op, vm) reserved(op)

    opcode OpIf<0x63, "IF">(op, vm) {
        let taken = match vm.succeeded() {
            true => vm.pop_bool().map_err(|_| TxScriptError::ErrUnbalancedConditional)?,
            false => false,
        };
        vm.open(taken);
        Ok(())
    }

    opcode OpNotIf<0x64, "NOTIF">(op, vm) {
        let taken = match vm.succeeded() {
            true => !vm.pop_bool().map_err(|_| TxScriptError::ErrUnbalancedConditional)?,
            false => false,
        };
        vm.open(taken);
        Ok(())
    }

    opcode OpVerIf<0x65, "VERIF">(op, vm) reserved(op)
    opcode OpVerNotIf<0x66, "VERNOTIF">(op, vm) reserved(op)

    opcode OpElse<0x67, "ELSE">(op, vm) vm.negate()
    opcode OpEndIf<0x68, "ENDIF">(op, vm) vm.close()

    opcode OpVerify<0x69, "VERIFY">(op, vm) verify(vm.pop_bool()?)
    opcode OpReturn<0x6a, "RETURN">(op, vm) Err(TxScriptError::EarlyReturn)

    // Stack opcodes.
    opcode OpToAltStack<0x6b, "TOALTSTACK">(op, vm) {
        let item = vm.pop()?;
        vm.push_alternate(item);
        Ok(())
    }

    opcode OpFromAltStack<0x6c, "FROMALTSTACK">(op, vm) {
        let item = vm.pop_alternate()?;
        vm.push(item);
        Ok(())
    }

    opcode Op2Drop<0x6d, "2DROP">(op, vm) vm.dstack.drop_items::<2>()
    opcode Op2Dup<0x6e, "2DUP">(op, vm) vm.dstack.dup_items::<2>()
    opcode Op3Dup<0x6f, "3DUP">(op, vm) vm.dstack.dup_items::<3>()
    opcode Op2Over<0x70, "2OVER">(op, vm) vm.dstack.over_items::<2>()
    opcode Op2Rot<0x71, "2ROT">(op, vm) vm.dstack.rot_items::<2>()
    opcode Op2Swap<0x72, "2SWAP">(op, vm) vm.dstack.swap_items::<2>()

    opcode OpIfDup<0x73, "IFDUP">(op, vm) {
        if stack_bool(vm.item(0)?) {
            vm.duplicate(0)?;
        }
        Ok(())
    }

    opcode OpDepth<0x74, "DEPTH">(op, vm) push_number(vm.size() as i64, vm)
    opcode OpDrop<0x75, "DROP">(op, vm) vm.dstack.drop_items::<1>()
    opcode OpDup<0x76, "DUP">(op, vm) vm.duplicate(0)

    opcode OpNip<0x77, "NIP">(op, vm) {
        let position = vm.position(1)?;
        vm.erase(position)?;
        Ok(())
    }

    opcode OpOver<0x78, "OVER">(op, vm) vm.duplicate(1)

    opcode OpPick<0x79, "PICK">(op, vm) {
        let position = vm.pop_position()?;
        let item = vm.dstack[position].clone();
        vm.push(item);
        Ok(())
    }

    opcode OpRoll<0x7a, "ROLL">(op, vm) {
        let position = vm.pop_position()?;
        let item = vm.erase(position)?;
        vm.push(item);
        Ok(())
    }

    opcode OpRot<0x7b, "ROT">(op, vm) vm.dstack.rot_items::<1>()
    opcode OpSwap<0x7c, "SWAP">(op, vm) vm.swap(0, 1)

    opcode OpTuck<0x7d, "TUCK">(op, vm) {
        let top = vm.item(0)?.to_vec();
        let position = vm.position(1)?;
        vm.dstack.insert(position, top);
        Ok(())
    }

    // Splice opcodes.
    opcode OpCat<0x7e, "CAT">(op, vm) disabled(op)
    opcode OpSubStr<0x7f, "SUBSTR">(op, vm) disabled(op)
    opcode OpLeft<0x80, "LEFT">(op, vm) disabled(op)
    opcode OpRight<0x81, "RIGHT">(op, vm) disabled(op)

    opcode OpSize<0x82, "SIZE">(op, vm) {
        let len = vm.item(0)?.len();
        push_number(len as i64, vm)
    }

    // Bitwise logic opcodes.
    opcode OpInvert<0x83, "INVERT">(op, vm) disabled(op)
    opcode OpAnd<0x84, "AND">(op, vm) disabled(op)
    opcode OpOr<0x85, "OR">(op, vm) disabled(op)
    opcode OpXor<0x86, "XOR">(op, vm) disabled(op)

    opcode OpEqual<0x87, "EQUAL">(op, vm) {
        let [a, b] = vm.dstack.pop_raw::<2>()?;
        vm.push_bool(a == b);
        Ok(())
    }

    opcode OpEqualVerify<0x88, "EQUALVERIFY">(op, vm) {
        let [a, b] = vm.dstack.pop_raw::<2>()?;
        verify(a == b)
    }

    opcode OpReserved1<0x89, "RESERVED1">(op, vm) reserved(op)
    opcode OpReserved2<0x8a, "RESERVED2">(op, vm) reserved(op)

    // Numeric related opcodes.
    opcode Op1Add<0x8b, "1ADD">(op, vm) unary(vm, |a| a + 1)
    opcode Op1Sub<0x8c, "1SUB">(op, vm) unary(vm, |a| a - 1)
    opcode Op2Mul<0x8d, "2MUL">(op, vm) disabled(op)
    opcode Op2Div<0x8e, "2DIV">(op, vm) disabled(op)
    opcode OpNegate<0x8f, "NEGATE">(op, vm) unary(vm, |a| -a)
    opcode OpAbs<0x90, "ABS">(op, vm) unary(vm, |a| a.abs())
    opcode OpNot<0x91, "NOT">(op, vm) unary(vm, |a| (a == 0) as i64)
    opcode Op0NotEqual<0x92, "0NOTEQUAL">(op, vm) unary(vm, |a| (a != 0) as i64)

    opcode OpAdd<0x93, "ADD">(op, vm) binary(vm, |a, b| a + b)
    opcode OpSub<0x94, "SUB">(op, vm) binary(vm, |a, b| a - b)
    opcode OpMul<0x95, "MUL">(op, vm) disabled(op)
    opcode OpDiv<0x96, "DIV">(op, vm) disabled(op)
    opcode OpMod<0x97, "MOD">(op, vm) disabled(op)
    opcode OpLShift<0x98, "LSHIFT">(op, vm) disabled(op)
    opcode OpRShift<0x99, "RSHIFT">(op, vm) disabled(op)

    opcode OpBoolAnd<0x9a, "BOOLAND">(op, vm) binary(vm, |a, b| (a != 0 && b != 0) as i64)
    opcode OpBoolOr<0x9b, "BOOLOR">(op, vm) binary(vm, |a, b| (a != 0 || b != 0) as i64)
    opcode OpNumEqual<0x9c, "NUMEQUAL">(op, vm) binary(vm, |a, b| (a == b) as i64)

    opcode OpNumEqualVerify<0x9d, "NUMEQUALVERIFY">(op, vm) {
        let (first, second) = vm.pop_binary()?;
        verify(first == second)
    }

    opcode OpNumNotEqual<0x9e, "NUMNOTEQUAL">(op, vm) binary(vm, |a, b| (a != b) as i64)
    opcode OpLessThan<0x9f, "LESSTHAN">(op, vm) binary(vm, |a, b| (a < b) as i64)
    opcode OpGreaterThan<0xa0, "GREATERTHAN">(op, vm) binary(vm, |a, b| (a > b) as i64)
    opcode OpLessThanOrEqual<0xa1, "LESSTHANOREQUAL">(op, vm) binary(vm, |a, b| (a <= b) as i64)
    opcode OpGreaterThanOrEqual<0xa2, "GREATERTHANOREQUAL">(op, vm) binary(vm, |a, b| (a >= b) as i64)
    opcode OpMin<0xa3, "MIN">(op, vm) binary(vm, i64::min)
    opcode OpMax<0xa4, "MAX">(op, vm) binary(vm, i64::max)

    opcode OpWithin<0xa5, "WITHIN">(op, vm) {
        let (upper, lower, value) = vm.pop_ternary()?;
        vm.push_bool(lower <= value && value < upper);
        Ok(())
    }

    // Crypto opcodes.
    opcode OpRipeMd160<0xa6, "RIPEMD160">(op, vm) hash_top(vm, ripemd160)
    opcode OpSha1<0xa7, "SHA1">(op, vm) hash_top(vm, sha1)
    opcode OpSha256<0xa8, "SHA256">(op, vm) hash_top(vm, sha256)
    opcode OpHash160<0xa9, "HASH160">(op, vm) hash_top(vm, hash160)
    opcode OpHash256<0xaa, "HASH256">(op, vm) hash_top(vm, sha256d)
    opcode OpCodeSeparator<0xab, "CODESEPARATOR">(op, vm) vm.set_jump_register(op, 1)

    opcode OpCheckSig<0xac, "CHECKSIG">(op, vm) {
        let valid = vm.op_check_sig()?;
        vm.push_bool(valid);
        Ok(())
    }

    opcode OpCheckSigVerify<0xad, "CHECKSIGVERIFY">(op, vm) verify(vm.op_check_sig()?)

    opcode OpCheckMultiSig<0xae, "CHECKMULTISIG">(op, vm) {
        let valid = vm.op_check_multisig()?;
        vm.push_bool(valid);
        Ok(())
    }

    opcode OpCheckMultiSigVerify<0xaf, "CHECKMULTISIGVERIFY">(op, vm) verify(vm.op_check_multisig()?)

    // Expansion opcodes.
    opcode OpNop1<0xb0, "NOP1">(op, vm) Ok(())

    opcode |OpNop2| OpCheckLockTimeVerify<0xb1, "CHECKLOCKTIMEVERIFY">(op, vm) {
        if !vm.is_enabled(Forks::BIP65) {
            return Ok(());
        }
        // The operand stays on the stack
        let lock_time = vm.peek_number(MAX_LOCK_TIME_NUMBER_SIZE)?.value();
        if lock_time < 0 {
            return Err(TxScriptError::NegativeLockTime(lock_time));
        }
        let (tx, input_index) = vm.tx_input()?;
        check_lock_time(tx, input_index, lock_time)
    }

    opcode |OpNop3| OpCheckSequenceVerify<0xb2, "CHECKSEQUENCEVERIFY">(op, vm) {
        if !vm.is_enabled(Forks::BIP112) {
            return Ok(());
        }
        let sequence = vm.peek_number(MAX_LOCK_TIME_NUMBER_SIZE)?.value();
        if sequence < 0 {
            return Err(TxScriptError::NegativeLockTime(sequence));
        }
        // Reserved for soft fork extensions, so it acts as a NOP
        if sequence & SEQUENCE_LOCKTIME_DISABLE_FLAG as i64 != 0 {
            return Ok(());
        }
        let (tx, input_index) = vm.tx_input()?;
        check_sequence(tx, input_index, sequence)
    }

    opcode OpNop4<0xb3, "NOP4">(op, vm) Ok(())
    opcode OpNop5<0xb4, "NOP5">(op, vm) Ok(())
    opcode OpNop6<0xb5, "NOP6">(op, vm) Ok(())
    opcode OpNop7<0xb6, "NOP7">(op, vm) Ok(())
    opcode OpNop8<0xb7, "NOP8">(op, vm) Ok(())
    opcode OpNop9<0xb8, "NOP9">(op, vm) Ok(())
    opcode OpNop10<0xb9, "NOP10">(op, vm) Ok(())

    // Undefined opcodes.
    opcode OpUnknown186<0xba, "UNKNOWN186">(op, vm) unknown(op)
    opcode OpUnknown187<0xbb, "UNKNOWN187">(op, vm) unknown(op)
    opcode OpUnknown188<0xbc, "UNKNOWN188">(op, vm) unknown(op)
    opcode OpUnknown189<0xbd, "UNKNOWN189">(op, vm) unknown(op)
    opcode OpUnknown190<0xbe, "UNKNOWN190">(op, vm) unknown(op)
    opcode OpUnknown191<0xbf, "UNKNOWN191">(op, vm) unknown(op)
    opcode OpUnknown192<0xc0, "UNKNOWN192">(op, vm) unknown(op)
    opcode OpUnknown193<0xc1, "UNKNOWN193">(op, vm) unknown(op)
    opcode OpUnknown194<0xc2, "UNKNOWN194">(op, vm) unknown(op)
    opcode OpUnknown195<0xc3, "UNKNOWN195">(op, vm) unknown(op)
    opcode OpUnknown196<0xc4, "UNKNOWN196">(op, vm) unknown(op)
    opcode OpUnknown197<0xc5, "UNKNOWN197">(op, vm) unknown(op)
    opcode OpUnknown198<0xc6, "UNKNOWN198">(op, vm) unknown(op)
    opcode OpUnknown199<0xc7, "UNKNOWN199">(op, vm) unknown(op)
    opcode OpUnknown200<0xc8, "UNKNOWN200">(op, vm) unknown(op)
    opcode OpUnknown201<0xc9, "UNKNOWN201">(op, vm) unknown(op)
    opcode OpUnknown202<0xca, "UNKNOWN202">(op, vm) unknown(op)
    opcode OpUnknown203<0xcb, "UNKNOWN203">(op, vm) unknown(op)
    opcode OpUnknown204<0xcc, "UNKNOWN204">(op, vm) unknown(op)
    opcode OpUnknown205<0xcd, "UNKNOWN205">(op, vm) unknown(op)
    opcode OpUnknown206<0xce, "UNKNOWN206">(op, vm) unknown(op)
    opcode OpUnknown207<0xcf, "UNKNOWN207">(op, vm) unknown(op)
    opcode OpUnknown208<0xd0, "UNKNOWN208">(op, vm) unknown(op)
    opcode OpUnknown209<0xd1, "UNKNOWN209">(op, vm) unknown(op)
    opcode OpUnknown210<0xd2, "UNKNOWN210">(op, vm) unknown(op)
    opcode OpUnknown211<0xd3, "UNKNOWN211">(op, vm) unknown(op)
    opcode OpUnknown212<0xd4, "UNKNOWN212">(op, vm) unknown(op)
    opcode OpUnknown213<0xd5, "UNKNOWN213">(op, vm) unknown(op)
    opcode OpUnknown214<0xd6, "UNKNOWN214">(op, vm) unknown(op)
    opcode OpUnknown215<0xd7, "UNKNOWN215">(op, vm) unknown(op)
    opcode OpUnknown216<0xd8, "UNKNOWN216">(op, vm) unknown(op)
    opcode OpUnknown217<0xd9, "UNKNOWN217">(op, vm) unknown(op)
    opcode OpUnknown218<0xda, "UNKNOWN218">(op, vm) unknown(op)
    opcode OpUnknown219<0xdb, "UNKNOWN219">(op, vm) unknown(op)
    opcode OpUnknown220<0xdc, "UNKNOWN220">(op, vm) unknown(op)
    opcode OpUnknown221<0xdd, "UNKNOWN221">(op, vm) unknown(op)
    opcode OpUnknown222<0xde, "UNKNOWN222">(op, vm) unknown(op)
    opcode OpUnknown223<0xdf, "UNKNOWN223">(op, vm) unknown(op)
    opcode OpUnknown224<0xe0, "UNKNOWN224">(op, vm) unknown(op)
    opcode OpUnknown225<0xe1, "UNKNOWN225">(op, vm) unknown(op)
    opcode OpUnknown226<0xe2, "UNKNOWN226">(op, vm) unknown(op)
    opcode OpUnknown227<0xe3, "UNKNOWN227">(op, vm) unknown(op)
    opcode OpUnknown228<0xe4, "UNKNOWN228">(op, vm) unknown(op)
    opcode OpUnknown229<0xe5, "UNKNOWN229">(op, vm) unknown(op)
    opcode OpUnknown230<0xe6, "UNKNOWN230">(op, vm) unknown(op)
    opcode OpUnknown231<0xe7, "UNKNOWN231">(op, vm) unknown(op)
    opcode OpUnknown232<0xe8, "UNKNOWN232">(op, vm) unknown(op)
    opcode OpUnknown233<0xe9, "UNKNOWN233">(op, vm) unknown(op)
    opcode OpUnknown234<0xea, "UNKNOWN234">(op, vm) unknown(op)
    opcode OpUnknown235<0xeb, "UNKNOWN235">(op, vm) unknown(op)
    opcode OpUnknown236<0xec, "UNKNOWN236">(op, vm) unknown(op)
    opcode OpUnknown237<0xed, "UNKNOWN237">(op, vm) unknown(op)
    opcode OpUnknown238<0xee, "UNKNOWN238">(op, vm) unknown(op)
    opcode OpUnknown239<0xef, "UNKNOWN239">(op, vm) unknown(op)
    opcode OpUnknown240<0xf0, "UNKNOWN240">(op, vm) unknown(op)
    opcode OpUnknown241<0xf1, "UNKNOWN241">(op, vm) unknown(op)
    opcode OpUnknown242<0xf2, "UNKNOWN242">(op, vm) unknown(op)
    opcode OpUnknown243<0xf3, "UNKNOWN243">(op, vm) unknown(op)
    opcode OpUnknown244<0xf4, "UNKNOWN244">(op, vm) unknown(op)
    opcode OpUnknown245<0xf5, "UNKNOWN245">(op, vm) unknown(op)
    opcode OpUnknown246<0xf6, "UNKNOWN246">(op, vm) unknown(op)
    opcode OpUnknown247<0xf7, "UNKNOWN247">(op, vm) unknown(op)
    opcode OpUnknown248<0xf8, "UNKNOWN248">(op, vm) unknown(op)
    opcode OpUnknown249<0xf9, "UNKNOWN249">(op, vm) unknown(op)
    opcode OpUnknown250<0xfa, "UNKNOWN250">(op, vm) unknown(op)
    opcode OpUnknown251<0xfb, "UNKNOWN251">(op, vm) unknown(op)
    opcode OpUnknown252<0xfc, "UNKNOWN252">(op, vm) unknown(op)
    opcode OpUnknown253<0xfd, "UNKNOWN253">(op, vm) unknown(op)
    opcode OpUnknown254<0xfe, "UNKNOWN254">(op, vm) unknown(op)
    opcode OpUnknown255<0xff, "UNKNOWN255">(op, vm) unknown(op)
}
