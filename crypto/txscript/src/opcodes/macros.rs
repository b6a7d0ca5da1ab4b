/// Expands the opcode table into the `codes` constants, the mnemonic lookup
/// and the `run_op` dispatcher.
///
/// Each entry reads `opcode [|Alias|] Name<code, "MNEMONIC">(op, vm) handler`,
/// where the handler is an expression over the executing operation `op` and the
/// engine `vm` evaluating to `OpCodeResult`.
macro_rules! opcode_list {
    ( $( opcode $(|$alias:ident|)? $name:ident<$num:literal, $mnemonic:literal>($op:ident, $vm:ident) $code:expr )* ) => {
        pub mod codes {
            $(
                #[allow(non_upper_case_globals)]
                pub const $name: u8 = $num;
                $(
                    #[allow(non_upper_case_globals)]
                    pub const $alias: u8 = $num;
                )?
            )*
        }

        /// Mnemonic of `code` without the `OP_` prefix
        pub fn name(code: u8) -> &'static str {
            match code {
                $( $num => $mnemonic, )*
                #[allow(unreachable_patterns)]
                _ => "UNKNOWN",
            }
        }

        /// Executes a single operation against the engine state
        #[allow(unused_variables)]
        pub(crate) fn run_op(operation: &Operation, engine: &mut TxScriptEngine<'_>) -> OpCodeResult {
            match operation.code() {
                $(
                    $num => {
                        let $op = operation;
                        let $vm = engine;
                        $code
                    }
                )*
                #[allow(unreachable_patterns)]
                code => Err(TxScriptError::InvalidOpcode(format!("{code:#04x}"))),
            }
        }
    };
}
