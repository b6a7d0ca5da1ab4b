pub mod constants;

use crate::forks::Forks;
use constants::consensus::{
    MAX_OPS_PER_SCRIPT, MAX_PUB_KEYS_PER_MULTISIG, MAX_SCRIPT_ELEMENT_SIZE, MAX_SCRIPT_NUMBER_SIZE, MAX_SCRIPT_SIZE, MAX_STACK_SIZE,
};
use serde::{Deserialize, Serialize};

/// Resource limits enforced by the script engine.
///
/// Threaded through engine construction so that a rule set can tighten or
/// relax them without touching the engine itself. Missing fields fall back to
/// the consensus defaults when loaded from a config file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScriptLimits {
    pub max_ops_per_script: usize,
    /// Pooled limit over the primary and alternate stacks
    pub max_stack_size: usize,
    pub max_pub_keys_per_multisig: usize,
    pub max_script_element_size: usize,
    pub max_script_size: usize,
    pub max_script_number_size: usize,
}

impl ScriptLimits {
    pub const fn new() -> Self {
        Self {
            max_ops_per_script: MAX_OPS_PER_SCRIPT,
            max_stack_size: MAX_STACK_SIZE,
            max_pub_keys_per_multisig: MAX_PUB_KEYS_PER_MULTISIG,
            max_script_element_size: MAX_SCRIPT_ELEMENT_SIZE,
            max_script_size: MAX_SCRIPT_SIZE,
            max_script_number_size: MAX_SCRIPT_NUMBER_SIZE,
        }
    }

    /// Limits in force under the given rule set.
    ///
    /// Every legacy soft fork so far shares the same limits, so this only
    /// exists as the single place where a future rule set would diverge.
    pub fn for_forks(_forks: Forks) -> Self {
        Self::new()
    }
}

impl Default for ScriptLimits {
    fn default() -> Self {
        Self::new()
    }
}
