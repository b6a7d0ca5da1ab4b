use crate::config::constants::consensus::{
    BIP16_ACTIVATION_HEIGHT, BIP65_ACTIVATION_HEIGHT, BIP66_ACTIVATION_HEIGHT, BIP112_ACTIVATION_HEIGHT, NULL_DUMMY_ACTIVATION_HEIGHT,
};

bitflags::bitflags! {
    /// The consensus rule set a script is validated under.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
    pub struct Forks: u32 {
        /// Pay-to-script-hash evaluation
        const BIP16 = 1 << 0;
        /// OP_CHECKLOCKTIMEVERIFY
        const BIP65 = 1 << 1;
        /// Strict DER signatures
        const BIP66 = 1 << 2;
        /// OP_CHECKSEQUENCEVERIFY
        const BIP112 = 1 << 3;
        /// Pushes and numbers must be minimally encoded
        const MINIMAL_DATA = 1 << 4;
        /// The extra OP_CHECKMULTISIG argument must be empty
        const NULL_DUMMY = 1 << 5;
    }
}

impl Forks {
    /// Soft forks active on mainnet at the given block height.
    ///
    /// `MINIMAL_DATA` is relay policy and never activates by height.
    pub fn active_at(height: u32) -> Self {
        [
            (BIP16_ACTIVATION_HEIGHT, Forks::BIP16),
            (BIP66_ACTIVATION_HEIGHT, Forks::BIP66),
            (BIP65_ACTIVATION_HEIGHT, Forks::BIP65),
            (BIP112_ACTIVATION_HEIGHT, Forks::BIP112),
            (NULL_DUMMY_ACTIVATION_HEIGHT, Forks::NULL_DUMMY),
        ]
        .into_iter()
        .filter(|(activation, _)| height >= *activation)
        .fold(Forks::empty(), |acc, (_, fork)| acc | fork)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_at() {
        struct Test {
            height: u32,
            expected: Forks,
        }

        let tests = vec![
            Test { height: 0, expected: Forks::empty() },
            Test { height: 173_804, expected: Forks::empty() },
            Test { height: 173_805, expected: Forks::BIP16 },
            Test { height: 363_725, expected: Forks::BIP16 | Forks::BIP66 },
            Test { height: 388_381, expected: Forks::BIP16 | Forks::BIP66 | Forks::BIP65 },
            Test { height: 419_328, expected: Forks::BIP16 | Forks::BIP66 | Forks::BIP65 | Forks::BIP112 },
            Test { height: 900_000, expected: Forks::all() - Forks::MINIMAL_DATA },
        ];

        for test in tests {
            assert_eq!(Forks::active_at(test.height), test.expected, "height {}", test.height);
        }
    }

    #[test]
    fn test_serde() {
        let forks = Forks::BIP16 | Forks::BIP65;
        let json = serde_json::to_string(&forks).unwrap();
        assert_eq!(json, "\"BIP16 | BIP65\"");
        assert_eq!(serde_json::from_str::<Forks>(&json).unwrap(), forks);
    }
}
