use crate::{SigCache, SigCacheKey, TxScriptError, script::Script};
use bitscript_consensus_core::{
    forks::Forks,
    hashing::{sighash::calc_legacy_signature_hash, sighash_type::SigHashType},
    tx::Transaction,
};
use log::trace;
use secp256k1::{Message, PublicKey, ecdsa::Signature};

/// Strict DER check for a signature with its trailing hash type byte (BIP66).
///
/// Layout: `0x30 [total-len] 0x02 [R-len] [R] 0x02 [S-len] [S] [hashtype]`.
/// R and S must be positive and must not carry unnecessary leading zeros.
pub fn is_valid_signature_encoding(sig: &[u8]) -> bool {
    let len = sig.len();
    if !(9..=73).contains(&len) {
        return false;
    }
    if sig[0] != 0x30 || sig[1] as usize != len - 3 {
        return false;
    }

    let len_r = sig[3] as usize;
    if 5 + len_r >= len {
        return false;
    }
    let len_s = sig[5 + len_r] as usize;
    if len_r + len_s + 7 != len {
        return false;
    }

    if sig[2] != 0x02 || len_r == 0 || sig[4] & 0x80 != 0 {
        return false;
    }
    if len_r > 1 && sig[4] == 0x00 && sig[5] & 0x80 == 0 {
        return false;
    }

    if sig[len_r + 4] != 0x02 || len_s == 0 || sig[len_r + 6] & 0x80 != 0 {
        return false;
    }
    if len_s > 1 && sig[len_r + 6] == 0x00 && sig[len_r + 7] & 0x80 == 0 {
        return false;
    }
    true
}

/// Rejects a badly encoded signature once BIP66 is active. The empty
/// signature is always allowed, it is the canonical way to fail a check.
pub fn check_signature_encoding(sig: &[u8], forks: Forks) -> Result<(), TxScriptError> {
    if forks.contains(Forks::BIP66) && !sig.is_empty() && !is_valid_signature_encoding(sig) {
        return Err(TxScriptError::SigDer);
    }
    Ok(())
}

/// Verifies `sig` (DER plus hash type byte) by `pub_key` over the legacy
/// signature hash of the input. Anything unparsable is simply a failed check.
pub(crate) fn check_ecdsa(
    sig: &[u8],
    pub_key: &[u8],
    script_code: &Script,
    tx: &Transaction,
    input_index: usize,
    forks: Forks,
    sig_cache: Option<&SigCache>,
) -> bool {
    let Some((&hash_type, der)) = sig.split_last() else {
        return false;
    };
    let parsed = match forks.contains(Forks::BIP66) {
        true => Signature::from_der(der),
        false => Signature::from_der_lax(der),
    };
    let Ok(mut signature) = parsed else {
        return false;
    };
    // libsecp256k1 only accepts low S
    signature.normalize_s();
    let Ok(pub_key) = PublicKey::from_slice(pub_key) else {
        return false;
    };

    let sig_hash = calc_legacy_signature_hash(tx, input_index, script_code.as_bytes(), SigHashType::from_u8(hash_type));
    let message = Message::from_digest(sig_hash.as_bytes());
    let key = SigCacheKey { signature, pub_key, message };

    if let Some(valid) = sig_cache.and_then(|cache| cache.get(&key)) {
        return valid;
    }
    let valid = signature.verify(&message, &pub_key).is_ok();
    trace!("ecdsa check for input {input_index}: {valid}");
    if let Some(cache) = sig_cache {
        cache.insert(key, valid);
    }
    valid
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::caches::Cache;

    /// Mainnet block 170, the first transaction spending a coinbase output
    pub(crate) const BLOCK_170_TX: &str = "0100000001c997a5e56e104102fa209c6a852dd90660a20b2d9c352423edce25857fcd3704000000004847304402204e45e16932b8af514961a1d3a1a25fdf3f4f7732e9d624c6c61548ab5fb8cd410220181522ec8eca07de4860a4acdd12909d831cc56cbbac4622082221a8768d1d0901ffffffff0200ca9a3b00000000434104ae1a62fe09c5f51b13905f07f06b99a2f7159b2225f374cd378d71302fa28414e7aab37397f554a7df5f142c21c1b7303b8a0626f1baded5c72a704f7e6cd84cac00286bee0000000043410411db93e1dcdb8a016b49840f8c53bc1eb68a382e97b1482ecad7b148a6909a5cb2e0eaddfb84ccf9744464f82e160bfa9b8b64f9d4c03f999b8643f656b412a3ac00000000";
    /// The pay-to-pubkey output of block 9's coinbase it spends
    pub(crate) const BLOCK_9_COINBASE_SPK: &str = "410411db93e1dcdb8a016b49840f8c53bc1eb68a382e97b1482ecad7b148a6909a5cb2e0eaddfb84ccf9744464f82e160bfa9b8b64f9d4c03f999b8643f656b412a3ac";
    const BLOCK_170_SIG: &str = "304402204e45e16932b8af514961a1d3a1a25fdf3f4f7732e9d624c6c61548ab5fb8cd410220181522ec8eca07de4860a4acdd12909d831cc56cbbac4622082221a8768d1d0901";
    const BLOCK_9_PUB_KEY: &str = "0411db93e1dcdb8a016b49840f8c53bc1eb68a382e97b1482ecad7b148a6909a5cb2e0eaddfb84ccf9744464f82e160bfa9b8b64f9d4c03f999b8643f656b412a3";

    #[test]
    fn test_signature_encoding() {
        struct Test {
            name: &'static str,
            sig: &'static str,
            valid: bool,
        }

        let tests = vec![
            Test { name: "mainnet signature", sig: BLOCK_170_SIG, valid: true },
            Test { name: "smallest", sig: "300602010102010101", valid: true },
            Test { name: "padded R with high bit", sig: "30070202008102010101", valid: true },
            Test { name: "too short", sig: "3005020101020101", valid: false },
            Test { name: "wrong sequence marker", sig: "310602010102010101", valid: false },
            Test { name: "wrong total length", sig: "300702010102010101", valid: false },
            Test { name: "R marker", sig: "300603010102010101", valid: false },
            Test { name: "negative R", sig: "300602018102010101", valid: false },
            Test { name: "unnecessary R padding", sig: "30070202000102010101", valid: false },
            Test { name: "S marker", sig: "300602010103010101", valid: false },
            Test { name: "negative S", sig: "300602010102018101", valid: false },
            Test { name: "zero length R", sig: "3006020002020101", valid: false },
        ];

        for test in tests {
            assert_eq!(is_valid_signature_encoding(&hex::decode(test.sig).unwrap()), test.valid, "{}", test.name);
        }
    }

    #[test]
    fn test_check_signature_encoding() {
        let bad = hex::decode("300602018102010101").unwrap();
        assert_eq!(check_signature_encoding(&bad, Forks::BIP66), Err(TxScriptError::SigDer));
        assert_eq!(check_signature_encoding(&bad, Forks::all() - Forks::BIP66), Ok(()));
        assert_eq!(check_signature_encoding(&[], Forks::BIP66), Ok(()));
    }

    #[test]
    fn test_check_ecdsa() {
        let tx = Transaction::deserialize(&hex::decode(BLOCK_170_TX).unwrap()).unwrap();
        let script_code = Script::new(hex::decode(BLOCK_9_COINBASE_SPK).unwrap());
        let sig = hex::decode(BLOCK_170_SIG).unwrap();
        let pub_key = hex::decode(BLOCK_9_PUB_KEY).unwrap();
        let cache: SigCache = Cache::new(16);

        for forks in [Forks::empty(), Forks::all()] {
            assert!(check_ecdsa(&sig, &pub_key, &script_code, &tx, 0, forks, Some(&cache)));
        }
        assert_eq!(cache.len(), 1);
        // Served from the cache
        assert!(check_ecdsa(&sig, &pub_key, &script_code, &tx, 0, Forks::empty(), Some(&cache)));

        // A different script code changes the message
        let other_code = Script::new(vec![0x51]);
        assert!(!check_ecdsa(&sig, &pub_key, &other_code, &tx, 0, Forks::empty(), None));

        // A different hash type byte changes the message too
        let mut wrong_hash_type = sig.clone();
        *wrong_hash_type.last_mut().unwrap() = 0x02;
        assert!(!check_ecdsa(&wrong_hash_type, &pub_key, &script_code, &tx, 0, Forks::empty(), None));

        assert!(!check_ecdsa(&[], &pub_key, &script_code, &tx, 0, Forks::empty(), None));
        assert!(!check_ecdsa(&sig, &[0x04, 0x01], &script_code, &tx, 0, Forks::empty(), None));
        assert!(!check_ecdsa(&sig[1..], &pub_key, &script_code, &tx, 0, Forks::empty(), None));
    }
}
