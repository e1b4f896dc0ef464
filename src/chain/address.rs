use std::fmt;

use bitcoin::base58;
use bitcoin::blockdata::script::{Script, ScriptBuf};
use bitcoin::hashes::Hash as _;
use serde::Serialize;

use super::currency::Currency;
use crate::error::SwapError;
use crate::swap::script::SwapScript;

/// Largest redeem script a P2SH output can be spent with.
pub const MAX_REDEEM_SCRIPT_SIZE: usize = 520;
/// Largest witness script a P2WSH output can be spent with.
pub const MAX_WITNESS_SCRIPT_SIZE: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DepositAddress(String);

impl DepositAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DepositAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn derive_deposit_address(
    currency: &Currency,
    script: &SwapScript,
) -> Result<DepositAddress, SwapError> {
    derive_p2sh_p2wsh(currency, script.as_script())
}

/// P2SH address whose redeem script is the version 0 witness program
/// `OP_0 <sha256(script)>`.
pub fn derive_p2sh_p2wsh(
    currency: &Currency,
    script: &Script,
) -> Result<DepositAddress, SwapError> {
    ensure_script_size(script, MAX_WITNESS_SCRIPT_SIZE)?;

    let witness_program = ScriptBuf::new_p2wsh(&script.wscript_hash());
    Ok(encode_script_hash(currency.script_hash_version, &witness_program))
}

pub fn derive_p2sh_address(
    currency: &Currency,
    script: &Script,
) -> Result<DepositAddress, SwapError> {
    ensure_script_size(script, MAX_REDEEM_SCRIPT_SIZE)?;
    Ok(encode_script_hash(currency.script_hash_version, script))
}

fn ensure_script_size(script: &Script, max: usize) -> Result<(), SwapError> {
    if script.is_empty() {
        return Err(SwapError::EncodingError("script is empty".to_string()));
    }
    if script.len() > max {
        return Err(SwapError::EncodingError(format!(
            "script is {} bytes, limit is {max}",
            script.len()
        )));
    }
    Ok(())
}

fn encode_script_hash(version: u8, script: &Script) -> DepositAddress {
    let script_hash = script.script_hash();

    let mut payload = Vec::with_capacity(21);
    payload.push(version);
    payload.extend_from_slice(script_hash.as_byte_array());

    DepositAddress(base58::encode_check(&payload))
}
