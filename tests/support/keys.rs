use std::time::Duration;

use anyhow::{Context as _, Result};
use bitcoin::secp256k1::PublicKey;
use submarine_swap::chain::currency::BITCOIN;
use submarine_swap::lightning::invoice::PaymentRequest;

pub const BROKER_PUBKEY_HEX: &str =
    "032c2cec8d4d581f2589db146339995000a1d399c6bfbaa4572aa84c3e11be6939";
pub const USER_PUBKEY_HEX: &str =
    "039115e11c22a7699efbb07cd2248e7158386d0ee0ecec0188cbfba21ce5c4bf42";

pub fn pubkey(hex_str: &str) -> Result<PublicKey> {
    let bytes = hex::decode(hex_str).context("decode pubkey hex")?;
    PublicKey::from_slice(&bytes).context("parse pubkey")
}

pub fn broker_key() -> Result<PublicKey> {
    pubkey(BROKER_PUBKEY_HEX)
}

pub fn user_key() -> Result<PublicKey> {
    pubkey(USER_PUBKEY_HEX)
}

/// Mainnet Bitcoin payment request with an all-zero payment hash, created at
/// 1_700_000_000 and expiring an hour later.
pub fn zero_hash_payreq() -> Result<PaymentRequest> {
    Ok(PaymentRequest {
        raw_invoice: "lnbc-fixture".to_string(),
        currency: &BITCOIN,
        destination_pubkey: broker_key()?,
        created_at: 1_700_000_000,
        expiry: Duration::from_secs(3600),
        amount_sats: 0,
        amount_msat: None,
        description: String::new(),
        description_hash: None,
        payment_hash: [0u8; 32],
        payment_secret: None,
        min_final_cltv_expiry: 18,
    })
}
