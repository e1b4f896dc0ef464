use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bitcoin::secp256k1::PublicKey;

use super::bolt11;
use crate::chain::currency::{Currency, resolve_by_invoice};
use crate::error::SwapError;

pub const DEFAULT_EXPIRY: Duration = Duration::from_secs(3600);
pub const DEFAULT_MIN_FINAL_CLTV_EXPIRY: u64 = 18;

/// A decoded, unexpired Lightning payment request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub raw_invoice: String,
    pub currency: &'static Currency,
    pub destination_pubkey: PublicKey,
    /// Unix timestamp in seconds.
    pub created_at: u64,
    pub expiry: Duration,
    /// Whole satoshis, rounded down; zero for invoices without an amount.
    pub amount_sats: u64,
    pub amount_msat: Option<u64>,
    pub description: String,
    pub description_hash: Option<[u8; 32]>,
    pub payment_hash: [u8; 32],
    pub payment_secret: Option<[u8; 32]>,
    pub min_final_cltv_expiry: u64,
}

impl PaymentRequest {
    pub fn expires_at(&self) -> u64 {
        self.created_at.saturating_add(self.expiry.as_secs())
    }

    pub fn is_expired_at(&self, now: u64) -> bool {
        now >= self.expires_at()
    }

    pub fn destination_hex(&self) -> String {
        hex::encode(self.destination_pubkey.serialize())
    }

    pub fn payment_hash_hex(&self) -> String {
        hex::encode(self.payment_hash)
    }
}

pub fn decode_invoice(bolt11: &str) -> Result<PaymentRequest, SwapError> {
    decode_invoice_at(bolt11, SystemTime::now())
}

/// Decodes `bolt11` and rejects it if it has expired by `now`.
pub fn decode_invoice_at(bolt11: &str, now: SystemTime) -> Result<PaymentRequest, SwapError> {
    let currency = resolve_by_invoice(bolt11)?;

    let raw = bolt11::parse(bolt11, currency.bech32_prefix).map_err(|e| {
        tracing::debug!(currency = %currency, error = %format!("{e:#}"), "decode bolt11 invoice");
        SwapError::MalformedInvoice
    })?;

    let payreq = PaymentRequest {
        raw_invoice: bolt11.to_string(),
        currency,
        destination_pubkey: raw.payee,
        created_at: raw.timestamp,
        expiry: raw
            .expiry_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_EXPIRY),
        amount_sats: raw.amount_msat.map(|msat| msat / 1_000).unwrap_or(0),
        amount_msat: raw.amount_msat,
        description: raw.description.unwrap_or_default(),
        description_hash: raw.description_hash,
        payment_hash: raw.payment_hash,
        payment_secret: raw.payment_secret,
        min_final_cltv_expiry: raw
            .min_final_cltv_expiry
            .unwrap_or(DEFAULT_MIN_FINAL_CLTV_EXPIRY),
    };

    let now = now
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    if payreq.is_expired_at(now) {
        return Err(SwapError::InvoiceExpired {
            expired_at: payreq.expires_at(),
        });
    }

    Ok(payreq)
}
