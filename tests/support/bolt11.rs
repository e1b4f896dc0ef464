use anyhow::{Context as _, Result};
use bech32::{ToBase32 as _, Variant, u5};
use bitcoin::hashes::{Hash as _, sha256};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};

const TAG_PAYMENT_HASH: u8 = 1;
const TAG_EXPIRY: u8 = 6;
const TAG_DESCRIPTION: u8 = 13;
const TAG_PAYMENT_SECRET: u8 = 16;
const TAG_PAYEE: u8 = 19;
const TAG_DESCRIPTION_HASH: u8 = 23;
const TAG_MIN_FINAL_CLTV_EXPIRY: u8 = 24;

/// Signing BOLT11 encoder for building invoices with arbitrary
/// timestamps and currency prefixes.
#[derive(Debug, Clone)]
pub struct InvoiceFixture {
    pub currency_prefix: String,
    pub amount: Option<String>,
    pub timestamp: u64,
    pub payment_hash: [u8; 32],
    pub description: Option<String>,
    pub description_hash: Option<[u8; 32]>,
    pub expiry_secs: Option<u64>,
    /// Key written into the `n` field, if any. Need not match the signer.
    pub payee_field: Option<PublicKey>,
    pub payment_secret: Option<[u8; 32]>,
    pub min_final_cltv_expiry: Option<u64>,
    /// Raw `(tag, words)` fields written ahead of all the others.
    pub leading_fields: Vec<(u8, Vec<u5>)>,
    pub secret_key: SecretKey,
}

impl InvoiceFixture {
    pub fn new(currency_prefix: &str, timestamp: u64) -> Result<Self> {
        Ok(Self {
            currency_prefix: currency_prefix.to_string(),
            amount: None,
            timestamp,
            payment_hash: [7u8; 32],
            description: Some("coffee".to_string()),
            description_hash: None,
            expiry_secs: None,
            payee_field: None,
            payment_secret: None,
            min_final_cltv_expiry: None,
            leading_fields: Vec::new(),
            secret_key: SecretKey::from_slice(&[0x11; 32]).context("fixture secret key")?,
        })
    }

    pub fn amount(mut self, amount: &str) -> Self {
        self.amount = Some(amount.to_string());
        self
    }

    pub fn expiry_secs(mut self, secs: u64) -> Self {
        self.expiry_secs = Some(secs);
        self
    }

    pub fn leading_field(mut self, tag: u8, words: Vec<u5>) -> Self {
        self.leading_fields.push((tag, words));
        self
    }

    pub fn signer_pubkey(&self) -> PublicKey {
        self.secret_key.public_key(&Secp256k1::new())
    }

    pub fn encode(&self) -> Result<String> {
        let hrp = format!(
            "ln{}{}",
            self.currency_prefix,
            self.amount.as_deref().unwrap_or("")
        );

        let mut data = fixed_uint_words(self.timestamp, 7)?;
        for (tag, words) in &self.leading_fields {
            push_field(&mut data, *tag, words)?;
        }
        push_field(&mut data, TAG_PAYMENT_HASH, &self.payment_hash.to_base32())?;
        if let Some(description) = &self.description {
            push_field(&mut data, TAG_DESCRIPTION, &description.as_bytes().to_base32())?;
        }
        if let Some(hash) = &self.description_hash {
            push_field(&mut data, TAG_DESCRIPTION_HASH, &hash.to_base32())?;
        }
        if let Some(expiry) = self.expiry_secs {
            push_field(&mut data, TAG_EXPIRY, &uint_words(expiry)?)?;
        }
        if let Some(payee) = &self.payee_field {
            push_field(&mut data, TAG_PAYEE, &payee.serialize().to_base32())?;
        }
        if let Some(secret) = &self.payment_secret {
            push_field(&mut data, TAG_PAYMENT_SECRET, &secret.to_base32())?;
        }
        if let Some(delta) = self.min_final_cltv_expiry {
            push_field(&mut data, TAG_MIN_FINAL_CLTV_EXPIRY, &uint_words(delta)?)?;
        }

        let mut preimage = hrp.as_bytes().to_vec();
        preimage.extend(bech32::convert_bits(&data, 5, 8, true).context("pack signed data")?);
        let message = Message::from_digest(sha256::Hash::hash(&preimage).to_byte_array());

        let (recovery_id, compact) = Secp256k1::new()
            .sign_ecdsa_recoverable(&message, &self.secret_key)
            .serialize_compact();
        let mut signature = compact.to_vec();
        signature.push(u8::try_from(recovery_id.to_i32()).context("recovery id")?);
        data.extend(signature.to_base32());

        bech32::encode(&hrp, data, Variant::Bech32).context("encode bech32")
    }
}

fn word(value: u64) -> Result<u5> {
    u5::try_from_u8((value & 31) as u8).context("5-bit word")
}

fn fixed_uint_words(value: u64, len: usize) -> Result<Vec<u5>> {
    (0..len).rev().map(|i| word(value >> (5 * i))).collect()
}

fn uint_words(mut value: u64) -> Result<Vec<u5>> {
    let mut words = Vec::new();
    while value > 0 {
        words.push(word(value)?);
        value >>= 5;
    }
    words.reverse();
    Ok(words)
}

fn push_field(data: &mut Vec<u5>, tag: u8, value: &[u5]) -> Result<()> {
    let len = value.len() as u64;
    anyhow::ensure!(len < 1024, "tagged field too long");
    data.push(word(u64::from(tag))?);
    data.push(word(len >> 5)?);
    data.push(word(len)?);
    data.extend_from_slice(value);
    Ok(())
}

/// Replaces the final checksum character so the bech32 checksum fails.
pub fn corrupt_checksum(invoice: &str) -> String {
    let mut chars: Vec<char> = invoice.chars().collect();
    if let Some(last) = chars.last_mut() {
        *last = if *last == 'q' { 'p' } else { 'q' };
    }
    chars.into_iter().collect()
}
