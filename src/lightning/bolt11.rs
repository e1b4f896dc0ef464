//! BOLT11 framing: bech32 data part, HRP amount, timestamp, tagged fields and
//! the recoverable signature over them.
//!
//! The reader is generic over the currency prefix so that chains unknown to
//! the wider Lightning ecosystem (Litecoin and its test networks) decode the
//! same way Bitcoin invoices do.

use anyhow::{Context as _, Result};
use bech32::{FromBase32 as _, Variant, u5};
use bitcoin::hashes::{Hash as _, sha256};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1};

const TIMESTAMP_WORDS: usize = 7;
const SIGNATURE_WORDS: usize = 104;
const HASH_WORDS: usize = 52;
const PUBKEY_WORDS: usize = 53;
const MAX_UINT_WORDS: usize = 12;

const MSAT_PER_BTC: u64 = 100_000_000_000;

mod tag {
    pub const PAYMENT_HASH: u8 = 1;
    pub const EXPIRY: u8 = 6;
    pub const DESCRIPTION: u8 = 13;
    pub const PAYMENT_SECRET: u8 = 16;
    pub const PAYEE: u8 = 19;
    pub const DESCRIPTION_HASH: u8 = 23;
    pub const MIN_FINAL_CLTV_EXPIRY: u8 = 24;
}

/// An invoice whose checksum and signature have been verified. Optional
/// fields are `None` when the invoice does not carry them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInvoice {
    pub amount_msat: Option<u64>,
    pub timestamp: u64,
    pub payment_hash: [u8; 32],
    pub payee: PublicKey,
    pub description: Option<String>,
    pub description_hash: Option<[u8; 32]>,
    pub expiry_secs: Option<u64>,
    pub min_final_cltv_expiry: Option<u64>,
    pub payment_secret: Option<[u8; 32]>,
}

#[derive(Default)]
struct TaggedFields {
    payment_hash: Option<[u8; 32]>,
    payee: Option<PublicKey>,
    description: Option<String>,
    description_hash: Option<[u8; 32]>,
    expiry_secs: Option<u64>,
    min_final_cltv_expiry: Option<u64>,
    payment_secret: Option<[u8; 32]>,
}

/// Parses `bolt11`, which must carry the `ln<currency_prefix>` HRP.
pub fn parse(bolt11: &str, currency_prefix: &str) -> Result<RawInvoice> {
    let (hrp, data, variant) = bech32::decode(bolt11).context("decode bech32")?;
    anyhow::ensure!(variant == Variant::Bech32, "invoice uses bech32m checksum");

    let amount = hrp
        .strip_prefix("ln")
        .and_then(|rest| rest.strip_prefix(currency_prefix))
        .with_context(|| format!("hrp {hrp:?} does not start with ln{currency_prefix}"))?;
    let amount_msat = parse_amount_msat(amount)?;

    anyhow::ensure!(
        data.len() >= TIMESTAMP_WORDS + SIGNATURE_WORDS,
        "data part too short: {} words",
        data.len()
    );
    let (signed, signature) = data.split_at(data.len() - SIGNATURE_WORDS);

    let timestamp = read_uint(&signed[..TIMESTAMP_WORDS]).context("timestamp")?;
    let fields = parse_tagged_fields(&signed[TIMESTAMP_WORDS..])?;

    let payment_hash = fields.payment_hash.context("missing payment hash")?;
    anyhow::ensure!(
        fields.description.is_some() || fields.description_hash.is_some(),
        "missing description and description hash"
    );

    let payee = check_signature(&hrp, signed, signature, fields.payee)?;

    Ok(RawInvoice {
        amount_msat,
        timestamp,
        payment_hash,
        payee,
        description: fields.description,
        description_hash: fields.description_hash,
        expiry_secs: fields.expiry_secs,
        min_final_cltv_expiry: fields.min_final_cltv_expiry,
        payment_secret: fields.payment_secret,
    })
}

fn parse_amount_msat(amount: &str) -> Result<Option<u64>> {
    if amount.is_empty() {
        return Ok(None);
    }

    let (digits, multiplier) = match amount.char_indices().last() {
        Some((i, c)) if !c.is_ascii_digit() => (&amount[..i], Some(c)),
        _ => (amount, None),
    };
    anyhow::ensure!(
        !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
        "invalid amount {amount:?}"
    );
    let value: u64 = digits
        .parse()
        .with_context(|| format!("parse amount {digits:?}"))?;

    let msat = match multiplier {
        None => value.checked_mul(MSAT_PER_BTC),
        Some('m') => value.checked_mul(MSAT_PER_BTC / 1_000),
        Some('u') => value.checked_mul(MSAT_PER_BTC / 1_000_000),
        Some('n') => value.checked_mul(MSAT_PER_BTC / 1_000_000_000),
        Some('p') => {
            anyhow::ensure!(value % 10 == 0, "amount {value}p is not a whole millisatoshi");
            Some(value / 10)
        }
        Some(other) => anyhow::bail!("unknown amount multiplier {other:?}"),
    };

    msat.map(Some).context("amount overflows millisatoshis")
}

fn parse_tagged_fields(mut rest: &[u5]) -> Result<TaggedFields> {
    let mut fields = TaggedFields::default();

    while !rest.is_empty() {
        anyhow::ensure!(rest.len() >= 3, "truncated tagged field header");
        let kind = rest[0].to_u8();
        let len = usize::from(rest[1].to_u8()) * 32 + usize::from(rest[2].to_u8());
        anyhow::ensure!(rest.len() >= 3 + len, "tagged field {kind} overruns data part");

        let value = &rest[3..3 + len];
        rest = &rest[3 + len..];

        // First well-formed occurrence wins; fields of the wrong length are
        // skipped.
        match kind {
            tag::PAYMENT_HASH if len == HASH_WORDS && fields.payment_hash.is_none() => {
                fields.payment_hash = Some(read_hash(value).context("payment hash")?);
            }
            tag::PAYMENT_SECRET if len == HASH_WORDS && fields.payment_secret.is_none() => {
                fields.payment_secret = Some(read_hash(value).context("payment secret")?);
            }
            tag::DESCRIPTION_HASH if len == HASH_WORDS && fields.description_hash.is_none() => {
                fields.description_hash = Some(read_hash(value).context("description hash")?);
            }
            tag::PAYEE if len == PUBKEY_WORDS && fields.payee.is_none() => {
                let bytes = Vec::<u8>::from_base32(value).context("payee key")?;
                fields.payee = Some(PublicKey::from_slice(&bytes).context("payee key")?);
            }
            tag::DESCRIPTION if fields.description.is_none() => {
                let bytes = Vec::<u8>::from_base32(value).context("description")?;
                fields.description = Some(String::from_utf8(bytes).context("description")?);
            }
            tag::EXPIRY if fields.expiry_secs.is_none() => {
                fields.expiry_secs = Some(read_uint(value).context("expiry")?);
            }
            tag::MIN_FINAL_CLTV_EXPIRY if fields.min_final_cltv_expiry.is_none() => {
                fields.min_final_cltv_expiry =
                    Some(read_uint(value).context("min final cltv expiry")?);
            }
            _ => {}
        }
    }

    Ok(fields)
}

fn read_hash(words: &[u5]) -> Result<[u8; 32]> {
    let bytes = Vec::<u8>::from_base32(words)?;
    bytes
        .as_slice()
        .try_into()
        .with_context(|| format!("expected 32 bytes, got {}", bytes.len()))
}

fn read_uint(words: &[u5]) -> Result<u64> {
    anyhow::ensure!(
        words.len() <= MAX_UINT_WORDS,
        "integer field too long: {} words",
        words.len()
    );
    Ok(words
        .iter()
        .fold(0u64, |acc, w| (acc << 5) | u64::from(w.to_u8())))
}

/// Verifies the signature against the `n` field when present, otherwise
/// recovers the payee key from it.
fn check_signature(
    hrp: &str,
    signed: &[u5],
    signature: &[u5],
    payee: Option<PublicKey>,
) -> Result<PublicKey> {
    let sig_bytes = Vec::<u8>::from_base32(signature).context("signature words")?;
    anyhow::ensure!(sig_bytes.len() == 65, "signature must be 65 bytes");

    let recovery_id =
        RecoveryId::from_i32(i32::from(sig_bytes[64])).context("signature recovery id")?;
    let signature =
        RecoverableSignature::from_compact(&sig_bytes[..64], recovery_id).context("signature")?;

    let mut preimage = hrp.as_bytes().to_vec();
    preimage.extend(bech32::convert_bits(signed, 5, 8, true).context("signed data")?);
    let digest = sha256::Hash::hash(&preimage);
    let message = Message::from_digest(digest.to_byte_array());

    let secp = Secp256k1::verification_only();
    match payee {
        Some(payee) => {
            secp.verify_ecdsa(&message, &signature.to_standard(), &payee)
                .context("invoice signature does not match payee key")?;
            Ok(payee)
        }
        None => secp
            .recover_ecdsa(&message, &signature)
            .context("recover payee key from signature"),
    }
}
