use std::fmt;

use serde::Serialize;

use crate::error::SwapError;

/// Chain and network a [`Currency`] lives on. Two currencies can only take
/// part in the same swap when their identities are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkId {
    BitcoinMainnet,
    BitcoinTestnet,
    BitcoinSimnet,
    LitecoinMainnet,
    LitecoinTestnet,
    LitecoinSimnet,
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NetworkId::BitcoinMainnet => "bitcoin-mainnet",
            NetworkId::BitcoinTestnet => "bitcoin-testnet3",
            NetworkId::BitcoinSimnet => "bitcoin-simnet",
            NetworkId::LitecoinMainnet => "litecoin-mainnet",
            NetworkId::LitecoinTestnet => "litecoin-testnet",
            NetworkId::LitecoinSimnet => "litecoin-simnet",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Currency {
    pub name: &'static str,
    pub network_id: NetworkId,
    /// Human-readable part of Bech32 segwit addresses, also the currency
    /// prefix of BOLT11 invoices.
    pub bech32_prefix: &'static str,

    pub pubkey_hash_version: u8,
    pub script_hash_version: u8,
    pub witness_pubkey_hash_version: u8,
    pub witness_script_hash_version: u8,
    pub private_key_version: u8,
}

pub const BITCOIN: Currency = Currency {
    name: "Bitcoin",
    network_id: NetworkId::BitcoinMainnet,
    bech32_prefix: "bc",
    pubkey_hash_version: 0x00,
    script_hash_version: 0x05,
    witness_pubkey_hash_version: 0x06,
    witness_script_hash_version: 0x0a,
    private_key_version: 0x80,
};

pub const BITCOIN_TESTNET: Currency = Currency {
    name: "Bitcoin Testnet",
    network_id: NetworkId::BitcoinTestnet,
    bech32_prefix: "tb",
    pubkey_hash_version: 0x6f,
    script_hash_version: 0xc4,
    witness_pubkey_hash_version: 0x03,
    witness_script_hash_version: 0x28,
    private_key_version: 0xef,
};

pub const BITCOIN_SIMNET: Currency = Currency {
    name: "Bitcoin Simnet",
    network_id: NetworkId::BitcoinSimnet,
    bech32_prefix: "sb",
    pubkey_hash_version: 0x3f,
    script_hash_version: 0x7b,
    witness_pubkey_hash_version: 0x19,
    witness_script_hash_version: 0x28,
    private_key_version: 0x64,
};

pub const LITECOIN: Currency = Currency {
    name: "Litecoin",
    network_id: NetworkId::LitecoinMainnet,
    bech32_prefix: "ltc",
    pubkey_hash_version: 0x30,
    script_hash_version: 0x32,
    witness_pubkey_hash_version: 0x06,
    witness_script_hash_version: 0x0a,
    private_key_version: 0xb0,
};

pub const LITECOIN_TESTNET: Currency = Currency {
    name: "Litecoin Testnet",
    network_id: NetworkId::LitecoinTestnet,
    bech32_prefix: "tltc",
    pubkey_hash_version: 0x6f,
    script_hash_version: 0x3a,
    witness_pubkey_hash_version: 0x52,
    witness_script_hash_version: 0x31,
    private_key_version: 0xef,
};

pub const LITECOIN_SIMNET: Currency = Currency {
    name: "Litecoin Simnet",
    network_id: NetworkId::LitecoinSimnet,
    bech32_prefix: "sltc",
    pubkey_hash_version: 0x3f,
    script_hash_version: 0x7b,
    witness_pubkey_hash_version: 0x19,
    witness_script_hash_version: 0x28,
    private_key_version: 0x64,
};

static REGISTRY: [Currency; 6] = [
    BITCOIN,
    BITCOIN_TESTNET,
    BITCOIN_SIMNET,
    LITECOIN,
    LITECOIN_TESTNET,
    LITECOIN_SIMNET,
];

/// Length of the bech32 checksum that must follow the `1` separator.
const CHECKSUM_LEN: usize = 6;

impl Currency {
    pub fn all() -> &'static [Currency] {
        &REGISTRY
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Exact, case-sensitive lookup of a Bech32 prefix.
pub fn resolve_by_prefix(prefix: &str) -> Result<&'static Currency, SwapError> {
    REGISTRY
        .iter()
        .find(|c| c.bech32_prefix == prefix)
        .ok_or_else(|| SwapError::UnsupportedCurrency(prefix.to_string()))
}

pub fn resolve_currency(tag: &str) -> Result<&'static Currency, SwapError> {
    resolve_by_prefix(tag)
}

/// Resolves the currency of a BOLT11 invoice from its human-readable part
/// without validating the checksum.
///
/// The HRP is everything between the leading `ln` and the first `1`; the
/// currency prefix is the HRP up to its first decimal digit (the amount).
pub fn resolve_by_invoice(bolt11: &str) -> Result<&'static Currency, SwapError> {
    if bolt11.trim().is_empty() {
        return Err(SwapError::InvalidFormat("lightning invoice is required"));
    }

    let one = bolt11
        .find('1')
        .ok_or(SwapError::InvalidFormat("invalid index of 1"))?;
    if one < 3 || one + CHECKSUM_LEN + 1 > bolt11.len() {
        return Err(SwapError::InvalidFormat("invalid index of 1"));
    }

    let hrp = bolt11
        .get(2..one)
        .ok_or(SwapError::InvalidFormat("invalid human-readable part"))?;
    // ASCII digits only; a non-ASCII digit stays part of the prefix.
    let amount_idx = hrp.find(|c: char| c.is_ascii_digit()).unwrap_or(hrp.len());

    resolve_by_prefix(&hrp[..amount_idx])
}

pub fn validate_same_network(deposit: &Currency, invoice: &Currency) -> Result<(), SwapError> {
    if deposit.network_id != invoice.network_id {
        return Err(SwapError::NetworkMismatch {
            deposit: deposit.network_id,
            invoice: invoice.network_id,
        });
    }
    Ok(())
}
