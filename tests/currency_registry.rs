use anyhow::Result;

use submarine_swap::SwapError;
use submarine_swap::chain::currency::{
    BITCOIN, BITCOIN_TESTNET, Currency, LITECOIN, LITECOIN_SIMNET, NetworkId, resolve_by_invoice,
    resolve_currency, validate_same_network,
};

#[test]
fn every_registered_prefix_resolves_to_itself() -> Result<()> {
    for currency in Currency::all() {
        let resolved = resolve_currency(currency.bech32_prefix)?;
        assert_eq!(resolved.bech32_prefix, currency.bech32_prefix);
        assert_eq!(resolved, currency);
    }
    Ok(())
}

#[test]
fn registry_prefixes_are_unique() {
    let mut prefixes: Vec<&str> = Currency::all().iter().map(|c| c.bech32_prefix).collect();
    prefixes.sort_unstable();
    prefixes.dedup();
    assert_eq!(prefixes.len(), Currency::all().len());
}

#[test]
fn unknown_or_differently_cased_tags_are_unsupported() {
    for tag in ["", "BC", "bcrt", "doge", " bc"] {
        assert_eq!(
            resolve_currency(tag),
            Err(SwapError::UnsupportedCurrency(tag.to_string())),
            "tag {tag:?}"
        );
    }
}

#[test]
fn script_hash_versions_match_chain_parameters() -> Result<()> {
    assert_eq!(resolve_currency("bc")?.script_hash_version, 0x05);
    assert_eq!(resolve_currency("tb")?.script_hash_version, 0xc4);
    assert_eq!(resolve_currency("ltc")?.script_hash_version, 0x32);
    assert_eq!(resolve_currency("tltc")?.script_hash_version, 0x3a);
    Ok(())
}

#[test]
fn invoice_prefix_stops_at_first_digit() -> Result<()> {
    assert_eq!(resolve_by_invoice("lnbc2500u1pvjluezpp5qqqsyqcyq")?, &BITCOIN);
    assert_eq!(resolve_by_invoice("lntb1pvjluezpp5qqqsyqcyq")?, &BITCOIN_TESTNET);
    assert_eq!(resolve_by_invoice("lnltc20m1pvjluezpp5qqqsyqcyq")?, &LITECOIN);
    assert_eq!(resolve_by_invoice("lnsltc1pvjluezpp5qqqsyqcyq")?, &LITECOIN_SIMNET);
    Ok(())
}

#[test]
fn invoice_framing_errors_are_invalid_format() {
    for invoice in [
        "",
        "   ",
        "not-an-invoice",
        "ln1qqqqqqqq",
        "lnbc1short",
        "1lnbcqqqqqqqqq",
    ] {
        assert!(
            matches!(resolve_by_invoice(invoice), Err(SwapError::InvalidFormat(_))),
            "invoice {invoice:?}"
        );
    }
}

#[test]
fn unregistered_invoice_prefix_is_unsupported() {
    assert_eq!(
        resolve_by_invoice("lnbcrt500u1pvjluezpp5qqqsyqcyq"),
        Err(SwapError::UnsupportedCurrency("bcrt".to_string()))
    );
    assert_eq!(
        resolve_by_invoice("LNBC2500U1PVJLUEZPP5QQQSYQCYQ"),
        Err(SwapError::UnsupportedCurrency("BC".to_string()))
    );
}

#[test]
fn same_network_passes_and_cross_network_fails() {
    assert_eq!(validate_same_network(&BITCOIN, &BITCOIN), Ok(()));

    assert_eq!(
        validate_same_network(&BITCOIN, &LITECOIN),
        Err(SwapError::NetworkMismatch {
            deposit: NetworkId::BitcoinMainnet,
            invoice: NetworkId::LitecoinMainnet,
        })
    );
    assert!(matches!(
        validate_same_network(&BITCOIN, &BITCOIN_TESTNET),
        Err(SwapError::NetworkMismatch { .. })
    ));
}
