pub mod script;
pub mod service;

use std::time::Duration;

use bitcoin::absolute::LockTime;
use bitcoin::secp256k1::PublicKey;

use crate::chain::address::DepositAddress;
use crate::chain::currency::Currency;
use crate::lightning::invoice::PaymentRequest;
use script::SwapScript;

/// Time between invoice expiry and the refund branch becoming spendable.
pub const DEFAULT_EXPIRY_MARGIN: Duration = Duration::from_secs(3 * 24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct SwapConfig {
    pub broker_key: PublicKey,
    pub expiry_margin: Duration,
}

impl SwapConfig {
    pub fn new(broker_key: PublicKey) -> Self {
        Self {
            broker_key,
            expiry_margin: DEFAULT_EXPIRY_MARGIN,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SwapRequest {
    /// Bech32 prefix of the currency the user deposits, e.g. `bc`.
    pub deposit_currency: String,
    pub invoice: String,
    pub user_key: PublicKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Swap {
    pub payment_request: PaymentRequest,
    pub deposit_currency: &'static Currency,
    pub redeem_script: SwapScript,
    pub locktime: LockTime,
    pub deposit_address: DepositAddress,
}
