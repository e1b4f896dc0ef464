use crate::chain::currency::NetworkId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SwapError {
    #[error("currency is not supported: {0:?}")]
    UnsupportedCurrency(String),

    #[error("invalid lightning invoice: {0}")]
    InvalidFormat(&'static str),

    #[error("problem decoding invoice")]
    MalformedInvoice,

    #[error("invoice has already expired at {expired_at}")]
    InvoiceExpired { expired_at: u64 },

    #[error(
        "deposit and invoice currencies must be on same network: deposit={deposit} invoice={invoice}"
    )]
    NetworkMismatch {
        deposit: NetworkId,
        invoice: NetworkId,
    },

    #[error("payment hash must be 32 bytes, got {0}")]
    InvalidPaymentHash(usize),

    #[error("payment hash160 must be 20 bytes, got {0}")]
    PaymentHashLengthError(usize),

    #[error("invalid refund locktime: {0}")]
    InvalidLocktime(u64),

    #[error("encode deposit address: {0}")]
    EncodingError(String),
}

impl SwapError {
    /// Whether the failure stems from caller input (currency or invoice) as
    /// opposed to an internal fault while building the script or address.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            SwapError::UnsupportedCurrency(_)
                | SwapError::InvalidFormat(_)
                | SwapError::MalformedInvoice
                | SwapError::InvoiceExpired { .. }
                | SwapError::NetworkMismatch { .. }
        )
    }
}
