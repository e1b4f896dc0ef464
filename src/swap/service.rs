use std::time::SystemTime;

use crate::chain::address::derive_deposit_address;
use crate::chain::currency::{resolve_by_invoice, resolve_currency, validate_same_network};
use crate::error::SwapError;
use crate::lightning::invoice::decode_invoice_at;
use crate::swap::script::{build_swap_script, refund_locktime};
use crate::swap::{Swap, SwapConfig, SwapRequest};

#[derive(Debug, Clone)]
pub struct SwapService {
    cfg: SwapConfig,
}

impl SwapService {
    pub fn new(cfg: SwapConfig) -> Self {
        Self { cfg }
    }

    pub fn create_swap(&self, req: &SwapRequest) -> Result<Swap, SwapError> {
        self.create_swap_at(req, SystemTime::now())
    }

    /// Runs the swap pipeline, checking the invoice expiry against `now`.
    pub fn create_swap_at(&self, req: &SwapRequest, now: SystemTime) -> Result<Swap, SwapError> {
        let result = self.build_swap(req, now);

        match &result {
            Ok(swap) => {
                tracing::info!(
                    deposit_currency = %swap.deposit_currency,
                    payment_hash = %swap.payment_request.payment_hash_hex(),
                    amount_sats = swap.payment_request.amount_sats,
                    locktime = swap.locktime.to_consensus_u32(),
                    deposit_address = %swap.deposit_address,
                    "created swap"
                );
            }
            Err(err) if err.is_user_error() => {
                tracing::info!(
                    deposit_currency = %req.deposit_currency,
                    error = %err,
                    "rejected swap request"
                );
            }
            Err(err) => {
                tracing::error!(
                    deposit_currency = %req.deposit_currency,
                    error = %err,
                    "failed to create swap"
                );
            }
        }

        result
    }

    fn build_swap(&self, req: &SwapRequest, now: SystemTime) -> Result<Swap, SwapError> {
        let deposit_currency = resolve_currency(&req.deposit_currency)?;
        let invoice_currency = resolve_by_invoice(&req.invoice)?;
        validate_same_network(deposit_currency, invoice_currency)?;

        let payment_request = decode_invoice_at(&req.invoice, now)?;

        let locktime = refund_locktime(&payment_request, self.cfg.expiry_margin)?;
        let redeem_script = build_swap_script(
            &payment_request,
            self.cfg.expiry_margin,
            &self.cfg.broker_key,
            &req.user_key,
        )?;
        let deposit_address = derive_deposit_address(deposit_currency, &redeem_script)?;

        Ok(Swap {
            payment_request,
            deposit_currency,
            redeem_script,
            locktime,
            deposit_address,
        })
    }
}
