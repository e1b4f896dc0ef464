use std::time::Duration;

use anyhow::{Context as _, Result};
use bitcoin::absolute::LockTime;
use bitcoin::blockdata::opcodes::{self, all as op};
use bitcoin::blockdata::script::{Builder, Instruction, Script, ScriptBuf};
use bitcoin::hashes::{Hash as _, ripemd160};
use bitcoin::secp256k1::PublicKey;

use crate::error::SwapError;
use crate::lightning::invoice::PaymentRequest;

/// Redeem script of a submarine swap:
///
/// ```text
/// OP_HASH160 <hash160> OP_EQUAL
/// OP_IF
///     <broker_key>
/// OP_ELSE
///     <locktime> OP_CHECKLOCKTIMEVERIFY OP_DROP
///     <user_key>
/// OP_ENDIF
/// OP_CHECKSIG
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SwapScript(ScriptBuf);

impl SwapScript {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(ScriptBuf::from_bytes(bytes))
    }

    pub fn as_script(&self) -> &Script {
        self.0.as_script()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapScriptSpec {
    pub hash160: [u8; 20],
    pub broker_key: PublicKey,
    pub user_key: PublicKey,
    pub locktime: LockTime,
}

/// Builds the swap script for a decoded invoice. The refund branch unlocks
/// `extra_window` after the invoice itself expires.
pub fn build_swap_script(
    payreq: &PaymentRequest,
    extra_window: Duration,
    broker_key: &PublicKey,
    user_key: &PublicKey,
) -> Result<SwapScript, SwapError> {
    let locktime = refund_locktime(payreq, extra_window)?;
    let spec =
        SwapScriptSpec::from_payment_hash(&payreq.payment_hash, *broker_key, *user_key, locktime)?;
    Ok(spec.redeem_script())
}

/// `created_at + expiry + extra_window` as an absolute Unix-time locktime.
pub fn refund_locktime(
    payreq: &PaymentRequest,
    extra_window: Duration,
) -> Result<LockTime, SwapError> {
    let invoice_expiry = payreq.expires_at();
    let margin = extra_window.as_secs();
    if margin == 0 {
        return Err(SwapError::InvalidLocktime(invoice_expiry));
    }

    let secs = invoice_expiry
        .checked_add(margin)
        .ok_or(SwapError::InvalidLocktime(u64::MAX))?;
    let secs32 = u32::try_from(secs).map_err(|_| SwapError::InvalidLocktime(secs))?;

    LockTime::from_time(secs32).map_err(|_| SwapError::InvalidLocktime(secs))
}

impl SwapScriptSpec {
    /// Takes the 32-byte invoice payment hash and reduces it to the 20-byte
    /// form with a single RIPEMD160.
    pub fn from_payment_hash(
        payment_hash: &[u8],
        broker_key: PublicKey,
        user_key: PublicKey,
        locktime: LockTime,
    ) -> Result<Self, SwapError> {
        if payment_hash.len() != 32 {
            return Err(SwapError::InvalidPaymentHash(payment_hash.len()));
        }

        let hash160 = ripemd160::Hash::hash(payment_hash);
        Self::from_hash160(hash160.as_byte_array(), broker_key, user_key, locktime)
    }

    pub fn from_hash160(
        hash160: &[u8],
        broker_key: PublicKey,
        user_key: PublicKey,
        locktime: LockTime,
    ) -> Result<Self, SwapError> {
        let hash160: [u8; 20] = hash160
            .try_into()
            .map_err(|_| SwapError::PaymentHashLengthError(hash160.len()))?;

        Ok(Self {
            hash160,
            broker_key,
            user_key,
            locktime,
        })
    }

    pub fn redeem_script(&self) -> SwapScript {
        let script = Builder::new()
            .push_opcode(op::OP_HASH160)
            .push_slice(self.hash160)
            .push_opcode(op::OP_EQUAL)
            .push_opcode(op::OP_IF)
            .push_key(&bitcoin::PublicKey::new(self.broker_key))
            .push_opcode(op::OP_ELSE)
            .push_lock_time(self.locktime)
            .push_opcode(op::OP_CLTV)
            .push_opcode(op::OP_DROP)
            .push_key(&bitcoin::PublicKey::new(self.user_key))
            .push_opcode(op::OP_ENDIF)
            .push_opcode(op::OP_CHECKSIG)
            .into_script();

        SwapScript(script)
    }

    /// Recovers the swap terms from a redeem script built by
    /// [`SwapScriptSpec::redeem_script`]. Any other script is rejected.
    pub fn parse(script: &Script) -> Result<Self> {
        fn next_instruction<'a>(
            iter: &mut impl Iterator<
                Item = std::result::Result<Instruction<'a>, bitcoin::blockdata::script::Error>,
            >,
        ) -> Result<Instruction<'a>> {
            iter.next()
                .transpose()
                .context("decode swap script instruction")?
                .context("unexpected end of swap script")
        }

        fn expect_op(actual: Instruction<'_>, expected: opcodes::Opcode) -> Result<()> {
            match actual {
                Instruction::Op(found) if found == expected => Ok(()),
                other => anyhow::bail!("expected {expected:?}, got {other:?}"),
            }
        }

        fn expect_push<'a>(actual: Instruction<'a>, what: &str) -> Result<&'a [u8]> {
            match actual {
                Instruction::PushBytes(bytes) => Ok(bytes.as_bytes()),
                other => anyhow::bail!("expected {what} push, got {other:?}"),
            }
        }

        fn expect_key(actual: Instruction<'_>, what: &str) -> Result<PublicKey> {
            let bytes = expect_push(actual, what)?;
            anyhow::ensure!(
                bytes.len() == 33,
                "{what} must be a compressed key, got {} bytes",
                bytes.len()
            );
            PublicKey::from_slice(bytes).with_context(|| format!("parse {what}"))
        }

        // Minimal little-endian sign-magnitude encoding, as pushed by
        // `Builder::push_int`.
        fn decode_script_num(bytes: &[u8]) -> Result<i64> {
            anyhow::ensure!(
                bytes.len() <= 5,
                "locktime push too large: {} bytes",
                bytes.len()
            );

            let mut value: i64 = 0;
            for (i, b) in bytes.iter().enumerate() {
                value |= i64::from(*b) << (8 * i);
            }

            match bytes.last() {
                Some(last) if last & 0x80 != 0 => {
                    let sign_bit = 0x80_i64 << (8 * (bytes.len() - 1));
                    Ok(-(value & !sign_bit))
                }
                _ => Ok(value),
            }
        }

        let mut iter = script.instructions_minimal();

        expect_op(next_instruction(&mut iter)?, op::OP_HASH160)?;
        let hash160: [u8; 20] = expect_push(next_instruction(&mut iter)?, "hash160")?
            .try_into()
            .context("hash160 must be 20 bytes")?;
        expect_op(next_instruction(&mut iter)?, op::OP_EQUAL)?;

        expect_op(next_instruction(&mut iter)?, op::OP_IF)?;
        let broker_key = expect_key(next_instruction(&mut iter)?, "broker key")?;

        expect_op(next_instruction(&mut iter)?, op::OP_ELSE)?;
        let locktime =
            decode_script_num(expect_push(next_instruction(&mut iter)?, "locktime")?)?;
        let locktime = u32::try_from(locktime)
            .with_context(|| format!("locktime out of range: {locktime}"))?;
        let locktime = LockTime::from_time(locktime).context("locktime is not a unix time")?;
        expect_op(next_instruction(&mut iter)?, op::OP_CLTV)?;
        expect_op(next_instruction(&mut iter)?, op::OP_DROP)?;
        let user_key = expect_key(next_instruction(&mut iter)?, "user key")?;

        expect_op(next_instruction(&mut iter)?, op::OP_ENDIF)?;
        expect_op(next_instruction(&mut iter)?, op::OP_CHECKSIG)?;

        anyhow::ensure!(
            iter.next().is_none(),
            "unexpected trailing instructions in swap script"
        );

        Ok(Self {
            hash160,
            broker_key,
            user_key,
            locktime,
        })
    }
}
