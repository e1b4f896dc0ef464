use std::time::Duration;

use anyhow::{Context as _, Result};
use bitcoin::secp256k1::PublicKey;
use clap::{Parser as _, Subcommand};
use serde_json::json;
use submarine_swap::chain::currency::Currency;
use submarine_swap::lightning::invoice::{PaymentRequest, decode_invoice};
use submarine_swap::swap::script::{SwapScript, SwapScriptSpec};
use submarine_swap::swap::service::SwapService;
use submarine_swap::swap::{DEFAULT_EXPIRY_MARGIN, SwapConfig, SwapRequest};

#[derive(Debug, clap::Parser)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List supported currencies.
    Currencies,
    Decode {
        #[arg(long)]
        invoice: String,
    },
    Create {
        /// Bech32 prefix of the deposit currency, e.g. `bc`.
        #[arg(long)]
        deposit: String,

        #[arg(long)]
        invoice: String,

        #[arg(long)]
        broker_pubkey: String,

        #[arg(long)]
        user_pubkey: String,

        #[arg(long, default_value_t = DEFAULT_EXPIRY_MARGIN.as_secs())]
        expiry_margin_secs: u64,
    },
    InspectScript {
        #[arg(long)]
        script_hex: String,
    },
}

fn main() -> Result<()> {
    submarine_swap::logging::init().ok();
    let args = Args::parse();

    let out = match args.command {
        Command::Currencies => json!(Currency::all()),
        Command::Decode { invoice } => {
            let payreq = decode_invoice(&invoice).context("decode invoice")?;
            payment_request_json(&payreq)
        }
        Command::Create {
            deposit,
            invoice,
            broker_pubkey,
            user_pubkey,
            expiry_margin_secs,
        } => {
            let broker_key = parse_pubkey(&broker_pubkey).context("parse broker_pubkey")?;
            let user_key = parse_pubkey(&user_pubkey).context("parse user_pubkey")?;

            let svc = SwapService::new(SwapConfig {
                broker_key,
                expiry_margin: Duration::from_secs(expiry_margin_secs),
            });
            let swap = svc
                .create_swap(&SwapRequest {
                    deposit_currency: deposit,
                    invoice,
                    user_key,
                })
                .context("create swap")?;

            json!({
              "invoice": payment_request_json(&swap.payment_request),
              "deposit_currency": swap.deposit_currency.name,
              "locktime": swap.locktime.to_consensus_u32(),
              "redeem_script_hex": swap.redeem_script.to_hex(),
              "deposit_address": swap.deposit_address,
            })
        }
        Command::InspectScript { script_hex } => {
            let bytes = hex::decode(script_hex.trim()).context("decode script_hex")?;
            let script = SwapScript::from_bytes(bytes);
            let spec = SwapScriptSpec::parse(script.as_script()).context("parse swap script")?;

            json!({
              "hash160": hex::encode(spec.hash160),
              "broker_pubkey": hex::encode(spec.broker_key.serialize()),
              "user_pubkey": hex::encode(spec.user_key.serialize()),
              "locktime": spec.locktime.to_consensus_u32(),
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn parse_pubkey(s: &str) -> Result<PublicKey> {
    let bytes = hex::decode(s.trim()).context("decode hex")?;
    anyhow::ensure!(
        bytes.len() == 33,
        "expected 33-byte compressed key, got {} bytes",
        bytes.len()
    );
    PublicKey::from_slice(&bytes).context("parse secp256k1 public key")
}

fn payment_request_json(payreq: &PaymentRequest) -> serde_json::Value {
    json!({
      "invoice": payreq.raw_invoice,
      "currency": payreq.currency.name,
      "destination": payreq.destination_hex(),
      "created_at": payreq.created_at,
      "expiry_secs": payreq.expiry.as_secs(),
      "amount_sats": payreq.amount_sats,
      "description": payreq.description,
      "payment_hash": payreq.payment_hash_hex(),
    })
}
