//! Walkthrough of the Virtron transaction lifecycle.
//!
//! Creates a treasury from a recovery phrase, builds a vault transaction
//! that needs two signers, signs it on two "machines" with a serialization
//! hop in between, verifies it, and submits it to an in-process channel.
//!
//! Run with:
//!   cargo run --example demo
//!   RUST_LOG=virtron_protocol=debug LOG_FORMAT=json cargo run --example demo

use std::time::Instant;

use anyhow::{bail, Context, Result};

use virtron_protocol::config::{vrt_to_vinnies, ProgramConfig, DEFAULT_PROGRAM_ID};
use virtron_protocol::crypto::hash;
use virtron_protocol::crypto::keys::Keypair;
use virtron_protocol::logging::{init_logging, LogFormat};
use virtron_protocol::program::VaultProgram;
use virtron_protocol::transaction::{
    submit_transaction, SubmissionChannel, SubmissionReceipt, Transaction,
};

// ---------------------------------------------------------------------------
// ANSI color constants
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn section(num: u32, title: &str) {
    println!();
    println!("{BOLD}{CYAN}===[{YELLOW} Step {num} {CYAN}]================================================{RESET}");
    println!("{BOLD}{WHITE}  {title}{RESET}");
}

fn success(text: &str) {
    println!("{GREEN}  [OK] {text}{RESET}");
}

fn info(label: &str, value: &str) {
    println!("{WHITE}  {BOLD}{label}:{RESET} {YELLOW}{value}{RESET}");
}

fn timing(label: &str, elapsed: std::time::Duration) {
    let ms = elapsed.as_secs_f64() * 1000.0;
    println!("{DIM}  [{label}: {ms:.2} ms]{RESET}");
}

// ---------------------------------------------------------------------------
// In-process submission channel
// ---------------------------------------------------------------------------

/// Accepts everything and answers with the payload hash as the reference.
struct LoopbackChannel;

impl SubmissionChannel for LoopbackChannel {
    fn submit(&self, payload: &[u8]) -> SubmissionReceipt {
        SubmissionReceipt::success(hash::hash(payload).to_text())
    }
}

fn main() -> Result<()> {
    let format = LogFormat::from_str_lossy(&std::env::var("LOG_FORMAT").unwrap_or_default());
    init_logging("info", format).context("installing tracing subscriber")?;

    // -----------------------------------------------------------------------
    section(1, "Key material");
    // -----------------------------------------------------------------------
    let treasury = Keypair::generate_with_recovery_phrase();
    let phrase = treasury
        .recovery_phrase()
        .context("generated keypair keeps its phrase")?;
    info("Treasury", &treasury.pubkey().to_text());
    info("Recovery phrase", phrase);

    let restored = Keypair::from_recovery_phrase(phrase)?;
    if restored.pubkey() != treasury.pubkey() {
        bail!("recovery phrase produced a different key");
    }
    success("recovery phrase restores the same identifier");

    let buyer = Keypair::generate();
    info("Buyer", &buyer.pubkey().to_text());

    // -----------------------------------------------------------------------
    section(2, "Build");
    // -----------------------------------------------------------------------
    let program = VaultProgram::new(ProgramConfig::from_text(DEFAULT_PROGRAM_ID)?);
    let amount = vrt_to_vinnies(25).context("amount overflow")?;

    let mut tx = Transaction::with_recent_blockhash(hash::hash(b"demo slot 1"));
    tx.add(program.initialize_vault(&treasury.pubkey(), 1024)?);
    tx.add(program.create_account(&treasury.pubkey(), &buyer.pubkey(), amount, 128)?);

    info("Instructions", &tx.instructions().len().to_string());
    info("Accounts", &tx.account_keys().len().to_string());
    info("Required signers", &tx.num_required_signatures().to_string());
    info("Message hash", &tx.message_hash()?.to_hex());

    // -----------------------------------------------------------------------
    section(3, "Sign on two machines");
    // -----------------------------------------------------------------------
    let start = Instant::now();
    tx.partial_sign(&[&treasury])?;
    let hop = tx.serialize()?;
    timing("treasury signs + serialize", start.elapsed());
    info("Transport size", &format!("{} bytes", hop.len()));

    let start = Instant::now();
    let mut remote = Transaction::deserialize(&hop)?;
    remote.partial_sign(&[&buyer])?;
    timing("deserialize + buyer signs", start.elapsed());

    if !remote.is_complete() {
        bail!("missing signers: {:?}", remote.missing_signers());
    }
    success("all signature slots filled");

    // -----------------------------------------------------------------------
    section(4, "Verify and submit");
    // -----------------------------------------------------------------------
    if !remote.verify_signatures() {
        bail!("signature verification failed");
    }
    success("every signature verifies against the compiled message");

    let receipt = submit_transaction(&LoopbackChannel, &remote)?;
    info("Reference", &receipt.reference);
    if receipt.is_confirmed() {
        success("submitted");
    }

    println!();
    Ok(())
}
