use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{BufReader, IsTerminal, stdin, stdout};
use std::path::PathBuf;

use crate::application::{ExpenseLedger, StaleEditPolicy};

mod session;

pub use session::*;

/// Ledgerline - Session Expense Tracker
#[derive(Parser, Debug)]
#[command(name = "ledgerline")]
#[command(about = "Track expenses for a session and see totals per category")]
#[command(version)]
pub struct Cli {
    /// Currency symbol shown before amounts
    #[arg(short, long, default_value = "₹")]
    pub currency: String,

    /// What happens when the expense being edited is deleted before saving
    #[arg(long, value_enum, default_value_t = StaleEditPolicy::Drop)]
    pub stale_edits: StaleEditPolicy,

    /// Read session commands from a file instead of standard input
    #[arg(short, long)]
    pub script: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let ledger = ExpenseLedger::with_policy(self.stale_edits);
        let out = stdout().lock();

        match &self.script {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("Failed to open script: {}", path.display()))?;
                let mut session = Session::new(ledger, self.currency, out);
                session.run(BufReader::new(file))
            }
            None => {
                let input = stdin();
                let interactive = input.is_terminal();
                let mut session =
                    Session::new(ledger, self.currency, out).with_prompt(interactive);
                if interactive {
                    session.greet()?;
                }
                session.run(input.lock())
            }
        }
    }
}
