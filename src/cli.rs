//! Command-line interface built on clap.
//!
//! [`Cli`] carries the subcommands in [`Command`] (print, session, demo)
//! and global flags that override values from `receipt-matic.toml`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// RECEIPT-MATIC 3000: a simulated thermal receipt printer.
#[derive(Debug, Parser)]
#[command(name = "receipt-matic", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file to use instead of ./receipt-matic.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enrichment endpoint URL.
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Print receipts without calling the enrichment endpoint.
    #[arg(long, global = true, default_value_t = false)]
    pub no_enrich: bool,

    /// Column width at which receipt lines wrap.
    #[arg(long, global = true)]
    pub wrap_width: Option<usize>,

    /// Log lifecycle transitions to stderr.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print a single receipt and exit once it has settled.
    Print {
        /// Receipt text; read from --file or stdin when omitted.
        text: Option<String>,

        /// Read the receipt text from this file.
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Dump the settled job record as JSON afterwards.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Type lines interactively; an empty line prints what was typed.
    Session,

    /// Print a built-in sample receipt without enrichment.
    Demo,
}
