use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "orl",
    about = "ORL — an append-only ledger of owned records",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Ledger file (a JSON audit log)
    #[arg(long, global = true, default_value = "orl-ledger.json")]
    pub ledger: PathBuf,

    /// Caller identity, derived from this label
    #[arg(long = "as", global = true, default_value = "default", value_name = "LABEL")]
    pub caller: String,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an empty ledger file
    Init(InitArgs),
    /// Append a new record owned by the caller
    Add(AddArgs),
    /// Replace the payload of a mutable record
    SetData(SetDataArgs),
    /// Transfer a mutable record to another owner
    Transfer(TransferArgs),
    /// Show one record
    Show(ShowArgs),
    /// Show the audit log, newest first
    Log(LogArgs),
    /// Show the mutation history of one record
    History(HistoryArgs),
    /// List records currently held by an owner
    Holdings(HoldingsArgs),
    /// Show record and audit event counts
    Count(CountArgs),
    /// Validate audit log integrity
    Verify(VerifyArgs),
    /// Replay the audit log and check convergence
    Replay(ReplayArgs),
    /// Show the caller identity in use
    Whoami(WhoamiArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing ledger file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct AddArgs {
    /// Payload as hex, zero-extended to the fixed width
    pub payload: String,
    /// Lock the record forever at creation
    #[arg(long)]
    pub immutable: bool,
}

#[derive(Args)]
pub struct SetDataArgs {
    /// Record id (`3` or `rec#3`)
    pub id: String,
    /// New payload as hex
    pub payload: String,
}

#[derive(Args)]
pub struct TransferArgs {
    /// Record id (`3` or `rec#3`)
    pub id: String,
    /// New owner: a 64-char hex id, or a label to derive one
    pub new_owner: String,
}

#[derive(Args)]
pub struct ShowArgs {
    pub id: String,
}

#[derive(Args)]
pub struct LogArgs {
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,
}

#[derive(Args)]
pub struct HistoryArgs {
    pub id: String,
}

#[derive(Args)]
pub struct HoldingsArgs {
    /// Owner to list (hex id or label); defaults to the caller
    pub owner: Option<String>,
}

#[derive(Args)]
pub struct CountArgs {}

#[derive(Args)]
pub struct VerifyArgs {}

#[derive(Args)]
pub struct ReplayArgs {}

#[derive(Args)]
pub struct WhoamiArgs {}
