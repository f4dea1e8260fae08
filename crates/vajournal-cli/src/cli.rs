use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use vajournal_core::VERSION;

/// VA Journal - a private journal for text, drawings and audio, encrypted on your machine
#[derive(Parser)]
#[command(name = "vajournal")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the journal store
    #[arg(short, long, global = true, env = "VAJOURNAL_STORE")]
    pub store: Option<String>,

    /// Account to act as
    #[arg(short, long, global = true, env = "VAJOURNAL_USER")]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Path where the store will be created
    #[arg(value_name = "PATH")]
    pub path: Option<String>,

    /// Salt policy for new accounts (fixed, per_user)
    #[arg(long, value_name = "POLICY")]
    pub salt_policy: Option<String>,

    /// PBKDF2 iterations for new accounts
    #[arg(long, value_name = "N")]
    pub kdf_iterations: Option<u32>,

    /// Default editor for `write`
    #[arg(long)]
    pub editor: Option<String>,
}

/// Arguments for the `register` command
#[derive(Args)]
pub struct RegisterArgs {
    /// Username (defaults to --user)
    #[arg(value_name = "USERNAME")]
    pub username: Option<String>,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `write` command
#[derive(Args)]
pub struct WriteArgs {
    /// Journal to write to
    #[arg(short, long)]
    pub journal: Option<String>,

    /// Entry body (overrides stdin/editor)
    #[arg(long)]
    pub body: Option<String>,

    /// Set custom date/time (ISO-8601)
    #[arg(long)]
    pub date: Option<String>,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `attach` command
#[derive(Args)]
pub struct AttachArgs {
    /// File to encrypt and store
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Entry kind (drawing, audio)
    #[arg(short, long)]
    pub kind: String,

    /// Journal to write to
    #[arg(short, long)]
    pub journal: Option<String>,

    /// Set custom date/time (ISO-8601)
    #[arg(long)]
    pub date: Option<String>,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `read` command
#[derive(Args)]
pub struct ReadArgs {
    /// Journal to read
    #[arg(short, long)]
    pub journal: Option<String>,

    /// Filter by entry kind (text, drawing, audio)
    #[arg(short, long)]
    pub kind: Option<String>,

    /// Time window (e.g., "7d", "12h")
    #[arg(long)]
    pub last: Option<String>,

    /// Start date (ISO-8601)
    #[arg(long)]
    pub since: Option<String>,

    /// End date (ISO-8601)
    #[arg(long)]
    pub until: Option<String>,

    /// Limit number of results
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Write drawing and audio entries into this directory
    #[arg(long, value_name = "DIR")]
    pub out: Option<String>,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new journal store and write the config file
    Init(InitArgs),

    /// Register an account (creates its "default" journal)
    Register(RegisterArgs),

    /// List your journals
    Journals {
        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Disable interactive prompts
        #[arg(long)]
        no_input: bool,
    },

    /// Create a named journal
    CreateJournal {
        /// Journal name
        #[arg(value_name = "NAME")]
        name: String,

        /// Disable interactive prompts
        #[arg(long)]
        no_input: bool,
    },

    /// Write an encrypted text entry
    Write(WriteArgs),

    /// Encrypt a drawing or audio file into a journal
    Attach(AttachArgs),

    /// Decrypt and show entries, newest first
    Read(ReadArgs),

    /// Check store integrity
    Check {
        /// Also log in and count entries that decrypt
        #[arg(long)]
        decrypt: bool,

        /// Disable interactive prompts
        #[arg(long)]
        no_input: bool,
    },

    /// Write a consistent copy of the store
    Backup {
        /// Destination path
        #[arg(value_name = "DEST")]
        destination: String,

        /// Replace an existing file at the destination
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
