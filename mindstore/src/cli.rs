use clap::{Parser, Subcommand};

/// Mindstore - virtual memory/storage engine for autonomous agents
#[derive(Parser, Debug)]
#[command(name = "mindstore")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Data directory (default: ~/.mindstore, or MINDSTORE_DATA_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute a batch of tool actions from a JSON array file
    Run {
        /// Path to the actions JSON file. Use "-" to read from stdin
        #[arg(value_name = "ACTIONS_JSON")]
        actions_json: String,
    },

    /// Clear all recorded action results from working memory
    ClearResults,

    /// Print the current working-memory statistics record
    Stats,

    /// Print the index the next action would receive
    PeekIndex,
}
