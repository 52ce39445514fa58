use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "wall")]
#[command(about = "Post and browse notes on the Wall of Love")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Use a throwaway in-memory board instead of Supabase
    #[arg(long, global = true)]
    pub memory: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List notes, newest first
    #[command(alias = "ls")]
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Post a note (reads piped stdin when no message is given)
    #[command(alias = "add")]
    Post {
        /// Note message
        message: Vec<String>,
    },
    /// Delete a note
    #[command(alias = "rm")]
    Delete {
        /// Note ID
        id: String,
    },
    /// Copy a note's message to the clipboard
    Share {
        /// Note ID
        id: String,
    },
    /// Print notes, then follow inserts and deletes until Ctrl-C
    Watch,
}
