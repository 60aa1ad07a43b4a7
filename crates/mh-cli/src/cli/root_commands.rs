use clap::{Args, Subcommand};

use crate::cli::subcommands::{
    HistoryCommands, HouseCommands, MarkCommands, PostCommands, WeekCommands,
};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Change history of a house or a week.
    History {
        #[command(subcommand)]
        action: HistoryCommands,
    },
    /// Query raw audit records, including those of deleted entities.
    Audit(AuditArgs),
    /// Houses.
    House {
        #[command(subcommand)]
        action: HouseCommands,
    },
    /// Structural posts.
    Post {
        #[command(subcommand)]
        action: PostCommands,
    },
    /// Weekly progress entries.
    Week {
        #[command(subcommand)]
        action: WeekCommands,
    },
    /// Marks on a week.
    Mark {
        #[command(subcommand)]
        action: MarkCommands,
    },
}

#[derive(Clone, Debug, Args)]
pub struct AuditArgs {
    /// Logical table name, e.g. `Houses`
    #[arg(long)]
    pub table: Option<String>,
    #[arg(long)]
    pub record: Option<String>,
    /// create, update or delete
    #[arg(long)]
    pub operation: Option<String>,
    #[arg(long)]
    pub author: Option<String>,
}
