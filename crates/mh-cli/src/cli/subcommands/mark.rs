use clap::Subcommand;

/// Week mark commands.
#[derive(Clone, Debug, Subcommand)]
pub enum MarkCommands {
    /// Add a mark to a week.
    Create {
        week: i64,
        /// red_mark or blue_mark
        #[arg(long = "type")]
        mark_type: String,
        #[arg(long)]
        comment: String,
    },
    /// Update a mark. Omitted options keep their current value.
    Update {
        id: i64,
        #[arg(long = "type")]
        mark_type: Option<String>,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Delete a mark.
    Delete { id: i64 },
}
