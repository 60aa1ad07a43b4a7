use clap::Subcommand;

/// Week info commands.
#[derive(Clone, Debug, Subcommand)]
pub enum WeekCommands {
    /// Record a construction week for a house.
    Create {
        house: String,
        /// First day of the week (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        #[arg(long, default_value = "not_started")]
        status: String,
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        on_time: bool,
    },
    /// Update a week. Omitted options keep their current value.
    Update {
        id: i64,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long, action = clap::ArgAction::Set)]
        on_time: Option<bool>,
    },
    /// Delete a week and its marks.
    Delete { id: i64 },
    /// Get a week with its marks.
    Get { id: i64 },
    /// List weeks of a house.
    List { house: String },
}
