use clap::Subcommand;

/// House commands.
#[derive(Clone, Debug, Subcommand)]
pub enum HouseCommands {
    /// Create a house.
    Create {
        /// Model name, unique per house
        id: String,
        #[arg(long)]
        length: f64,
        #[arg(long)]
        width: f64,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        x: i64,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        y: i64,
        #[arg(long, default_value = "planned")]
        state: String,
        /// Official start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        brigade: String,
        /// Post id to assign; repeatable
        #[arg(long)]
        post: Vec<i64>,
    },
    /// Update a house. Omitted options keep their current value.
    Update {
        id: String,
        #[arg(long)]
        length: Option<f64>,
        #[arg(long)]
        width: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        x: Option<i64>,
        #[arg(long, allow_hyphen_values = true)]
        y: Option<i64>,
        #[arg(long)]
        state: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        real_start: Option<String>,
        #[arg(long)]
        real_end: Option<String>,
        #[arg(long)]
        brigade: Option<String>,
        /// Replace assigned posts; repeatable
        #[arg(long)]
        post: Option<Vec<i64>>,
    },
    /// Delete a house.
    Delete { id: String },
    /// Get a house with its posts and weeks.
    Get { id: String },
    /// List houses.
    List {
        #[arg(long)]
        state: Option<String>,
        /// Official term must start on or after this date
        #[arg(long)]
        from: Option<String>,
        /// Official term must end on or before this date
        #[arg(long, requires = "from")]
        to: Option<String>,
    },
}
