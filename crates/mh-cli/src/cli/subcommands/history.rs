use clap::Subcommand;

/// History queries.
#[derive(Clone, Debug, Subcommand)]
pub enum HistoryCommands {
    /// House, its post links, weeks and marks.
    Full { house: String },
    /// The house record only.
    House { house: String },
    /// One week and its marks.
    Week { id: i64 },
}
