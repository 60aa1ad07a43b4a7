use clap::Subcommand;

/// Post commands.
#[derive(Clone, Debug, Subcommand)]
pub enum PostCommands {
    /// Create a post.
    Create {
        name: String,
        #[arg(long, default_value_t = 0.0)]
        area: f64,
    },
    /// Rename a post or change its area.
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        area: Option<f64>,
    },
    /// Delete a post.
    Delete { id: i64 },
    /// List posts.
    List,
}
