use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "repasse-core")]
#[command(about = "Repasse Core - ISO settlement and margin engine", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Run settlement consolidation for a target period
    Consolidate {
        /// Target month (1-12); defaults to the month that just ended
        #[arg(long)]
        month: Option<u32>,

        /// Target year; required when --month is given
        #[arg(long)]
        year: Option<i32>,
    },

    /// Database management commands
    #[command(subcommand)]
    Db(DbCommands),

    /// Configuration validation
    Config,
}

#[derive(Subcommand)]
pub enum DbCommands {
    /// Run database migrations
    Migrate,
}
