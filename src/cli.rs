use clap::{Parser, Subcommand};
use parsha_tracker::config::DEFAULT_API_PORT;
use parsha_tracker::fetch::DEFAULT_YEARS;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "parsha")]
#[command(about = "Track your progress through the weekly Torah readings", long_about = None)]
pub struct Cli {
    /// Read and write the local progress database instead of the API server
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print overall completion statistics
    Stats,
    /// Print every book with its parshiot and their progress
    Overview,
    /// Print one parsha and its aliyot (the first parsha if no title is given)
    Show { title: Option<String> },
    /// Flip one aliyah between complete and incomplete
    Toggle { title: String, number: u32 },
    /// Mark every aliyah of a parsha complete, or incomplete if all already are
    ToggleAll { title: String },
    /// Build the readings file from Hebcal and Sefaria
    Init {
        /// Where to write the readings (defaults to the configured data file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing readings file
        #[arg(long)]
        force: bool,

        /// First calendar year to scan
        #[arg(long, default_value_t = *DEFAULT_YEARS.start())]
        from_year: i32,

        /// Last calendar year to scan
        #[arg(long, default_value_t = *DEFAULT_YEARS.end())]
        to_year: i32,
    },
    /// Manage the API server
    Serve {
        #[command(subcommand)]
        command: Option<ServeCommand>,

        /// Port to run the server on
        #[arg(short, long, global = true, default_value_t = DEFAULT_API_PORT)]
        port: u16,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ServeCommand {
    /// Start the API server (default if no subcommand given)
    Start {
        #[arg(long, hide = true)]
        daemon: bool,
    },
    /// Stop the running API server
    Stop,
    /// Check if the API server is running
    Status,
}
