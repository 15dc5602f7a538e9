//! Command-line interface.

use clap::Parser;

/// Vanishing tic-tac-toe - two players, seven stones, the oldest one vanishes
#[derive(Parser, Debug)]
#[command(name = "vanishing_tictactoe")]
#[command(about = "Real-time vanishing tic-tac-toe server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Port to bind to
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Optional TOML config file (keys: host, port)
    #[arg(short, long)]
    pub config: Option<std::path::PathBuf>,
}
