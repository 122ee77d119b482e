use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

/// Select the Sentinel-1 scenes covering an area of interest and check that
/// the selected data takes are complete.
#[derive(Debug, Parser)]
#[command(name = "s1_select", version)]
struct Cli {
    /// RON selection config
    config: PathBuf,

    /// Log debug messages
    #[arg(short, long)]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        })
        .with_target(false)
        .init();

    let selection = match s1_arch::load_config(&cli.config).and_then(|cfg| s1_arch::run(&cfg)) {
        Ok(selection) => selection,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    for scene in &selection.scenes {
        println!("{}", scene.scene().display());
    }
    println!("tiles: {}", selection.tiles.join(", "));

    ExitCode::SUCCESS
}
