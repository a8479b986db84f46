//! Terminal UI binary for the Skirmish combat tracker.

mod app;
mod terminal;
mod views;

use std::path::PathBuf;
use std::process;

use clap::Parser;

use sk_engine::{Encounter, EncounterConfig};

use crate::app::App;

#[derive(Parser)]
#[command(
    name = "skirmish",
    about = "Turn-based combat tracker for tabletop encounters",
    version
)]
struct Args {
    /// Save file path
    #[arg(long, default_value = ".skirmish_save.txt")]
    save: PathBuf,

    /// Combat log export path
    #[arg(long, default_value = "combat_log_export.txt")]
    export: PathBuf,

    /// RNG seed for death saves and duplicated-combatant initiative
    #[arg(long, default_value = "42")]
    seed: u64,
}

fn main() {
    let args = Args::parse();

    let config = EncounterConfig::default().with_seed(args.seed);
    let app = App::new(Encounter::new(config), args.save, args.export);

    if let Err(e) = terminal::run(app) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
