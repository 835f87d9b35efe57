use std::io::{stdin, stdout};

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};

use vetclinic::menu::Menu;
use vetclinic::{ClinicDatabase, VetclinicConfig};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// configuration file path, by default $HOME/.vetclinic/vetclinic.toml is used
    #[clap(short, long)]
    config: Option<String>,

    /// Print debug information
    #[clap(long)]
    debug: bool,

    /// Database file path (overrides the configured data directory)
    #[clap(long)]
    db: Option<String>,

    /// Discard any existing database file before starting
    #[clap(long)]
    reset: bool,

    /// Skip loading sample data into a fresh database
    #[clap(long)]
    no_seed: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt().with_max_level(Level::INFO).init();
    }

    let db_path = match &cli.db {
        Some(path) => path.clone(),
        None => {
            let config = VetclinicConfig::new(&cli.config)?;
            config.database_path()
        }
    };

    let db = if cli.reset {
        ClinicDatabase::open_with_reset(&db_path)?
    } else {
        ClinicDatabase::open(&db_path)?
    };
    info!("Clinic database ready at {}", db_path);

    if !cli.no_seed && db.needs_seed() {
        let summary = db.seed()?;
        println!(
            "Loaded sample data: {} owners, {} pets, {} consultations.",
            summary.owners, summary.pets, summary.consultations
        );
    }

    let stdin = stdin();
    let stdout = stdout();
    let mut menu = Menu::new(stdin.lock(), stdout.lock());
    menu.run(&db)?;

    Ok(())
}
