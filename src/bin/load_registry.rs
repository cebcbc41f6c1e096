use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result};
use asset_tracker_api::{
    bulk_load::{self, LoadReport},
    config, db,
};
use clap::Parser;
use tracing::info;

/// Loads the code registry from CSV files.
///
/// Files are loaded parents first, so a sublocation file may name locations
/// from the location file given in the same run. Rows whose code already
/// exists are skipped, which makes re-running a load harmless.
#[derive(Parser)]
#[command(name = "load-registry", version)]
struct Cli {
    /// Overrides the configured database URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
    /// `name,code`
    #[arg(long)]
    locations: Option<PathBuf>,
    /// `name,code,location_code` (or `location_id`)
    #[arg(long)]
    sublocations: Option<PathBuf>,
    /// `name,code`
    #[arg(long)]
    categories: Option<PathBuf>,
    /// `name,code,category_code` (or `category_id`)
    #[arg(long)]
    subcategories: Option<PathBuf>,
    /// Apply pending migrations before loading
    #[arg(long)]
    migrate: bool,
}

fn open(path: &PathBuf) -> Result<File> {
    File::open(path).with_context(|| format!("cannot open {}", path.display()))
}

fn print_report(what: &str, path: &PathBuf, report: &LoadReport) {
    println!("{:<14} {}: {}", what, path.display(), report);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config().context("failed to load configuration")?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    let url = cli.database_url.clone().unwrap_or_else(|| cfg.database_url.clone());
    let pool = db::establish_connection(&url)
        .await
        .context("failed to connect to database")?;
    if cli.migrate {
        db::run_migrations(&pool).await?;
    }

    let mut totals = LoadReport::default();
    let mut add = |report: LoadReport| {
        totals.inserted += report.inserted;
        totals.skipped_existing += report.skipped_existing;
        totals.skipped_invalid += report.skipped_invalid;
    };

    if let Some(path) = &cli.locations {
        let report = bulk_load::load_locations(&pool, open(path)?).await?;
        print_report("locations", path, &report);
        add(report);
    }
    if let Some(path) = &cli.sublocations {
        let report = bulk_load::load_sublocations(&pool, open(path)?).await?;
        print_report("sublocations", path, &report);
        add(report);
    }
    if let Some(path) = &cli.categories {
        let report = bulk_load::load_categories(&pool, open(path)?).await?;
        print_report("categories", path, &report);
        add(report);
    }
    if let Some(path) = &cli.subcategories {
        let report = bulk_load::load_subcategories(&pool, open(path)?).await?;
        print_report("subcategories", path, &report);
        add(report);
    }

    info!(%totals, "Registry load finished");
    db::close_pool(pool).await?;
    Ok(())
}
