use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use skydrop_cli::{plan_and_report, Config};
use skydrop_client::rest::parse_base_url;
use skydrop_client::{DataSource, FileSource, RestClient};
use skydrop_core::PlannerConfig;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Planning date (YYYY-MM-DD)
    date: NaiveDate,

    /// Base URL of the delivery data service
    base_url: String,

    /// Read JSON files from this directory instead of the service
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Where result files are written [env: SKYDROP_OUTPUT_DIR]
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Moves available for the day [env: SKYDROP_MOVE_BUDGET]
    #[arg(long)]
    move_budget: Option<u32>,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("skydrop=info,skydrop_cli=info,skydrop_core=info,skydrop_client=info")
    });
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();

    let args = Args::parse();
    let env_config = Config::from_env();

    let base_url = parse_base_url(&args.base_url)?;
    let output_dir = args.output_dir.unwrap_or(env_config.output_dir);
    let planner = PlannerConfig::default()
        .with_move_budget(args.move_budget.unwrap_or(env_config.move_budget));

    let source: Box<dyn DataSource> = match args.data_dir {
        Some(dir) => {
            let files = FileSource::new(dir);
            tracing::info!(dir = %files.dir().display(), "using local data files");
            Box::new(files)
        }
        None => {
            let client = RestClient::with_timeout(base_url.as_str(), env_config.http_timeout)?;
            client
                .ensure_alive()
                .with_context(|| format!("Service at {base_url} is not available"))?;
            tracing::info!(url = %client.base_url(), "service is alive");
            Box::new(client)
        }
    };

    let (plan, paths) = plan_and_report(source.as_ref(), args.date, &planner, &output_dir)?;

    println!(
        "{}: delivered {}/{} orders in {} moves ({} left)",
        args.date,
        plan.delivered_count(),
        plan.orders.len(),
        plan.flight_log.len(),
        plan.remaining_moves.max(0)
    );
    println!("  {}", paths.deliveries.display());
    println!("  {}", paths.flightpath.display());
    println!("  {}", paths.geojson.display());
    Ok(())
}
