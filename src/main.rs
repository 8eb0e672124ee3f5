// SBDL contract job - batch entry point
//
// sbdl <local|qa|prod> <load_date> [--config conf/sbdl.json]

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sbdl::{
    build_contract_events, prepare_publish_records, write_to_sink, DataLoader, ExecutionContext,
    JobConfig, JobEnv,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EnvArg {
    Local,
    Qa,
    Prod,
}

impl From<EnvArg> for JobEnv {
    fn from(arg: EnvArg) -> Self {
        match arg {
            EnvArg::Local => JobEnv::Local,
            EnvArg::Qa => JobEnv::Qa,
            EnvArg::Prod => JobEnv::Prod,
        }
    }
}

/// Reshape account, party and address extracts into contract events
#[derive(Debug, Parser)]
#[command(name = "sbdl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Environment the job runs in
    #[arg(value_enum, ignore_case = true)]
    env: EnvArg,

    /// Business date of the extracts (YYYY-MM-DD)
    load_date: NaiveDate,

    /// Config file (defaults to conf/sbdl.json, then built-in LOCAL settings)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let env = JobEnv::from(cli.env);
    let ctx = ExecutionContext::new(env);
    info!(env = %env, run_id = %ctx.run_id, load_date = %cli.load_date, "Initializing SBDL job");

    let config = JobConfig::resolve(cli.config.as_deref(), env)?;
    let loader = DataLoader::from_config(&config)?;

    info!("Reading accounts");
    let accounts = loader.read_accounts()?;

    info!("Reading party relations");
    let parties = loader.read_parties()?;

    info!("Reading party addresses");
    let addresses = loader.read_addresses()?;

    info!(
        accounts = accounts.len(),
        parties = parties.len(),
        addresses = addresses.len(),
        "Building contract events"
    );
    let events = build_contract_events(&ctx, accounts, parties, addresses);

    // Everything is serialized before the sink opens: a failure publishes nothing
    let records = prepare_publish_records(events)?;

    info!(topic = %config.kafka_topic, output = ?config.output_path, "Writing publish records");
    let written = write_to_sink(config.output_path.as_deref(), &records)?;

    info!(run_id = %ctx.run_id, events = written, "SBDL job finished");
    Ok(())
}
