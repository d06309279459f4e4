use clap::Parser;
use docqa_cli::cli::IngestArgs;
use docqa_cli::commands::ingest::run_ingest;
use docqa_cli::settings::IngestSettings;
use docqa_telemetry::init_logging;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the variables may come from the shell.
    dotenvy::dotenv().ok();
    let args = IngestArgs::parse();
    init_logging(&args.log_config()?)?;

    let settings = IngestSettings::from_env()?;
    run_ingest(&settings).await?;
    Ok(())
}
