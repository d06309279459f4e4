use clap::Parser;
use docqa_cli::cli::ChatArgs;
use docqa_cli::commands::chat::run_chat;
use docqa_cli::settings::ChatSettings;
use docqa_telemetry::init_logging;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = ChatArgs::parse();
    init_logging(&args.log_config()?)?;

    let settings = ChatSettings::from_env()?;
    run_chat(&settings).await
}
