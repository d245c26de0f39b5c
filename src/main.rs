use anyhow::Result;
use clap::Parser;
use mqtt_recorder::cli::Cli;
use mqtt_recorder::App;

#[tokio::main]
async fn main() -> Result<()> {
    // Log to stderr; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    let app = App::new(config);
    app.run(cli.command).await
}
