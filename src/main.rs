use clap::Parser;
use dotenvy::dotenv;
use gold_draw_club::{
    cli::{AppContext, Cli, dispatch},
    config::{
        club::load_config,
        database::{create_connection, create_tables},
    },
    core::admin::seed_from_config,
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, env vars can also be set externally
    dotenv().ok();

    let cli = Cli::parse();

    // 3. Load the club configuration
    let config = load_config(&cli.config)
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    info!("Loaded configuration for {}", config.club.name);

    // 4. Initialize database
    let database = create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    create_tables(&database).await?;

    // 5. Seed members and the gold price on first run
    let seeded = seed_from_config(&database, &config)
        .await
        .inspect_err(|e| error!("Failed to seed database: {}", e))?;
    if seeded.members_created > 0 {
        info!("Seeded {} members", seeded.members_created);
    }

    // 6. Run the command
    let ctx = AppContext::new(database, config);
    let output = dispatch(&ctx, cli.command)
        .await
        .inspect_err(|e| error!("{}", e))?;
    println!("{output}");

    Ok(())
}
