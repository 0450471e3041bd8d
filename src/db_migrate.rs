use color_eyre::eyre::{Result, WrapErr};
use dotenv::dotenv;
use mentorhub_db::{create_pool, schema::initialize_database};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let database_url =
        std::env::var("DATABASE_URL").wrap_err("DATABASE_URL environment variable not set")?;

    info!("Connecting to database");
    let db_pool = create_pool(&database_url).await?;

    info!("Initializing database schema");
    initialize_database(&db_pool).await?;
    info!("Database schema initialized");

    Ok(())
}
