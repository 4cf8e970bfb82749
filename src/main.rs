use clap::{Parser, Subcommand};
use shop_search::Result;
use shop_search::commands::{
    init_store, rebuild_store, run_search, serve_api, show_config, show_status,
};

#[derive(Parser)]
#[command(name = "shop-search")]
#[command(about = "A shopping assistant backend with semantic product search")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Override the listen port from the configuration
        #[arg(long)]
        port: Option<u16>,
    },
    /// Build the product vector store (one-time, may take several minutes)
    Init,
    /// Destroy and rebuild the product vector store from scratch
    Rebuild,
    /// Run a one-off semantic product search from the command line
    Search {
        /// Free-text search query
        query: String,
        /// Restrict results to a single catalog category
        #[arg(long)]
        category: Option<String>,
        /// Maximum number of results
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Show catalog and vector store status
    Status,
    /// Show the active configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            serve_api(port).await?;
        }
        Commands::Init => {
            init_store().await?;
        }
        Commands::Rebuild => {
            rebuild_store().await?;
        }
        Commands::Search {
            query,
            category,
            limit,
        } => {
            run_search(&query, category.as_deref(), limit).await?;
        }
        Commands::Status => {
            show_status().await?;
        }
        Commands::Config => {
            show_config()?;
        }
    }

    Ok(())
}
