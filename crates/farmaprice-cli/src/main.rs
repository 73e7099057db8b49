use clap::{Parser, Subcommand};

mod output;
mod search;

#[derive(Debug, Parser)]
#[command(name = "farmaprice")]
#[command(about = "Compare product prices across Colombian drugstore storefronts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search every configured store and print a price comparison
    Search {
        /// Product to search for, e.g. "dolex" or "trimebutina maleato"
        query: String,

        /// Maximum listings per store
        #[arg(long)]
        max: Option<usize>,

        /// Comma-separated store ids to restrict the search to
        #[arg(long, value_delimiter = ',')]
        stores: Option<Vec<String>>,

        /// Overall deadline for the whole search, in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Fetch through a headless browser instead of plain HTTP
        #[arg(long)]
        browser: bool,
    },
    /// List the configured stores
    Stores,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Search {
            query,
            max,
            stores,
            timeout_secs,
            browser,
        } => {
            search::run_search(search::SearchArgs {
                query,
                max,
                stores,
                timeout_secs,
                browser,
            })
            .await
        }
        Commands::Stores => search::list_stores(),
    }
}
