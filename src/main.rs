// Entrypoint for the `crawlio` CLI.
// - Parses arguments with clap, sets up logging, builds the API client and
//   hands it to the selected flow in `ui`.
// - Any error returned by a flow ends the process with a non-zero status.

use clap::{Parser, Subcommand};
use crawlio_client::api::{ApiClient, CrawlOptions, DEFAULT_BASE_URL};
use crawlio_client::logging::init_logging;
use crawlio_client::ui::{run_crawl, run_demo, run_history, DemoSettings};
use std::path::PathBuf;
use tracing::{debug, error};

const DEFAULT_TARGET_URL: &str = "https://www.wikipedia.org/";

#[derive(Parser)]
#[command(author, version, about = "Client for the Crawlio crawling API", long_about = None)]
struct Cli {
    /// Base URL of the Crawlio API server
    #[arg(long, env = "CRAWLIO_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    base_url: String,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new user, crawl a page and show the crawl history
    Demo {
        /// Email to register; a unique test address is generated if omitted
        #[arg(long)]
        email: Option<String>,

        /// Account password; prompted for if omitted
        #[arg(long, env = "CRAWLIO_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        #[arg(long, default_value = "Test")]
        first_name: String,

        #[arg(long, default_value = "User")]
        last_name: String,

        /// Page to crawl
        #[arg(long, default_value = DEFAULT_TARGET_URL)]
        url: String,

        /// Directory the crawl result is written to
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Crawl a page with an existing API key
    Crawl {
        /// Page to crawl
        #[arg(default_value = DEFAULT_TARGET_URL)]
        url: String,

        /// API key; falls back to the key saved by `demo`
        #[arg(long, env = "CRAWLIO_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Also capture a screenshot
        #[arg(long)]
        screenshot: bool,

        /// Directory the crawl result is written to
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Show the crawl history of an API key
    History {
        /// API key; falls back to the key saved by `demo`
        #[arg(long, env = "CRAWLIO_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;
    debug!("Using Crawlio API at {}", cli.base_url);

    let api = ApiClient::new(&cli.base_url)?;

    let outcome = match cli.command {
        Commands::Demo {
            email,
            password,
            first_name,
            last_name,
            url,
            output_dir,
        } => run_demo(
            api,
            DemoSettings {
                email,
                password,
                first_name,
                last_name,
                url,
                options: CrawlOptions::full_page(),
                output_dir,
            },
        ),
        Commands::Crawl {
            url,
            api_key,
            screenshot,
            output_dir,
        } => {
            let options = CrawlOptions {
                screenshot: Some(screenshot),
                ..CrawlOptions::full_page()
            };
            run_crawl(api, api_key, &url, &options, &output_dir)
        }
        Commands::History { api_key } => run_history(api, api_key),
    };

    if let Err(e) = &outcome {
        error!("{:#}", e);
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert()
    }

    #[test]
    fn crawl_defaults_to_wikipedia() {
        let cli = Cli::try_parse_from(["crawlio", "crawl", "--api-key", "k"]).unwrap();
        match cli.command {
            Commands::Crawl { url, api_key, screenshot, .. } => {
                assert_eq!(url, DEFAULT_TARGET_URL);
                assert_eq!(api_key.as_deref(), Some("k"));
                assert!(!screenshot);
            }
            _ => panic!("expected crawl subcommand"),
        }
    }
}
