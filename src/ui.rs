// UI layer: the three command flows (demo, crawl, history). Each flow is a
// straight line of API calls with a spinner while the network is busy and
// a printed summary afterwards.

use crate::api::{ApiClient, CrawlOptions};
use crate::report::{crawl_summary, history_summary, save_result};
use anyhow::{bail, Context, Result};
use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Value shipped in sample configs; treated the same as having no key.
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY_HERE";

/// File in the home directory holding the key from the last registration.
pub const API_KEY_FILE: &str = ".crawlio_api_key";

/// Inputs for [`run_demo`]. `email` and `password` are filled in (generated
/// address, interactive prompt) when left empty.
#[derive(Clone)]
pub struct DemoSettings {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub url: String,
    pub options: CrawlOptions,
    pub output_dir: PathBuf,
}

/// Register a fresh user, crawl one page, save it, then show the history.
pub fn run_demo(mut api: ApiClient, settings: DemoSettings) -> Result<()> {
    println!("Crawlio API Client Demo");
    println!("{}", "=".repeat(50));

    println!("\n1. User Registration");
    println!("{}", "-".repeat(20));

    let timestamp = chrono::Utc::now().timestamp();
    let email = settings
        .email
        .unwrap_or_else(|| format!("testuser_{}@example.com", timestamp));
    let password = match settings.password {
        Some(p) => p,
        // `Password` hides input in terminal for passwords.
        None => Password::new()
            .with_prompt(format!("Password for {}", email))
            .interact()
            .context("Failed to read password")?,
    };

    let spinner = start_spinner("Registering...")?;
    let registered = api.register(&email, &password, &settings.first_name, &settings.last_name);
    spinner.finish_and_clear();
    if !registered {
        bail!("Failed to register user {}", email);
    }
    println!("Registration successful!");

    println!("\n2. Website Crawling");
    println!("{}", "-".repeat(20));

    let spinner = start_spinner("Crawling...")?;
    let crawl_result = api.crawl(&settings.url, Some(&settings.options));
    spinner.finish_and_clear();

    if let Some(result) = crawl_result {
        println!("\nCrawl Results Summary:");
        println!("{}", "-".repeat(25));
        print_lines(&crawl_summary(&result));

        let path = save_result(&result, &settings.output_dir, "crawl_result", timestamp)?;
        println!("\nFull results saved to: {}", path.display());
    } else {
        println!("Crawl failed");
    }

    println!("\n3. Crawl History");
    println!("{}", "-".repeat(15));

    let spinner = start_spinner("Fetching history...")?;
    let history = api.fetch_history();
    spinner.finish_and_clear();
    if let Some(history) = history {
        print_lines(&history_summary(&history));
    }

    println!("\nDemo completed successfully!");
    if let Some(key) = api.api_key() {
        println!("Your API Key: {}", key);
        match persist_api_key(&api_key_path(), key) {
            Ok(path) => println!("Saved to {} for future runs.", path.display()),
            Err(e) => println!("Could not save API key: {:#}", e),
        }
    }
    Ok(())
}

/// Crawl `url` with an existing key and save the result. Fails before any
/// request is made when no real key is available.
pub fn run_crawl(
    mut api: ApiClient,
    api_key: Option<String>,
    url: &str,
    options: &CrawlOptions,
    output_dir: &Path,
) -> Result<()> {
    let key = resolve_api_key(api_key)?;
    api.set_api_key(&key);

    println!("Simple Crawlio API Client");
    println!("{}", "=".repeat(40));

    let spinner = start_spinner("Crawling...")?;
    let crawl_result = api.crawl(url, Some(options));
    spinner.finish_and_clear();

    let Some(result) = crawl_result else {
        bail!("Crawl of {} failed", url);
    };
    println!("Crawl successful!");
    print_lines(&crawl_summary(&result));

    let path = save_result(&result, output_dir, "simple_crawl", chrono::Utc::now().timestamp())?;
    println!("Results saved to: {}", path.display());
    Ok(())
}

/// Print the crawl history of an existing key.
pub fn run_history(mut api: ApiClient, api_key: Option<String>) -> Result<()> {
    let key = resolve_api_key(api_key)?;
    api.set_api_key(&key);

    let spinner = start_spinner("Fetching history...")?;
    let history = api.fetch_history();
    spinner.finish_and_clear();

    let Some(history) = history else {
        bail!("Could not fetch crawl history");
    };
    print_lines(&history_summary(&history));
    Ok(())
}

/// Pick the key given on the command line (or environment), else the one
/// saved by the last demo run.
fn resolve_api_key(explicit: Option<String>) -> Result<String> {
    let key = explicit.or_else(|| load_api_key(&api_key_path()).ok());
    check_api_key(key.as_deref()).map(str::to_string)
}

/// Reject a missing, blank or placeholder key.
pub fn check_api_key(key: Option<&str>) -> Result<&str> {
    match key.map(str::trim) {
        Some(k) if !k.is_empty() && k != PLACEHOLDER_API_KEY => Ok(k),
        Some(k) if k == PLACEHOLDER_API_KEY => bail!(
            "Please replace {} with your actual API key. \
             Get one by running: crawlio demo",
            PLACEHOLDER_API_KEY
        ),
        _ => bail!(
            "No API key available. Pass --api-key, set CRAWLIO_API_KEY, \
             or run `crawlio demo` to register one"
        ),
    }
}

/// Location of the saved key in the user's home directory.
pub fn api_key_path() -> PathBuf {
    let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.join(API_KEY_FILE)
}

/// Persist the key so later runs can reuse it.
pub fn persist_api_key(path: &Path, key: &str) -> Result<PathBuf> {
    std::fs::write(path, key)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path.to_path_buf())
}

/// Load a key written by [`persist_api_key`].
pub fn load_api_key(path: &Path) -> Result<String> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(data.trim().to_string())
}

fn start_spinner(msg: &'static str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message(msg);
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}
