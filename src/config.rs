// Application configuration, loaded from environment variables and CLI flags.

use std::path::PathBuf;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Directory or `http(s)://` base URL holding `event_data/` and `match_results/`.
    pub data_source: String,
    /// Path prefix the dashboard uses for asset URLs.
    pub asset_prefix: String,
    /// Event slugs to load at startup.
    pub preload_events: Vec<String>,
    /// Timeout for HTTP data source requests.
    pub fetch_timeout: Duration,
    /// Directory containing the pre-built dashboard to serve.
    /// When set, the backend serves static files from this path.
    pub static_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables and CLI arguments.
    ///
    /// Environment variables:
    /// - `PORT` - HTTP server port (default: 3000)
    /// - `DATA_SOURCE` - data directory or base URL (default: `./public`)
    /// - `ASSET_PREFIX` - asset path prefix (default: empty)
    /// - `PRELOAD_EVENTS` - comma-separated event slugs
    /// - `FETCH_TIMEOUT_SECS` - HTTP fetch timeout (default: 30)
    /// - `STATIC_DIR` - Path to the dashboard dist directory for static file serving
    ///
    /// CLI flags:
    /// - `--port <PORT>` - Override the port
    /// - `--data-source <LOCATION>` - Override the data source
    pub fn load() -> Self {
        let args: Vec<String> = std::env::args().collect();
        Self::from_sources(&args, |key| std::env::var(key).ok())
    }

    /// Build a config from CLI args and an environment lookup.
    /// CLI flags take precedence over the environment, which beats defaults.
    pub fn from_sources(args: &[String], env: impl Fn(&str) -> Option<String>) -> Self {
        let port = Self::parse_cli_value(args, "--port")
            .and_then(|v| v.parse().ok())
            .or_else(|| env("PORT").and_then(|v| v.parse().ok()))
            .unwrap_or(3000);

        let data_source = Self::parse_cli_value(args, "--data-source")
            .or_else(|| env("DATA_SOURCE"))
            .unwrap_or_else(|| "./public".to_string());

        let asset_prefix = env("ASSET_PREFIX").unwrap_or_default();

        let preload_events = env("PRELOAD_EVENTS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let fetch_timeout = env("FETCH_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        let static_dir = env("STATIC_DIR").map(PathBuf::from);

        Config {
            port,
            data_source,
            asset_prefix,
            preload_events,
            fetch_timeout,
            static_dir,
        }
    }

    /// Parse a CLI flag value like `--port 8080`.
    fn parse_cli_value(args: &[String], flag: &str) -> Option<String> {
        args.windows(2).find_map(|pair| {
            if pair[0] == flag {
                Some(pair[1].clone())
            } else {
                None
            }
        })
    }
}
