// Where event data files come from: a local directory or an HTTP base URL.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, ScoutError};

/// A fetchable file belonging to one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource<'a> {
    EventData(&'a str),
    MatchResults(&'a str),
}

impl Resource<'_> {
    /// Path relative to the data source root.
    pub fn path(&self) -> String {
        match self {
            Resource::EventData(slug) => format!("event_data/{slug}.json"),
            Resource::MatchResults(slug) => format!("match_results/{slug}.json"),
        }
    }

    /// Metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            Resource::EventData(_) => "event_data",
            Resource::MatchResults(_) => "match_results",
        }
    }
}

/// Event slugs name files under the data source, so only ASCII
/// alphanumerics, `_` and `-` are accepted.
pub fn validate_slug(slug: &str) -> Result<()> {
    let valid = !slug.is_empty()
        && slug
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
    if valid {
        Ok(())
    } else {
        Err(ScoutError::InvalidSlug(slug.to_string()))
    }
}

/// Fetches raw file contents for the event store.
pub trait EventSource: Send + Sync {
    fn fetch(&self, resource: Resource<'_>) -> impl Future<Output = Result<String>> + Send;
}

#[derive(Debug, Clone)]
pub enum DataSource {
    Directory(PathBuf),
    Http {
        client: reqwest::Client,
        base_url: String,
    },
}

impl DataSource {
    /// `http://` and `https://` locations are fetched over HTTP; anything else is a directory.
    pub fn from_location(location: &str, timeout: Duration) -> Result<Self> {
        if location.starts_with("http://") || location.starts_with("https://") {
            let client = reqwest::Client::builder().timeout(timeout).build()?;
            Ok(DataSource::Http {
                client,
                base_url: location.trim_end_matches('/').to_string(),
            })
        } else {
            Ok(DataSource::Directory(PathBuf::from(location)))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            DataSource::Directory(dir) => dir.display().to_string(),
            DataSource::Http { base_url, .. } => base_url.clone(),
        }
    }
}

impl EventSource for DataSource {
    async fn fetch(&self, resource: Resource<'_>) -> Result<String> {
        match self {
            DataSource::Directory(dir) => {
                let path = dir.join(resource.path());
                match tokio::fs::read_to_string(&path).await {
                    Ok(text) => Ok(text),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        Err(ScoutError::NotFound {
                            resource: path.display().to_string(),
                        })
                    }
                    Err(e) => Err(e.into()),
                }
            }
            DataSource::Http { client, base_url } => {
                let url = format!("{}/{}", base_url, resource.path());
                let resp = client.get(&url).send().await?;
                let status = resp.status();
                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(ScoutError::NotFound { resource: url });
                }
                if !status.is_success() {
                    return Err(ScoutError::HttpStatus {
                        url,
                        status: status.as_u16(),
                    });
                }
                Ok(resp.text().await?)
            }
        }
    }
}
