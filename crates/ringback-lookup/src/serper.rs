use crate::{LookupError, Result};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub endpoint: String,
    pub api_key: String,
    pub query_suffix: String,
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    snippet: Option<String>,
}

/// Quotes the email so the search engine treats it as an exact phrase.
pub fn build_query(email: &str, suffix: &str) -> String {
    let suffix = suffix.trim();
    if suffix.is_empty() {
        format!("\"{}\"", email.trim())
    } else {
        format!("\"{}\" {}", email.trim(), suffix)
    }
}

/// Concatenates every organic result snippet in response order, with no
/// separator. A response without organic results yields empty text.
pub fn parse_snippets(body: &str) -> Result<String> {
    let parsed: SearchResponse = serde_json::from_str(body)
        .map_err(|err| LookupError::Parse(format!("search response: {err}")))?;
    Ok(parsed
        .organic
        .into_iter()
        .filter_map(|result| result.snippet)
        .collect())
}

#[cfg(feature = "remote")]
mod imp {
    use super::{build_query, parse_snippets, SearchOptions};
    use crate::source::SnippetSource;
    use crate::{LookupError, Result};
    use reqwest::blocking::Client;
    use std::time::Duration;
    use tracing::debug;
    use url::Url;

    #[derive(Debug, Clone)]
    pub struct SerperSource {
        client: Client,
        endpoint: Url,
        api_key: String,
        query_suffix: String,
    }

    impl SerperSource {
        pub fn new(options: SearchOptions) -> Result<Self> {
            let endpoint = Url::parse(&options.endpoint)?;
            if endpoint.scheme() != "https" && !is_loopback(&endpoint) {
                return Err(LookupError::InvalidEndpoint(
                    "search endpoint must use https".to_string(),
                ));
            }
            let client = Client::builder()
                .timeout(options.timeout)
                .connect_timeout(Duration::from_secs(10))
                .build()?;
            Ok(Self {
                client,
                endpoint,
                api_key: options.api_key,
                query_suffix: options.query_suffix,
            })
        }
    }

    impl SnippetSource for SerperSource {
        fn source_name(&self) -> &'static str {
            "serper"
        }

        fn fetch_snippets(&self, email: &str) -> Result<String> {
            let query = build_query(email, &self.query_suffix);
            debug!(query = %query, "searching snippets");
            let body = self
                .client
                .post(self.endpoint.clone())
                .header("X-API-KEY", &self.api_key)
                .json(&serde_json::json!({ "q": query }))
                .send()?
                .error_for_status()?
                .text()?;
            parse_snippets(&body)
        }
    }

    fn is_loopback(url: &Url) -> bool {
        matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"))
    }
}

#[cfg(not(feature = "remote"))]
mod imp {
    use super::SearchOptions;
    use crate::source::SnippetSource;
    use crate::{LookupError, Result};

    #[derive(Debug, Clone)]
    pub struct SerperSource {
        options: SearchOptions,
    }

    impl SerperSource {
        pub fn new(options: SearchOptions) -> Result<Self> {
            Ok(Self { options })
        }
    }

    impl SnippetSource for SerperSource {
        fn source_name(&self) -> &'static str {
            "serper"
        }

        fn fetch_snippets(&self, _email: &str) -> Result<String> {
            let _ = &self.options;
            Err(LookupError::Unavailable(
                "snippet search requires the remote feature".to_string(),
            ))
        }
    }
}

pub use imp::SerperSource;
