//! Web search tool — DuckDuckGo's HTML results page, no API key needed.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, Url};
use tracing::debug;

use localagent_core::config::WebSearchConfig;

use super::base::{optional_i64, require_string, ParamSpec, ParamType, Tool, ToolArgs};

/// User-Agent header.
const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_7_2) AppleWebKit/537.36 (KHTML, like Gecko)";

/// Hard cap on results per query.
const MAX_RESULTS_CAP: usize = 10;

const INPUTS: &[ParamSpec] = &[
    ParamSpec::required("query", ParamType::String, "The search query to perform."),
    ParamSpec::optional(
        "max_results",
        ParamType::Integer,
        "Number of results to return (1-10).",
    ),
];

static RESULT_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<a([^>]*class="result__a"[^>]*)>(.*?)</a>"#).expect("valid regex")
});
static RESULT_SNIPPET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)class="result__snippet"[^>]*>(.*?)</(?:a|div|td)>"#).expect("valid regex")
});
static HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href="([^"]*)""#).expect("valid regex"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// One parsed search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

// ─────────────────────────────────────────────
// WebSearchTool
// ─────────────────────────────────────────────

pub struct WebSearchTool {
    client: Client,
    endpoint: String,
    default_max_results: usize,
}

impl WebSearchTool {
    pub fn new(config: &WebSearchConfig) -> Self {
        Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            endpoint: config.endpoint.clone(),
            default_max_results: config.max_results as usize,
        }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Performs a DuckDuckGo web search based on your query, then returns the top search results \
         as a numbered list of titles, URLs and snippets."
    }

    fn inputs(&self) -> &[ParamSpec] {
        INPUTS
    }

    async fn execute(&self, args: &ToolArgs) -> anyhow::Result<String> {
        let query = require_string(args, "query")?.trim();
        if query.is_empty() {
            anyhow::bail!("query must not be empty");
        }
        let count = optional_i64(args, "max_results")
            .map(|n| n.clamp(1, MAX_RESULTS_CAP as i64) as usize)
            .unwrap_or(self.default_max_results);

        debug!(query = %query, count = count, "searching web");

        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("search request failed: {e}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            anyhow::bail!("search endpoint returned {status}");
        }

        let html = resp
            .text()
            .await
            .map_err(|e| anyhow::anyhow!("failed to read search response: {e}"))?;

        let results = extract_results(&html, count);
        if results.is_empty() {
            return Ok(format!("No results found for: {query}"));
        }

        let output: Vec<String> = results
            .iter()
            .enumerate()
            .map(|(i, r)| format!("{}. {}\n   {}\n   {}", i + 1, r.title, r.url, r.snippet))
            .collect();
        Ok(output.join("\n\n"))
    }
}

// ─────────────────────────────────────────────
// HTML helpers
// ─────────────────────────────────────────────

/// Pull up to `limit` results out of a DuckDuckGo HTML page.
pub fn extract_results(html: &str, limit: usize) -> Vec<SearchResult> {
    let mut results = Vec::new();

    for chunk in html.split("result__body").skip(1) {
        if results.len() >= limit {
            break;
        }
        let Some(link) = RESULT_LINK.captures(chunk) else {
            continue;
        };
        let title = clean_text(&link[2]);
        if title.is_empty() {
            continue;
        }
        let url = HREF
            .captures(&link[1])
            .map(|c| resolve_link(&html_decode(&c[1])))
            .unwrap_or_default();
        let snippet = RESULT_SNIPPET
            .captures(chunk)
            .map(|c| clean_text(&c[1]))
            .unwrap_or_default();

        results.push(SearchResult {
            title,
            url,
            snippet,
        });
    }

    results
}

/// DuckDuckGo wraps targets as `//duckduckgo.com/l/?uddg=<encoded>`; unwrap them.
fn resolve_link(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };
    match Url::parse(&absolute) {
        Ok(url) => url
            .query_pairs()
            .find(|(k, _)| k == "uddg")
            .map(|(_, v)| v.into_owned())
            .unwrap_or(absolute),
        Err(_) => absolute,
    }
}

/// Strip tags, decode entities, collapse whitespace.
fn clean_text(fragment: &str) -> String {
    let text = TAG.replace_all(fragment, "");
    let text = html_decode(&text);
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Basic HTML entity decoding.
fn html_decode(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
