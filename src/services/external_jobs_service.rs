use crate::dto::envelope::Sourced;
use crate::error::{Error, Result};
use crate::models::external_job::ExternalJob;
use crate::services::mock_data;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const SEARCH_URL: &str = "https://www.linkedin.com/jobs-guest/jobs/api/seeMoreJobPostings/search";
const DEFAULT_LOCATION: &str = "Bolivia";
const MAX_RESULTS: usize = 25;

static CARD_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r#"<li[\s>]"#).expect("job card regex"));
static TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)class="base-search-card__title"[^>]*>(.*?)</h3>"#).expect("job card regex")
});
static COMPANY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)class="base-search-card__subtitle"[^>]*>(.*?)</h4>"#).expect("job card regex")
});
static LOCATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)class="job-search-card__location"[^>]*>(.*?)</span>"#).expect("job card regex")
});
static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"href="(https://[^"]*linkedin\.com/jobs/view/[^"?]+)"#).expect("job card regex"));
static POSTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#"<time[^>]*datetime="([^"]+)""#).expect("job card regex"));
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("job card regex"));

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalJobQuery {
    pub keywords: Option<String>,
    pub location: Option<String>,
    pub start: Option<u32>,
}

#[derive(Clone)]
pub struct ExternalJobsService {
    client: Client,
    proxy_url: String,
}

impl ExternalJobsService {
    pub fn new(proxy_url: String, client: Client) -> Self {
        Self { client, proxy_url }
    }

    pub async fn search(&self, query: &ExternalJobQuery) -> Sourced<Vec<ExternalJob>> {
        match self.fetch(query).await {
            Ok(jobs) => Sourced::live(jobs),
            Err(e) => {
                tracing::warn!(error = %e, "external job search failed, serving demo listings");
                Sourced::demo(mock_data::external_jobs())
            }
        }
    }

    async fn fetch(&self, query: &ExternalJobQuery) -> Result<Vec<ExternalJob>> {
        let target = search_url(query)?;
        let request_url = proxied(&self.proxy_url, &target);
        tracing::debug!(url = %request_url, "fetching external jobs");

        let res = self
            .client
            .get(&request_url)
            .timeout(Duration::from_secs(20))
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(Error::Upstream {
                status: res.status().as_u16(),
                message: "job board request failed".to_string(),
            });
        }
        let html = res.text().await?;
        let jobs = parse_cards(&html);
        if jobs.is_empty() {
            return Err(Error::Upstream {
                status: 502,
                message: "no job cards found in response".to_string(),
            });
        }
        Ok(jobs)
    }
}

pub fn search_url(query: &ExternalJobQuery) -> Result<Url> {
    let location = query
        .location
        .as_deref()
        .filter(|l| !l.trim().is_empty())
        .unwrap_or(DEFAULT_LOCATION);
    Url::parse_with_params(
        SEARCH_URL,
        &[
            ("keywords", query.keywords.clone().unwrap_or_default()),
            ("location", location.to_string()),
            ("start", query.start.unwrap_or(0).to_string()),
        ],
    )
    .map_err(|e| Error::Internal(format!("bad job board url: {}", e)))
}

/// The proxy takes the target URL, percent-encoded, appended to its own.
pub fn proxied(proxy_url: &str, target: &Url) -> String {
    if proxy_url.trim().is_empty() {
        return target.to_string();
    }
    let encoded: String = url::form_urlencoded::byte_serialize(target.as_str().as_bytes()).collect();
    format!("{}{}", proxy_url, encoded)
}

pub fn parse_cards(html: &str) -> Vec<ExternalJob> {
    CARD_SPLIT
        .split(html)
        .filter_map(|card| {
            let title = capture_text(&TITLE, card)?;
            let company = capture_text(&COMPANY, card).unwrap_or_default();
            Some(ExternalJob {
                title,
                company,
                location: capture_text(&LOCATION, card),
                url: LINK.captures(card).map(|c| c[1].to_string()),
                posted_at: POSTED.captures(card).map(|c| c[1].to_string()),
                source: "linkedin".to_string(),
            })
        })
        .take(MAX_RESULTS)
        .collect()
}

fn capture_text(re: &Regex, haystack: &str) -> Option<String> {
    let raw = re.captures(haystack)?.get(1)?.as_str();
    let text = decode_entities(&TAG.replace_all(raw, ""));
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

fn decode_entities(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
}
