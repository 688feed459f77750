use chrono::DateTime;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, LINK, RETRY_AFTER, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::RepositoryDescriptor;

pub const DEFAULT_PAGE_SIZE: usize = 100;

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const CLIENT_USER_AGENT: &str = concat!("github-summary/", env!("CARGO_PKG_VERSION"));

/// Authenticated, read-only access to the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    base_url: String,
    token: String,
    page_size: usize,
}

impl GitHubClient {
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            http,
            base_url: config.github_api_url.clone(),
            token: config.github_token.clone(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub(crate) fn repo_url(&self, owner: &str, repo: &str, tail: &str) -> String {
        format!("{}/repos/{owner}/{repo}/{tail}", self.base_url)
    }

    pub(crate) fn get(&self, url: &str) -> RequestBuilder {
        self.http
            .get(url)
            .header(AUTHORIZATION, format!("token {}", self.token))
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(USER_AGENT, CLIENT_USER_AGENT)
    }

    /// Sends `req` and returns the response if GitHub answered with success.
    pub(crate) async fn send(&self, req: RequestBuilder) -> Result<Response> {
        let resp = req.send().await?;
        check_status(resp).await
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let resp = self.send(self.get(url)).await?;
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| Error::Decode(format!("{url}: {e}")))
    }

    /// Lists every non-fork repository of `username`, following page numbers
    /// until a page comes back shorter than the page size.
    pub async fn list_repositories(&self, username: &str) -> Result<Vec<RepositoryDescriptor>> {
        let url = format!("{}/users/{username}/repos", self.base_url);
        let mut repos = Vec::new();
        let mut page = 1usize;

        loop {
            let req = self
                .get(&url)
                .query(&[("page", page), ("per_page", self.page_size)]);
            let resp = self.send(req).await?;
            let body = resp.text().await?;
            let batch: Vec<RepositoryDescriptor> = serde_json::from_str(&body)
                .map_err(|e| Error::Decode(format!("repository page {page}: {e}")))?;

            let fetched = batch.len();
            debug!(page, fetched, "fetched repository page");
            repos.extend(batch.into_iter().filter(|r| !r.fork));

            if fetched < self.page_size {
                break;
            }
            page += 1;
        }

        info!(count = repos.len(), "found original repositories");
        Ok(repos)
    }
}

async fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let headers = resp.headers().clone();
    let url = resp.url().to_string();

    if is_rate_limited(status, &headers) {
        return Err(Error::RateLimit {
            retry_after: retry_guidance(&headers),
        });
    }
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            let message = resp
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            Err(Error::Auth {
                status: status.as_u16(),
                message,
            })
        }
        _ => Err(Error::Http {
            status: status.as_u16(),
            url,
        }),
    }
}

fn is_rate_limited(status: StatusCode, headers: &HeaderMap) -> bool {
    if status != StatusCode::FORBIDDEN && status != StatusCode::TOO_MANY_REQUESTS {
        return false;
    }
    let exhausted = header_str(headers, "x-ratelimit-remaining").is_some_and(|v| v.trim() == "0");
    exhausted || headers.contains_key(RETRY_AFTER) || status == StatusCode::TOO_MANY_REQUESTS
}

fn retry_guidance(headers: &HeaderMap) -> Option<String> {
    // Retry-After is either delay-seconds or an HTTP-date.
    if let Some(value) = header_str(headers, RETRY_AFTER.as_str()) {
        let value = value.trim();
        return Some(match value.parse::<u64>() {
            Ok(secs) => format!("{secs} seconds"),
            Err(_) => value.to_string(),
        });
    }
    let reset: i64 = header_str(headers, "x-ratelimit-reset")?.trim().parse().ok()?;
    let at = DateTime::from_timestamp(reset, 0)?;
    Some(at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Page number of the `rel="last"` entry in a GitHub `Link` header.
pub fn last_page(headers: &HeaderMap) -> Option<u64> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',')
        .find(|part| part.contains("rel=\"last\""))
        .and_then(|part| part.split(';').next())
        .map(|target| target.trim().trim_start_matches('<').trim_end_matches('>'))
        .and_then(|target| Url::parse(target).ok())
        .and_then(|url| {
            url.query_pairs()
                .find(|(k, _)| k == "page")
                .and_then(|(_, v)| v.parse().ok())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, HeaderValue::from_static(*v));
        }
        map
    }

    #[test]
    fn reads_last_page_from_link_header() {
        let h = headers(&[(
            "link",
            "<https://api.github.com/repositories/1/commits?per_page=1&page=2>; rel=\"next\", \
             <https://api.github.com/repositories/1/commits?per_page=1&page=57>; rel=\"last\"",
        )]);
        assert_eq!(last_page(&h), Some(57));
    }

    #[test]
    fn no_last_relation_means_no_page() {
        let h = headers(&[(
            "link",
            "<https://api.github.com/repositories/1/commits?per_page=1&page=1>; rel=\"first\"",
        )]);
        assert_eq!(last_page(&h), None);
        assert_eq!(last_page(&HeaderMap::new()), None);
    }

    #[test]
    fn forbidden_with_remaining_zero_is_rate_limit() {
        let h = headers(&[("x-ratelimit-remaining", "0"), ("x-ratelimit-reset", "0")]);
        assert!(is_rate_limited(StatusCode::FORBIDDEN, &h));
        assert_eq!(
            retry_guidance(&h).as_deref(),
            Some("1970-01-01 00:00:00 UTC")
        );
    }

    #[test]
    fn plain_forbidden_is_not_rate_limit() {
        let h = headers(&[("x-ratelimit-remaining", "4999")]);
        assert!(!is_rate_limited(StatusCode::FORBIDDEN, &h));
        assert!(!is_rate_limited(StatusCode::NOT_FOUND, &HeaderMap::new()));
    }

    #[test]
    fn retry_after_wins_over_reset() {
        let h = headers(&[("retry-after", "30"), ("x-ratelimit-reset", "0")]);
        assert_eq!(retry_guidance(&h).as_deref(), Some("30 seconds"));
    }

    #[test]
    fn retry_after_date_is_shown_verbatim() {
        let h = headers(&[("retry-after", "Wed, 21 Oct 2015 07:28:00 GMT")]);
        assert_eq!(
            retry_guidance(&h).as_deref(),
            Some("Wed, 21 Oct 2015 07:28:00 GMT")
        );
    }
}
