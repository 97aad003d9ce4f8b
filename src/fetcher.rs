use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT, ACCEPT_LANGUAGE};
use reqwest::Proxy;
use std::time::Duration;
use log::{debug, info, warn};
use crate::config::Config;
use crate::error::ScrapeError;

/// A GET request plus the transport hint for sites that need automatic unblocking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub unblock: bool,
}

impl Request {
    pub fn new(url: impl Into<String>) -> Self {
        Request { url: url.into(), unblock: false }
    }

    pub fn unblocked(url: impl Into<String>) -> Self {
        Request { url: url.into(), unblock: true }
    }
}

/// Fetches a request body. The pipeline only talks to this trait.
pub trait Fetch {
    fn fetch(&self, request: &Request) -> Result<String, ScrapeError>;
}

pub struct Fetcher {
    client: Client,
    unblock_client: Option<Client>,
}

impl Fetcher {
    pub fn new(config: &Config) -> Result<Self, ScrapeError> {
        let client = Self::builder(config).build()?;

        let unblock_client = match &config.unblock_proxy {
            Some(proxy_url) => {
                let proxy = Proxy::all(proxy_url)
                    .map_err(|source| ScrapeError::Proxy { url: proxy_url.clone(), source })?;
                info!("Unblocking requests will be routed through the configured proxy.");
                Some(Self::builder(config).proxy(proxy).build()?)
            }
            None => None,
        };

        Ok(Fetcher { client, unblock_client })
    }

    fn builder(config: &Config) -> reqwest::blocking::ClientBuilder {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(15))
            .default_headers(headers)
            .cookie_store(true)
    }

    fn get_random_user_agent(&self) -> &'static str {
        let uas = [
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:121.0) Gecko/20100101 Firefox/121.0",
        ];
        use rand::Rng;
        let mut rng = rand::thread_rng();
        uas[rng.gen_range(0..uas.len())]
    }

    fn client_for(&self, request: &Request) -> &Client {
        match (&self.unblock_client, request.unblock) {
            (Some(client), true) => client,
            (None, true) => {
                debug!("No unblock proxy configured; fetching {} directly", request.url);
                &self.client
            }
            _ => &self.client,
        }
    }
}

impl Fetch for Fetcher {
    fn fetch(&self, request: &Request) -> Result<String, ScrapeError> {
        info!("Visiting: {}", request.url);
        let resp = self
            .client_for(request)
            .get(&request.url)
            .header(USER_AGENT, self.get_random_user_agent())
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            warn!("{} returned {}", request.url, status);
            return Err(ScrapeError::Status { url: request.url.clone(), status: status.as_u16() });
        }
        Ok(resp.text()?)
    }
}
