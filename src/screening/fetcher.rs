use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::Client;
use tracing::{debug, info, warn};

use super::screening_file_name;
use crate::models::{Config, ScreenerCredentials};

/// Pause between screening requests so the site can keep up.
const PAGE_DELAY: Duration = Duration::from_secs(2);

/// Fetches screening result pages from the screening site: logs in once,
/// then submits the screening form for each market cap threshold and saves
/// the response HTML under the results directory.
pub struct ScreeningFetcher {
    client: Client,
    base_url: String,
    results_dir: PathBuf,
    credentials: ScreenerCredentials,
}

impl ScreeningFetcher {
    /// Build a fetcher with a cookie-holding HTTP session. Fails when the
    /// configuration carries no screener credentials.
    pub fn new(config: &Config) -> Result<Self> {
        let credentials = config.screener_credentials.clone().context(
            "screener credentials missing: set SCREENER_USERNAME and SCREENER_PASSWORD",
        )?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .cookie_store(true)
            .user_agent("value-screener/0.1")
            .build()?;

        Ok(Self {
            client,
            base_url: config.screener_base_url.trim_end_matches('/').to_string(),
            results_dir: config.results_dir.clone(),
            credentials,
        })
    }

    /// Log in and fetch one results page per threshold. Authentication
    /// failure aborts the run; a failure on a single threshold only skips
    /// that threshold.
    pub async fn fetch_all(&self, market_caps: &[u64]) -> Result<()> {
        fs::create_dir_all(&self.results_dir).with_context(|| {
            format!("cannot create results directory {}", self.results_dir.display())
        })?;

        self.login().await?;

        for &cap in market_caps {
            match self.fetch_screening_page(cap).await {
                Ok(html) => self.save_page(cap, &html),
                Err(e) => warn!("skipping market cap {}: {}", cap, e),
            }
            tokio::time::sleep(PAGE_DELAY).await;
        }

        Ok(())
    }

    async fn login(&self) -> Result<()> {
        let url = format!("{}/Account/LogOn", self.base_url);
        let form = [
            ("Email", self.credentials.username.as_str()),
            ("Password", self.credentials.password.as_str()),
        ];

        let response = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .await
            .context("login request failed")?;

        if !response.status().is_success() {
            bail!("login failed with status {}", response.status());
        }

        // A successful login redirects to the stock screening form.
        let landed_on_screening = response.url().path().contains("/Screening/StockScreening");
        let body = response.text().await.context("login response unreadable")?;
        if !landed_on_screening && !body.contains("MinimumMarketCap") {
            bail!("login did not reach the stock screening page; check credentials");
        }

        info!("logged in to screening site");
        Ok(())
    }

    async fn fetch_screening_page(&self, market_cap: u64) -> Result<String> {
        let url = format!("{}/Screening/StockScreening", self.base_url);
        let cap = market_cap.to_string();
        let form = [("MinimumMarketCap", cap.as_str()), ("Select30", "false")];

        debug!("requesting screening page for market cap {}", market_cap);
        let response = self.client.post(&url).form(&form).send().await?;
        if !response.status().is_success() {
            bail!(
                "screening request for market cap {} failed with status {}",
                market_cap,
                response.status()
            );
        }

        Ok(response.text().await?)
    }

    fn save_page(&self, market_cap: u64, html: &str) {
        let path = self.results_dir.join(screening_file_name(market_cap));
        match fs::write(&path, html) {
            Ok(()) => info!("saved screening page to {}", path.display()),
            Err(e) => warn!("error writing {}: {}", path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SCREENING_FORM: &str =
        r#"<form><input id="MinimumMarketCap" name="MinimumMarketCap"/></form>"#;

    fn test_config(base_url: &str, dir: &std::path::Path) -> Config {
        Config {
            output_dir: dir.to_path_buf(),
            results_dir: dir.join("screening_html"),
            ticker_list_path: dir.join("tickers.csv"),
            screener_base_url: base_url.to_string(),
            screener_credentials: Some(ScreenerCredentials {
                username: "user@example.com".to_string(),
                password: "secret".to_string(),
            }),
            provider_base_url: "http://provider.invalid".to_string(),
            request_timeout_secs: 5,
            rate_limit_per_minute: 6000,
            market_caps: vec![250],
        }
    }

    #[test]
    fn missing_credentials_fail_construction() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config("http://screener.invalid", dir.path());
        config.screener_credentials = None;

        assert!(ScreeningFetcher::new(&config).is_err());
    }

    #[tokio::test]
    async fn fetch_all_saves_page_per_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/Account/LogOn"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SCREENING_FORM))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/Screening/StockScreening"))
            .and(body_string_contains("MinimumMarketCap=250"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<table class=\"screeningdata\"/>"),
            )
            .mount(&server)
            .await;

        let fetcher = ScreeningFetcher::new(&test_config(&server.uri(), dir.path())).unwrap();
        fetcher.fetch_all(&[250]).await.unwrap();

        let saved = dir
            .path()
            .join("screening_html")
            .join(screening_file_name(250));
        assert!(saved.exists());
    }

    #[tokio::test]
    async fn failed_login_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/Account/LogOn"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>Invalid login</p>"))
            .mount(&server)
            .await;

        let fetcher = ScreeningFetcher::new(&test_config(&server.uri(), dir.path())).unwrap();
        assert!(fetcher.fetch_all(&[250]).await.is_err());
    }

    #[tokio::test]
    async fn one_failed_threshold_does_not_abort_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/Account/LogOn"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SCREENING_FORM))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/Screening/StockScreening"))
            .and(body_string_contains("MinimumMarketCap=250"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/Screening/StockScreening"))
            .and(body_string_contains("MinimumMarketCap=500"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<table class=\"screeningdata\"/>"),
            )
            .mount(&server)
            .await;

        let fetcher = ScreeningFetcher::new(&test_config(&server.uri(), dir.path())).unwrap();
        fetcher.fetch_all(&[250, 500]).await.unwrap();

        let results_dir = dir.path().join("screening_html");
        assert!(!results_dir.join(screening_file_name(250)).exists());
        assert!(results_dir.join(screening_file_name(500)).exists());
    }
}
