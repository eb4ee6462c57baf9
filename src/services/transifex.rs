use rand::{thread_rng, Rng};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};

use std::{thread, time::Duration};

use crate::error::{ConfigError, RemoteError};
use crate::model::config::SyncConfig;
use crate::model::translation::TranslationSet;
use crate::services::rate_limit::RateLimiter;

const MAX_RETRIES: usize = 3;
const BASE_DELAY_MS: u64 = 800;
const DEFAULT_WINDOW: Duration = Duration::from_secs(3600);
const DEFAULT_MAX_REQUESTS: u32 = 6000;

/// Anything that can download every translation of a resource.
pub trait TranslationSource {
    fn fetch_translations(&mut self, slug: &str) -> Result<TranslationSet, RemoteError>;
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Blocking Transifex API v2 client. Every HTTP request, retries included,
/// takes a token from the rate limiter first.
pub struct TransifexClient {
    http: Client,
    api_base: String,
    project: String,
    credentials: Credentials,
    source_language: String,
    limiter: RateLimiter,
    languages: Option<Vec<String>>,
}

fn backoff(attempt: usize) -> Duration {
    let jitter: u64 = thread_rng().gen_range(0..200);
    let ms = BASE_DELAY_MS * (2_u64.pow(attempt as u32)) + jitter;
    Duration::from_millis(ms)
}

impl TransifexClient {
    pub fn new(
        project: &str,
        credentials: Credentials,
        source_language: &str,
        api_base: &str,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Client(e.to_string()))?;

        let limiter = RateLimiter::new(DEFAULT_WINDOW, DEFAULT_MAX_REQUESTS)
            .map_err(|e| RemoteError::Client(e.to_string()))?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            project: project.to_string(),
            credentials,
            source_language: source_language.to_string(),
            limiter,
            languages: None,
        })
    }

    pub fn from_config(cfg: &SyncConfig) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let mut client = Self::new(
            &cfg.transifex.project,
            Credentials {
                username: cfg.transifex.username.clone(),
                password: cfg.transifex.password.clone(),
            },
            &cfg.source_language,
            &cfg.transifex.api_base,
            Duration::from_secs(cfg.request_timeout_secs),
        )?;
        client.configure_rate_limit(
            Duration::from_secs(cfg.rate_limit.window_secs),
            cfg.rate_limit.max_requests,
        )?;
        Ok(client)
    }

    pub fn configure_rate_limit(
        &mut self,
        window: Duration,
        max_requests: u32,
    ) -> Result<(), ConfigError> {
        self.limiter = RateLimiter::new(window, max_requests)?;
        Ok(())
    }

    fn project_url(&self) -> String {
        format!("{}/project/{}", self.api_base, self.project)
    }

    /// Target languages of the project, fetched once per client.
    fn project_languages(&mut self) -> Result<Vec<String>, RemoteError> {
        if let Some(langs) = &self.languages {
            return Ok(langs.clone());
        }

        let url = format!("{}/languages/", self.project_url());
        let json = self.get_json(&url)?;

        let langs: Vec<String> = json
            .as_array()
            .ok_or_else(|| RemoteError::InvalidResponse {
                url: url.clone(),
                message: "expected a list of languages".into(),
            })?
            .iter()
            .filter_map(|l| l.get("language_code").and_then(|c| c.as_str()))
            .map(str::to_string)
            .collect();

        debug!(count = langs.len(), "project languages loaded");
        self.languages = Some(langs.clone());
        Ok(langs)
    }

    fn download_content(&mut self, url: &str) -> Result<String, RemoteError> {
        let json = self.get_json(url)?;
        json.get("content")
            .and_then(|c| c.as_str())
            .map(str::to_string)
            .ok_or_else(|| RemoteError::InvalidResponse {
                url: url.to_string(),
                message: "missing `content`".into(),
            })
    }

    fn get_json(&mut self, url: &str) -> Result<Value, RemoteError> {
        let mut last_err: Option<RemoteError> = None;

        for attempt in 0..MAX_RETRIES {
            self.limiter.acquire();

            let res = self
                .http
                .get(url)
                .basic_auth(&self.credentials.username, Some(&self.credentials.password))
                .send();

            let resp = match res {
                Ok(resp) => resp,
                Err(err) => {
                    last_err = Some(RemoteError::Transport {
                        url: url.to_string(),
                        message: err.to_string(),
                    });
                    if attempt + 1 < MAX_RETRIES {
                        thread::sleep(backoff(attempt));
                    }
                    continue;
                }
            };

            let status = resp.status();

            // Read as text first so error bodies survive a failed JSON decode.
            let text = match resp.text() {
                Ok(t) => t,
                Err(err) => {
                    last_err = Some(RemoteError::Transport {
                        url: url.to_string(),
                        message: err.to_string(),
                    });
                    if attempt + 1 < MAX_RETRIES {
                        thread::sleep(backoff(attempt));
                    }
                    continue;
                }
            };

            if !status.is_success() {
                let err = RemoteError::Status(extract_error_message(status, &text));
                if should_retry_http(status) && attempt + 1 < MAX_RETRIES {
                    warn!(url, status = status.as_u16(), attempt, "transient http error, retrying");
                    last_err = Some(err);
                    thread::sleep(backoff(attempt));
                    continue;
                }
                return Err(err);
            }

            return serde_json::from_str(&text).map_err(|e| RemoteError::InvalidResponse {
                url: url.to_string(),
                message: e.to_string(),
            });
        }

        Err(last_err.unwrap_or_else(|| RemoteError::Transport {
            url: url.to_string(),
            message: "no attempt made".into(),
        }))
    }
}

impl TranslationSource for TransifexClient {
    fn fetch_translations(&mut self, slug: &str) -> Result<TranslationSet, RemoteError> {
        let languages = self.project_languages()?;
        let resource_url = format!("{}/resource/{}", self.project_url(), slug);

        let mut set = TranslationSet::new();

        let source = self.download_content(&format!("{resource_url}/content/"))?;
        set.insert(self.source_language.clone(), source);

        for lang in languages {
            if lang == self.source_language {
                continue;
            }
            let text = self.download_content(&format!("{resource_url}/translation/{lang}/"))?;
            set.insert(lang, text);
        }

        Ok(set)
    }
}

fn should_retry_http(status: StatusCode) -> bool {
    // 408/429/5xx are usually temporary
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

fn extract_error_message(status: StatusCode, body_text: &str) -> String {
    // { "error": { "message": "..." } } or { "message": "..." } or { "detail": "..." }
    if let Ok(v) = serde_json::from_str::<Value>(body_text) {
        let msg = v
            .get("error")
            .and_then(|e| e.get("message"))
            .or_else(|| v.get("message"))
            .or_else(|| v.get("detail"))
            .and_then(|m| m.as_str());
        if let Some(msg) = msg {
            return format!("HTTP {}: {}", status.as_u16(), msg);
        }
    }

    let trimmed = body_text.trim();
    let snippet = if trimmed.chars().count() > 400 {
        format!("{}...", trimmed.chars().take(400).collect::<String>())
    } else {
        trimmed.to_string()
    };

    format!("HTTP {}: {}", status.as_u16(), snippet)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retries_only_transient_statuses() {
        assert!(should_retry_http(StatusCode::TOO_MANY_REQUESTS));
        assert!(should_retry_http(StatusCode::BAD_GATEWAY));
        assert!(!should_retry_http(StatusCode::NOT_FOUND));
        assert!(!should_retry_http(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn error_message_prefers_json_detail() {
        assert_eq!(
            extract_error_message(StatusCode::NOT_FOUND, r#"{"detail": "Not found"}"#),
            "HTTP 404: Not found"
        );
        assert_eq!(
            extract_error_message(StatusCode::UNAUTHORIZED, "Authorization Required\n"),
            "HTTP 401: Authorization Required"
        );
    }

    #[test]
    fn long_bodies_are_truncated_on_char_boundaries() {
        let body = "錯".repeat(500);
        let msg = extract_error_message(StatusCode::BAD_GATEWAY, &body);
        assert!(msg.ends_with("..."));
        assert_eq!(msg.chars().filter(|c| *c == '錯').count(), 400);
    }
}
