use crate::api;
use crate::conf::{ApiConfig, Settings};
use crate::model::AccessToken;
use crate::service::storage;
use std::path::PathBuf;
use std::time::Duration;

pub const POLL_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// 单次轮询的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// 获取 token 失败，立即重试
    TokenFailed,
    /// 查询失败，输出文件保持不变
    FetchFailed,
    Fetched {
        days: usize,
        saved: bool,
        range: Option<(String, String)>,
    },
}

pub struct Poller {
    client: reqwest::Client,
    api: ApiConfig,
    output_file: PathBuf,
    token: Option<AccessToken>,
}

impl Poller {
    pub fn new(settings: &Settings) -> Self {
        Self {
            client: api::build_client(),
            api: settings.api.clone(),
            output_file: settings.storage.output_file.clone(),
            token: None,
        }
    }

    /// 持续轮询，不会返回
    pub async fn run(&mut self) {
        tracing::info!("Daemon started, checking availability every hour...");

        loop {
            let outcome = self.run_cycle().await;
            if let Some(pause) = pause_after(&outcome) {
                tracing::info!("Sleeping for 1 hour...");
                tokio::time::sleep(pause).await;
            }
        }
    }

    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let token = match self.valid_token().await {
            Some(token) => token,
            None => return CycleOutcome::TokenFailed,
        };

        let report = match api::fetch_availability(&self.client, &self.api, &token).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("Failed to query availability: {}", e);
                return CycleOutcome::FetchFailed;
            }
        };

        let saved = match storage::save(&self.output_file, &report).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    "Failed to save availability to {}: {}",
                    self.output_file.display(),
                    e
                );
                false
            }
        };

        if report.is_empty() {
            tracing::debug!("Availability report is empty");
        }
        let range = report.date_range().map(|(first, last)| {
            tracing::info!("Availability from {} to {}", first, last);
            (first.to_string(), last.to_string())
        });

        CycleOutcome::Fetched {
            days: report.len(),
            saved,
            range,
        }
    }

    async fn valid_token(&mut self) -> Option<String> {
        if let Some(token) = self.token.as_ref().filter(|t| !t.is_expired()) {
            return Some(token.token.clone());
        }

        tracing::info!("Requesting new token...");
        self.token = None;
        match api::acquire_token(&self.client, &self.api).await {
            Ok(token) => {
                tracing::debug!("Token valid until {:?}", token.valid_until);
                let value = token.token.clone();
                self.token = Some(token);
                Some(value)
            }
            Err(e) => {
                tracing::error!("Failed to get access token: {}", e);
                None
            }
        }
    }
}

/// token 失败时立即重试，其余情况等待下一个周期
pub fn pause_after(outcome: &CycleOutcome) -> Option<Duration> {
    match outcome {
        CycleOutcome::TokenFailed => None,
        CycleOutcome::FetchFailed | CycleOutcome::Fetched { .. } => Some(POLL_INTERVAL),
    }
}
