use crate::common::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};

// token 提前失效的秒数
const EXPIRY_MARGIN_SECS: i64 = 5;

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub valid_until: SystemTime,
}

impl AccessToken {
    pub fn from_response(response: TokenResponse, issued_at: SystemTime) -> AppResult<Self> {
        let expires_in: i64 = response.expires_in.parse().map_err(|source| AppError::Parse {
            value: response.expires_in.clone(),
            source,
        })?;

        let lifetime = expires_in.saturating_sub(EXPIRY_MARGIN_SECS);
        let offset = Duration::from_secs(lifetime.unsigned_abs());
        let shifted = if lifetime >= 0 {
            issued_at.checked_add(offset)
        } else {
            issued_at.checked_sub(offset)
        };
        // 超出时间范围的值按已过期处理
        let valid_until = shifted.unwrap_or(issued_at);

        Ok(Self {
            token: response.access_token,
            valid_until,
        })
    }

    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        now > self.valid_until
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(SystemTime::now())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityReport {
    #[serde(rename = "calendar-availabilities")]
    pub availabilities: Vec<SingleDay>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleDay {
    pub date: String,
    pub facilities: Vec<Facility>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    #[serde(rename = "facilityName")]
    pub facility_name: String,
    pub available: bool,
}

impl AvailabilityReport {
    /// 按上游返回顺序取第一天和最后一天
    pub fn date_range(&self) -> Option<(&str, &str)> {
        let first = self.availabilities.first()?;
        let last = self.availabilities.last()?;
        Some((first.date.as_str(), last.date.as_str()))
    }

    pub fn len(&self) -> usize {
        self.availabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.availabilities.is_empty()
    }
}
