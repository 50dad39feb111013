use crate::common::{AppError, AppResult};
use crate::conf::ApiConfig;
use crate::model::{AccessToken, AvailabilityReport, TokenResponse};
use reqwest::header::{AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use std::time::{Duration, SystemTime};

/// 请求不设置超时，使用传输层默认行为
pub fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .tcp_keepalive(Duration::from_secs(15))
        .tcp_nodelay(true)
        .build()
        .unwrap_or_else(|_| {
            log::warn!("创建HTTP客户端失败，使用默认配置");
            reqwest::Client::new()
        })
}

pub async fn acquire_token(client: &reqwest::Client, api: &ApiConfig) -> AppResult<AccessToken> {
    let response = client
        .post(&api.token_url)
        .header(USER_AGENT, &api.user_agent)
        .send()
        .await
        .map_err(|e| {
            log::debug!("发送请求失败: {}, url: {}", e, &api.token_url);
            AppError::Network(e)
        })?;

    let token_response: TokenResponse = read_json(response, &api.token_url).await?;
    AccessToken::from_response(token_response, SystemTime::now())
}

pub async fn fetch_availability(
    client: &reqwest::Client,
    api: &ApiConfig,
    token: &str,
) -> AppResult<AvailabilityReport> {
    let url = api.availability_endpoint()?;

    let response = client
        .get(url.clone())
        .header(USER_AGENT, &api.user_agent)
        .header(AUTHORIZATION, format!("Bearer {}", token))
        .send()
        .await
        .map_err(|e| {
            log::debug!("发送请求失败: {}, url: {}", e, url);
            AppError::Network(e)
        })?;

    read_json(response, url.as_str()).await
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response, url: &str) -> AppResult<T> {
    let status = response.status();
    if !status.is_success() {
        log::debug!("请求失败, HTTP状态码: {}, url: {}", status, url);
        return Err(AppError::Status(status));
    }

    let response_text = response.text().await.map_err(|e| {
        log::debug!("读取响应内容失败: {}, url: {}", e, url);
        AppError::Network(e)
    })?;

    serde_json::from_str::<T>(&response_text).map_err(|e| {
        log::debug!("解析响应失败: {}, 原始响应: {}", e, response_text);
        AppError::Decode(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    const AGENT: &str = "test-agent/1.0";

    fn api_for(server: &MockServer) -> ApiConfig {
        ApiConfig {
            token_url: server.url("/get-token/"),
            availability_url: server.url("/availabilities/"),
            skus: vec!["66282".to_string(), "66283".to_string()],
            user_agent: AGENT.to_string(),
        }
    }

    #[tokio::test]
    async fn token_request_is_post_with_user_agent() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/get-token/")
                    .header("user-agent", AGENT);
                then.status(200)
                    .json_body(json!({"access_token": "abc", "expires_in": "3600"}));
            })
            .await;

        let before = SystemTime::now();
        let token = acquire_token(&build_client(), &api_for(&server)).await.unwrap();
        let after = SystemTime::now();

        mock.assert_async().await;
        assert_eq!(token.token, "abc");
        assert!(token.valid_until >= before + Duration::from_secs(3595));
        assert!(token.valid_until <= after + Duration::from_secs(3595));
    }

    #[tokio::test]
    async fn token_with_non_numeric_expiry_fails() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/get-token/");
                then.status(200)
                    .json_body(json!({"access_token": "abc", "expires_in": "soon"}));
            })
            .await;

        let result = acquire_token(&build_client(), &api_for(&server)).await;
        assert!(matches!(result, Err(AppError::Parse { .. })));
    }

    #[tokio::test]
    async fn malformed_token_body_is_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/get-token/");
                then.status(200).body("<html>oops</html>");
            })
            .await;

        let result = acquire_token(&build_client(), &api_for(&server)).await;
        assert!(matches!(result, Err(AppError::Decode(_))));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_network_error() {
        let api = ApiConfig {
            token_url: "http://127.0.0.1:1/get-token/".to_string(),
            availability_url: "http://127.0.0.1:1/availabilities/".to_string(),
            skus: vec!["66282".to_string()],
            user_agent: AGENT.to_string(),
        };
        let client = build_client();

        assert!(matches!(
            acquire_token(&client, &api).await,
            Err(AppError::Network(_))
        ));
        assert!(matches!(
            fetch_availability(&client, &api, "abc").await,
            Err(AppError::Network(_))
        ));
    }

    #[tokio::test]
    async fn availability_request_carries_skus_and_bearer() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/availabilities/")
                    .query_param("sku", "66282")
                    .query_param("sku", "66283")
                    .header("user-agent", AGENT)
                    .header("authorization", "Bearer abc");
                then.status(200).json_body(json!({
                    "calendar-availabilities": [
                        {"date": "2024-06-01", "facilities": [
                            {"facilityName": "DLR_DP", "available": true}
                        ]},
                        {"date": "2024-06-02", "facilities": []}
                    ]
                }));
            })
            .await;

        let report = fetch_availability(&build_client(), &api_for(&server), "abc")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(report.len(), 2);
        assert_eq!(report.date_range(), Some(("2024-06-01", "2024-06-02")));
        assert!(report.availabilities[0].facilities[0].available);
    }

    #[tokio::test]
    async fn unexpected_availability_shape_is_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/availabilities/");
                then.status(200).json_body(json!({"availabilities": []}));
            })
            .await;

        let result = fetch_availability(&build_client(), &api_for(&server), "abc").await;
        assert!(matches!(result, Err(AppError::Decode(_))));
    }

    #[tokio::test]
    async fn rejected_request_is_status_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/availabilities/");
                then.status(401).body("{}");
            })
            .await;

        let result = fetch_availability(&build_client(), &api_for(&server), "stale").await;
        match result {
            Err(AppError::Status(status)) => assert_eq!(status.as_u16(), 401),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
