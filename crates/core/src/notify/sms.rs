use crate::error::NotifyError;
use crate::notify::SmsSender;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

const TEXTBELT: &str = "textbelt";
const FAST2SMS: &str = "fast2sms";
const TEXTBELT_URL: &str = "https://textbelt.com/text";
const FAST2SMS_URL: &str = "https://www.fast2sms.com/dev/bulkV2";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmsGateway {
    Textbelt,
    Fast2Sms,
}

/// Fast2SMS only delivers to Indian numbers, and only when a key is configured.
pub fn choose_gateway(phone: &str, fast2sms_key: Option<&str>) -> SmsGateway {
    if is_indian_number(phone) && fast2sms_key.is_some() {
        SmsGateway::Fast2Sms
    } else {
        SmsGateway::Textbelt
    }
}

pub fn is_indian_number(phone: &str) -> bool {
    let p = phone.trim();
    p.starts_with("+91") || p.starts_with("91")
}

fn strip_india_prefix(phone: &str) -> &str {
    let p = phone.trim();
    p.strip_prefix("+91")
        .or_else(|| p.strip_prefix("91"))
        .unwrap_or(p)
}

#[derive(Debug, Clone)]
pub struct TextbeltSmsSender {
    http: reqwest::Client,
    key: String,
}

#[derive(Debug, Deserialize)]
struct TextbeltResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default, rename = "textId")]
    text_id: Option<serde_json::Value>,
}

impl TextbeltSmsSender {
    pub fn new(http: reqwest::Client, key: String) -> Self {
        Self { http, key }
    }
}

#[async_trait::async_trait]
impl SmsSender for TextbeltSmsSender {
    fn gateway(&self) -> SmsGateway {
        SmsGateway::Textbelt
    }

    async fn send_sms(&self, to: &str, body: &str) -> Result<(), NotifyError> {
        let form = [("phone", to), ("message", body), ("key", self.key.as_str())];
        let res = self
            .http
            .post(TEXTBELT_URL)
            .form(&form)
            .send()
            .await
            .map_err(|source| NotifyError::Request {
                provider: TEXTBELT,
                source,
            })?;

        let status = res.status();
        let text = res.text().await.map_err(|source| NotifyError::Request {
            provider: TEXTBELT,
            source,
        })?;

        let parsed = serde_json::from_str::<TextbeltResponse>(&text).map_err(|_| {
            NotifyError::Status {
                provider: TEXTBELT,
                status,
                body: text.clone(),
            }
        })?;
        check_textbelt(parsed)
    }
}

fn check_textbelt(res: TextbeltResponse) -> Result<(), NotifyError> {
    if res.success {
        tracing::info!(text_id = ?res.text_id, "SMS sent via Textbelt");
        return Ok(());
    }
    let detail = res.error.unwrap_or_else(|| "unknown error".to_string());
    if detail.to_ascii_lowercase().contains("country") {
        tracing::warn!("Textbelt refused the destination country; set FAST2SMS_API_KEY for Indian numbers");
    }
    Err(NotifyError::Rejected {
        provider: TEXTBELT,
        detail,
    })
}

#[derive(Debug, Clone)]
pub struct Fast2SmsSender {
    http: reqwest::Client,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct Fast2SmsRequest<'a> {
    route: &'static str,
    message: &'a str,
    language: &'static str,
    flash: u8,
    numbers: &'a str,
}

#[derive(Debug, Deserialize)]
struct Fast2SmsResponse {
    #[serde(default, rename = "return")]
    ok: bool,
    #[serde(default)]
    message: Option<serde_json::Value>,
}

impl Fast2SmsSender {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self { http, api_key }
    }

    fn headers(&self) -> Result<HeaderMap, NotifyError> {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&self.api_key)
            .map_err(|_| NotifyError::InvalidHeader { provider: FAST2SMS })?;
        headers.insert("authorization", value);
        Ok(headers)
    }
}

#[async_trait::async_trait]
impl SmsSender for Fast2SmsSender {
    fn gateway(&self) -> SmsGateway {
        SmsGateway::Fast2Sms
    }

    async fn send_sms(&self, to: &str, body: &str) -> Result<(), NotifyError> {
        let req = Fast2SmsRequest {
            route: "q",
            message: body,
            language: "english",
            flash: 0,
            numbers: strip_india_prefix(to),
        };

        let res = self
            .http
            .post(FAST2SMS_URL)
            .headers(self.headers()?)
            .json(&req)
            .send()
            .await
            .map_err(|source| NotifyError::Request {
                provider: FAST2SMS,
                source,
            })?;

        let status = res.status();
        let text = res.text().await.map_err(|source| NotifyError::Request {
            provider: FAST2SMS,
            source,
        })?;

        parse_fast2sms(status, &text)
    }
}

fn parse_fast2sms(status: reqwest::StatusCode, text: &str) -> Result<(), NotifyError> {
    let parsed = serde_json::from_str::<Fast2SmsResponse>(text).map_err(|_| NotifyError::Status {
        provider: FAST2SMS,
        status,
        body: text.to_string(),
    })?;
    check_fast2sms(parsed)
}

fn check_fast2sms(res: Fast2SmsResponse) -> Result<(), NotifyError> {
    if res.ok {
        tracing::info!("SMS sent via Fast2SMS");
        return Ok(());
    }
    // `message` is a list of strings on errors, a plain string on some older routes.
    let detail = match res.message {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
            .collect::<Vec<_>>()
            .join("; "),
        Some(other) => other.to_string(),
        None => "unknown error".to_string(),
    };
    Err(NotifyError::Rejected {
        provider: FAST2SMS,
        detail,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn routes_indian_numbers_to_fast2sms_only_with_key() {
        assert_eq!(choose_gateway("+919876543210", Some("k")), SmsGateway::Fast2Sms);
        assert_eq!(choose_gateway("919876543210", Some("k")), SmsGateway::Fast2Sms);
        assert_eq!(choose_gateway("+919876543210", None), SmsGateway::Textbelt);
        assert_eq!(choose_gateway("+15551234567", Some("k")), SmsGateway::Textbelt);
    }

    #[test]
    fn strips_country_prefix_for_fast2sms() {
        assert_eq!(strip_india_prefix("+919876543210"), "9876543210");
        assert_eq!(strip_india_prefix("919876543210"), "9876543210");
        assert_eq!(strip_india_prefix("9876543210"), "9876543210");
    }

    #[test]
    fn textbelt_failure_carries_provider_error() {
        let res: TextbeltResponse =
            serde_json::from_value(json!({"success": false, "error": "Out of quota"})).unwrap();
        match check_textbelt(res) {
            Err(NotifyError::Rejected { provider, detail }) => {
                assert_eq!(provider, "textbelt");
                assert_eq!(detail, "Out of quota");
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let ok: TextbeltResponse =
            serde_json::from_value(json!({"success": true, "textId": "123"})).unwrap();
        assert!(check_textbelt(ok).is_ok());
    }

    #[test]
    fn fast2sms_request_shape() {
        let req = Fast2SmsRequest {
            route: "q",
            message: "hi",
            language: "english",
            flash: 0,
            numbers: strip_india_prefix("+919876543210"),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"route": "q", "message": "hi", "language": "english", "flash": 0, "numbers": "9876543210"})
        );
    }

    #[test]
    fn fast2sms_rejection_carries_message_text() {
        let res: Fast2SmsResponse = serde_json::from_value(
            json!({"return": false, "status_code": 412, "message": ["Invalid Authentication"]}),
        )
        .unwrap();
        match check_fast2sms(res) {
            Err(NotifyError::Rejected { provider, detail }) => {
                assert_eq!(provider, "fast2sms");
                assert_eq!(detail, "Invalid Authentication");
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let res: Fast2SmsResponse =
            serde_json::from_value(json!({"return": false, "message": "Invalid Numbers"})).unwrap();
        assert!(matches!(
            check_fast2sms(res),
            Err(NotifyError::Rejected { detail, .. }) if detail == "Invalid Numbers"
        ));

        let ok: Fast2SmsResponse =
            serde_json::from_value(json!({"return": true, "request_id": "abc"})).unwrap();
        assert!(check_fast2sms(ok).is_ok());
    }

    #[test]
    fn fast2sms_non_json_reply_is_a_status_error() {
        let err = parse_fast2sms(reqwest::StatusCode::BAD_GATEWAY, "<html>bad gateway</html>")
            .unwrap_err();
        match err {
            NotifyError::Status { provider, status, body } => {
                assert_eq!(provider, "fast2sms");
                assert_eq!(status, reqwest::StatusCode::BAD_GATEWAY);
                assert_eq!(body, "<html>bad gateway</html>");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(parse_fast2sms(reqwest::StatusCode::OK, r#"{"return": true}"#).is_ok());
    }
}
