use crate::error::NotifyError;
use crate::notify::EmailSender;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

const PROVIDER: &str = "resend";
const SEND_URL: &str = "https://api.resend.com/emails";

#[derive(Debug, Clone)]
pub struct ResendEmailSender {
    http: reqwest::Client,
    api_key: String,
    from: String,
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: Option<String>,
}

impl ResendEmailSender {
    pub fn new(http: reqwest::Client, api_key: String, from: String) -> Self {
        Self { http, api_key, from }
    }

    fn headers(&self) -> Result<HeaderMap, NotifyError> {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|_| NotifyError::InvalidHeader { provider: PROVIDER })?;
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }
}

#[async_trait::async_trait]
impl EmailSender for ResendEmailSender {
    async fn send_email(&self, to: &str, subject: &str, html: &str) -> Result<(), NotifyError> {
        let req = SendEmailRequest {
            from: &self.from,
            to: [to],
            subject,
            html,
        };

        let res = self
            .http
            .post(SEND_URL)
            .headers(self.headers()?)
            .json(&req)
            .send()
            .await
            .map_err(|source| NotifyError::Request {
                provider: PROVIDER,
                source,
            })?;

        let status = res.status();
        let text = res.text().await.map_err(|source| NotifyError::Request {
            provider: PROVIDER,
            source,
        })?;

        let id = parse_send_response(status, text)?;
        tracing::info!(email_id = id.as_deref().unwrap_or("unknown"), "email sent via Resend");
        Ok(())
    }
}

/// Returns the email id Resend assigned, if the body carried one.
fn parse_send_response(status: StatusCode, text: String) -> Result<Option<String>, NotifyError> {
    if !status.is_success() {
        return Err(NotifyError::Status {
            provider: PROVIDER,
            status,
            body: text,
        });
    }
    Ok(serde_json::from_str::<SendEmailResponse>(&text)
        .ok()
        .and_then(|r| r.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_body_matches_resend_schema() {
        let req = SendEmailRequest {
            from: "Tracker <t@example.com>",
            to: ["me@example.com"],
            subject: "s",
            html: "<p>h</p>",
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "from": "Tracker <t@example.com>",
                "to": ["me@example.com"],
                "subject": "s",
                "html": "<p>h</p>",
            })
        );
    }

    #[test]
    fn bearer_header_is_built_from_key() {
        let sender = ResendEmailSender::new(
            reqwest::Client::new(),
            "re_123".to_string(),
            "t@example.com".to_string(),
        );
        let headers = sender.headers().unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer re_123");

        let bad = ResendEmailSender::new(
            reqwest::Client::new(),
            "re\n123".to_string(),
            "t@example.com".to_string(),
        );
        assert!(matches!(bad.headers(), Err(NotifyError::InvalidHeader { .. })));
    }

    #[test]
    fn non_success_status_is_an_error_with_body() {
        let body = r#"{"statusCode":403,"message":"You can only send testing emails to your own email address"}"#;
        match parse_send_response(StatusCode::FORBIDDEN, body.to_string()) {
            Err(NotifyError::Status { provider, status, body: got }) => {
                assert_eq!(provider, "resend");
                assert_eq!(status, StatusCode::FORBIDDEN);
                assert_eq!(got, body);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn success_returns_email_id_when_present() {
        let id = parse_send_response(StatusCode::OK, r#"{"id":"49a3999c"}"#.to_string()).unwrap();
        assert_eq!(id.as_deref(), Some("49a3999c"));

        let id = parse_send_response(StatusCode::OK, String::new()).unwrap();
        assert_eq!(id, None);
    }
}
