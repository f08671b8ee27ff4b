pub mod render;
pub mod resend;
pub mod sms;

use crate::config::Settings;
use crate::domain::{AlertEvent, PriceQuote};
use crate::error::NotifyError;
use anyhow::Context;
use std::sync::Arc;

pub use render::{render_alert, RenderedAlert};
pub use resend::ResendEmailSender;
pub use sms::{choose_gateway, Fast2SmsSender, SmsGateway, TextbeltSmsSender};

#[async_trait::async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_email(&self, to: &str, subject: &str, html: &str) -> Result<(), NotifyError>;
}

#[async_trait::async_trait]
pub trait SmsSender: Send + Sync {
    fn gateway(&self) -> SmsGateway;

    async fn send_sms(&self, to: &str, body: &str) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelStatus {
    Delivered,
    Failed(String),
    NotConfigured,
}

impl ChannelStatus {
    pub fn delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub email: ChannelStatus,
    pub sms: ChannelStatus,
}

impl DispatchOutcome {
    /// A threshold counts as notified when at least one channel got through.
    pub fn any_delivered(&self) -> bool {
        self.email.delivered() || self.sms.delivered()
    }
}

#[derive(Clone)]
struct EmailChannel {
    sender: Arc<dyn EmailSender>,
    to: String,
}

#[derive(Clone)]
struct SmsChannel {
    sender: Arc<dyn SmsSender>,
    to: String,
}

/// Fans an alert out to every configured channel.
#[derive(Clone, Default)]
pub struct Notifier {
    email: Option<EmailChannel>,
    sms: Option<SmsChannel>,
}

impl Notifier {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.http_timeout())
            .build()
            .context("failed to build notifier http client")?;

        let mut notifier = Self::default();

        if let (Some(api_key), Some(to)) = (&settings.resend_api_key, &settings.email_to) {
            let sender =
                ResendEmailSender::new(http.clone(), api_key.clone(), settings.email_from.clone());
            notifier = notifier.with_email(Arc::new(sender), to.clone());
        }

        if let Some(phone) = &settings.phone_number {
            let fast2sms_key = settings.fast2sms_api_key.as_deref();
            let sender: Arc<dyn SmsSender> = match (choose_gateway(phone, fast2sms_key), fast2sms_key) {
                (SmsGateway::Fast2Sms, Some(key)) => {
                    Arc::new(Fast2SmsSender::new(http, key.to_string()))
                }
                _ => {
                    if sms::is_indian_number(phone) {
                        tracing::warn!("Indian phone number without FAST2SMS_API_KEY; using Textbelt");
                    }
                    Arc::new(TextbeltSmsSender::new(http, settings.textbelt_key.clone()))
                }
            };
            notifier = notifier.with_sms(sender, phone.clone());
        }

        Ok(notifier)
    }

    pub fn with_email(mut self, sender: Arc<dyn EmailSender>, to: String) -> Self {
        self.email = Some(EmailChannel { sender, to });
        self
    }

    pub fn with_sms(mut self, sender: Arc<dyn SmsSender>, to: String) -> Self {
        self.sms = Some(SmsChannel { sender, to });
        self
    }

    pub fn email_configured(&self) -> bool {
        self.email.is_some()
    }

    pub fn sms_gateway(&self) -> Option<SmsGateway> {
        self.sms.as_ref().map(|c| c.sender.gateway())
    }

    pub async fn dispatch(&self, event: &AlertEvent, quote: &PriceQuote) -> DispatchOutcome {
        let rendered = render_alert(event, quote);

        let email = match &self.email {
            Some(ch) => match ch.sender.send_email(&ch.to, &rendered.subject, &rendered.html).await {
                Ok(()) => ChannelStatus::Delivered,
                Err(err) => {
                    tracing::error!(
                        metal = %event.metal,
                        threshold = event.threshold.percent(),
                        error = %err,
                        "email notification failed"
                    );
                    ChannelStatus::Failed(err.to_string())
                }
            },
            None => ChannelStatus::NotConfigured,
        };

        let sms = match &self.sms {
            Some(ch) => match ch.sender.send_sms(&ch.to, &rendered.sms).await {
                Ok(()) => ChannelStatus::Delivered,
                Err(err) => {
                    tracing::error!(
                        metal = %event.metal,
                        threshold = event.threshold.percent(),
                        error = %err,
                        "SMS notification failed"
                    );
                    ChannelStatus::Failed(err.to_string())
                }
            },
            None => ChannelStatus::NotConfigured,
        };

        DispatchOutcome { email, sms }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records every message and fails on demand.
    #[derive(Default)]
    pub struct RecordingSender {
        pub fail: Mutex<bool>,
        pub sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingSender {
        pub fn failing() -> Self {
            Self {
                fail: Mutex::new(true),
                sent: Mutex::new(Vec::new()),
            }
        }

        pub fn set_failing(&self, fail: bool) {
            *self.fail.lock().unwrap() = fail;
        }

        pub fn sent_count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }

        fn record(&self, provider: &'static str, to: &str, body: &str) -> Result<(), NotifyError> {
            if *self.fail.lock().unwrap() {
                return Err(NotifyError::Rejected {
                    provider,
                    detail: "simulated failure".to_string(),
                });
            }
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), body.to_string()));
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl EmailSender for RecordingSender {
        async fn send_email(&self, to: &str, subject: &str, _html: &str) -> Result<(), NotifyError> {
            self.record("fake_email", to, subject)
        }
    }

    #[async_trait::async_trait]
    impl SmsSender for RecordingSender {
        fn gateway(&self) -> SmsGateway {
            SmsGateway::Textbelt
        }

        async fn send_sms(&self, to: &str, body: &str) -> Result<(), NotifyError> {
            self.record("fake_sms", to, body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingSender;
    use super::*;
    use crate::domain::{Metal, Threshold};
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn event() -> (AlertEvent, PriceQuote) {
        let quote = PriceQuote::new(
            Metal::Silver,
            Decimal::from(140),
            Utc.with_ymd_and_hms(2026, 1, 27, 10, 0, 0).unwrap(),
        );
        let event = AlertEvent {
            metal: Metal::Silver,
            threshold: Threshold::TwentyPercent,
            drop_pct: Decimal::new(2222, 2),
            current_price: Decimal::from(140),
            baseline_price: Decimal::from(180),
        };
        (event, quote)
    }

    #[tokio::test]
    async fn one_failing_channel_does_not_block_the_other() {
        let email = Arc::new(RecordingSender::failing());
        let sms = Arc::new(RecordingSender::default());
        let notifier = Notifier::default()
            .with_email(email.clone(), "me@example.com".to_string())
            .with_sms(sms.clone(), "+15551234567".to_string());

        let (event, quote) = event();
        let outcome = notifier.dispatch(&event, &quote).await;

        assert!(matches!(outcome.email, ChannelStatus::Failed(_)));
        assert_eq!(outcome.sms, ChannelStatus::Delivered);
        assert!(outcome.any_delivered());
        assert_eq!(sms.sent_count(), 1);
        assert!(sms.sent.lock().unwrap()[0].1.contains("SILVER PRICE ALERT"));
    }

    #[tokio::test]
    async fn nothing_configured_delivers_nothing() {
        let (event, quote) = event();
        let outcome = Notifier::default().dispatch(&event, &quote).await;
        assert_eq!(outcome.email, ChannelStatus::NotConfigured);
        assert_eq!(outcome.sms, ChannelStatus::NotConfigured);
        assert!(!outcome.any_delivered());
    }

    #[test]
    fn from_settings_wires_configured_channels() {
        let settings = Settings::from_lookup(|key| match key {
            "RESEND_API_KEY" => Some("re_123".to_string()),
            "EMAIL_TO" => Some("me@example.com".to_string()),
            "PHONE_NUMBER" => Some("+919876543210".to_string()),
            "FAST2SMS_API_KEY" => Some("f2s".to_string()),
            _ => None,
        })
        .unwrap();

        let notifier = Notifier::from_settings(&settings).unwrap();
        assert!(notifier.email_configured());
        assert_eq!(notifier.sms_gateway(), Some(SmsGateway::Fast2Sms));

        let bare = Notifier::from_settings(&Settings::from_lookup(|_| None).unwrap()).unwrap();
        assert!(!bare.email_configured());
        assert_eq!(bare.sms_gateway(), None);
    }
}
