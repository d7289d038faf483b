//! Best-effort order emails over an authenticated SMTP relay.
//!
//! Every send is a single attempt. Failures are logged and reported as `false`; they never
//! reach the request that triggered them.

use anyhow::Result;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use uuid::Uuid;

use crate::{config::MailConfig, order_status::OrderStatus};

#[derive(Clone)]
pub struct Mailer {
    relay: Option<Relay>,
}

#[derive(Clone)]
struct Relay {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl Mailer {
    /// Build a mailer from config. Missing credentials or a bad relay setup yield a disabled mailer.
    pub fn from_config(config: &MailConfig) -> Self {
        if !config.is_configured() {
            tracing::info!("mail relay not configured, order emails disabled");
            return Self::disabled();
        }
        match build_relay(config) {
            Ok(relay) => Self { relay: Some(relay) },
            Err(err) => {
                tracing::warn!(error = %err, "invalid mail relay settings, order emails disabled");
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self {
        Self { relay: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.relay.is_some()
    }

    pub async fn send(&self, to: &str, subject: &str, body: &str) -> bool {
        let Some(relay) = &self.relay else {
            tracing::debug!(to = %to, subject = %subject, "mail disabled, skipping send");
            return false;
        };
        match relay.deliver(to, subject, body).await {
            Ok(()) => {
                tracing::info!(to = %to, subject = %subject, "email sent");
                true
            }
            Err(err) => {
                tracing::warn!(to = %to, subject = %subject, error = %err, "email send failed");
                false
            }
        }
    }

    /// Fire-and-forget variant of [`Mailer::send`].
    pub fn dispatch(&self, to: String, subject: String, body: String) {
        if !self.is_enabled() {
            tracing::debug!(to = %to, subject = %subject, "mail disabled, skipping send");
            return;
        }
        let mailer = self.clone();
        tokio::spawn(async move {
            mailer.send(&to, &subject, &body).await;
        });
    }

    pub fn order_placed(&self, to: &str, order_id: Uuid) {
        let (subject, body) = order_placed_message(order_id);
        self.dispatch(to.to_string(), subject, body);
    }

    pub fn status_changed(&self, to: &str, order_id: Uuid, status: OrderStatus) {
        let (subject, body) = status_changed_message(order_id, status);
        self.dispatch(to.to_string(), subject, body);
    }
}

impl Relay {
    async fn deliver(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let to: Mailbox = to.parse()?;
        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;
        self.transport.send(email).await?;
        Ok(())
    }
}

fn build_relay(config: &MailConfig) -> Result<Relay> {
    let (Some(username), Some(password)) = (&config.username, &config.password) else {
        anyhow::bail!("mail credentials missing");
    };
    let from = config
        .sender()
        .ok_or_else(|| anyhow::anyhow!("sender address not configured"))?
        .parse::<Mailbox>()?;

    let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.server)?
        .port(config.port)
        .credentials(Credentials::new(username.clone(), password.clone()))
        .build();

    Ok(Relay { transport, from })
}

pub fn order_placed_message(order_id: Uuid) -> (String, String) {
    (
        "Order Confirmation".to_string(),
        format!("Your order #{order_id} has been placed successfully!"),
    )
}

pub fn status_changed_message(order_id: Uuid, status: OrderStatus) -> (String, String) {
    (
        format!("Order #{order_id} Status Update"),
        format!("Your order status has been updated to: {status}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_mailer_reports_failure() {
        let mailer = Mailer::from_config(&MailConfig::default());
        assert!(!mailer.is_enabled());
        assert!(!mailer.send("someone@example.com", "hi", "body").await);
    }

    #[test]
    fn password_alone_is_not_enough() {
        let config = MailConfig {
            server: "smtp.example.com".into(),
            port: 587,
            username: None,
            password: Some("secret".into()),
            from: None,
        };
        assert!(!Mailer::from_config(&config).is_enabled());
    }

    #[test]
    fn messages_carry_order_and_status() {
        let id = Uuid::new_v4();
        let (subject, body) = order_placed_message(id);
        assert_eq!(subject, "Order Confirmation");
        assert!(body.contains(&id.to_string()));

        let (subject, body) = status_changed_message(id, OrderStatus::Dispatched);
        assert_eq!(subject, format!("Order #{id} Status Update"));
        assert_eq!(body, "Your order status has been updated to: dispatched");
    }
}
