use crate::error::{Error, Result};
use crate::models::application::ProposedSlot;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub html_body: String,
}

/// Port for the outbound email collaborator. Delivery retries are the
/// collaborator's own policy; an error here means retries are exhausted.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()>;
}

/// Email-gateway client: posts the message as JSON to a relay endpoint that
/// owns SMTP delivery.
pub struct HttpEmailGateway {
    client: Client,
    gateway_url: String,
    token: String,
}

impl HttpEmailGateway {
    pub fn new(gateway_url: String, token: String, client: Client) -> Self {
        Self {
            client,
            gateway_url,
            token,
        }
    }
}

#[async_trait]
impl EmailSender for HttpEmailGateway {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()> {
        let res = self
            .client
            .post(&self.gateway_url)
            .bearer_auth(&self.token)
            .json(message)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Email gateway error {}: {}", status, text));
        }
        Ok(())
    }
}

/// Composes and sends the interview invitation: one message carrying every
/// proposed slot as a confirmation hyperlink.
#[derive(Clone)]
pub struct EmailService {
    sender: std::sync::Arc<dyn EmailSender>,
    from: String,
}

impl EmailService {
    pub fn new(sender: std::sync::Arc<dyn EmailSender>, from: String) -> Self {
        Self { sender, from }
    }

    pub async fn send_interview_invitation(
        &self,
        candidate_email: &str,
        candidate_name: &str,
        offers: &[(ProposedSlot, String)],
    ) -> Result<()> {
        let message = EmailMessage {
            to: candidate_email.to_string(),
            from: self.from.clone(),
            subject: "Interview Invitation - Please Confirm Your Interview Time".to_string(),
            html_body: invitation_body(candidate_name, offers),
        };

        self.sender.send(&message).await.map_err(|e| {
            tracing::error!("Failed to send invitation to {}: {:?}", candidate_email, e);
            Error::InvitationFailed(e.to_string())
        })?;

        tracing::info!(to = candidate_email, slots = offers.len(), "invitation sent");
        Ok(())
    }
}

fn invitation_body(candidate_name: &str, offers: &[(ProposedSlot, String)]) -> String {
    let time_options: String = offers
        .iter()
        .map(|(slot, link)| {
            format!(
                "<tr><td><a href='{}'>{}</a></td></tr>",
                link,
                slot.start.format("%Y-%m-%d %H:%M")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<html>
    <body>
        <p>Dear {},</p>
        <p>Thank you for your application. We are pleased to inform you that you have passed the initial screening.</p>
        <p>Please select a suitable interview time from the following options:</p>
        <table>{}</table>
        <p>Click on the time to confirm.</p>
        <p>Best regards,<br>HR Team</p>
    </body>
</html>"#,
        candidate_name, time_options
    )
}
