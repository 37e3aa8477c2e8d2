//! NATS producer for score replies

use crate::types::ScoreReply;
use anyhow::Result;
use async_nats::{Client, Subject};
use tracing::debug;

/// Publishes score replies, either to a request's reply-to subject or to
/// the shared results subject.
#[derive(Clone)]
pub struct ScoreReplyProducer {
    client: Client,
    subject: String,
}

impl ScoreReplyProducer {
    /// Create a new reply producer
    pub fn new(client: Client, subject: &str) -> Self {
        Self {
            client,
            subject: subject.to_string(),
        }
    }

    /// Publish a reply to the results subject
    pub async fn publish(&self, reply: &ScoreReply) -> Result<()> {
        let payload = serde_json::to_vec(reply)?;

        self.client
            .publish(self.subject.clone(), payload.into())
            .await?;

        debug!(
            reply_id = %reply.reply_id,
            customer_id = reply.customer_id,
            decision = ?reply.decision,
            "Published score reply"
        );

        Ok(())
    }

    /// Respond on a request's reply-to subject
    pub async fn respond(&self, reply_to: Subject, reply: &ScoreReply) -> Result<()> {
        let payload = serde_json::to_vec(reply)?;

        self.client.publish(reply_to, payload.into()).await?;

        debug!(
            reply_id = %reply.reply_id,
            customer_id = reply.customer_id,
            decision = ?reply.decision,
            "Responded to score request"
        );

        Ok(())
    }

    /// Route to the reply-to subject when the request carries one, the
    /// results subject otherwise.
    pub async fn deliver(&self, reply_to: Option<Subject>, reply: &ScoreReply) -> Result<()> {
        match reply_to {
            Some(subject) => self.respond(subject, reply).await,
            None => self.publish(reply).await,
        }
    }

    /// Get the subject name
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

#[cfg(test)]
mod tests {
    // Integration tests would require a running NATS server
}
