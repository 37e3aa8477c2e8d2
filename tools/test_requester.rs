//! Test Score Requester
//!
//! Publishes randomized score requests to NATS and prints the replies,
//! for exercising the service end to end.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

/// Request structure matching the service's expected format
#[derive(Debug, Serialize)]
struct ScoreRequest {
    sk_id_curr: u64,
}

/// The subset of the reply this tool cares about
#[derive(Debug, Deserialize)]
struct ScoreReply {
    customer_id: u64,
    probability: Option<f64>,
    decision: Option<String>,
    error: Option<String>,
}

fn env_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let url = std::env::var("NATS_URL").unwrap_or_else(|_| "nats://localhost:4222".to_string());
    let subject =
        std::env::var("REQUEST_SUBJECT").unwrap_or_else(|_| "scoring.requests".to_string());
    let count: usize = env_var("REQUEST_COUNT", 100);
    let id_min: u64 = env_var("ID_MIN", 100001);
    let id_max: u64 = env_var("ID_MAX", 110000);

    let client = async_nats::connect(&url).await?;
    info!(%url, %subject, count, "Publishing test score requests");

    let mut rng = rand::thread_rng();
    let mut scored = 0usize;
    let mut misses = 0usize;

    for i in 0..count {
        // Roughly one in ten requests targets an id outside the range
        let sk_id_curr = if rng.gen_ratio(1, 10) {
            id_max + rng.gen_range(1..=1000)
        } else {
            rng.gen_range(id_min..=id_max)
        };

        let payload = serde_json::to_vec(&ScoreRequest { sk_id_curr })?;

        match client.request(subject.clone(), payload.into()).await {
            Ok(message) => match serde_json::from_slice::<ScoreReply>(&message.payload) {
                Ok(reply) => {
                    if reply.probability.is_some() {
                        scored += 1;
                    } else {
                        misses += 1;
                    }
                    info!(
                        request = i + 1,
                        customer_id = reply.customer_id,
                        probability = ?reply.probability,
                        decision = ?reply.decision,
                        error = ?reply.error,
                        "Reply received"
                    );
                }
                Err(e) => warn!(error = %e, "Unparseable reply"),
            },
            Err(e) => warn!(sk_id_curr, error = %e, "Request failed"),
        }

        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    info!(scored, misses, "Done");
    Ok(())
}
