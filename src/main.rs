//! Credit Scoring Service - Main Entry Point
//!
//! Loads the model, feature schema, and customer dataset, then serves
//! score queries over NATS with bounded parallelism.

use anyhow::{Context, Result};
use credit_scoring_service::{
    config::AppConfig,
    consumer::ScoreRequestConsumer,
    dataset::{ColumnDescriptions, CustomerDataset},
    error::ScoringError,
    metrics::{MetricsReporter, ScoringMetrics},
    models::{OnnxModel, Scorer},
    normalizer::RecordNormalizer,
    pipeline::ScoringContext,
    producer::ScoreReplyProducer,
    schema::FeatureSchema,
    types::{ScoreReply, ScoreRequest},
};
use futures::StreamExt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("credit_scoring_service=info".parse()?),
        )
        .init();

    info!("Starting Credit Scoring Service");

    // Load configuration
    let config = AppConfig::load()?;
    info!("Configuration loaded successfully");
    info!(
        "Decision threshold: {:.6} (probability at or above refuses)",
        config.scoring.threshold
    );

    // Initialize metrics
    let metrics = Arc::new(ScoringMetrics::new());

    // Mandatory resources; absence is fatal.
    let schema = FeatureSchema::load(&config.data.feature_names_path)
        .context("feature schema is required")?;
    info!("Feature schema ready ({} features)", schema.len());

    let dataset = CustomerDataset::load(&config.data.dataset_path, &config.data.id_column)
        .context("customer dataset is required")?;
    if let Some((id_min, id_max)) = dataset.id_range() {
        info!(
            customers = dataset.len(),
            id_min, id_max, "Customer dataset ready"
        );
    }

    // Display-only glossary; absence is not fatal.
    if let Some(path) = &config.data.descriptions_path {
        match ColumnDescriptions::load(path) {
            Ok(descriptions) => {
                info!("Column descriptions ready ({} columns)", descriptions.len())
            }
            Err(e) => warn!(error = %e, "Column descriptions unavailable, continuing without"),
        }
    }

    let normalizer = RecordNormalizer::fit(&dataset);
    info!(
        "Record normalizer fitted ({} categorical columns)",
        normalizer.category_columns()
    );

    let model = OnnxModel::load(
        &config.model.path,
        &config.model.name,
        config.model.onnx_threads,
    )
    .context("probability model is required")?;

    let scorer = Scorer::new(config.scoring.threshold);
    let context = Arc::new(ScoringContext::new(
        schema,
        dataset,
        normalizer,
        Box::new(model),
        scorer,
    ));

    // Connect to NATS
    let client = async_nats::connect(&config.nats.url).await?;
    info!("Connected to NATS at {}", config.nats.url);

    let consumer = ScoreRequestConsumer::new(client.clone(), &config.nats.request_subject);
    let producer = Arc::new(ScoreReplyProducer::new(
        client.clone(),
        &config.nats.result_subject,
    ));

    let num_workers = config.pipeline.workers;
    info!("Serving score queries with {} parallel workers", num_workers);
    info!("Listening on subject: {}", config.nats.request_subject);
    info!("Publishing replies to: {}", config.nats.result_subject);

    // Semaphore to limit concurrent queries
    let semaphore = Arc::new(Semaphore::new(num_workers));
    let served_count = Arc::new(AtomicU64::new(0));
    let threshold = config.scoring.threshold;

    // Start metrics reporter (prints summary every 30 seconds)
    let metrics_clone = metrics.clone();
    tokio::spawn(async move {
        let reporter = MetricsReporter::new(metrics_clone, 30);
        reporter.start().await;
    });

    let mut subscription = consumer.subscribe().await?;

    while let Some(message) = subscription.next().await {
        let permit = semaphore.clone().acquire_owned().await?;

        let context = context.clone();
        let producer = producer.clone();
        let metrics = metrics.clone();
        let served_count = served_count.clone();

        tokio::spawn(async move {
            let start_time = Instant::now();

            match serde_json::from_slice::<ScoreRequest>(&message.payload) {
                Ok(request) => {
                    let customer_id = request.sk_id_curr;

                    let reply = match context.score_customer(customer_id) {
                        Ok(score) => {
                            let processing_time = start_time.elapsed();
                            metrics.record_scored(processing_time, &score.result);
                            debug!(
                                customer_id,
                                probability = score.result.probability,
                                decision = %score.result.decision,
                                processing_time_us = processing_time.as_micros(),
                                "Customer scored"
                            );
                            ScoreReply::scored(customer_id, score.result, threshold)
                                .with_record(score.record)
                        }
                        Err(e @ ScoringError::RecordNotFound(_)) => {
                            metrics.record_not_found();
                            debug!(customer_id, "Customer not found");
                            ScoreReply::failed(customer_id, threshold, e.to_string())
                        }
                        Err(e) => {
                            metrics.record_failure();
                            error!(customer_id, error = %e, "Score query failed");
                            ScoreReply::failed(customer_id, threshold, e.to_string())
                        }
                    };

                    if let Err(e) = producer.deliver(message.reply.clone(), &reply).await {
                        error!(customer_id, error = %e, "Failed to deliver score reply");
                    }

                    let count = served_count.fetch_add(1, Ordering::Relaxed) + 1;

                    // Log progress every 100 queries
                    if count % 100 == 0 {
                        let throughput = metrics.get_throughput();
                        let processing_stats = metrics.get_processing_stats();
                        info!(
                            served = count,
                            throughput = format!("{:.1} q/s", throughput),
                            avg_latency_us = processing_stats.mean_us,
                            "Serving milestone"
                        );
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Failed to deserialize score request");
                }
            }

            drop(permit);
        });
    }

    info!("Service shutting down...");
    metrics.print_summary();

    Ok(())
}
