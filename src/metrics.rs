//! Query metrics and statistics tracking for the scoring service.

use crate::types::ScoreResult;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for score queries
pub struct ScoringMetrics {
    /// Total queries handled (scored, not found, or failed)
    pub queries_processed: AtomicU64,
    /// Lookups that matched no customer
    pub records_not_found: AtomicU64,
    /// Queries that failed during normalization or prediction
    pub query_failures: AtomicU64,
    /// Scored queries by decision label
    decisions: RwLock<HashMap<String, u64>>,
    /// Processing times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Probability distribution buckets
    score_buckets: RwLock<[u64; 10]>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl ScoringMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            queries_processed: AtomicU64::new(0),
            records_not_found: AtomicU64::new(0),
            query_failures: AtomicU64::new(0),
            decisions: RwLock::new(HashMap::new()),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            score_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record a successfully scored query
    pub fn record_scored(&self, processing_time: Duration, result: &ScoreResult) {
        self.queries_processed.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only the most recent window
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        let bucket = (result.probability * 10.0).min(9.0) as usize;
        if let Ok(mut buckets) = self.score_buckets.write() {
            buckets[bucket] += 1;
        }

        if let Ok(mut decisions) = self.decisions.write() {
            *decisions
                .entry(result.decision.as_str().to_string())
                .or_insert(0) += 1;
        }
    }

    /// Record a lookup that matched no customer
    pub fn record_not_found(&self) {
        self.queries_processed.fetch_add(1, Ordering::Relaxed);
        self.records_not_found.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a query that failed to score
    pub fn record_failure(&self) {
        self.queries_processed.fetch_add(1, Ordering::Relaxed);
        self.query_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get processing time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let times = self.processing_times.read().unwrap();
        if times.is_empty() {
            return ProcessingStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: *sorted.last().unwrap_or(&0),
        }
    }

    /// Get current throughput (queries per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.queries_processed.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get probability distribution
    pub fn get_score_distribution(&self) -> [u64; 10] {
        *self.score_buckets.read().unwrap()
    }

    /// Get scored queries by decision label
    pub fn get_decisions(&self) -> HashMap<String, u64> {
        self.decisions.read().unwrap().clone()
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let query_count = self.queries_processed.load(Ordering::Relaxed);
        let not_found = self.records_not_found.load(Ordering::Relaxed);
        let failures = self.query_failures.load(Ordering::Relaxed);

        let processing = self.get_processing_stats();
        let throughput = self.get_throughput();
        let decisions = self.get_decisions();
        let score_dist = self.get_score_distribution();

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║           CREDIT SCORING SERVICE - METRICS SUMMARY           ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Queries Processed: {:>8}  │  Throughput: {:>6.1} q/s       ║",
            query_count, throughput
        );
        info!(
            "║ Not Found:         {:>8}  │  Failures:   {:>6}           ║",
            not_found, failures
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Processing Time (μs): mean={:>5} p50={:>5} p95={:>5} p99={:>5} ║",
            processing.mean_us, processing.p50_us, processing.p95_us, processing.p99_us
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Decisions:                                                   ║");
        let scored: u64 = decisions.values().sum();
        for (label, count) in &decisions {
            let pct = if scored > 0 {
                (*count as f64 / scored as f64) * 100.0
            } else {
                0.0
            };
            info!("║   {:10}: {:>6} ({:>5.1}%)                                ║", label, count, pct);
        }
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Default Probability Distribution:                            ║");
        let total: u64 = score_dist.iter().sum();
        for (i, &count) in score_dist.iter().enumerate() {
            let pct = if total > 0 { (count as f64 / total as f64) * 100.0 } else { 0.0 };
            let bar_len = (pct / 2.0) as usize;
            let bar: String = "█".repeat(bar_len.min(20));
            info!(
                "║   {:.1}-{:.1}: {:>6} ({:>5.1}%) {}",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count,
                pct,
                bar
            );
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

impl Default for ScoringMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Real-time metrics reporter that prints periodic summaries
pub struct MetricsReporter {
    metrics: std::sync::Arc<ScoringMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: std::sync::Arc<ScoringMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Decision;

    #[test]
    fn test_metrics_recording() {
        let metrics = ScoringMetrics::new();

        metrics.record_scored(
            Duration::from_micros(100),
            &ScoreResult {
                probability: 0.2,
                decision: Decision::Approved,
            },
        );
        metrics.record_scored(
            Duration::from_micros(200),
            &ScoreResult {
                probability: 0.8,
                decision: Decision::Refused,
            },
        );
        metrics.record_not_found();
        metrics.record_failure();

        assert_eq!(metrics.queries_processed.load(Ordering::Relaxed), 4);
        assert_eq!(metrics.records_not_found.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.query_failures.load(Ordering::Relaxed), 1);

        let decisions = metrics.get_decisions();
        assert_eq!(decisions.get("approved"), Some(&1));
        assert_eq!(decisions.get("refused"), Some(&1));

        let distribution = metrics.get_score_distribution();
        assert_eq!(distribution[2], 1);
        assert_eq!(distribution[8], 1);
    }

    #[test]
    fn test_processing_stats() {
        let metrics = ScoringMetrics::new();
        let result = ScoreResult {
            probability: 0.5,
            decision: Decision::Approved,
        };

        for us in [100, 200, 300] {
            metrics.record_scored(Duration::from_micros(us), &result);
        }

        let stats = metrics.get_processing_stats();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.mean_us, 200);
        assert_eq!(stats.max_us, 300);
    }
}
