//! Batch evaluation of independent units.
//!
//! Units run on the blocking pool with at most `workers` in flight. Outcomes
//! travel over a channel to a single collector task that owns the summary and
//! folds them in submission order, so the report does not depend on which unit
//! finishes first.

use crate::aggregate::MetricSummary;
use crate::matcher::Matcher;
use crate::unit::{evaluate_unit, UnitOutcome};
use geometrics_core::config::EvaluationConfig;
use geometrics_core::error::{GeometricsError, Result};
use geometrics_core::models::{MetricReport, UnitInput};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinError;

/// Shared flag that stops submission of new units
///
/// Units already in flight finish and are folded. A stop applies to one run:
/// the flag is cleared when that run finishes, so the driver can be reused.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.stopped.store(false, Ordering::SeqCst);
    }
}

/// Progress information reported after each folded unit
#[derive(Debug, Clone)]
pub struct BatchProgress {
    pub completed: usize,
    pub failed: usize,
    pub total: usize,
    /// Id of the unit that was just folded
    pub unit: String,
}

type UnitResult = Result<UnitOutcome>;

/// Evaluates a batch of units and produces one report
pub struct BatchDriver {
    config: EvaluationConfig,
    matcher: Arc<Matcher>,
    stop: StopHandle,
}

impl BatchDriver {
    /// Create a driver for a validated configuration
    pub fn new(config: EvaluationConfig) -> Self {
        let matcher = Arc::new(Matcher::new(&config));
        Self { config, matcher, stop: StopHandle::new() }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Handle that stops the batch early when triggered
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Evaluate all units
    pub async fn run(&self, units: Vec<UnitInput>) -> Result<MetricReport> {
        self.run_with_progress(units, |_| {}).await
    }

    /// Evaluate all units, reporting progress from the collector task
    pub async fn run_with_progress<F>(
        &self,
        units: Vec<UnitInput>,
        progress: F,
    ) -> Result<MetricReport>
    where
        F: FnMut(BatchProgress) + Send + 'static,
    {
        let matcher = Arc::clone(&self.matcher);
        let min_confidence = self.config.min_confidence;
        let max_shapes = self.config.max_shapes_per_unit;

        let summary = self
            .run_units(units, progress, move |unit| {
                evaluate_unit(unit, &*matcher, min_confidence, max_shapes)
            })
            .await?;

        let strategy = self.matcher.strategy();
        Ok(summary.finalize(self.config.threshold, strategy, self.config.per_category))
    }

    async fn run_units<F, E>(
        &self,
        units: Vec<UnitInput>,
        mut progress: F,
        evaluate: E,
    ) -> Result<MetricSummary>
    where
        F: FnMut(BatchProgress) + Send + 'static,
        E: Fn(&UnitInput) -> UnitResult + Send + Sync + 'static,
    {
        let total = units.len();
        let workers = self.config.workers.max(1);
        let evaluate = Arc::new(evaluate);
        let semaphore = Arc::new(Semaphore::new(workers));
        let (tx, mut rx) = mpsc::channel::<(usize, String, UnitResult)>(workers * 2);

        tracing::info!(units = total, workers, "Starting batch evaluation");

        let collector = tokio::spawn(async move {
            let mut summary = MetricSummary::new();
            let mut pending: BTreeMap<usize, (String, UnitResult)> = BTreeMap::new();
            let mut next = 0;
            let mut completed = 0;

            while let Some((seq, unit, result)) = rx.recv().await {
                pending.insert(seq, (unit, result));

                // Fold strictly in submission order
                while let Some((unit, result)) = pending.remove(&next) {
                    match result {
                        Ok(outcome) => summary.fold(&outcome),
                        Err(e) => {
                            tracing::warn!(unit = %unit, "Unit failed: {}", e);
                            summary.record_failure();
                        }
                    }
                    next += 1;
                    completed += 1;
                    progress(BatchProgress {
                        completed,
                        failed: summary.units_failed,
                        total,
                        unit,
                    });
                }
            }

            summary
        });

        let mut submitted = 0;
        let mut interrupted = false;
        for (seq, unit) in units.into_iter().enumerate() {
            if self.stop.is_stopped() {
                interrupted = true;
                break;
            }
            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            // The stop may have arrived while waiting for a free worker
            if self.stop.is_stopped() {
                interrupted = true;
                break;
            }

            let tx = tx.clone();
            let evaluate = Arc::clone(&evaluate);
            tokio::spawn(async move {
                let id = unit.id.clone();
                let result = match tokio::task::spawn_blocking(move || evaluate(&unit)).await {
                    Ok(result) => result,
                    Err(e) => Err(GeometricsError::UnitFailed {
                        unit: id.clone(),
                        reason: join_error_reason(e),
                    }),
                };
                drop(permit);
                // The collector only goes away once every sender is dropped
                let _ = tx.send((seq, id, result)).await;
            });
            submitted += 1;
        }
        drop(tx);

        let mut summary = collector
            .await
            .map_err(|e| GeometricsError::BatchAborted(join_error_reason(e)))?;

        // A stop that arrives after the last submission has nothing left to skip
        summary.units_skipped = total - submitted;
        summary.stopped_early = interrupted;
        self.stop.reset();

        if summary.stopped_early {
            tracing::warn!(
                submitted,
                skipped = summary.units_skipped,
                "Batch stopped early; remaining units were not submitted"
            );
        }
        tracing::info!(
            evaluated = summary.units_evaluated,
            failed = summary.units_failed,
            excluded = summary.shapes_excluded,
            "Batch evaluation finished"
        );

        Ok(summary)
    }
}

fn join_error_reason(error: JoinError) -> String {
    if error.is_panic() {
        let payload = error.into_panic();
        if let Some(message) = payload.downcast_ref::<&str>() {
            format!("worker panicked: {}", message)
        } else if let Some(message) = payload.downcast_ref::<String>() {
            format!("worker panicked: {}", message)
        } else {
            "worker panicked".to_string()
        }
    } else {
        "worker was cancelled".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geometrics_core::models::{MatchResult, MatchStrategy, RawGeometry, ShapeInput};
    use std::sync::Mutex;

    fn units(count: usize) -> Vec<UnitInput> {
        (0..count)
            .map(|i| {
                let offset = (i % 5) as f64 * 0.5;
                let category = if i % 2 == 0 { "a" } else { "b" };
                UnitInput::new(format!("unit-{i}"))
                    .reference(
                        ShapeInput::new(RawGeometry::rectangle(0.0, 0.0, 10.0, 10.0))
                            .category(category),
                    )
                    .reference(ShapeInput::new(RawGeometry::rectangle(20.0, 0.0, 22.0, 2.0)))
                    .candidate(
                        ShapeInput::new(RawGeometry::rectangle(offset, 0.0, 10.0 + offset, 10.0))
                            .category(category),
                    )
                    .candidate(ShapeInput::new(RawGeometry::point(50.0, 50.0)))
            })
            .collect()
    }

    fn config(workers: usize) -> EvaluationConfig {
        EvaluationConfig::new(0.5, MatchStrategy::Greedy, true).unwrap().workers(workers)
    }

    #[tokio::test]
    async fn test_batch_counts() {
        let report = BatchDriver::new(config(2)).run(units(4)).await.unwrap();

        assert_eq!(report.units_evaluated, 4);
        assert_eq!(report.units_failed, 0);
        assert_eq!(report.global.true_positives, 4);
        assert_eq!(report.global.false_negatives, 4);
        assert_eq!(report.global.false_positives, 4);
        assert!(!report.stopped_early);
        assert_eq!(report.categories.len(), 2);
    }

    #[tokio::test]
    async fn test_report_independent_of_worker_count() {
        let single = BatchDriver::new(config(1)).run(units(25)).await.unwrap();
        let many = BatchDriver::new(config(8)).run(units(25)).await.unwrap();

        assert_eq!(single.global, many.global);
        assert_eq!(single.categories, many.categories);
        assert_eq!(single.units_evaluated, many.units_evaluated);
    }

    #[tokio::test]
    async fn test_stop_before_start_skips_everything() {
        let driver = BatchDriver::new(config(2));
        driver.stop_handle().stop();

        let report = driver.run(units(5)).await.unwrap();

        assert!(report.stopped_early);
        assert_eq!(report.units_evaluated, 0);
        assert_eq!(report.units_skipped, 5);
        assert!(report.global.precision.is_undefined());
    }

    #[tokio::test]
    async fn test_stop_during_run() {
        let driver = BatchDriver::new(config(1));
        let stop = driver.stop_handle();

        let report = driver
            .run_with_progress(units(40), move |p| {
                if p.completed == 1 {
                    stop.stop();
                }
            })
            .await
            .unwrap();

        assert!(report.stopped_early);
        assert!(report.units_evaluated >= 1);
        assert_eq!(report.units_evaluated + report.units_skipped, 40);
    }

    #[tokio::test]
    async fn test_stop_after_last_submission_is_not_early() {
        let driver = BatchDriver::new(config(1));
        let stop = driver.stop_handle();

        let report = driver
            .run_with_progress(units(3), move |p| {
                if p.completed == p.total {
                    stop.stop();
                }
            })
            .await
            .unwrap();

        assert!(!report.stopped_early);
        assert_eq!(report.units_evaluated, 3);
        assert_eq!(report.units_skipped, 0);
    }

    #[tokio::test]
    async fn test_driver_reusable_after_stop() {
        let driver = BatchDriver::new(config(2));
        let stop = driver.stop_handle();
        stop.stop();

        let first = driver.run(units(5)).await.unwrap();
        assert!(first.stopped_early);
        assert_eq!(first.units_skipped, 5);
        assert!(!stop.is_stopped());

        let second = driver.run(units(5)).await.unwrap();
        assert!(!second.stopped_early);
        assert_eq!(second.units_evaluated, 5);
        assert_eq!(second.units_skipped, 0);
    }

    #[tokio::test]
    async fn test_panicking_unit_is_counted_as_failed() {
        let driver = BatchDriver::new(config(3));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_by_progress = Arc::clone(&seen);

        let summary = driver
            .run_units(
                units(6),
                move |p| seen_by_progress.lock().unwrap().push(p.unit),
                |unit| {
                    if unit.id == "unit-3" {
                        panic!("boom");
                    }
                    Ok(UnitOutcome {
                        unit: unit.id.clone(),
                        result: MatchResult::default(),
                        excluded: Vec::new(),
                        filtered_candidates: 0,
                    })
                },
            )
            .await
            .unwrap();

        assert_eq!(summary.units_failed, 1);
        assert_eq!(summary.units_evaluated, 5);
        // Progress follows submission order
        let order = seen.lock().unwrap().clone();
        let expected: Vec<String> = (0..6).map(|i| format!("unit-{i}")).collect();
        assert_eq!(order, expected);
    }

    #[tokio::test]
    async fn test_oversized_unit_fails_without_stopping_the_batch() {
        let mut batch = units(3);
        batch[1] = batch[1]
            .clone()
            .candidate(ShapeInput::new(RawGeometry::point(60.0, 60.0)))
            .candidate(ShapeInput::new(RawGeometry::point(70.0, 70.0)));

        let report =
            BatchDriver::new(config(2).max_shapes_per_unit(3)).run(batch).await.unwrap();

        assert_eq!(report.units_failed, 1);
        assert_eq!(report.units_evaluated, 2);
        assert_eq!(report.global.true_positives, 2);
        assert!(!report.stopped_early);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let report = BatchDriver::new(config(4)).run(Vec::new()).await.unwrap();

        assert_eq!(report.units_evaluated, 0);
        assert!(report.global.recall.is_undefined());
        assert!(!report.stopped_early);
    }
}
