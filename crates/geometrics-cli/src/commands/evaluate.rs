//! Evaluate command implementation

use crate::cli::EvaluateArgs;
use crate::config_loader::load_config_with_overrides;
use crate::input::load_units;
use crate::output::OutputWriter;
use crate::output_types::EvaluateOutput;
use crate::progress::{finish_error, finish_success, progress_bar_for};
use anyhow::{Context, Result};
use geometrics_core::config::{parse_strategy, CliConfigOverrides};
use geometrics_core::models::{MetricReport, MetricSet};
use geometrics_eval::BatchDriver;
use std::fs;
use tabled::Tabled;

pub async fn execute(args: EvaluateArgs, output: &OutputWriter) -> Result<()> {
    let overrides = CliConfigOverrides {
        threshold: args.threshold,
        strategy: args.strategy.as_deref().map(parse_strategy).transpose()?,
        per_category: args.per_category,
        class_agnostic: args.class_agnostic,
        min_confidence: args.min_confidence,
        point_radius: args.point_radius,
        max_shapes_per_unit: args.max_shapes_per_unit,
        workers: args.workers,
    };

    // Configuration problems are reported before any input is read
    let config = load_config_with_overrides(args.config.as_deref(), overrides)?.resolve()?;
    let units = load_units(&args.input)?;

    let driver = BatchDriver::new(config);

    // Ctrl-C stops submitting units; the ones in flight still count
    let stop = driver.stop_handle();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing units in flight");
            stop.stop();
        }
    });

    let pb = progress_bar_for(output.is_json(), units.len() as u64, "Evaluating units");
    let progress = pb.clone();
    let report = driver
        .run_with_progress(units, move |p| {
            progress.set_position(p.completed as u64);
            progress.set_message(format!("Evaluated {}", p.unit));
        })
        .await;
    interrupt.abort();

    let report = match report {
        Ok(report) => report,
        Err(e) => {
            finish_error(&pb, "Evaluation aborted");
            return Err(e.into());
        }
    };
    finish_success(&pb, &format!("Evaluated {} units", report.units_evaluated));

    let output_file = match args.output {
        Some(path) => {
            let json = serde_json::to_string_pretty(&report)?;
            fs::write(&path, json)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            Some(path.display().to_string())
        }
        None => None,
    };

    if output.is_json() {
        output.result(EvaluateOutput { report, output_file })?;
    } else {
        print_report(&report, output);
        if let Some(path) = output_file {
            output.success(format!("Report written to {}", path));
        }
    }

    Ok(())
}

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "TP")]
    true_positives: u64,
    #[tabled(rename = "FP")]
    false_positives: u64,
    #[tabled(rename = "FN")]
    false_negatives: u64,
    #[tabled(rename = "Precision")]
    precision: String,
    #[tabled(rename = "Recall")]
    recall: String,
    #[tabled(rename = "F1")]
    f1: String,
    #[tabled(rename = "Mean overlap")]
    mean_overlap: String,
}

impl MetricRow {
    fn new(category: impl Into<String>, metrics: &MetricSet) -> Self {
        Self {
            category: category.into(),
            true_positives: metrics.true_positives,
            false_positives: metrics.false_positives,
            false_negatives: metrics.false_negatives,
            precision: metrics.precision.to_string(),
            recall: metrics.recall.to_string(),
            f1: metrics.f1.to_string(),
            mean_overlap: metrics.mean_overlap.to_string(),
        }
    }
}

fn print_report(report: &MetricReport, output: &OutputWriter) {
    output.section("Evaluation");
    output.kv("Threshold", report.threshold);
    output.kv("Strategy", report.strategy);
    output.kv("Units evaluated", report.units_evaluated);
    output.kv("Units failed", report.units_failed);
    output.kv("Shapes excluded", report.shapes_excluded);
    if report.candidates_filtered > 0 {
        output.kv("Candidates below confidence floor", report.candidates_filtered);
    }

    output.section("Metrics");
    let mut rows = vec![MetricRow::new("(all)", &report.global)];
    rows.extend(report.categories.iter().map(|(name, metrics)| MetricRow::new(name, metrics)));
    output.table(rows);

    if report.shapes_excluded > 0 {
        output.warning(format!(
            "{} invalid shapes in {} units were excluded and counted as errors",
            report.shapes_excluded, report.units_with_exclusions
        ));
    }
    if report.units_failed > 0 {
        output.warning(format!("{} units failed and were not counted", report.units_failed));
    }
    if report.stopped_early {
        output.warning(format!(
            "Stopped early: {} units were not evaluated",
            report.units_skipped
        ));
    }
}
