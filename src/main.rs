//! Journal Insights CLI
//!
//! Command-line driver for the analyzers:
//! - Build a full insights report
//! - Run a single analyzer (correlations, trends, outliers, ...)
//! - Generate a default config file

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use journal_insights::analysis::{
    self, BoxPlotStats, CalendarHeatmap, CorrelationMatrix, CorrelationResult, Decomposition,
    DensityCurve, OutlierReport, TrendResult,
};
use journal_insights::config::{generate_default_config, Config, LoadedConfig, LoggingConfig};
use journal_insights::ingest;
use journal_insights::report::{InsightsReport, InsightsReportBuilder};
use journal_insights::series::{Entry, MetricSeriesStore};
use journal_insights::InsightsError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "journal-insights")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Statistical insights over journal metrics")]
#[command(long_about = "Journal Insights reads dated metric entries (JSON or CSV) and reports\ncorrelations, trends, outliers, distributions and calendar intensity.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: user config dir, then ./config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the full insights report
    Report {
        /// Entry file (.json or .csv)
        input: PathBuf,
        /// Metric shown in the calendar section (default: most recorded)
        #[arg(long)]
        calendar_metric: Option<String>,
    },

    /// Pairwise correlations
    Correlations {
        input: PathBuf,
        /// Only correlations involving this metric
        #[arg(short, long)]
        metric: Option<String>,
        /// Print the full matrix instead of a list
        #[arg(long)]
        matrix: bool,
        /// Minimum |r| for matrix edges
        #[arg(long, default_value = "0.5")]
        min: f64,
        /// Include pairs with no notable correlation
        #[arg(long)]
        all: bool,
    },

    /// Trend classification per metric
    Trends { input: PathBuf },

    /// Z-score outliers across all metrics
    Outliers {
        input: PathBuf,
        /// Override the z-score threshold
        #[arg(short, long)]
        threshold: Option<f64>,
    },

    /// Kernel density curves
    Density {
        input: PathBuf,
        #[arg(short, long)]
        metric: Option<String>,
    },

    /// Daily averages and heatmap intensity for one metric
    Calendar {
        input: PathBuf,
        /// Metric to aggregate (default: most recorded)
        #[arg(short, long)]
        metric: Option<String>,
    },

    /// Moving-average trend/residual decomposition
    Decompose {
        input: PathBuf,
        #[arg(short, long)]
        metric: String,
        /// Window size (default from config)
        #[arg(short, long)]
        window: Option<usize>,
    },

    /// Box-plot statistics and arbitrary quantiles
    Quantiles {
        input: PathBuf,
        #[arg(short, long)]
        metric: Option<String>,
        /// Extra quantiles to compute, e.g. -p 0.9 -p 0.95
        #[arg(short, long)]
        p: Vec<f64>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => LoadedConfig {
            config: Config::load_with_env(path)?,
            source: Some(path.clone()),
            skipped: Vec::new(),
        },
        None => Config::load_default(),
    };
    init_logging(&loaded.config.logging);
    loaded.log();
    let config = loaded.config;
    config
        .analysis
        .validate()
        .context("Invalid analysis configuration")?;

    let analysis_config = &config.analysis;
    let format = cli.format;

    match cli.command {
        Commands::Report {
            input,
            calendar_metric,
        } => {
            let entries = load(&input)?;
            let mut builder = InsightsReportBuilder::new(analysis_config.clone());
            if let Some(metric) = calendar_metric {
                builder = builder.calendar_metric(metric);
            }
            let report = builder.build(&entries);
            emit(format, &report, print_report)?;
        }

        Commands::Correlations {
            input,
            metric,
            matrix,
            min,
            all,
        } => {
            let store = load_store(&input)?;
            let cfg = &analysis_config.correlation;

            if matrix {
                let matrix = analysis::correlation_matrix(&store, min, cfg)?;
                emit(format, &matrix, print_matrix)?;
            } else {
                let mut correlations = match metric.as_deref() {
                    Some(m) => {
                        require_metric(&store, m)?;
                        analysis::correlations_for_metric(&store, m, cfg)
                    }
                    None if all => analysis::all_correlations(&store, cfg),
                    None => analysis::strong_correlations(&store, cfg),
                };
                if !all && metric.is_some() {
                    correlations.retain(|c| c.strength != analysis::CorrelationStrength::None);
                }
                emit(format, &correlations, |c| print_correlations(c))?;
            }
        }

        Commands::Trends { input } => {
            let store = load_store(&input)?;
            let trends = analysis::analyze_trends(&store, &analysis_config.trend);
            emit(format, &trends, |t| print_trends(t))?;
        }

        Commands::Outliers { input, threshold } => {
            let store = load_store(&input)?;
            let mut cfg = analysis_config.outliers.clone();
            if let Some(z) = threshold {
                if z <= 0.0 || !z.is_finite() {
                    return Err(InsightsError::InvalidThreshold {
                        name: "threshold",
                        value: z,
                    }
                    .into());
                }
                cfg.z_threshold = z;
            }
            let report = analysis::detect_outliers(&store, &cfg);
            emit(format, &report, print_outliers)?;
        }

        Commands::Density { input, metric } => {
            let store = load_store(&input)?;
            let curves: Vec<DensityCurve> = match metric.as_deref() {
                Some(m) => {
                    let series = require_metric(&store, m)?;
                    analysis::kernel_density(m, &series.values, analysis_config.density.samples)
                        .into_iter()
                        .collect()
                }
                None => analysis::metric_densities(&store, &analysis_config.density),
            };
            emit(format, &curves, |c| print_densities(c))?;
        }

        Commands::Calendar { input, metric } => {
            let store = load_store(&input)?;
            let metric = match metric {
                Some(m) => m,
                None => match store.most_recorded_metric() {
                    Some(m) => m.to_string(),
                    None => bail!("No metrics found in {}", input.display()),
                },
            };
            let heatmap = analysis::calendar_bins(&store, &metric);
            emit(format, &heatmap, print_calendar)?;
        }

        Commands::Decompose {
            input,
            metric,
            window,
        } => {
            let store = load_store(&input)?;
            let window = window.unwrap_or(analysis_config.trend.moving_average_window);
            let decomposition = analysis::decompose_metric(&store, &metric, window)?;
            emit(format, &decomposition, print_decomposition)?;
        }

        Commands::Quantiles { input, metric, p } => {
            let store = load_store(&input)?;
            if let Some(bad) = p.iter().find(|q| !(0.0..=1.0).contains(*q)) {
                return Err(InsightsError::InvalidThreshold {
                    name: "quantile",
                    value: *bad,
                }
                .into());
            }

            let distributions: Vec<BoxPlotStats> = match metric.as_deref() {
                Some(m) => {
                    let series = require_metric(&store, m)?;
                    BoxPlotStats::compute(m, &series.values).into_iter().collect()
                }
                None => analysis::distributions(&store),
            };
            let quantiles = distributions
                .iter()
                .filter_map(|d| store.series(&d.metric))
                .flat_map(|s| {
                    p.iter().filter_map(move |&q| {
                        analysis::quantile(&s.values, q).map(|value| QuantileRow {
                            metric: s.name.clone(),
                            p: q,
                            value,
                        })
                    })
                })
                .collect();

            let output = QuantilesOutput {
                distributions,
                quantiles,
            };
            emit(format, &output, print_quantiles)?;
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            if let Some(path) = output {
                std::fs::write(&path, &content)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Config written to {:?}", path);
            } else {
                print!("{}", content);
            }
        }
    }

    Ok(())
}

/// Install the tracing subscriber; `RUST_LOG` wins over the config level
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("journal_insights={}", logging.level)));

    // Logs go to stderr so JSON output on stdout stays parseable
    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load(input: &Path) -> anyhow::Result<Vec<Entry>> {
    let result = ingest::load_entries(input)
        .with_context(|| format!("Failed to load entries from {}", input.display()))?;

    if result.rows_failed > 0 {
        tracing::warn!(rows_failed = result.rows_failed, "Some rows could not be read");
        for error in &result.errors {
            tracing::warn!("{}", error);
        }
    }

    Ok(result.entries)
}

fn load_store(input: &Path) -> anyhow::Result<MetricSeriesStore> {
    Ok(MetricSeriesStore::build(&load(input)?))
}

fn require_metric<'a>(
    store: &'a MetricSeriesStore,
    metric: &str,
) -> Result<&'a journal_insights::series::MetricSeries, InsightsError> {
    store
        .series(metric)
        .ok_or_else(|| InsightsError::MetricNotFound(metric.to_string()))
}

fn emit<T: Serialize + ?Sized>(
    format: OutputFormat,
    value: &T,
    table: impl FnOnce(&T),
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Table => table(value),
    }
    Ok(())
}

#[derive(Serialize)]
struct QuantileRow {
    metric: String,
    p: f64,
    value: f64,
}

#[derive(Serialize)]
struct QuantilesOutput {
    distributions: Vec<BoxPlotStats>,
    quantiles: Vec<QuantileRow>,
}

fn print_report(report: &InsightsReport) {
    let overview = &report.overview;

    println!("Journal Insights v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Overview:");
    println!("  Entries: {}", overview.total_entries);
    println!("  Metrics: {}", overview.metric_count);
    if let Some(label) = &overview.date_range_label {
        println!("  Date range: {}", label);
    }
    println!("  Entries per week: {:.1}", overview.average_entries_per_week);
    if let Some(best) = &overview.most_consistent_metric {
        println!(
            "  Most consistent: {} (score {:.2})",
            best.metric, best.score
        );
    }

    let quality = &report.data_quality;
    if quality.unparsable_dates > 0 || quality.skipped_values > 0 {
        println!(
            "  Data quality: {} unparsable dates, {} skipped values",
            quality.unparsable_dates, quality.skipped_values
        );
    }

    println!();
    println!("Trends:");
    print_trends(&report.trends);

    println!();
    println!(
        "Outliers ({} of {}):",
        report.outliers.len(),
        report.total_outliers
    );
    for outlier in &report.outliers {
        println!("  {}", outlier.description);
    }

    println!();
    println!("Correlations:");
    print_correlations(&report.correlations);

    if !report.patterns.weekly.is_empty() {
        println!();
        println!("Weekly patterns:");
        for pattern in &report.patterns.weekly {
            println!("  {}", pattern.description);
        }
    }

    if let Some(metric) = &report.calendar_metric {
        let recorded = report.calendar_bins.iter().filter(|b| b.has_data()).count();
        println!();
        println!(
            "Calendar ({}): {} of {} days recorded",
            metric,
            recorded,
            report.calendar_bins.len()
        );
    }
}

fn print_correlations(correlations: &[CorrelationResult]) {
    if correlations.is_empty() {
        println!("  No notable correlations");
        return;
    }
    println!(
        "  {:<20} {:<20} {:>7} {:<10} {:>6}",
        "Metric A", "Metric B", "r", "Strength", "n"
    );
    println!("  {}", "-".repeat(67));
    for c in correlations {
        println!(
            "  {:<20} {:<20} {:>7.3} {:<10} {:>6}",
            c.metric_a, c.metric_b, c.r, c.strength, c.sample_size
        );
    }
}

fn print_matrix(matrix: &CorrelationMatrix) {
    if matrix.metrics.is_empty() {
        println!("No metrics");
        return;
    }
    print!("{:<16}", "");
    for name in &matrix.metrics {
        print!(" {:>10}", truncate(name, 10));
    }
    println!();
    for (name, row) in matrix.metrics.iter().zip(&matrix.cells) {
        print!("{:<16}", truncate(name, 16));
        for cell in row {
            match cell {
                Some(r) => print!(" {:>10.3}", r),
                None => print!(" {:>10}", "-"),
            }
        }
        println!();
    }
    println!();
    println!(
        "{} pairs with |r| >= {:.2}",
        matrix.edges.len(),
        matrix.min_correlation
    );
}

fn print_trends(trends: &[TrendResult]) {
    if trends.is_empty() {
        println!("  Not enough data");
        return;
    }
    println!(
        "  {:<20} {:<10} {:>9} {:>9} {:>9}",
        "Metric", "Direction", "Slope", "Recent", "Older"
    );
    println!("  {}", "-".repeat(61));
    for t in trends {
        println!(
            "  {:<20} {:<10} {:>9.3} {:>9.2} {:>9.2}",
            t.metric, t.direction, t.slope, t.recent_average, t.older_average
        );
    }
}

fn print_outliers(report: &OutlierReport) {
    if report.outliers.is_empty() {
        println!("No outliers in {} metrics", report.metrics_checked);
        return;
    }
    println!(
        "{:<12} {:<20} {:>10} {:>8} {:<5}",
        "Date", "Metric", "Value", "Z", "Kind"
    );
    println!("{}", "-".repeat(59));
    for o in &report.outliers {
        println!(
            "{:<12} {:<20} {:>10.2} {:>8.2} {:<5}",
            o.date_label, o.metric, o.value, o.z_score, o.kind
        );
    }
    if report.total_flagged > report.outliers.len() {
        println!();
        println!(
            "({} more not shown)",
            report.total_flagged - report.outliers.len()
        );
    }
}

fn print_densities(curves: &[DensityCurve]) {
    if curves.is_empty() {
        println!("No data");
        return;
    }
    println!(
        "{:<20} {:>10} {:>10} {:>10} {:>10}",
        "Metric", "Bandwidth", "Min", "Max", "Peak at"
    );
    println!("{}", "-".repeat(64));
    for c in curves {
        let peak = c
            .x_values
            .iter()
            .zip(&c.density)
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(x, _)| *x)
            .unwrap_or(f64::NAN);
        let min = c.x_values.first().copied().unwrap_or(f64::NAN);
        let max = c.x_values.last().copied().unwrap_or(f64::NAN);
        if c.degenerate {
            println!(
                "{:<20} {:>10} {:>10.2} {:>10.2} {:>10}",
                c.metric, "-", min, max, "constant"
            );
        } else {
            println!(
                "{:<20} {:>10.3} {:>10.2} {:>10.2} {:>10.2}",
                c.metric, c.bandwidth, min, max, peak
            );
        }
    }
}

fn print_calendar(heatmap: &CalendarHeatmap) {
    println!("Calendar: {}", heatmap.metric);
    println!();
    println!("{:<12} {:>6} {:>10} {:>10}", "Date", "Count", "Average", "Intensity");
    println!("{}", "-".repeat(41));
    for bin in &heatmap.bins {
        match (bin.average, bin.intensity) {
            (Some(avg), Some(intensity)) => println!(
                "{:<12} {:>6} {:>10.2} {:>10.2}",
                bin.date.to_string(),
                bin.count,
                avg,
                intensity
            ),
            _ => println!(
                "{:<12} {:>6} {:>10} {:>10}",
                bin.date.to_string(),
                bin.count,
                "-",
                "-"
            ),
        }
    }
    if heatmap.dropped_dates > 0 {
        println!();
        println!("({} values with unparsable dates left out)", heatmap.dropped_dates);
    }
}

fn print_decomposition(d: &Decomposition) {
    println!("Decomposition: {} (window {})", d.metric, d.window);
    println!();
    println!("{:<12} {:>10} {:>10} {:>10}", "Date", "Value", "Trend", "Residual");
    println!("{}", "-".repeat(45));
    for i in 0..d.original.len() {
        println!(
            "{:<12} {:>10.2} {:>10.2} {:>10.2}",
            d.dates[i], d.original[i], d.trend[i], d.residual[i]
        );
    }
}

fn print_quantiles(output: &QuantilesOutput) {
    if output.distributions.is_empty() {
        println!("No data");
        return;
    }
    println!(
        "{:<20} {:>6} {:>9} {:>9} {:>9} {:>9} {:>9} {:>8}",
        "Metric", "n", "Min", "Q1", "Median", "Q3", "Max", "Outside"
    );
    println!("{}", "-".repeat(86));
    for d in &output.distributions {
        println!(
            "{:<20} {:>6} {:>9.2} {:>9.2} {:>9.2} {:>9.2} {:>9.2} {:>8}",
            d.metric, d.count, d.min, d.q1, d.median, d.q3, d.max, d.outlier_count
        );
    }
    if !output.quantiles.is_empty() {
        println!();
        for row in &output.quantiles {
            println!("{:<20} p{:<6} {:>9.3}", row.metric, row.p, row.value);
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max.saturating_sub(1)).chain(['~']).collect()
    }
}
