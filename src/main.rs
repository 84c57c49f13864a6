use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};

use dtwpar_dtw::{Assembled, BatchDtw, Dtw, Series, pairwise_dtw};
use dtwpar_io::{
    DtwType, ExperimentName, MetricName, PairReader, ResultWriter, Settings, TensorReader,
    render_json,
};

#[derive(Parser)]
#[command(name = "dtwpar")]
#[command(about = "Dynamic Time Warping distances for univariate and multivariate time series")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON settings file (see `init-config`); built-in defaults when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of worker threads for tensor mode (overrides the settings file)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Per-run overrides of the settings file.
#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Point distance: euclidean, sqeuclidean, cityblock, chebyshev or minkowski
    #[arg(long)]
    metric: Option<String>,

    /// Order of the Minkowski distance
    #[arg(long)]
    minkowski_p: Option<f64>,

    /// Multivariate mode: dependent (d) or independent (i)
    #[arg(long)]
    mode: Option<String>,

    /// Include cost grids and warping paths in pairwise output
    #[arg(long, default_value_t = false)]
    visualize: bool,

    /// Also write result files to this directory
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
    #[arg(long, default_value = "dtw")]
    experiment: String,
}

#[derive(Subcommand)]
enum Command {
    /// Compare the two series stored in a delimited pair file
    Pair {
        /// Path to the pair file (2 x dims records, no header)
        #[arg(long)]
        data: PathBuf,

        /// Dimensions per series; the first `dims` records are x, the rest y
        #[arg(long, default_value_t = 1)]
        dims: usize,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Compare two univariate series given on the command line
    Values {
        /// Values of the first series
        #[arg(long, num_args = 1.., required = true, allow_negative_numbers = true)]
        x: Vec<f64>,

        /// Values of the second series
        #[arg(long, num_args = 1.., required = true, allow_negative_numbers = true)]
        y: Vec<f64>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Compute the distance matrix of a .npy tensor against itself or another tensor
    Tensor {
        /// Path to an (N, T, D) or (N, T) float64 .npy file
        #[arg(long)]
        data: PathBuf,

        /// Optional second tensor; rows come from --data, columns from --other
        #[arg(long)]
        other: Option<PathBuf>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Write a settings file with default values
    InitConfig {
        /// Destination path; an existing file is never overwritten
        #[arg(long, default_value = "dtwpar.json")]
        path: PathBuf,
    },
}

fn load_settings(config: Option<&Path>) -> Result<Settings> {
    match config {
        Some(path) => Settings::load(path).context("failed to load settings file"),
        None => Ok(Settings::default()),
    }
}

fn apply_overrides(mut settings: Settings, run: &RunArgs, threads: Option<usize>) -> Result<Settings> {
    if let Some(metric) = &run.metric {
        settings.distance = metric.parse::<MetricName>()?;
    }
    if let Some(p) = run.minkowski_p {
        settings.minkowski_p = p;
    }
    if let Some(mode) = &run.mode {
        settings.dtw_type = mode.parse::<DtwType>()?;
    }
    if let Some(threads) = threads {
        settings.n_threads = threads;
    }
    settings.visualization |= run.visualize;
    settings.output_file |= run.output_dir.is_some();
    settings.validate().context("invalid run settings")?;
    Ok(settings)
}

/// `--verbose` wins over `--quiet`; the settings level applies unless `--quiet` alone is given.
fn log_filter(cli: &Cli, settings: &Settings) -> &'static str {
    match (cli.verbose, cli.quiet, settings.verbose) {
        (true, _, 2..) | (false, false, 2..) => "trace",
        (true, _, _) | (false, false, 1) => "debug",
        (false, true, _) => "error",
        _ => "info",
    }
}

/// Print `result` as JSON and, when requested, write it to the output directory.
fn emit(result: &Assembled, run: &RunArgs, settings: &Settings) -> Result<()> {
    if settings.output_file {
        let output_dir = run.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        let experiment = ExperimentName::new(run.experiment.clone())?;
        let writer = ResultWriter::new(&output_dir, experiment)?;
        writer.write(result).context("failed to write result files")?;
    }
    println!("{}", render_json(result)?);
    Ok(())
}

fn compare_pair(x: &Series, y: &Series, run: &RunArgs, settings: &Settings) -> Result<()> {
    let result = pairwise_dtw(
        x,
        y,
        settings.mode(),
        &settings.metric(),
        settings.visualization,
    )
    .context("DTW computation failed")?;
    info!(distance = %result.distance(), "pairwise distance computed");
    emit(&Assembled::from(&result), run, settings)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&cli, &settings))
        .with_writer(std::io::stderr)
        .init();
    debug!(?settings, "settings resolved");

    match &cli.command {
        Command::Pair { data, dims, run } => {
            let settings = apply_overrides(settings, run, cli.threads)?;
            let pair = PairReader::new(data, *dims)
                .with_delimiter(settings.delimiter_byte())
                .read()
                .context("failed to read pair file")?;
            compare_pair(&pair.x, &pair.y, run, &settings)?;
        }

        Command::Values { x, y, run } => {
            let settings = apply_overrides(settings, run, cli.threads)?;
            let x = Series::univariate(x.clone()).context("invalid --x series")?;
            let y = Series::univariate(y.clone()).context("invalid --y series")?;
            compare_pair(&x, &y, run, &settings)?;
        }

        Command::Tensor { data, other, run } => {
            let settings = apply_overrides(settings, run, cli.threads)?;
            let rows = TensorReader::new(data)
                .read()
                .context("failed to read tensor")?;
            let cols = other
                .as_deref()
                .map(|path| TensorReader::new(path).read())
                .transpose()
                .context("failed to read second tensor")?;

            let dtw = Dtw::new(settings.metric()).with_mode(settings.mode());
            let batch = BatchDtw::new(dtw, settings.n_threads)
                .context("failed to start worker pool")?;
            let matrix = batch
                .run(&rows, cols.as_ref())
                .context("batch DTW failed")?;
            info!(rows = matrix.rows(), cols = matrix.cols(), "distance matrix computed");
            emit(&Assembled::from(&matrix), run, &settings)?;
        }

        Command::InitConfig { path } => {
            Settings::write_default(path).context("failed to write settings file")?;
            info!(path = %path.display(), "settings file created");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args() -> RunArgs {
        RunArgs {
            metric: None,
            minkowski_p: None,
            mode: None,
            visualize: false,
            output_dir: None,
            experiment: "dtw".to_string(),
        }
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn overrides_replace_settings() {
        let run = RunArgs {
            metric: Some("chebyshev".to_string()),
            mode: Some("i".to_string()),
            visualize: true,
            output_dir: Some(PathBuf::from("out")),
            ..run_args()
        };
        let s = apply_overrides(Settings::default(), &run, Some(3)).unwrap();
        assert_eq!(s.distance, MetricName::Chebyshev);
        assert_eq!(s.dtw_type, DtwType::Independent);
        assert_eq!(s.n_threads, 3);
        assert!(s.visualization);
        assert!(s.output_file);
    }

    #[test]
    fn zero_threads_override_rejected() {
        assert!(apply_overrides(Settings::default(), &run_args(), Some(0)).is_err());
    }

    #[test]
    fn verbose_wins_over_quiet() {
        let parse = |args: &[&str]| Cli::try_parse_from(args).unwrap();
        let settings = Settings::default();
        let both = parse(&["dtwpar", "--verbose", "--quiet", "init-config"]);
        assert_eq!(log_filter(&both, &settings), "debug");
        let quiet = parse(&["dtwpar", "--quiet", "init-config"]);
        assert_eq!(log_filter(&quiet, &settings), "error");
        let plain = parse(&["dtwpar", "init-config"]);
        assert_eq!(log_filter(&plain, &settings), "info");

        let chatty = Settings {
            verbose: 2,
            ..Settings::default()
        };
        assert_eq!(log_filter(&both, &chatty), "trace");
        assert_eq!(log_filter(&quiet, &chatty), "error");
    }

    #[test]
    fn negative_values_parse() {
        let cli = Cli::try_parse_from(["dtwpar", "values", "--x", "-1", "2", "--y", "0.5"]).unwrap();
        match cli.command {
            Command::Values { x, y, .. } => {
                assert_eq!(x, vec![-1.0, 2.0]);
                assert_eq!(y, vec![0.5]);
            }
            _ => panic!("expected values subcommand"),
        }
    }
}
