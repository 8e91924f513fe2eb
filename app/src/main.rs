use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, error::ErrorKind};
use common::{ReportError, error::EXIT_FAILURE};
use eyre::Result;
use tracing::error;
use tracing_subscriber::{
    EnvFilter,
    fmt::{layer, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

mod report;

/// sysexits `EX_USAGE`
const EXIT_USAGE: u8 = 64;

/// Plot memory pool benchmark results against the pool enlarge step
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// Tag appended to every generated image name
    image_output_tag: String,
    /// Benchmark results JSON file
    json_file: PathBuf,
    /// Only plot pattern_<N>
    #[arg(short, long)]
    pattern: Option<usize>,
    /// Directory for generated images [default: tests/results]
    #[arg(long)]
    results_dir: Option<PathBuf>,
    /// YAML chart settings
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Extra tracing filter directives
    #[arg(short, long)]
    log: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(err) => {
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    _ = err.print();
                    ExitCode::SUCCESS
                }
                _ => {
                    print!("{}", err.render());
                    ExitCode::from(EXIT_USAGE)
                }
            };
        }
    };

    if let Err(err) = init_logging(&args.log) {
        println!("Invalid --log directive: {err}");
        return ExitCode::from(EXIT_USAGE);
    }

    let Err(err) = run(args).await else {
        return ExitCode::SUCCESS;
    };
    error!("{err:#}");
    match err.downcast_ref::<ReportError>() {
        Some(report_err) => {
            if let ReportError::InvalidJson { .. } = report_err {
                println!("{report_err}");
            }
            ExitCode::from(report_err.exit_code())
        }
        None => ExitCode::from(EXIT_FAILURE),
    }
}

async fn run(args: Cli) -> Result<()> {
    let settings = report::load_settings(args.config.as_deref(), args.results_dir).await?;
    report::run(
        &args.image_output_tag,
        &args.json_file,
        args.pattern,
        &settings,
    )
    .await
}

fn init_logging(directives: &[String]) -> Result<()> {
    let log_level = std::env::var("RUST_LOG").unwrap_or("warn".to_owned());
    let mut env_filter = EnvFilter::new(format!("pool_report={log_level},common={log_level}"));
    for directive in directives {
        env_filter = env_filter.add_directive(directive.parse()?);
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            layer()
                .with_writer(std::io::stderr)
                .with_timer(ChronoLocal::new("%v %k:%M:%S %z".to_owned()))
                .compact(),
        )
        .init();
    Ok(())
}
