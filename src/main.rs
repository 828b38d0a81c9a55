use clap::Parser;
use quizreport::batch::{collect_reports, normalize_files, render_batch};
use quizreport::cli::{Args, Command};
use quizreport::config::Config;
use quizreport::logging::setup_logging;
use quizreport::renaissance::RenaissanceApi;
use quizreport::report::QuizRecord;
use quizreport::report::summary::BatchSummary;
use quizreport::utils::fmt_duration;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info};

async fn run(command: &Command, config: &Config) -> anyhow::Result<Vec<QuizRecord>> {
    match command {
        Command::Parse { files } => Ok(normalize_files(files)),
        Command::Fetch => {
            let session = config.session()?;
            let api = RenaissanceApi::new(
                &config.renaissance_base_url,
                &session,
                config.request_timeout,
            )?;
            Ok(collect_reports(&api, config.request_delay).await?)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Logging depends on config, so a config error can only go to stderr directly
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    };
    setup_logging(&config, args.tracing);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        command = ?args.command,
        "starting quizreport"
    );

    let start = Instant::now();
    let records = match run(&args.command, &config).await {
        Ok(records) => records,
        Err(e) => {
            error!(error = ?e, "Batch aborted");
            return ExitCode::FAILURE;
        }
    };

    if args.summary {
        let summary = BatchSummary::from_records(&records);
        info!(
            total = summary.total,
            failed = summary.failed,
            average = summary.average,
            best = summary.best,
            "Batch summary"
        );
    }

    match render_batch(&records) {
        Ok(output) => {
            println!("{output}");
            info!(
                records = records.len(),
                elapsed = fmt_duration(start.elapsed()),
                "Batch written"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = ?e, "Failed to write batch");
            ExitCode::FAILURE
        }
    }
}
