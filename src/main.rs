use anyhow::{bail, Context};
use std::path::PathBuf;
use stonepath::{init_logging, run_jobs, Config, BUILD_DATE, VERSION};

const USAGE: &str = "Usage: stonepath [--config <file>] <job.json>...";

struct Args {
    config: Option<PathBuf>,
    jobs: Vec<PathBuf>,
}

fn parse_args() -> anyhow::Result<Option<Args>> {
    let mut args = std::env::args().skip(1);
    let mut config = None;
    let mut jobs = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                println!("{USAGE}");
                return Ok(None);
            }
            "-V" | "--version" => {
                println!("stonepath {VERSION} (built {BUILD_DATE})");
                return Ok(None);
            }
            "-c" | "--config" => {
                let path = args.next().context("--config needs a file")?;
                config = Some(PathBuf::from(path));
            }
            flag if flag.starts_with('-') => bail!("unknown option {flag}\n{USAGE}"),
            job => jobs.push(PathBuf::from(job)),
        }
    }

    if jobs.is_empty() {
        bail!("no job files given\n{USAGE}");
    }
    Ok(Some(Args { config, jobs }))
}

fn main() -> anyhow::Result<()> {
    let Some(args) = parse_args()? else {
        return Ok(());
    };

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => match Config::default_path() {
            Ok(path) => Config::load_or_default(&path)?,
            Err(_) => Config::default(),
        },
    };

    init_logging(&config.general.log_level, config.general.log_json)?;
    tracing::info!("stonepath {} starting with {} job(s)", VERSION, args.jobs.len());

    for report in run_jobs(&args.jobs, &config)? {
        println!(
            "{}: {} placements ({}) -> {}",
            report.name,
            report.count,
            report.operation,
            report.output.display()
        );
    }

    Ok(())
}
