//! Domain Dataset Builder - Main Entry Point

use std::path::PathBuf;
use std::process::ExitCode;

use domain_dataset::constants;
use domain_dataset::logic::features::{CharacterCategories, FeatureExtractor, LayoutInfo};
use domain_dataset::{DatasetError, Pipeline, PipelineConfig};

const USAGE: &str = "\
Usage: domain-dataset [--config PATH] <COMMAND>

Commands:
  run               assemble, clean and split
  assemble          build the combined dataset from all sources
  clean             deduplicate the combined dataset and assign ids
  split             write train/val/test splits and the manifest
  inspect DOMAIN..  print the features of each domain
  layout            print the dataset layout";

#[derive(Debug, PartialEq)]
enum Command {
    Run,
    Assemble,
    Clean,
    Split,
    Inspect(Vec<String>),
    Layout,
    Help,
}

#[derive(Debug, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    command: Command,
}

fn parse_args<I: Iterator<Item = String>>(mut args: I) -> Result<Args, String> {
    let mut config = None;
    let mut command = None;
    let mut rest = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-c" | "--config" => {
                let path = args.next().ok_or("--config needs a path")?;
                config = Some(PathBuf::from(path));
            }
            "-h" | "--help" => return Ok(Args { config, command: Command::Help }),
            _ if command.is_none() => command = Some(arg),
            _ => rest.push(arg),
        }
    }

    let command = match command.as_deref() {
        Some("run") => Command::Run,
        Some("assemble") => Command::Assemble,
        Some("clean") => Command::Clean,
        Some("split") => Command::Split,
        Some("layout") => Command::Layout,
        Some("inspect") if rest.is_empty() => return Err("inspect needs at least one domain".into()),
        Some("inspect") => Command::Inspect(std::mem::take(&mut rest)),
        Some("help") | None => Command::Help,
        Some(other) => return Err(format!("unknown command '{}'", other)),
    };

    if !rest.is_empty() {
        return Err(format!("unexpected arguments: {}", rest.join(" ")));
    }

    Ok(Args { config, command })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), DatasetError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn execute(args: Args) -> Result<(), DatasetError> {
    match args.command {
        Command::Help => {
            println!("{}", USAGE);
            Ok(())
        }
        Command::Layout => print_json(&LayoutInfo::current()),
        Command::Inspect(domains) => {
            let categories = CharacterCategories::standard();
            let extractor = FeatureExtractor::new(&categories);
            let entries: Vec<_> = domains
                .iter()
                .map(|d| extractor.extract(d).features.to_log_entry(d))
                .collect();
            print_json(&entries)
        }
        command => {
            let path = PipelineConfig::discover(args.config.as_deref(), constants::get_config_path())?;
            let pipeline = Pipeline::new(PipelineConfig::load(&path)?);

            match command {
                Command::Assemble => print_json(&pipeline.assemble()?),
                Command::Clean => print_json(&pipeline.clean()?),
                Command::Split => print_json(&pipeline.split()?),
                _ => print_json(&pipeline.run()?),
            }
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("error: {}\n\n{}", msg, USAGE);
            return ExitCode::from(2);
        }
    };

    log::debug!("{} v{}: {:?}", constants::APP_NAME, constants::APP_VERSION, args.command);

    match execute(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
