//! Domain configuration harness.
//!
//! Usage:
//!   domain-harness init [--env-name dc_bossfight] [--experiments-dir DIR] [--cache-name NAME] [--config FILE]
//!   domain-harness show <config.json>
//!   domain-harness set <config.json> key=value... [--no-cache]
//!   domain-harness validate <config.json>
//!
//! `init` prints the bound configuration path; pass it to the engine as its
//! domain config path.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use domain_harness::{commands, HarnessConfig};
use domain_shared::registry::PresetRegistry;
use tracing::info;

enum Command {
    Init(HarnessConfig),
    Show(PathBuf),
    Set {
        path: PathBuf,
        assignments: Vec<String>,
        cache: bool,
    },
    Validate(PathBuf),
}

fn parse_init(args: &[String]) -> anyhow::Result<HarnessConfig> {
    let mut cfg = HarnessConfig::default();

    // A config file, if given, is applied before the other flags.
    if let Some(pos) = args.iter().position(|a| a == "--config") {
        let path = args.get(pos + 1).context("--config needs a path")?;
        let text = std::fs::read_to_string(path).with_context(|| format!("read {path}"))?;
        cfg = HarnessConfig::from_json_str(&text).with_context(|| format!("parse {path}"))?;
    }

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--env-name" if i + 1 < args.len() => {
                cfg.env_name = args[i + 1].clone();
                i += 2;
            }
            "--experiments-dir" if i + 1 < args.len() => {
                cfg.experiments_dir = args[i + 1].clone();
                i += 2;
            }
            "--cache-name" if i + 1 < args.len() => {
                cfg.cache_name = Some(args[i + 1].clone());
                i += 2;
            }
            "--config" => i += 2,
            other => bail!("unexpected argument: {other}"),
        }
    }
    Ok(cfg)
}

fn parse_args() -> anyhow::Result<Command> {
    let args: Vec<String> = env::args().skip(1).collect();
    let Some((cmd, rest)) = args.split_first() else {
        bail!("usage: domain-harness <init|show|set|validate> ...");
    };
    let path = || -> anyhow::Result<PathBuf> {
        rest.first()
            .map(PathBuf::from)
            .with_context(|| format!("{cmd} needs a configuration path"))
    };

    match cmd.as_str() {
        "init" => Ok(Command::Init(parse_init(rest)?)),
        "show" => Ok(Command::Show(path()?)),
        "validate" => Ok(Command::Validate(path()?)),
        "set" => {
            let path = path()?;
            let mut cache = true;
            let mut assignments = Vec::new();
            for arg in &rest[1..] {
                if arg == "--no-cache" {
                    cache = false;
                } else {
                    assignments.push(arg.clone());
                }
            }
            Ok(Command::Set {
                path,
                assignments,
                cache,
            })
        }
        other => bail!("unknown command: {other}"),
    }
}

fn run() -> anyhow::Result<ExitCode> {
    match parse_args()? {
        Command::Init(cfg) => {
            info!(env = %cfg.env_name, experiments_dir = %cfg.experiments_dir, "Initializing experiment");
            let registry = PresetRegistry::interactive();
            let config = commands::init(&cfg, &registry)?;
            if let Some(path) = config.bound_path() {
                println!("{}", path.display());
            }
        }
        Command::Show(path) => {
            println!("{}", commands::show(&path)?);
        }
        Command::Set {
            path,
            assignments,
            cache,
        } => {
            let report = commands::set(&path, &assignments, cache)?;
            println!("applied: {}", report.applied.join(", "));
            if !report.skipped.is_empty() {
                println!("skipped: {}", report.skipped.join(", "));
            }
            if let Some(snapshot) = report.snapshot {
                println!("snapshot: {}", snapshot.display());
            }
        }
        Command::Validate(path) => {
            let violations = commands::validate(&path)?;
            if violations.is_empty() {
                println!("ok");
            } else {
                for v in &violations {
                    println!("{v}");
                }
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    run()
}
