//! Replays a recorded A2UI message stream and prints the resulting state.
//!
//! ```text
//! a2ui-replay [--config <file>] [<input>]
//! ```
//!
//! Input is either newline-delimited envelopes or one JSON array of
//! envelopes, read from `<input>` or stdin. Failed messages are logged and
//! skipped; `RUST_LOG` controls verbosity.

use std::io::Read;
use std::path::PathBuf;

use a2ui_kit::a2ui::{A2uiMessageProcessor, ProcessorConfig};
use anyhow::{Context, bail};

struct Args {
    config: Option<PathBuf>,
    input: Option<PathBuf>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        config: None,
        input: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().context("--config expects a file")?;
                args.config = Some(PathBuf::from(path));
            }
            "-h" | "--help" => {
                println!("usage: a2ui-replay [--config <file>] [<input>]");
                std::process::exit(0);
            }
            other if other.starts_with("--") => bail!("unknown option {}", other),
            other => {
                if args.input.is_some() {
                    bail!("only one input file may be given");
                }
                args.input = Some(PathBuf::from(other));
            }
        }
    }
    Ok(args)
}

fn read_input(path: Option<&PathBuf>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = parse_args()?;

    let config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            ProcessorConfig::from_json_str(&raw).with_context(|| format!("loading {}", path.display()))?
        }
        None => ProcessorConfig::default(),
    };
    let processor = A2uiMessageProcessor::with_config(config)?;

    let input = read_input(args.input.as_ref())?;
    let (mut applied, mut failed) = (0usize, 0usize);

    if input.trim_start().starts_with('[') {
        for result in processor.process_batch(&input)? {
            match result {
                Ok(_) => applied += 1,
                Err(_) => failed += 1,
            }
        }
    } else {
        for (number, line) in input.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match processor.process_message(line) {
                Ok(_) => applied += 1,
                Err(e) => {
                    log::warn!("line {}: {}", number + 1, e);
                    failed += 1;
                }
            }
        }
    }

    log::info!("applied {} messages, {} failed", applied, failed);
    println!("{}", serde_json::to_string_pretty(&processor.snapshot())?);
    Ok(())
}
