use anyhow::{bail, Context, Result};
use conflict_experiment::TaskKind;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod app;
pub use app::App;

const USAGE: &str =
    "Usage: conflict-tasks <flanker|stroop> [--config PATH] [--seed N] [--group N]";

#[derive(Debug)]
pub struct Args {
    pub task: TaskKind,
    pub config: Option<PathBuf>,
    pub seed: u64,
    pub group: Option<i32>,
}

fn parse_args() -> Result<Option<Args>> {
    let args: Vec<String> = std::env::args().collect();
    let mut task = None;
    let mut config = None;
    let mut seed = 42u64;
    let mut group = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                let path = args.get(i).context("--config needs a path")?;
                config = Some(PathBuf::from(path));
            }
            "--seed" => {
                i += 1;
                let value = args.get(i).context("--seed needs a value")?;
                seed = value
                    .parse()
                    .with_context(|| format!("invalid --seed value: {value}"))?;
            }
            "--group" => {
                i += 1;
                let value = args.get(i).context("--group needs a value")?;
                group = Some(
                    value
                        .parse()
                        .with_context(|| format!("invalid --group value: {value}"))?,
                );
            }
            "--help" | "-h" => {
                println!("{USAGE}");
                println!();
                println!("Options:");
                println!("  --config PATH  JSON task settings; missing keys keep their defaults");
                println!("  --seed N       RNG seed for the schedule and simulated participant");
                println!("                 (default: 42)");
                println!("  --group N      Counterbalancing group 0..=14, picks the key mapping");
                return Ok(None);
            }
            other if task.is_none() && !other.starts_with('-') => {
                task = Some(other.parse::<TaskKind>().map_err(anyhow::Error::msg)?);
            }
            other => bail!("unexpected argument '{other}'\n{USAGE}"),
        }
        i += 1;
    }

    let Some(task) = task else {
        bail!("missing task name\n{USAGE}");
    };
    Ok(Some(Args {
        task,
        config,
        seed,
        group,
    }))
}

fn main() -> Result<()> {
    // stdout carries the data export, so logs go to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let Some(args) = parse_args()? else {
        return Ok(());
    };
    let app = App::new(args)?;
    app.run()?;

    Ok(())
}
