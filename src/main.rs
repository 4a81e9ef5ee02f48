use chrono::Utc;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recall_sched::config;
use recall_sched::replay::{self, ReplayInput};

fn main() -> ExitCode {
  // Logs go to stderr so stdout stays valid JSON
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "recall_sched=info".into()),
    )
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();

  let Some(path) = std::env::args().nth(1) else {
    eprintln!("usage: recall-replay <history.json>");
    return ExitCode::from(2);
  };

  match run(Path::new(&path)) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      tracing::error!("{}", e);
      ExitCode::FAILURE
    }
  }
}

fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
  let contents = std::fs::read_to_string(path)?;
  let input: ReplayInput = serde_json::from_str(&contents)?;

  let params = match input.parameters {
    Some(params) => {
      params.validate()?;
      tracing::info!("Using scheduling parameters from {}", path.display());
      params
    }
    None => config::load_parameters()?,
  };

  let now = input.now.unwrap_or_else(Utc::now);
  tracing::info!("Replaying {} review events", input.events.len());

  let cards = replay::replay(&input.events, &params, now)?;
  println!("{}", serde_json::to_string_pretty(&cards)?);
  Ok(())
}
