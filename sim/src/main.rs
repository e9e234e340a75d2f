use std::path::Path;

use tokio::io::BufReader;
use tracing_appender::non_blocking::WorkerGuard;

use lezg_engine::{engine::Engine, scenario::Scenario};
use lezg_sim::{
  CLI, broadcast_updates_to,
  config::{Config, Settings},
  receive_commands_from,
  runner::Runner,
};

/// stdout carries the JSON updates, so logs go to stderr or to files.
fn init_logging(log_dir: Option<&Path>) -> Option<WorkerGuard> {
  match log_dir {
    Some(dir) => {
      let appender = tracing_appender::rolling::daily(dir, "lezg.log");
      let (writer, guard) = tracing_appender::non_blocking(appender);
      tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .init();

      Some(guard)
    }
    None => {
      tracing_subscriber::fmt().with_writer(std::io::stderr).init();
      None
    }
  }
}

#[tokio::main]
async fn main() {
  let guard = init_logging(CLI.log_dir.as_deref());

  let config = match Config::load(CLI.config_path.as_deref()) {
    Ok(config) => config,
    Err(e) => {
      tracing::error!("{e}");
      std::process::exit(1);
    }
  };
  let settings = Settings::resolve(config, &CLI);

  let airspace = match settings.airspace() {
    Ok(airspace) => airspace,
    Err(e) => {
      tracing::error!("{e}");
      std::process::exit(1);
    }
  };

  let mut engine = Engine::new(airspace, settings.seed);
  engine.multiplier = settings.multiplier;
  engine.paused = settings.paused;

  if let Some(path) = &settings.scenario {
    match Scenario::from_path(path) {
      Ok(scenario) => {
        engine.load_scenario(scenario);
      }
      Err(e) => {
        tracing::error!("Unable to load {}: {e}", path.display());
        std::process::exit(1);
      }
    }
  }

  let (command_tx, command_rx) = async_channel::unbounded();
  let (mut update_tx, update_rx) = async_broadcast::broadcast(256);
  update_tx.set_overflow(true);

  let reader_handle = tokio::spawn(receive_commands_from(
    BufReader::new(tokio::io::stdin()),
    update_tx.clone(),
    command_tx,
  ));
  let writer_handle =
    tokio::spawn(broadcast_updates_to(tokio::io::stdout(), update_rx));

  tracing::info!(
    "Running at {} tps, {}x, seed {}",
    settings.tick_rate,
    settings.multiplier,
    settings.seed
  );

  let mut runner =
    Runner::new(engine, command_rx, update_tx, settings.tick_rate);
  runner.begin_loop(settings.ticks).await;
  runner.close();

  reader_handle.abort();
  if let Err(e) = writer_handle.await {
    tracing::error!("Writer task failed: {e}");
  }

  // A pending stdin read can't be cancelled and would hold up the runtime.
  drop(guard);
  std::process::exit(0);
}
