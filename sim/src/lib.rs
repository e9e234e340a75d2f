use std::{path::PathBuf, sync::LazyLock};

use clap::Parser;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use lezg_engine::{
  command::Command,
  engine::{IncomingUpdate, OutgoingReply},
};

pub mod config;
pub mod runner;

pub static CLI: LazyLock<Cli> = LazyLock::new(Cli::parse);

#[derive(Parser)]
pub struct Cli {
  /// The seed to use for the random number generator.
  #[arg(short, long)]
  pub seed: Option<u64>,

  /// The path to the config file.
  #[arg(short, long, default_value = None)]
  pub config_path: Option<PathBuf>,

  /// A scenario file to load on startup.
  #[arg(long, default_value = None)]
  pub scenario: Option<PathBuf>,

  /// Write daily rolling log files into this directory instead of stderr.
  #[arg(long, default_value = None)]
  pub log_dir: Option<PathBuf>,

  /// Run this many ticks and exit.
  #[arg(long)]
  pub ticks: Option<usize>,
}

/// Serialises every update as one JSON line.
pub async fn broadcast_updates_to<W>(
  mut writer: W,
  mut update_rx: async_broadcast::Receiver<OutgoingReply>,
) where
  W: AsyncWrite + Unpin,
{
  loop {
    let update = match update_rx.recv().await {
      Ok(update) => update,
      Err(async_broadcast::RecvError::Overflowed(skipped)) => {
        tracing::warn!("Writer fell behind, skipped {skipped} updates");
        continue;
      }
      Err(async_broadcast::RecvError::Closed) => break,
    };

    let mut ser = match serde_json::to_string(&update) {
      Ok(ser) => ser,
      Err(e) => {
        tracing::error!("Unable to serialise update: {e}");
        continue;
      }
    };
    ser.push('\n');

    if let Err(e) = writer.write_all(ser.as_bytes()).await {
      tracing::error!("Unable to send update: {e}");
      break;
    }
    if let Err(e) = writer.flush().await {
      tracing::error!("Unable to flush update: {e}");
      break;
    }

    tracing::trace!("Sent update");
  }
}

/// Parses one JSON command per line and forwards it to the engine. Lines that
/// don't parse are answered with an error on the update channel.
pub async fn receive_commands_from<R>(
  reader: R,
  update_tx: async_broadcast::Sender<OutgoingReply>,
  command_tx: async_channel::Sender<IncomingUpdate>,
) where
  R: AsyncBufRead + Unpin,
{
  let mut lines = reader.lines();
  loop {
    let line = match lines.next_line().await {
      Ok(Some(line)) => line,
      Ok(None) => break,
      Err(e) => {
        tracing::error!("Unable to receive command: {e}");
        break;
      }
    };

    let line = line.trim();
    if line.is_empty() {
      continue;
    }

    let command: Command = match serde_json::from_str(line) {
      Ok(command) => command,
      Err(e) => {
        tracing::error!("Received malformed command: {e}");
        let _ = update_tx
          .try_broadcast(OutgoingReply::Error(format!(
            "malformed command: {e}"
          )))
          .inspect_err(|e| tracing::warn!("failed to broadcast error: {}", e));
        continue;
      }
    };

    tracing::debug!("Received command message: length {}", line.len());
    if command_tx
      .send(IncomingUpdate::Command(command))
      .await
      .is_err()
    {
      break;
    }
  }

  tracing::info!("Command input closed");
}
