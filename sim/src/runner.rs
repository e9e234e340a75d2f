use std::time::Duration;

use async_channel::TryRecvError;
use tokio::time::MissedTickBehavior;

use lezg_engine::{
  command::Command,
  engine::{Engine, IncomingUpdate, OutgoingReply},
};

pub struct Runner {
  pub engine: Engine,

  pub receiver: async_channel::Receiver<IncomingUpdate>,
  pub sender: async_broadcast::Sender<OutgoingReply>,

  rate: usize,
}

impl Runner {
  pub fn new(
    engine: Engine,
    receiver: async_channel::Receiver<IncomingUpdate>,
    sender: async_broadcast::Sender<OutgoingReply>,
    rate: usize,
  ) -> Self {
    Self {
      engine,

      receiver,
      sender,

      rate: rate.max(1),
    }
  }

  fn broadcast(&self, reply: OutgoingReply) {
    let _ = self
      .sender
      .try_broadcast(reply)
      .inspect_err(|e| tracing::warn!("failed to broadcast update: {}", e));
  }

  pub fn execute(&mut self, command: Command) {
    let clock = matches!(
      command,
      Command::Pause | Command::Resume | Command::SetMultiplier(..)
    );

    let reply = match self.engine.execute(command) {
      Ok(reply) => OutgoingReply::Reply(reply),
      Err(e) => {
        tracing::warn!("Rejected command: {e}");
        OutgoingReply::Error(e.to_string())
      }
    };
    self.broadcast(reply);

    if clock {
      self.broadcast(self.engine.clock());
    }
  }

  /// Runs one frame. Returns false once the command input has closed.
  pub fn tick(&mut self) -> bool {
    let mut commands: Vec<Command> = Vec::new();
    let mut open = true;

    loop {
      let incoming = match self.receiver.try_recv() {
        Ok(incoming) => incoming,
        Err(TryRecvError::Closed) => {
          open = false;
          break;
        }
        Err(TryRecvError::Empty) => break,
      };

      match incoming {
        IncomingUpdate::Command(command) => commands.push(command),
      }
    }

    for command in commands {
      self.execute(command);
    }

    self.engine.advance(1.0 / self.rate as f64);
    self.broadcast(OutgoingReply::Aircraft(self.engine.snapshot()));

    open
  }

  /// Ticks at the configured rate. Stops after `ticks` frames when given,
  /// otherwise when the command input closes.
  pub async fn begin_loop(&mut self, ticks: Option<usize>) {
    let mut interval =
      tokio::time::interval(Duration::from_secs_f64(1.0 / self.rate as f64));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut count = 0;
    loop {
      interval.tick().await;

      let open = self.tick();
      count += 1;

      match ticks {
        Some(ticks) if count >= ticks => break,
        None if !open => break,
        _ => {}
      }
    }

    tracing::info!(
      "Stopped after {count} ticks at {:.1} s of sim time",
      self.engine.sim_time
    );
    self.broadcast(self.engine.clock());
  }

  /// Closes the update channel so writers drain and exit.
  pub fn close(&self) {
    self.sender.close();
  }
}
