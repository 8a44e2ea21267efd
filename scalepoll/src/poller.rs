//! Periodic polling cycle
//!
//! One cycle is discover → request → decode → store, strictly in that
//! order. Any failure before the store degrades to a not-connected record;
//! nothing a single cycle does can stop the schedule.

use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

use scalepoll_types::Record;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::scale::Scale;
use crate::sink::ReadingSink;

/// Default time between cycles
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Default number of records held while the sink is unavailable
pub const DEFAULT_BACKLOG: usize = 1440;

/// Drives polling cycles against one scale and one sink
pub struct Poller<S> {
    scale: Scale,
    sink: S,
    interval: Duration,
    backlog: VecDeque<Record>,
    backlog_capacity: usize,
}

impl<S: ReadingSink> Poller<S> {
    pub fn new(scale: Scale, sink: S) -> Self {
        Self {
            scale,
            sink,
            interval: DEFAULT_INTERVAL,
            backlog: VecDeque::new(),
            backlog_capacity: DEFAULT_BACKLOG,
        }
    }

    /// Build a poller from a loaded configuration
    pub fn from_config(config: &Config, sink: S) -> Result<Self> {
        Ok(Self::new(Scale::new(&config.device)?, sink)
            .with_interval(config.poll.interval())
            .with_backlog(config.sink.backlog))
    }

    /// Set time between cycles
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set how many unsaved records to keep while the sink fails
    pub fn with_backlog(mut self, capacity: usize) -> Self {
        self.backlog_capacity = capacity.max(1);
        self
    }

    /// Records produced but not yet accepted by the sink
    pub fn pending(&self) -> usize {
        self.backlog.len()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Run one full cycle and return the record it produced
    ///
    /// The record is queued before it is stored, so a failing sink never
    /// loses it; queued records are retried oldest first on later cycles.
    pub async fn poll_once(&mut self) -> Record {
        let record = match self.scale.read_weight().await {
            Ok(reading) => Record::connected(reading),
            Err(e) => {
                log_cycle_failure(&e);
                Record::not_connected()
            }
        };

        self.enqueue(record.clone());
        self.flush().await;

        record
    }

    /// Poll every interval until `shutdown` resolves
    ///
    /// The first cycle starts immediately. A cycle already in progress is
    /// allowed to finish.
    pub async fn run_until<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!("Polling every {:?}", self.interval);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Poller stopped");
                    break;
                }
                _ = ticker.tick() => {
                    self.poll_once().await;
                }
            }
        }

        if !self.backlog.is_empty() {
            warn!(pending = self.backlog.len(), "Stopping with unsaved records");
        }
    }

    fn enqueue(&mut self, record: Record) {
        if self.backlog.len() >= self.backlog_capacity {
            if let Some(dropped) = self.backlog.pop_front() {
                warn!(
                    recorded_at = %dropped.recorded_at,
                    "Backlog full, dropping oldest unsaved record"
                );
            }
        }
        self.backlog.push_back(record);
    }

    async fn flush(&mut self) {
        while let Some(record) = self.backlog.front() {
            match self.sink.store(record).await {
                Ok(()) => {
                    info!(
                        weight = record.weight,
                        division = record.division,
                        stable = record.stable,
                        connected = record.connected,
                        "Record stored"
                    );
                    self.backlog.pop_front();
                }
                Err(e) => {
                    warn!(pending = self.backlog.len(), "Sink unavailable: {}", e);
                    break;
                }
            }
        }
    }
}

fn log_cycle_failure(e: &Error) {
    match e {
        Error::DiscoveryTimeout(_) => warn!("No scale found: {}", e),
        _ if e.is_protocol_drift() => error!("Scale sent an unexpected frame: {}", e),
        _ => warn!("Cycle failed: {}", e),
    }
}
