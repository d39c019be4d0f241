//! Background connectivity monitor.

use super::{ConnectivityEvent, ConnectivityStatus, ConnectivityTracker};
use crate::config::ConnectivityConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Something that can tell whether the network is reachable.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// Probe once.
    async fn is_online(&self) -> bool;
}

/// Probe that opens a TCP connection to a well-known address.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    addr: String,
    timeout: Duration,
}

impl TcpProbe {
    /// Create a probe for `host:port`.
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }
}

#[async_trait]
impl ConnectivityProbe for TcpProbe {
    async fn is_online(&self) -> bool {
        match tokio::time::timeout(self.timeout, TcpStream::connect(&self.addr)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                tracing::debug!(addr = %self.addr, error = %e, "connectivity probe failed");
                false
            }
            Err(_) => {
                tracing::debug!(addr = %self.addr, "connectivity probe timed out");
                false
            }
        }
    }
}

/// Probe that always reports online; used when probing is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOnline;

#[async_trait]
impl ConnectivityProbe for AlwaysOnline {
    async fn is_online(&self) -> bool {
        true
    }
}

/// Monitor timing.
#[derive(Debug, Clone, Copy)]
pub struct MonitorOptions {
    /// Time between probes.
    pub probe_interval: Duration,
    /// How long `was_offline` stays set after recovery.
    pub recovery_window: Duration,
}

impl From<&ConnectivityConfig> for MonitorOptions {
    fn from(config: &ConnectivityConfig) -> Self {
        Self {
            probe_interval: Duration::from_millis(config.probe_interval_ms.max(100)),
            recovery_window: Duration::from_millis(config.recovery_window_ms),
        }
    }
}

enum Command {
    Check(oneshot::Sender<bool>),
    ResetWasOffline,
}

/// Spawns the monitoring task.
pub struct ConnectivityMonitor;

impl ConnectivityMonitor {
    /// Build a probe from configuration.
    pub fn probe_from_config(config: &ConnectivityConfig) -> Arc<dyn ConnectivityProbe> {
        if config.enabled {
            Arc::new(TcpProbe::new(
                config.probe_addr.clone(),
                Duration::from_millis(config.probe_timeout_ms),
            ))
        } else {
            Arc::new(AlwaysOnline)
        }
    }

    /// Start monitoring. Transitions are delivered on the returned receiver.
    pub fn spawn(
        probe: Arc<dyn ConnectivityProbe>,
        options: MonitorOptions,
    ) -> (ConnectivityHandle, mpsc::UnboundedReceiver<ConnectivityEvent>) {
        let (status_tx, status_rx) = watch::channel(ConnectivityStatus::default());
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(run(probe, options, status_tx, event_tx, command_rx));

        (
            ConnectivityHandle {
                command_tx,
                status_rx,
                task,
            },
            event_rx,
        )
    }
}

async fn run(
    probe: Arc<dyn ConnectivityProbe>,
    options: MonitorOptions,
    status_tx: watch::Sender<ConnectivityStatus>,
    event_tx: mpsc::UnboundedSender<ConnectivityEvent>,
    mut command_rx: mpsc::UnboundedReceiver<Command>,
) {
    let initially_online = probe.is_online().await;
    let mut tracker = ConnectivityTracker::new(initially_online, options.recovery_window);
    status_tx.send_replace(tracker.status());
    if !initially_online {
        tracing::info!("starting offline");
        let _ = event_tx.send(ConnectivityEvent::WentOffline);
    }

    let period = options.probe_interval;
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let observe = |tracker: &mut ConnectivityTracker, online: bool| {
        if let Some(event) = tracker.observe(online, Instant::now()) {
            tracing::info!(?event, "connectivity changed");
            let _ = event_tx.send(event);
        }
        status_tx.send_if_modified(|status| {
            let changed = *status != tracker.status();
            *status = tracker.status();
            changed
        });
    };

    loop {
        let deadline = tracker.recovery_deadline();

        tokio::select! {
            _ = ticker.tick() => {
                let online = probe.is_online().await;
                observe(&mut tracker, online);
            }

            _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if tracker.expire(Instant::now()) {
                    status_tx.send_replace(tracker.status());
                }
            }

            command = command_rx.recv() => {
                match command {
                    Some(Command::Check(reply)) => {
                        let online = probe.is_online().await;
                        observe(&mut tracker, online);
                        let _ = reply.send(online);
                    }
                    Some(Command::ResetWasOffline) => {
                        tracker.reset_was_offline();
                        status_tx.send_replace(tracker.status());
                    }
                    None => break,
                }
            }
        }
    }
}

/// Handle to a running [`ConnectivityMonitor`]. Dropping it stops the task.
pub struct ConnectivityHandle {
    command_tx: mpsc::UnboundedSender<Command>,
    status_rx: watch::Receiver<ConnectivityStatus>,
    task: JoinHandle<()>,
}

impl ConnectivityHandle {
    /// Current status.
    pub fn status(&self) -> ConnectivityStatus {
        *self.status_rx.borrow()
    }

    /// Subscribe to status changes.
    pub fn subscribe(&self) -> watch::Receiver<ConnectivityStatus> {
        self.status_rx.clone()
    }

    /// Probe immediately and return whether the network is reachable.
    pub async fn check_connection(&self) -> Result<bool> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(Command::Check(reply_tx))
            .map_err(|_| Error::channel("connectivity monitor is not running"))?;
        reply_rx
            .await
            .map_err(|_| Error::channel("connectivity monitor dropped the request"))
    }

    /// Clear the recovery indicator now.
    pub fn reset_was_offline(&self) -> Result<()> {
        self.command_tx
            .send(Command::ResetWasOffline)
            .map_err(|_| Error::channel("connectivity monitor is not running"))
    }
}

impl Drop for ConnectivityHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
