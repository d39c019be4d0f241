//! Offline detection.
//!
//! A [`ConnectivityMonitor`] probes the network periodically and publishes
//! a [`ConnectivityStatus`]. When connectivity returns, `was_offline`
//! stays set for a short recovery window so the UI can show that data is
//! catching up.

mod monitor;
mod tracker;

pub use monitor::{
    AlwaysOnline, ConnectivityHandle, ConnectivityMonitor, ConnectivityProbe, MonitorOptions,
    TcpProbe,
};
pub use tracker::{
    ConnectivityEvent, ConnectivityStatus, ConnectivityTracker, DEFAULT_RECOVERY_WINDOW,
};
