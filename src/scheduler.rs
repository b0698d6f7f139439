//! Event loop driving the matcher.
//!
//! One task owns the [`PoseMatcher`], so sample ingestion and evaluation never
//! run concurrently.

use anyhow::Result;
use std::future::Future;
use std::time::Instant;
use tokio::net::UdpSocket;
use tokio::time::{Interval, MissedTickBehavior};

use crate::config::{Config, ConfigError, DriveMode};
use crate::engine::{PoseMatcher, Tick};
use crate::osc::{decode_datagram, Inbound, Transport};

const RECV_BUFFER_SIZE: usize = 65_536;

/// Run until Ctrl-C
pub async fn run<T: Transport>(config: &Config, socket: UdpSocket, transport: T) -> Result<T> {
    run_until(config, socket, transport, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    })
    .await
}

/// Run until `shutdown` resolves, then hand the transport back.
pub async fn run_until<T, F>(config: &Config, socket: UdpSocket, mut transport: T, shutdown: F) -> Result<T>
where
    T: Transport,
    F: Future<Output = ()>,
{
    let mut matcher = PoseMatcher::from_config(config);
    let mut buf = vec![0u8; RECV_BUFFER_SIZE];

    let mut ticker = match config.mode {
        DriveMode::Periodic => {
            let period = config.period().ok_or(ConfigError::Interval(config.interval_ms))?;
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            Some(ticker)
        }
        DriveMode::Synchronous => None,
    };
    let synchronous = ticker.is_none();

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                log::info!("shutting down");
                return Ok(transport);
            }
            _ = next_tick(&mut ticker) => {
                let tick = matcher.tick(Instant::now());
                emit_matches(&mut transport, &tick);
            }
            received = socket.recv_from(&mut buf) => {
                let len = match received {
                    Ok((len, _)) => len,
                    Err(e) => {
                        log::warn!("receive failed: {}", e);
                        continue;
                    }
                };
                let messages = match decode_datagram(&buf[..len]) {
                    Ok(messages) => messages,
                    Err(e) => {
                        log::debug!("dropped datagram: {}", e);
                        continue;
                    }
                };
                for msg in messages {
                    handle_inbound(&mut matcher, &mut transport, msg, synchronous);
                }
            }
        }
    }
}

/// Never resolves without a ticker
async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn handle_inbound<T: Transport>(matcher: &mut PoseMatcher, transport: &mut T, msg: Inbound, synchronous: bool) {
    match msg {
        Inbound::Joint { name, x, y, z } => {
            if !matcher.handle_sample(&name, x, y, z) {
                log::trace!("untracked joint {}", name);
            }
            if synchronous {
                let tick = matcher.tick(Instant::now());
                emit_matches(transport, &tick);
            }
        }
        Inbound::PoseQuery => {
            let pose = matcher.current_pose();
            log::info!("current pose: {:?}", pose);
            if let Err(e) = transport.emit_pose(&pose) {
                log::warn!("failed to send pose: {}", e);
            }
        }
        Inbound::DebugQuery => {
            let info = matcher.debug_info();
            log::info!("center: {:?}, hands distance: {:?}", info.center, info.hands_distance);
            if let Err(e) = transport.emit_debug(&info) {
                log::warn!("failed to send debug info: {}", e);
            }
        }
    }
}

fn emit_matches<T: Transport>(transport: &mut T, tick: &Tick) {
    for m in tick.matches() {
        if let Err(e) = transport.emit_match(m) {
            log::warn!("failed to send match for pose {}: {}", m.pose_index, e);
        }
    }
}
