use anyhow::{Context, Result};
use std::io::Write;
use tokio::net::UdpSocket;

use pose_match::config::{Config, DriveMode};
use pose_match::osc::OscTransport;
use pose_match::scheduler;

const CONFIG_PATH: &str = "pose_match.toml";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(buf, "[{}] {} - {}", record.level(), record.target(), record.args())
        })
        .init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| CONFIG_PATH.to_string());
    let config = Config::load_or_default(&config_path)?;
    config
        .validate()
        .with_context(|| format!("invalid configuration in {}", config_path))?;

    log::info!("pose-match ({})", env!("GIT_VERSION"));
    log::info!("  Listen: {}", config.osc.listen_addr);
    log::info!("  Target: {}", config.osc.target_addr);
    match config.mode {
        DriveMode::Periodic => log::info!("  Mode: periodic ({} ms)", config.interval_ms),
        DriveMode::Synchronous => log::info!("  Mode: synchronous"),
    }
    log::info!(
        "  Joints: {} ({}D{})",
        config.pose.joints.len(),
        config.pose.dimensions,
        if config.pose.normalize { ", normalized" } else { "" }
    );
    log::info!("  Reference poses: {}", config.pose.match_vectors.len());
    if config.gate.delta_validation {
        log::info!(
            "  Gate: {} z={}±{} |x|<{}",
            config.gate.reference_joint,
            config.gate.z_reference,
            config.gate.z_delta,
            config.gate.x_delta
        );
    }
    if config.verbose {
        log::info!("  Verbose mode: ON");
    }

    let socket = UdpSocket::bind(&config.osc.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.osc.listen_addr))?;
    let transport = OscTransport::new(&config.osc.target_addr)?;

    scheduler::run(&config, socket, transport).await?;
    Ok(())
}
