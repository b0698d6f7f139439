//! OSC wire mapping for joint samples, queries and match events.
//!
//! Inbound:
//! - `/bodies/<id>/joints/<Joint>` x y [z]
//! - `/posematch/pose/get`
//! - `/posematch/debug/get`
//!
//! Outbound:
//! - `/posematch` poseIndex distance
//! - `/posematch/pose` v0 v1 ...
//! - `/posematch/debug` x y z handsDistance (unknown values are Nil)

use anyhow::{Context, Result};
use rosc::{decoder, encoder, OscMessage, OscPacket, OscType};
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use thiserror::Error;

use crate::engine::DebugInfo;
use crate::matcher::Match;

pub const MATCH_ADDR: &str = "/posematch";
pub const POSE_ADDR: &str = "/posematch/pose";
pub const DEBUG_ADDR: &str = "/posematch/debug";
pub const POSE_QUERY_ADDR: &str = "/posematch/pose/get";
pub const DEBUG_QUERY_ADDR: &str = "/posematch/debug/get";

#[derive(Error, Debug)]
pub enum OscError {
    #[error("decode error: {0}")]
    Decode(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A decoded inbound message
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Joint {
        name: String,
        x: f64,
        y: f64,
        z: Option<f64>,
    },
    PoseQuery,
    DebugQuery,
}

/// Joint name from `/bodies/<id>/joints/<name>`.
///
/// The `/bodies/<id>/` prefix is matched case-insensitively and `<id>` must be
/// numeric. Anything after the joint name segment is ignored. Other body
/// sub-addresses (hands, tracking state...) give `None`.
pub fn joint_name(addr: &str) -> Option<&str> {
    let mut parts = addr.strip_prefix('/')?.split('/');
    let bodies = parts.next()?;
    let id = parts.next()?;
    let kind = parts.next()?;
    let name = parts.next()?;

    if !bodies.eq_ignore_ascii_case("bodies") {
        return None;
    }
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if kind != "joints" || name.is_empty() {
        return None;
    }
    Some(name)
}

fn as_f64(arg: &OscType) -> Option<f64> {
    match *arg {
        OscType::Float(v) => Some(v as f64),
        OscType::Double(v) => Some(v),
        OscType::Int(v) => Some(v as f64),
        OscType::Long(v) => Some(v as f64),
        _ => None,
    }
}

/// Map one OSC message to an [`Inbound`]. Anything unrecognized is `None`.
pub fn parse_message(msg: &OscMessage) -> Option<Inbound> {
    match msg.addr.as_str() {
        POSE_QUERY_ADDR => return Some(Inbound::PoseQuery),
        DEBUG_QUERY_ADDR => return Some(Inbound::DebugQuery),
        _ => {}
    }

    let name = joint_name(&msg.addr)?;
    let x = as_f64(msg.args.first()?)?;
    let y = as_f64(msg.args.get(1)?)?;
    let z = msg.args.get(2).and_then(as_f64);
    Some(Inbound::Joint {
        name: name.to_string(),
        x,
        y,
        z,
    })
}

/// Flatten a packet (bundles included) into inbound messages.
pub fn parse_packet(packet: &OscPacket, out: &mut Vec<Inbound>) {
    match packet {
        OscPacket::Message(msg) => {
            if let Some(inbound) = parse_message(msg) {
                out.push(inbound);
            } else {
                log::trace!("ignored OSC message {}", msg.addr);
            }
        }
        OscPacket::Bundle(bundle) => {
            for inner in &bundle.content {
                parse_packet(inner, out);
            }
        }
    }
}

/// Decode a UDP datagram
pub fn decode_datagram(data: &[u8]) -> Result<Vec<Inbound>, OscError> {
    let (_, packet) = decoder::decode_udp(data).map_err(|e| OscError::Decode(e.to_string()))?;
    let mut out = Vec::new();
    parse_packet(&packet, &mut out);
    Ok(out)
}

pub fn build_match_message(m: &Match) -> OscMessage {
    OscMessage {
        addr: MATCH_ADDR.to_string(),
        args: vec![OscType::Int(m.pose_index as i32), OscType::Float(m.distance as f32)],
    }
}

pub fn build_pose_message(vector: &[f64]) -> OscMessage {
    OscMessage {
        addr: POSE_ADDR.to_string(),
        args: vector.iter().map(|&v| OscType::Float(v as f32)).collect(),
    }
}

pub fn build_debug_message(info: &DebugInfo) -> OscMessage {
    let float_or_nil = |v: Option<f64>| v.map_or(OscType::Nil, |v| OscType::Float(v as f32));
    let center = info.center;
    OscMessage {
        addr: DEBUG_ADDR.to_string(),
        args: vec![
            float_or_nil(center.map(|c| c.x)),
            float_or_nil(center.map(|c| c.y)),
            float_or_nil(center.map(|c| c.z)),
            float_or_nil(info.hands_distance),
        ],
    }
}

pub fn encode_osc_message(msg: &OscMessage) -> Result<Vec<u8>, OscError> {
    let packet = OscPacket::Message(msg.clone());
    encoder::encode(&packet).map_err(|e| OscError::Encode(e.to_string()))
}

/// Outbound side of the transport as seen by the engine.
pub trait Transport {
    fn emit_match(&mut self, m: &Match) -> Result<()>;
    fn emit_pose(&mut self, vector: &[f64]) -> Result<()>;
    fn emit_debug(&mut self, info: &DebugInfo) -> Result<()>;
}

/// Sends outbound messages as OSC over UDP.
///
/// The socket is non-blocking; a send that would block fails that emit only.
pub struct OscTransport {
    socket: UdpSocket,
    target_addr: SocketAddr,
}

impl OscTransport {
    /// Resolves `target_addr` once, up front.
    pub fn new(target_addr: &str) -> Result<Self> {
        let target_addr = target_addr
            .to_socket_addrs()
            .with_context(|| format!("invalid target address {}", target_addr))?
            .next()
            .with_context(|| format!("target address {} did not resolve", target_addr))?;
        let bind_addr = if target_addr.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(bind_addr).context("failed to bind OSC send socket")?;
        socket.set_nonblocking(true)?;
        Ok(Self { socket, target_addr })
    }

    pub fn target_addr(&self) -> SocketAddr {
        self.target_addr
    }

    fn send(&self, msg: &OscMessage) -> Result<()> {
        let data = encode_osc_message(msg)?;
        self.socket
            .send_to(&data, self.target_addr)
            .map_err(OscError::from)?;
        Ok(())
    }
}

impl Transport for OscTransport {
    fn emit_match(&mut self, m: &Match) -> Result<()> {
        self.send(&build_match_message(m))
    }

    fn emit_pose(&mut self, vector: &[f64]) -> Result<()> {
        self.send(&build_pose_message(vector))
    }

    fn emit_debug(&mut self, info: &DebugInfo) -> Result<()> {
        self.send(&build_debug_message(info))
    }
}
