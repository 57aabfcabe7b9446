//! Load generator
//!
//! Opens `clients` connections up front, then runs a `SET`, a `GET` and a
//! `DEL` phase. Within a phase every client issues its command concurrently
//! on its own key (`key<i>`).

use std::time::{Duration, Instant};

use futures_util::future::try_join_all;
use serde::Serialize;
use tracing::info;

use crate::client::Connection;
use crate::utils::Result;

#[derive(Debug, Clone, Serialize)]
pub struct PhaseReport {
    pub phase: &'static str,
    pub operations: usize,
    pub elapsed_ms: f64,
    pub ops_per_sec: f64,
}

impl PhaseReport {
    fn new(phase: &'static str, operations: usize, elapsed: Duration) -> Self {
        let secs = elapsed.as_secs_f64();
        Self {
            phase,
            operations,
            elapsed_ms: secs * 1000.0,
            ops_per_sec: if secs > 0.0 {
                operations as f64 / secs
            } else {
                0.0
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub clients: usize,
    pub phases: Vec<PhaseReport>,
}

pub async fn run(address: &str, port: u16, clients: usize) -> Result<BenchReport> {
    let mut conns = try_join_all((0..clients).map(|_| Connection::connect(address, port))).await?;
    info!("opened {} connections to {address}:{port}", conns.len());

    let mut phases = Vec::with_capacity(3);

    let start = Instant::now();
    try_join_all(
        conns
            .iter_mut()
            .enumerate()
            .map(|(i, c)| async move { c.set(&format!("key{i}"), "val").await }),
    )
    .await?;
    phases.push(PhaseReport::new("set", clients, start.elapsed()));

    let start = Instant::now();
    try_join_all(
        conns
            .iter_mut()
            .enumerate()
            .map(|(i, c)| async move { c.get(&format!("key{i}")).await }),
    )
    .await?;
    phases.push(PhaseReport::new("get", clients, start.elapsed()));

    let start = Instant::now();
    try_join_all(
        conns
            .iter_mut()
            .enumerate()
            .map(|(i, c)| async move { c.delete(&format!("key{i}")).await }),
    )
    .await?;
    phases.push(PhaseReport::new("del", clients, start.elapsed()));

    for phase in &phases {
        info!(
            "{}: {} ops in {:.2} ms",
            phase.phase, phase.operations, phase.elapsed_ms
        );
    }

    Ok(BenchReport { clients, phases })
}
