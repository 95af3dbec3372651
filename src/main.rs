//! # iBUS Bridge
//!
//! Receive FlySky iBUS frames from a UART link and expose decoded channel
//! snapshots, with staleness monitoring and optional JSONL recording.
//!
//! # Control Flow
//!
//! 1. **Initialization**
//!    - Set up logging with tracing subscriber
//!    - Load configuration (path from the first CLI argument, defaults
//!      otherwise)
//!    - Open the serial port and spawn the frame receive task
//!
//! 2. **Main Loop**
//!    - Poll the shared snapshot at the configured interval
//!    - Record fresh snapshots, track signal acquired/lost transitions
//!    - Log link counters periodically
//!    - Reopen the port if the receive task fails (the link never goes
//!      silently idle)
//!
//! 3. **Graceful Shutdown**
//!    - Ctrl+C stops the loop and logs frame totals

use anyhow::Result;
use std::sync::Arc;
use tokio::time::{interval, sleep, Duration};
use tracing::{info, warn};

use ibus_bridge::clock::{Clock, MonotonicClock};
use ibus_bridge::config::Config;
use ibus_bridge::ibus::decoder::FrameDecoder;
use ibus_bridge::receiver::FrameReceiver;
use ibus_bridge::recorder::SnapshotRecorder;
use ibus_bridge::serial::IbusSerial;
use ibus_bridge::state::SharedChannelState;

/// Poll ticks between status log lines for the given intervals
fn ticks_per_status(status_interval_s: u64, poll_interval_ms: u64) -> u64 {
    (status_interval_s * 1000 / poll_interval_ms).max(1)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("iBUS Bridge v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let clock = Arc::new(MonotonicClock::new());
    let state = Arc::new(SharedChannelState::new());
    let decoder = FrameDecoder::new(config.channels, clock.clone());

    let mut recorder = if config.recorder.enabled {
        Some(SnapshotRecorder::new(&config.recorder)?)
    } else {
        None
    };

    let serial = IbusSerial::open(&config.serial.port)?;
    info!("iBUS receiver port opened at: {}", serial.device_path());

    let mut rx_task = tokio::spawn(
        FrameReceiver::new(serial.into_transport(), decoder.clone(), Arc::clone(&state)).run(),
    );

    let mut poll = interval(Duration::from_millis(config.monitor.poll_interval_ms));
    let status_ticks = ticks_per_status(
        config.monitor.status_interval_s,
        config.monitor.poll_interval_ms,
    );

    info!("Listening for channel frames; press Ctrl+C to exit");

    let mut link_up = false;
    let mut tick_count: u64 = 0;

    loop {
        tokio::select! {
            _ = poll.tick() => {
                tick_count += 1;

                if state.take_fresh() {
                    let snapshot = state.read();

                    if !link_up {
                        info!(
                            "Signal acquired (roll={} pitch={} yaw={} throttle={})",
                            snapshot.roll, snapshot.pitch, snapshot.yaw, snapshot.throttle
                        );
                        link_up = true;
                    }

                    if let Some(recorder) = recorder.as_mut() {
                        if let Err(e) = recorder.append(&snapshot) {
                            warn!("Failed to record snapshot: {}", e);
                        }
                    }
                } else if link_up {
                    let snapshot = *state.peek();
                    let age_ms = clock.now_ms().saturating_sub(snapshot.last_update_ms);

                    if age_ms > config.monitor.stale_after_ms {
                        warn!("Signal lost: no valid frame for {} ms", age_ms);
                        link_up = false;
                    }
                }

                if tick_count % status_ticks == 0 {
                    let stats = state.stats();
                    info!(
                        "Link status: {} frames received, {} rejected, link {}",
                        stats.frames_received,
                        stats.frames_rejected,
                        if link_up { "up" } else { "down" }
                    );
                }
            }

            result = &mut rx_task => {
                match result {
                    Ok(Err(e)) => warn!("Receive loop stopped: {}", e),
                    Ok(Ok(())) => warn!("Receive loop stopped"),
                    Err(e) => warn!("Receive task failed: {}", e),
                }
                link_up = false;

                // Keep trying to reopen the port; Ctrl+C still exits
                loop {
                    tokio::select! {
                        _ = sleep(Duration::from_millis(config.serial.reconnect_interval_ms)) => {}
                        _ = tokio::signal::ctrl_c() => {
                            info!("Received Ctrl+C, shutting down...");
                            return Ok(());
                        }
                    }

                    match IbusSerial::open(&config.serial.port) {
                        Ok(serial) => {
                            info!("Reopened iBUS receiver at {}", serial.device_path());
                            rx_task = tokio::spawn(
                                FrameReceiver::new(
                                    serial.into_transport(),
                                    decoder.clone(),
                                    Arc::clone(&state),
                                )
                                .run(),
                            );
                            break;
                        }
                        Err(e) => warn!("Failed to reopen {}: {}", config.serial.port, e),
                    }
                }
            }

            _ = tokio::signal::ctrl_c() => {
                let stats = state.stats();
                info!("Received Ctrl+C, shutting down...");
                info!(
                    "Total frames: {} received, {} rejected",
                    stats.frames_received, stats.frames_rejected
                );
                break;
            }
        }
    }

    rx_task.abort();
    Ok(())
}
