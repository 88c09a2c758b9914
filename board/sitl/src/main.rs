use std::path::Path;

use anyhow::Context;
use log::{error, info, warn};
use servopilot::{radians_to_degrees, Actuator, Board, UpdateSource, Vehicle};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use config::SitlConfig;

mod board;
mod config;

/// Forward operator commands from stdin, one per line.
async fn read_commands(tx: mpsc::Sender<String>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if tx.send(line).await.is_err() {
            break;
        }
    }
    Ok(())
}

// Ticks and commands are handled one at a time on a single thread, so a
// control pass never overlaps another.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => SitlConfig::load(Path::new(&path))?,
        None => SitlConfig::default(),
    };
    let period = config.period().context("Invalid tick rate")?;

    let mut board = config.build_board();
    let mut vehicle = Vehicle::new(&mut board, config.vehicle_config())
        .context("Invalid controller configuration")?;
    info!(
        "Servoing {} on board {} at {} Hz, {} axes",
        vehicle.config().target,
        board.name(),
        config.tick_hz,
        vehicle.axes().len()
    );

    let (tx, mut rx) = mpsc::channel::<String>(16);
    tokio::spawn(async move {
        if let Err(err) = read_commands(tx).await {
            warn!("Stopped reading commands: {err:#}");
        }
    });

    let substeps = config.substeps.max(1);
    let plant_dt = period.as_secs_f64() / substeps as f64;

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut ticks: u64 = 0;
    let mut commands_open = true;
    loop {
        let (command, source) = tokio::select! {
            _ = interval.tick() => (String::new(), UpdateSource::PERIODIC),
            line = rx.recv(), if commands_open => match line {
                Some(line) => (line, UpdateSource::TRIGGER),
                None => {
                    commands_open = false;
                    if config.max_ticks.is_none() {
                        info!("Command input closed, stopping");
                        break;
                    }
                    continue;
                }
            },
        };

        if source.contains(UpdateSource::PERIODIC) {
            for _ in 0..substeps {
                board.step(plant_dt);
            }
            ticks += 1;
        }

        match vehicle.tick(&mut board, &command, source) {
            Ok(diagnostics) => {
                for diag in diagnostics {
                    info!("{diag}");
                }
            }
            Err(err) => error!("{err}"),
        }

        if config.max_ticks.is_some_and(|max| ticks >= max) {
            info!("Stopping after {ticks} ticks");
            break;
        }
    }

    for rotor in board.rotors() {
        info!(
            "{}: {:.2} deg, {:.2} rpm",
            rotor.name(),
            radians_to_degrees(rotor.angle()),
            rotor.velocity_rpm()
        );
    }

    Ok(())
}
