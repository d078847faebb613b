//! Collection-wide commands (scan, stats, upcoming, watch, config)

use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use super::output::Output;
use super::session::Session;
use crate::domain::HealthChange;
use crate::store::{HealthMonitor, SharedStore, StoreEvent};

/// Run a health scan now
pub fn scan(session: &Session, output: &Output) -> Result<()> {
    let (_, mut store) = session.load_store(output)?;
    let changes = store.scan_health();
    output.verbose_ctx(
        "scan",
        &format!("Scanned {} plants on {}", store.len(), store.today()),
    );

    if output.is_json() {
        output.json(&serde_json::json!({
            "scanned": store.len(),
            "changes": changes,
        }));
    } else if changes.is_empty() {
        println!("All {} plants unchanged.", store.len());
    } else {
        println!("Health changes ({}):", changes.len());
        print_changes(&changes);
    }

    Ok(())
}

/// Show collection counts
pub fn stats(session: &Session, output: &Output) -> Result<()> {
    let (_, store) = session.open_store(output)?;
    let stats = store.stats();

    if output.is_json() {
        output.json(&stats);
    } else {
        output.row("Total plants", stats.total);
        output.row("Needs watering", stats.needs_watering);
        output.row("Needs attention", stats.needs_attention);
    }

    Ok(())
}

/// Show the plants due for watering soonest
pub fn upcoming(session: &Session, output: &Output, limit: Option<usize>) -> Result<()> {
    let (garden, store) = session.open_store(output)?;
    let limit = limit.unwrap_or(garden.config().garden.upcoming_limit);
    let upcoming = store.upcoming(limit);

    output.verbose_ctx("upcoming", &format!("Showing up to {} plants", limit));

    if output.is_json() {
        let items: Vec<_> = upcoming
            .iter()
            .map(|(plant, urgency)| {
                serde_json::json!({
                    "id": plant.id(),
                    "name": plant.name,
                    "location": plant.location,
                    "nextWatering": plant.next_watering(),
                    "urgency": urgency,
                })
            })
            .collect();
        output.json(&items);
    } else if upcoming.is_empty() {
        println!("No plants to water.");
    } else {
        println!("{:<16} {:<22} {:<12} WHEN", "ID", "NAME", "DATE");
        println!("{}", "-".repeat(60));
        for (plant, urgency) in upcoming {
            println!(
                "{:<16} {:<22} {:<12} {}",
                plant.id(),
                plant.name,
                plant.next_watering().to_string(),
                urgency.label()
            );
        }
    }

    Ok(())
}

/// Run the recurring health scan in the foreground
///
/// Prints every change as it happens. With `duration` the monitor stops
/// after that many seconds; otherwise it runs until interrupted.
pub fn watch(
    session: &Session,
    output: &Output,
    interval: Option<u64>,
    duration: Option<u64>,
) -> Result<()> {
    let (garden, store) = session.load_store(output)?;
    let interval = interval
        .map(Duration::from_secs)
        .unwrap_or_else(|| garden.config().garden.scan_interval());
    if interval.is_zero() {
        anyhow::bail!("Scan interval must be greater than zero");
    }

    let shared = SharedStore::new(store);
    let subscription = shared.lock().subscribe();

    if !output.is_json() {
        println!(
            "Watching {} plants, scanning every {}s",
            shared.lock().len(),
            interval.as_secs()
        );
    }

    let mut monitor = HealthMonitor::start(shared.clone(), interval)
        .context("Failed to start health monitor")?;

    let deadline = duration.map(|secs| Instant::now() + Duration::from_secs(secs));
    loop {
        let wait = match deadline {
            Some(deadline) => match deadline.checked_duration_since(Instant::now()) {
                Some(left) if !left.is_zero() => left,
                _ => break,
            },
            None => interval,
        };

        match subscription.receiver().recv_timeout(wait) {
            Ok(event) => report(output, event),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    monitor.stop();

    // Scans that finished while shutting down
    for event in subscription.drain() {
        report(output, event);
    }

    let failed = shared.lock().failed_saves();
    if failed > 0 {
        output.verbose_ctx("watch", &format!("{} snapshot saves failed", failed));
    }

    Ok(())
}

/// Show the effective configuration and paths
pub fn config(session: &Session, output: &Output) -> Result<()> {
    let garden = session.garden(output)?;
    let config = garden.config();

    if output.is_json() {
        output.json(&serde_json::json!({
            "dataDir": garden.data_dir(),
            "configFile": config.path(),
            "snapshotFile": garden.snapshot_path(),
            "snapshotExists": garden.has_snapshot(),
            "settings": config.garden,
        }));
    } else {
        output.row("Data directory", garden.data_dir().display());
        output.row("Config file", config.path().display());
        output.row("Snapshot file", garden.snapshot_path().display());
        output.blank();
        output.row("scan_interval_secs", config.garden.scan_interval_secs);
        output.row("seed_on_first_run", config.garden.seed_on_first_run);
        output.row("upcoming_limit", config.garden.upcoming_limit);
        output.row("snapshot_file", &config.garden.snapshot_file);
    }

    Ok(())
}

fn report(output: &Output, event: StoreEvent) {
    if let StoreEvent::HealthChanged { changes } = event {
        if output.is_json() {
            for change in &changes {
                output.json(change);
            }
        } else {
            print_changes(&changes);
        }
    }
}

fn print_changes(changes: &[HealthChange]) {
    for change in changes {
        println!(
            "  {:<16} {:<22} {} -> {} ({} days overdue)",
            change.id, change.name, change.from, change.to, change.days_overdue
        );
    }
}
