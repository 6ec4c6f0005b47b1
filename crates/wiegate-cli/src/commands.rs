//! Subcommand implementations.

use crate::config::AppConfig;
use anyhow::{Context, Result, bail};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use wiegate_access::{
    AccessStore, Decision, GateParts, GateRuntime, ManagementService, SystemClock,
    TracingReporter,
};
use wiegate_hardware::AnyOutputPins;
use wiegate_hardware::mock::MockWiegandReader;
use wiegate_storage::{
    AnyStore, AuditLog, MemoryStore, MeshSettings, NetworkSettings, SqliteStore, UserRegistry,
    WifiCredentials,
};

/// How long `simulate` waits for the decision on one card.
const DECISION_TIMEOUT: Duration = Duration::from_secs(2);

pub async fn open_store(config: &AppConfig, memory: bool) -> Result<Arc<AnyStore>> {
    let store = if memory {
        AnyStore::from(MemoryStore::new())
    } else {
        let path = &config.database.database_path;
        AnyStore::from(
            SqliteStore::new(config.database.clone())
                .await
                .with_context(|| format!("failed to open database {path}"))?,
        )
    };
    Ok(Arc::new(store))
}

pub async fn users_list(store: Arc<AnyStore>) -> Result<()> {
    let registry = UserRegistry::load(store).await?;
    for user in registry.list() {
        println!("{}\t{}", user.uid, user.name);
    }
    Ok(())
}

pub async fn users_add(store: Arc<AnyStore>, uid: &str, name: &str) -> Result<()> {
    let mut registry = UserRegistry::load(store).await?;
    registry.add(uid, name).await?;
    println!("Added {} ({} registered)", uid.trim().to_uppercase(), registry.len());
    Ok(())
}

pub async fn users_remove(store: Arc<AnyStore>, uid: &str) -> Result<()> {
    let mut registry = UserRegistry::load(store).await?;
    registry.remove(uid).await?;
    println!("Removed {} ({} registered)", uid.trim().to_uppercase(), registry.len());
    Ok(())
}

pub async fn users_clear(store: Arc<AnyStore>) -> Result<()> {
    let mut registry = UserRegistry::load(store).await?;
    registry.clear().await?;
    println!("Cleared");
    Ok(())
}

pub async fn logs(store: Arc<AnyStore>) -> Result<()> {
    let log = AuditLog::load(store).await?;
    for entry in log.list() {
        println!("{}\t{}", entry.timestamp, entry.uid);
    }
    Ok(())
}

pub async fn settings_show(store: Arc<AnyStore>) -> Result<()> {
    let settings = NetworkSettings::load(store.as_ref()).await?;
    match &settings.wifi {
        Some(wifi) => println!(
            "wifi: ssid={} pass={}",
            wifi.ssid,
            if wifi.pass.is_empty() { "<none>" } else { "<set>" }
        ),
        None => println!("wifi: not provisioned"),
    }
    println!(
        "mesh: channel={} pan_id={:#06X}",
        settings.mesh.channel, settings.mesh.pan_id
    );
    Ok(())
}

pub async fn settings_wifi(store: Arc<AnyStore>, ssid: &str, pass: &str) -> Result<()> {
    let wifi = WifiCredentials::new(ssid, pass)?;
    NetworkSettings::save_wifi(store.as_ref(), &wifi).await?;
    println!("Saved Wi-Fi credentials for {ssid}");
    Ok(())
}

pub async fn settings_mesh(store: Arc<AnyStore>, channel: u8, pan_id: u16) -> Result<()> {
    let mesh = MeshSettings::new(channel, pan_id)?;
    NetworkSettings::save_mesh(store.as_ref(), &mesh).await?;
    println!("Saved mesh channel {channel}, PAN id {pan_id:#06X}");
    Ok(())
}

/// Gate runtime over simulated hardware: a mock reader for input and
/// logging outputs.
async fn start_gate(
    config: &AppConfig,
    store: Arc<AnyStore>,
) -> Result<(GateRuntime, MockWiegandReader)> {
    let store = AccessStore::load(store).await?.shared();
    let (card, pulses) = MockWiegandReader::new(config.gate.reader.pulse_capacity);

    let runtime = GateRuntime::start(
        &config.gate,
        GateParts {
            pulses,
            outputs: AnyOutputPins::logging(config.gate.pins),
            store,
            reporter: Arc::new(TracingReporter),
            clock: Arc::new(SystemClock),
        },
    )?;
    Ok((runtime, card))
}

pub async fn simulate(config: &AppConfig, store: Arc<AnyStore>, cards: &[String]) -> Result<()> {
    let (runtime, card) = start_gate(config, store).await?;
    let mut decisions = runtime.subscribe();

    for bits in cards {
        card.present_str(bits)
            .await
            .with_context(|| format!("cannot present card '{bits}'"))?;

        let decision = tokio::time::timeout(DECISION_TIMEOUT, decisions.recv())
            .await
            .context("no decision within timeout")??;
        match decision {
            Decision::Granted { uid, name } => println!("{uid}\tgranted\t{name}"),
            Decision::Denied { uid } => println!("{uid}\tdenied"),
        }
    }

    // Let the last relay pulse finish before the outputs are released
    tokio::time::sleep(Duration::from_millis(config.gate.actuation.relay_pulse_ms)).await;

    let status = runtime.management().status();
    println!("{}", serde_json::to_string(&status)?);

    drop(card);
    let report = runtime.shutdown().await;
    if report.panicked > 0 {
        bail!("{} worker(s) panicked", report.panicked);
    }
    Ok(())
}

pub async fn run(config: &AppConfig, store: Arc<AnyStore>) -> Result<()> {
    let (runtime, card) = start_gate(config, store).await?;
    let management = runtime.management();
    info!("Gate running; enter card bits, 'open', 'status' or 'clear' (Ctrl-C to stop)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            line = lines.next_line() => match line? {
                Some(line) => console_command(line.trim(), &card, &management).await,
                None => break,
            },
        }
    }

    drop(card);
    let report = runtime.shutdown().await;
    if let Some(access) = report.access {
        info!(reads = access.reads, granted = access.granted, denied = access.denied, "Session summary");
    }
    if report.panicked > 0 {
        bail!("{} worker(s) panicked", report.panicked);
    }
    Ok(())
}

async fn console_command(
    line: &str,
    card: &MockWiegandReader,
    management: &ManagementService<AnyStore>,
) {
    match line {
        "" => {}
        "open" => match management.open_gate() {
            Ok(()) => println!("OK"),
            Err(e) => warn!(error = %e, "Open failed"),
        },
        "status" => match serde_json::to_string(&management.status()) {
            Ok(json) => println!("{json}"),
            Err(e) => warn!(error = %e, "Status serialization failed"),
        },
        "clear" => {
            management.clear_last_uid();
            println!("CLEARED");
        }
        bits => {
            if let Err(e) = card.present_str(bits).await {
                warn!(input = bits, error = %e, "Not a card read");
            }
        }
    }
}
