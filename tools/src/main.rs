//! sim-runner: headless runner for the city economy core.
//!
//! Usage:
//!   sim-runner --seed 12345 --months 24 --db run.db
//!   sim-runner --seed 12345 --live-secs 10 --tick-ms 50
//!   sim-runner --db run.db --resume run-12345-1700000000 --months 12
//!   sim-runner --seed 12345 --ipc-mode

use anyhow::{Context, Result};
use civic_core::{
    clock::SimSpeed,
    command::PlayerCommand,
    config::SimConfig,
    engine::SimEngine,
    geography::ManhattanPaths,
    report::Summary,
    scheduler::Scheduler,
    store::SimStore,
    world,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

/// Cycles between stored snapshots in batch mode.
const SNAPSHOT_EVERY: u64 = 12;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Months { count: u64 },
    Command { command: PlayerCommand },
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let months = parse_arg(&args, "--months", 12u64);
    let live_secs = parse_arg(&args, "--live-secs", 0u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = string_arg(&args, "--db").unwrap_or(":memory:");
    let data_dir = string_arg(&args, "--data-dir").unwrap_or("./data");
    let resume = string_arg(&args, "--resume");

    let config = match SimConfig::load(data_dir) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("{e:#}; falling back to built-in defaults");
            SimConfig::default_test()
        }
    };
    let tick_ms = parse_arg(&args, "--tick-ms", config.scheduler.tick_interval_ms);

    let mut store = SimStore::open(db).with_context(|| format!("opening {db}"))?;
    store.migrate()?;

    let mut engine = match resume {
        Some(run_id) => {
            let snapshot = store.latest_snapshot(run_id)?;
            // The map is regenerated from the run's own seed and config.
            let city = world::bootstrap(&snapshot.config, snapshot.seed);
            log::info!("resuming {run_id} at cycle {}", snapshot.cycle());
            SimEngine::restore(snapshot, Arc::new(city.map), Arc::new(ManhattanPaths))
        }
        None => {
            let run_id = format!("run-{seed}-{}", unix_secs());
            store.insert_run(&run_id, seed, env!("CARGO_PKG_VERSION"), config.start_date)?;
            SimEngine::build(run_id, seed, config)?
        }
    };

    if ipc_mode {
        run_ipc_loop(&mut engine, &mut store)?;
        return Ok(());
    }

    println!("city economy: sim-runner");
    println!("  run_id:    {}", engine.run_id);
    println!("  seed:      {}", engine.seed());
    println!("  db:        {db}");
    println!("  data_dir:  {data_dir}");
    println!();

    if live_secs > 0 {
        engine = run_live(engine, Duration::from_millis(tick_ms), Duration::from_secs(live_secs))?;
    } else {
        for _ in 0..months {
            engine.run_months(1)?;
            persist_cycle(&mut engine, &mut store)?;
            if engine.state.cycle % SNAPSHOT_EVERY == 0 {
                store.save_snapshot(&engine.snapshot())?;
            }
        }
    }

    store.save_snapshot(&engine.snapshot())?;
    persist_cycle(&mut engine, &mut store)?;
    print_summary(&engine, &store)?;
    Ok(())
}

/// Drive the engine on the wall clock for `duration`, then take it back.
fn run_live(mut engine: SimEngine, interval: Duration, duration: Duration) -> Result<SimEngine> {
    engine.clock.set_speed(SimSpeed::Accelerated);
    let scheduler = Scheduler::start(engine, interval);
    let started = std::time::Instant::now();
    while started.elapsed() < duration {
        std::thread::sleep(Duration::from_secs(1).min(duration));
        println!("{}", scheduler.summary());
    }
    let shared = scheduler.stop();
    let engine = Arc::try_unwrap(shared)
        .map_err(|_| anyhow::anyhow!("engine still shared after scheduler stopped"))?
        .into_inner();
    Ok(engine)
}

fn persist_cycle(engine: &mut SimEngine, store: &mut SimStore) -> Result<()> {
    let entries = engine.take_event_log();
    store.append_events(&entries)?;
    store.insert_monthly_report(&engine.run_id, &engine.summary())?;
    Ok(())
}

fn run_ipc_loop(engine: &mut SimEngine, store: &mut SimStore) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{err_json}")?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::Months { count } => {
                engine.run_months(count)?;
                persist_cycle(engine, store)?;
            }
            IpcCommand::Command { command } => {
                engine.apply_command(&command)?;
            }
            IpcCommand::GetState => {}
        }
        writeln!(stdout, "{}", serde_json::to_string(&engine.summary())?)?;
        stdout.flush()?;
    }
    store.save_snapshot(&engine.snapshot())?;
    persist_cycle(engine, store)?;
    Ok(())
}

fn print_summary(engine: &SimEngine, store: &SimStore) -> Result<()> {
    let summary: Summary = engine.summary();
    let events = store.event_count(&engine.run_id)?;
    let reports = store.monthly_reports(&engine.run_id)?;

    println!("=== RUN SUMMARY ===");
    println!("  cycles:        {}", engine.state.cycle);
    println!("  final date:    {}", engine.clock.date);
    println!("  events logged: {events}");
    println!("  {summary}");

    println!();
    println!("=== LAST 6 MONTHS ===");
    if reports.is_empty() {
        println!("  (no cycles completed yet)");
    } else {
        for r in reports.iter().rev().take(6).rev() {
            println!(
                "  {} | reserves {:.0} | pop {} | unemployment {:.1}% | index {:.1} | inflation {:.2}%",
                r.sim_date, r.reserves, r.population, r.unemployment, r.market_index, r.inflation
            );
        }
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn unix_secs() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
