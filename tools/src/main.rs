//! board-runner: headless harness for the dialboard engine.
//!
//! Wires a `UserRegistry` to the background reporter and drives the
//! engine from newline-delimited JSON commands on stdin, one response
//! line per command. Stands in for the HTTP API layer.
//!
//! Usage:
//!   board-runner                # JSON command loop on stdin
//!   board-runner --seed-demo    # preload three demo users first
//!
//! Commands:
//!   {"type":"register","id":"u1","name":"Alice"}
//!   {"type":"connect","id":"u1"}
//!   {"type":"deal","id":"u1","amount":5.0}
//!   {"type":"get_rating","id":"u1"}
//!   {"type":"quit"}

use anyhow::Result;
use chrono::{DateTime, Utc};
use dialboard_core::{
    config::EngineConfig,
    error::RegistryResult,
    rating::{RatingReport, RatingRequest},
    registry::UserRegistry,
    reporter::Reporter,
};
use serde_json::json;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Register {
        id: String,
        name: String,
    },
    Connect {
        id: String,
    },
    Disconnect {
        id: String,
    },
    Rename {
        id: String,
        name: String,
    },
    Deal {
        id: String,
        amount: f64,
        /// Missing time means "now".
        time: Option<DateTime<Utc>>,
    },
    SetCurrent {
        id: String,
    },
    GetRating {
        id: Option<String>,
        top_n: Option<usize>,
        near_n: Option<usize>,
    },
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let config = EngineConfig::from_env();
    let registry = Arc::new(UserRegistry::new());

    if std::env::args().any(|a| a == "--seed-demo") {
        seed_demo_users(&registry)?;
    }

    let reporter = Reporter::spawn(Arc::clone(&registry), config.report_interval);

    run_ipc_loop(&registry)?;

    reporter.stop();
    Ok(())
}

fn run_ipc_loop(registry: &UserRegistry) -> Result<()> {
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
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                writeln!(stdout, "{}", json!({ "error": e.to_string() }))?;
                stdout.flush()?;
                continue;
            }
        };

        let quit = matches!(cmd, IpcCommand::Quit);
        let response = match handle_command(registry, cmd) {
            Ok(v) => v,
            Err(e) => json!({ "error": e.to_string() }),
        };
        writeln!(stdout, "{response}")?;
        stdout.flush()?;

        if quit {
            break;
        }
    }
    Ok(())
}

fn handle_command(
    registry: &UserRegistry,
    cmd: IpcCommand,
) -> RegistryResult<serde_json::Value> {
    match cmd {
        IpcCommand::Register { id, name } => {
            registry.register(&id, &name)?;
            Ok(json!({ "message": "successful registration!" }))
        }
        IpcCommand::Connect { id } => {
            registry.set_connected(&id)?;
            // The connect response carries a first leaderboard view
            // centred on the user, same shape as get_rating.
            let req = RatingRequest {
                user_id: Some(id.clone()),
                ..RatingRequest::default()
            };
            let report = registry.compute_rating(&req)?;
            Ok(rating_json("successfully connected!", &report, &id))
        }
        IpcCommand::Disconnect { id } => {
            registry.set_disconnected(&id)?;
            Ok(json!({ "message": "successfully disconnected!" }))
        }
        IpcCommand::Rename { id, name } => {
            registry.rename(&id, &name)?;
            Ok(json!({ "message": "successful rename!" }))
        }
        IpcCommand::Deal { id, amount, time } => {
            let deal_time = time.unwrap_or_else(Utc::now);
            registry.record_deal(&id, deal_time, amount)?;
            Ok(json!({ "message": "successful deal!" }))
        }
        IpcCommand::SetCurrent { id } => {
            registry.select_current_user(&id)?;
            Ok(json!({ "message": "current user set!" }))
        }
        IpcCommand::GetRating { id, top_n, near_n } => {
            let mut req = RatingRequest {
                user_id: id.clone(),
                ..RatingRequest::default()
            };
            if let Some(n) = top_n {
                req.top_n = n;
            }
            if let Some(n) = near_n {
                req.near_n = n;
            }
            let report = registry.compute_rating(&req)?;
            Ok(rating_json("ok", &report, id.as_deref().unwrap_or("")))
        }
        IpcCommand::Quit => Ok(json!({ "message": "bye!" })),
    }
}

/// Serialize a report the way the wire API shapes it: positioned entries,
/// the queried user flagged with `is_current`.
fn rating_json(message: &str, report: &RatingReport, current_id: &str) -> serde_json::Value {
    let top: Vec<serde_json::Value> = report
        .top_rated
        .iter()
        .enumerate()
        .map(|(i, u)| {
            json!({
                "position": i + 1,
                "name": u.name,
                "rating": u.total_revenue,
            })
        })
        .collect();

    let neighbours: Vec<serde_json::Value> = report
        .neighbours
        .iter()
        .enumerate()
        .map(|(i, u)| {
            json!({
                "position": report.best_neighbour_rank + i,
                "name": u.name,
                "rating": u.total_revenue,
                "is_current": u.id == current_id,
            })
        })
        .collect();

    json!({
        "message": message,
        "total_users": report.total_users,
        "user_rank": report.user_rank,
        "top_rated": top,
        "neighbour_list": neighbours,
    })
}

fn seed_demo_users(registry: &UserRegistry) -> RegistryResult<()> {
    for (id, name, amount) in [
        ("u-alice", "Alice", 10.0),
        ("u-bob", "Bob", 5.0),
        ("u-carol", "Carol", 1.0),
    ] {
        registry.register(id, name)?;
        registry.set_connected(id)?;
        registry.record_deal(id, Utc::now(), amount)?;
    }
    registry.select_current_user("u-bob")?;
    log::info!("seeded 3 demo users, current user: u-bob");
    Ok(())
}
