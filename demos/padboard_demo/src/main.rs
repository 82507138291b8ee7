//! Drives the keyboard from JSON lines on stdin and prints what would be
//! typed. One command per line:
//!
//! ```text
//! {"event": "nav:move", "payload": {"phase": "down", "dx": 1, "dy": 0}}
//! {"pad": {"button": {"button": "south", "pressed": true}}}
//! {"key": "ArrowLeft", "phase": "down"}
//! {"wait_ms": 650}
//! {"open": false}
//! {"dump": true}
//! ```

use std::io::{self, BufRead};

use anyhow::Context;
use padboard_core::{
    DeliveryError, KeyPayload, LocalKey, LocalKeyEvent, NavConfig, NavigationSession, Phase,
    SystemClock,
};
use padboard_platform::{PadEvent, Runner, strokes};
use padboard_ui::Keyboard;
use serde::Deserialize;
use serde_json::Value;
use web_time::{Duration, Instant};

#[derive(Deserialize)]
#[serde(untagged)]
enum Command {
    Wait {
        wait_ms: u64,
    },
    Pad {
        pad: PadEvent,
    },
    Key {
        key: String,
        #[serde(default = "key_down")]
        phase: Phase,
        #[serde(default)]
        off_grid: bool,
    },
    Overlay {
        open: bool,
    },
    Dump {
        dump: bool,
    },
    Remote {
        event: String,
        #[serde(default)]
        payload: Value,
    },
}

fn key_down() -> Phase {
    Phase::Down
}

fn print_payload(payload: KeyPayload) -> Result<(), DeliveryError> {
    let line = serde_json::to_string(&payload).map_err(|e| DeliveryError::Rejected(e.to_string()))?;
    let typed: Vec<String> = strokes(&payload).iter().map(ToString::to_string).collect();
    println!("{line}  [{}]", typed.join(", "));
    Ok(())
}

type DemoRunner = Runner<SystemClock, Keyboard, fn(KeyPayload) -> Result<(), DeliveryError>>;

fn wait(runner: &mut DemoRunner, total: Duration) {
    let end = Instant::now() + total;
    loop {
        runner.pump();
        let now = Instant::now();
        if now >= end {
            break;
        }
        let until = runner.next_deadline().map_or(end, |d| d.min(end));
        std::thread::sleep(until.saturating_duration_since(now));
    }
}

fn run(runner: &mut DemoRunner, command: Command) {
    match command {
        Command::Wait { wait_ms } => wait(runner, Duration::from_millis(wait_ms)),
        Command::Pad { pad } => runner.handle_pad(pad),
        Command::Key {
            key,
            phase,
            off_grid,
        } => {
            let Some(key) = LocalKey::from_name(&key) else {
                log::debug!("key {key} is not handled by the keyboard");
                return;
            };
            runner.handle_local(LocalKeyEvent {
                key,
                phase,
                on_grid: !off_grid,
            });
        }
        Command::Overlay { open: true } => runner.open(),
        Command::Overlay { open: false } => runner.close(),
        Command::Dump { dump } => {
            if dump {
                eprintln!("{}", runner.session().surface().dump());
            }
        }
        Command::Remote { event, payload } => {
            if let Err(e) = runner.handle_named(&event, payload) {
                log::warn!("dropping remote event: {e}");
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            NavConfig::load(&path).with_context(|| format!("loading config from {path}"))?
        }
        None => NavConfig::default(),
    };
    let keyboard = Keyboard::qwerty().context("building the qwerty keyboard")?;
    let sink: fn(KeyPayload) -> Result<(), DeliveryError> = print_payload;
    let session = NavigationSession::new(keyboard, sink, config);
    let mut runner = Runner::new(SystemClock, session);
    runner.open();

    for line in io::stdin().lock().lines() {
        let line = line.context("reading stdin")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Command>(line) {
            Ok(command) => run(&mut runner, command),
            Err(e) => log::warn!("skipping line {line:?}: {e}"),
        }
        log::info!(
            "focus: {}",
            runner
                .session()
                .active_key_identifier()
                .unwrap_or_else(|| "-".into())
        );
    }
    runner.close();
    Ok(())
}
