//! REPL – drive the lorikeet by hand from the terminal.
//!
//! Supported slash-commands:
//!   /open /fist /peace /relaxed /away – show that hand to the landmark source
//!   /status       – current state, phase and altitude
//!   /pose         – full pose as JSON
//!   /config [save] – show the active settings, optionally persisting them
//!   /help         – show this list
//!   /quit | /exit – gracefully exit the CLI

use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

use lorikeet_hal::{HandShape, ManualProvider};
use lorikeet_types::LorikeetError;
use tracing::error;

use crate::config::{self, Config};
use crate::session::{self, Session, Snapshot};

/// A parsed REPL line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplCommand {
    Hand(HandShape),
    Status,
    Pose,
    Config { save: bool },
    Help,
    Quit,
}

impl ReplCommand {
    /// Parse one trimmed, non-empty input line.
    pub fn parse(line: &str) -> Result<ReplCommand, String> {
        let mut words = line.split_whitespace();
        let head = words.next().unwrap_or_default();
        let arg = words.next();
        if words.next().is_some() {
            return Err(format!("too many arguments for '{head}'"));
        }

        let cmd = match head {
            "/open" => ReplCommand::Hand(HandShape::Open),
            "/fist" => ReplCommand::Hand(HandShape::Fist),
            "/peace" => ReplCommand::Hand(HandShape::Peace),
            "/relaxed" => ReplCommand::Hand(HandShape::Relaxed),
            "/away" => ReplCommand::Hand(HandShape::Absent),
            "/status" => ReplCommand::Status,
            "/pose" => ReplCommand::Pose,
            "/config" => match arg {
                None => return Ok(ReplCommand::Config { save: false }),
                Some("save") => return Ok(ReplCommand::Config { save: true }),
                Some(other) => return Err(format!("unknown /config option '{other}'")),
            },
            "/help" => ReplCommand::Help,
            "/quit" | "/exit" => ReplCommand::Quit,
            other => return Err(format!("unknown command '{other}'")),
        };
        match arg {
            Some(extra) => Err(format!("'{head}' takes no argument, got '{extra}'")),
            None => Ok(cmd),
        }
    }
}

/// Entry point for the interactive REPL.
///
/// The render loop runs on its own thread; this thread reads stdin.
/// `shutdown` is polled each iteration; when set the REPL exits cleanly.
pub fn run(cfg: Config, shutdown: Arc<AtomicBool>) -> Result<(), LorikeetError> {
    let start = Instant::now();
    let hand = ManualProvider::new("keyboard");
    let mut session = Session::new(&cfg);
    let snapshot = session.snapshot();
    let provider = session::spawn_provider(
        hand.clone(),
        &cfg,
        session.latch(),
        Arc::clone(&shutdown),
        start,
    )?;

    let render_shutdown = Arc::clone(&shutdown);
    let render = thread::Builder::new()
        .name("render".to_string())
        .spawn(move || {
            let result = session.run(start, None, &render_shutdown, provider);
            render_shutdown.store(true, Ordering::SeqCst);
            result
        })
        .map_err(|e| LorikeetError::ProviderFault {
            provider: "render".to_string(),
            details: format!("failed to start render thread: {e}"),
        })?;

    read_loop(&cfg, &hand, &snapshot, &shutdown);
    shutdown.store(true, Ordering::SeqCst);

    render.join().unwrap_or_else(|_| {
        error!("render thread panicked");
        Err(LorikeetError::ProviderFault {
            provider: "render".to_string(),
            details: "render thread panicked".to_string(),
        })
    })
}

fn read_loop(cfg: &Config, hand: &ManualProvider, snapshot: &Snapshot, shutdown: &AtomicBool) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        print!("{} ", "lorikeet>".bold().cyan());
        stdout.flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("{}: {}", "Read error".red(), e);
                break;
            }
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match ReplCommand::parse(input) {
            Ok(ReplCommand::Hand(shape)) => {
                hand.set_shape(shape);
                println!("  hand: {}", shape.to_string().bold());
            }
            Ok(ReplCommand::Status) => cmd_status(snapshot),
            Ok(ReplCommand::Pose) => cmd_pose(snapshot),
            Ok(ReplCommand::Config { save }) => cmd_config(cfg, save),
            Ok(ReplCommand::Help) => cmd_help(),
            Ok(ReplCommand::Quit) => {
                println!("{}", "Goodbye.".green());
                break;
            }
            Err(msg) => {
                println!(
                    "{} {}. Type {} for available commands.",
                    "Error:".red(),
                    msg.yellow(),
                    "/help".bold()
                );
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command handlers
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_help() {
    println!();
    println!("{}", "Lorikeet Commands".bold().underline());
    println!("  {}   – open hand (fly)", "/open".bold().cyan());
    println!("  {}   – closed hand (land)", "/fist".bold().cyan());
    println!("  {}  – peace sign (present the heart)", "/peace".bold().cyan());
    println!("  {} – a hand that is no gesture", "/relaxed".bold().cyan());
    println!("  {}   – take the hand away", "/away".bold().cyan());
    println!("  {} – state, phase and altitude", "/status".bold().cyan());
    println!("  {}   – full pose as JSON", "/pose".bold().cyan());
    println!("  {} – show settings (add 'save' to persist)", "/config".bold().cyan());
    println!("  {} – exit the CLI", "/quit  /exit".bold().cyan());
    println!();
}

fn cmd_status(snapshot: &Snapshot) {
    let Some(report) = latest(snapshot) else {
        println!("  {}", "no tick yet".dimmed());
        return;
    };
    println!(
        "  state {} | phase {} ({:?}) | altitude {:.2} m | tick {}",
        report.state.to_string().bold(),
        report.phase.index(),
        report.phase,
        report.pose.altitude(),
        report.tick
    );
}

fn cmd_pose(snapshot: &Snapshot) {
    let Some(report) = latest(snapshot) else {
        println!("  {}", "no tick yet".dimmed());
        return;
    };
    match serde_json::to_string_pretty(&report.pose) {
        Ok(json) => println!("{json}"),
        Err(e) => println!("{}: {}", "Error encoding pose".red(), e),
    }
}

fn cmd_config(cfg: &Config, save: bool) {
    println!("{}", "Settings".bold().underline());
    println!("  tick rate      : {} Hz", cfg.tick_hz.to_string().yellow());
    println!("  frame rate     : {} Hz", cfg.frame_hz.to_string().yellow());
    println!("  blend          : {}", cfg.blend.to_string().yellow());
    println!(
        "  open above     : {}",
        cfg.classifier.open_above.to_string().yellow()
    );
    println!(
        "  folded below   : {}",
        cfg.classifier.folded_below.to_string().yellow()
    );

    if save {
        match config::save(cfg) {
            Ok(()) => println!(
                "{} {}",
                "✓ Settings saved to".green(),
                config::config_path().display().to_string().bold()
            ),
            Err(e) => println!("{}: {}", "Error saving config".red(), e),
        }
    }
}

fn latest(snapshot: &Snapshot) -> Option<lorikeet_runtime::TickReport> {
    *snapshot.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hand_commands() {
        assert_eq!(ReplCommand::parse("/open"), Ok(ReplCommand::Hand(HandShape::Open)));
        assert_eq!(ReplCommand::parse("/fist"), Ok(ReplCommand::Hand(HandShape::Fist)));
        assert_eq!(ReplCommand::parse("/peace"), Ok(ReplCommand::Hand(HandShape::Peace)));
        assert_eq!(ReplCommand::parse("/away"), Ok(ReplCommand::Hand(HandShape::Absent)));
    }

    #[test]
    fn quit_aliases() {
        assert_eq!(ReplCommand::parse("/quit"), Ok(ReplCommand::Quit));
        assert_eq!(ReplCommand::parse("/exit"), Ok(ReplCommand::Quit));
    }

    #[test]
    fn config_save_option() {
        assert_eq!(ReplCommand::parse("/config"), Ok(ReplCommand::Config { save: false }));
        assert_eq!(
            ReplCommand::parse("/config  save"),
            Ok(ReplCommand::Config { save: true })
        );
        assert!(ReplCommand::parse("/config reset").is_err());
    }

    #[test]
    fn unexpected_arguments_are_rejected() {
        assert!(ReplCommand::parse("/open wide").is_err());
        assert!(ReplCommand::parse("/config save now").is_err());
    }

    #[test]
    fn unknown_command_is_reported() {
        let err = ReplCommand::parse("/wave").unwrap_err();
        assert!(err.contains("/wave"));
    }
}
