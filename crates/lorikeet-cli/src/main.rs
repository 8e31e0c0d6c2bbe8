//! `lorikeet` – gesture-driven lorikeet from the terminal.
//!
//! ```text
//! lorikeet              interactive REPL; type /open, /fist, /peace …
//! lorikeet demo         play the built-in hand script
//! lorikeet run <file>   play a hand script from a TOML file
//! ```
//!
//! Settings come from `~/.lorikeet/config.toml` (see [`config`]).  Ctrl-C
//! stops any mode cleanly.

mod config;
mod repl;
mod script;
mod session;
mod status;

use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use lorikeet_hal::{LandmarkProvider, ScriptedProvider};
use lorikeet_types::LorikeetError;
use tracing::warn;

use crate::config::Config;
use crate::session::Session;

/// How long a scripted run keeps rendering after its last step.
const SCRIPT_TAIL: Duration = Duration::from_secs(2);

fn main() -> ExitCode {
    // Set LORIKEET_LOG_FORMAT=json for newline-delimited JSON logs on stderr.
    lorikeet_runtime::init_tracing("lorikeet");

    print_banner();

    // ── Shared shutdown flag ──────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – stopping …".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; Ctrl-C will not stop the session cleanly");
    }

    let cfg = load_config();
    let args: Vec<String> = std::env::args().skip(1).collect();

    let result = match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] => {
            println!("  Type {} for a list of commands.\n", "/help".bold().cyan());
            repl::run(cfg, shutdown)
        }
        ["demo"] => play(script::demo_script(), &cfg, &shutdown),
        ["run", file] => {
            script::load_script(Path::new(file)).and_then(|s| play(s, &cfg, &shutdown))
        }
        ["help"] | ["--help"] | ["-h"] => {
            print_usage();
            Ok(())
        }
        other => {
            println!("{} {}", "Unknown arguments:".red(), other.join(" ").yellow());
            print_usage();
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Render a scripted hand until it has played out.
fn play(
    script: ScriptedProvider,
    cfg: &Config,
    shutdown: &Arc<AtomicBool>,
) -> Result<(), LorikeetError> {
    println!(
        "  Playing {} ({:.1} s)\n",
        script.id().bold(),
        script.duration().as_secs_f32()
    );
    let stop_after = script.duration().saturating_add(SCRIPT_TAIL);
    let start = Instant::now();
    let mut session = Session::new(cfg);
    let provider =
        session::spawn_provider(script, cfg, session.latch(), Arc::clone(shutdown), start)?;
    session.run(start, Some(stop_after), shutdown, provider)
}

fn load_config() -> Config {
    match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => config::defaults().unwrap_or_else(|e| {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            Config::default()
        }),
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            Config::default()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   __           _ __            __ "#.bold().green());
    println!("{}", r#"  / /  ___  ___(_) /_____ ___ / /_"#.bold().green());
    println!("{}", r#" / /__/ _ \/ __/ /  '_/ -_) -_) __/"#.bold().green());
    println!("{}", r#"/____/\___/_/ /_/_/\_\\__/\__/\__/ "#.bold().green());
    println!();
    println!(
        "  {} {}",
        "Lorikeet".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Hand-gesture companion");
    println!();
}

fn print_usage() {
    println!();
    println!("{}", "Usage".bold().underline());
    println!("  {}              – interactive REPL", "lorikeet".bold().cyan());
    println!("  {}         – play the built-in hand script", "lorikeet demo".bold().cyan());
    println!("  {}   – play a hand script file", "lorikeet run <file>".bold().cyan());
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_apply_without_a_config_file() {
        let _env = config::ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let home = tempfile::tempdir().expect("tmp dir");
        let saved_home = std::env::var_os("HOME");
        // SAFETY: env access is serialised by ENV_LOCK.
        unsafe {
            std::env::set_var("HOME", home.path());
            std::env::set_var("LORIKEET_TICK_HZ", "144");
        }

        let cfg = load_config();

        unsafe {
            std::env::remove_var("LORIKEET_TICK_HZ");
            match saved_home {
                Some(h) => std::env::set_var("HOME", h),
                None => std::env::remove_var("HOME"),
            }
        }
        assert!(!config::config_path_for_home(&home.path().to_string_lossy()).exists());
        assert_eq!(cfg.tick_hz, 144);
        assert_eq!(cfg.frame_hz, 30);
    }
}
