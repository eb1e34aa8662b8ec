use anyhow::{Context, Result as AnyhowResult};
use clap::Parser;
use crossterm::event::KeyEvent;
use folio::app::{BufferSurface, Session, SurfaceEvent};
use folio::config_io;
use folio::input::{FocusContext, KeyChord, KeyOutcome};
use folio::services::fs::{FsManager, LocalDirectoryPicker, LocalFsBackend};
use folio::services::tracing_setup;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Browse a directory lazily, edit files and save them back
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(about = "A lazy directory-tree explorer driven from stdin", long_about = None)]
#[command(version)]
struct Args {
    /// Directory to open (default: current directory)
    #[arg(value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Path to log file (default: system temp dir)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

const HELP: &str = "\
Commands:
  ls              show the visible tree
  toggle PATH     expand or collapse a directory
  open PATH       open a file
  set TEXT        replace the open file's text
  save            save the open file
  key CHORD       press a shortcut, e.g. `key ctrl+s`
  status          show the last message and unsaved files
  quit            exit";

fn main() -> AnyhowResult<()> {
    let args = Args::parse();

    let log_file = args
        .log_file
        .clone()
        .unwrap_or_else(config_io::default_log_path);
    tracing_setup::init_global(&log_file)
        .with_context(|| format!("Failed to create log file {}", log_file.display()))?;

    let config = config_io::load_config(args.config.as_deref())
        .context("Failed to load configuration")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let dir = args.dir.or_else(|| std::env::current_dir().ok());
    let mut session = Session::new(
        Arc::new(FsManager::new(Arc::new(LocalFsBackend::new()))),
        Arc::new(LocalDirectoryPicker::new(dir)),
        Box::new(BufferSurface::new()),
        &config,
    )
    .context("Invalid keybindings")?;

    runtime.block_on(run(&mut session))
}

async fn run(session: &mut Session) -> AnyhowResult<()> {
    session.attach();

    if let Err(e) = session.open_folder().await {
        if e.is_user_cancelled() {
            println!("No folder selected");
            return Ok(());
        }
        return Err(e).context("Failed to open folder");
    }
    print_rows(session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        let (command, arg) = line.split_once(' ').unwrap_or((line, ""));
        let arg = arg.trim();

        match command {
            "" => continue,
            "quit" | "exit" => break,
            _ => {}
        }
        if let Err(e) = execute(session, command, arg).await {
            println!("error: {e}");
        }
    }

    if session.has_unsaved_changes() {
        println!("Discarding unsaved changes");
    }
    session.detach();
    Ok(())
}

async fn execute(session: &mut Session, command: &str, arg: &str) -> folio::error::Result<()> {
    match command {
        "help" => println!("{HELP}"),
        "ls" => print_rows(session),
        "toggle" => {
            session.toggle_expansion(arg).await?;
            print_rows(session);
        }
        "open" => {
            session.reveal(arg).await?;
            session.open_file(arg).await?;
            println!("{}", session.buffer(arg).unwrap_or_default());
        }
        "set" => {
            let text = arg.replace("\\n", "\n");
            session
                .handle_surface_event(SurfaceEvent::Changed(text))
                .await?;
        }
        "save" => {
            session.save_file().await?;
            print_status(session);
        }
        "key" => match parse_chord(arg) {
            Some(chord) => {
                let event = KeyEvent::new(chord.code, chord.modifiers);
                if session.handle_key(&event, FocusContext::Application).await
                    == KeyOutcome::Ignored
                {
                    println!("No shortcut bound to {arg}");
                } else {
                    print_status(session);
                }
            }
            None => println!("Bad chord: {arg}"),
        },
        "status" => print_status(session),
        other => println!("Unknown command: {other} (try `help`)"),
    }
    Ok(())
}

/// `ctrl+s` style chord: modifiers first, key last
fn parse_chord(text: &str) -> Option<KeyChord> {
    let mut parts: Vec<String> = text.split('+').map(|p| p.trim().to_string()).collect();
    let key = parts.pop()?;
    KeyChord::parse(&key, &parts).ok()
}

fn print_rows(session: &Session) {
    for row in session.rows() {
        println!("{row}");
    }
}

fn print_status(session: &Session) {
    println!("{}", session.status_message().unwrap_or("Ready"));
    let mut dirty: Vec<_> = session.tracker().dirty_paths().collect();
    dirty.sort();
    for path in dirty {
        println!("  modified: {path}");
    }
}
