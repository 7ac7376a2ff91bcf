//! sectree: a terminal editor for section trees.
#![allow(clippy::multiple_crate_versions)]

use clap::Parser;
use edtui::EditorEventHandler;
use ratatui::crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use sectree::app_state::{self, AppState};
use sectree::config::Config;
use sectree::context::Dispatcher;
use sectree::host::{HostMessage, NdjsonHost};
use sectree::journal::{FileJournal, MemoryJournal};
use sectree::loader::{FileLoader, LoadHandle, LoaderEvent, WatchOptions};
use sectree::render::{RenderOptions, Renderer};
use sectree::store::SectionStore;
use sectree::typeset::UnicodeMath;
use sectree::ui;
use std::error::Error;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "sectree")]
#[command(about = "Editable, reorderable section trees", long_about = None)]
struct Args {
    /// Section document (JSON) to edit
    #[arg(value_name = "FILE")]
    path: PathBuf,

    /// Do not reload the document when it changes on disk
    #[arg(long)]
    no_watch: bool,

    /// Open read-only
    #[arg(long)]
    preview: bool,

    /// Disable section reordering
    #[arg(long)]
    no_reorder: bool,

    /// Append committed edits to this NDJSON file
    #[arg(long, value_name = "PATH")]
    journal: Option<PathBuf>,

    /// Write host notifications to this NDJSON file
    #[arg(long, value_name = "PATH")]
    host_outbox: Option<PathBuf>,

    /// Write diagnostics to this file
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,
}

fn path_arg(path: Option<PathBuf>) -> Option<String> {
    path.map(|p| p.to_string_lossy().to_string())
}

fn init_logging(path: &Path) -> Result<(), Box<dyn Error>> {
    let file = File::create(path)?;
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let mut cfg = Config::load()?;

    // Override config with command line args
    if args.no_watch {
        cfg.watch = false;
    }
    if args.preview {
        cfg.preview = true;
    }
    if args.no_reorder {
        cfg.reorder_enabled = false;
    }
    if let Some(journal) = path_arg(args.journal) {
        cfg.journal_path = journal;
    }
    if let Some(outbox) = path_arg(args.host_outbox) {
        cfg.host_outbox = outbox;
    }
    if let Some(log) = path_arg(args.log) {
        cfg.log_file = log;
    }

    if let Some(log_path) = Config::non_empty(&cfg.log_file) {
        init_logging(log_path)?;
    }

    let (action_tx, action_rx) = mpsc::channel();
    let dispatcher = Dispatcher::from_sender(action_tx);

    let (host_tx, host_rx) = mpsc::channel::<HostMessage>();
    let store = match Config::non_empty(&cfg.host_outbox) {
        Some(outbox) => SectionStore::new(Vec::new(), NdjsonHost::new(File::create(outbox)?)),
        None => SectionStore::new(Vec::new(), host_tx),
    };
    let memory_journal = MemoryJournal::new();
    let store = match Config::non_empty(&cfg.journal_path) {
        Some(journal) => store.with_journal(FileJournal::new(journal)),
        None => store.with_journal(memory_journal.clone()),
    }
    .with_wrapper_prefix(cfg.wrapper_prefix.clone());

    let options = RenderOptions {
        reorder_enabled: cfg.reorder_enabled,
        is_preview: cfg.preview,
    };
    let renderer = Renderer::new(options, dispatcher.clone()).with_typesetter(UnicodeMath);
    let app = AppState::new(store, renderer, dispatcher, action_rx, cfg.wrap_width);

    let (loader_tx, loader_rx) = mpsc::channel();
    let watch = WatchOptions {
        enabled: cfg.watch,
        debounce: cfg.debounce(),
    };
    let handle = LoadHandle::spawn(FileLoader::new(&args.path), watch, loader_tx);

    let result = run_tui(app, &loader_rx);
    handle.teardown();
    result?;

    for message in host_rx.try_iter() {
        println!("{}", serde_json::to_string(&message)?);
    }
    let log = memory_journal.log();
    if !log.edits.is_empty() {
        println!("{}", serde_json::to_string_pretty(&log)?);
    }

    Ok(())
}

fn run_tui(mut app: AppState, loader: &mpsc::Receiver<LoaderEvent>) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut editor_handler = EditorEventHandler::default();

    let result = run_app(&mut terminal, &mut app, loader, &mut editor_handler);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

#[allow(clippy::too_many_lines)]
fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
    loader: &mpsc::Receiver<LoaderEvent>,
    editor_handler: &mut EditorEventHandler,
) -> io::Result<()> {
    loop {
        for event in loader.try_iter() {
            app.ingest(event);
        }
        app.pump_actions();

        terminal.draw(|f| ui::draw(f, app))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };

        match app.current_view {
            app_state::View::List => match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Up => {
                    if key.modifiers.contains(event::KeyModifiers::CONTROL) {
                        // Ctrl+Up: Start move or move up
                        if app.move_state == app_state::MoveState::None {
                            app.start_move();
                        } else {
                            app.move_section_up();
                        }
                    } else if let Some(prev) = app.find_prev_section() {
                        app.current_section_index = prev;
                    }
                }
                KeyCode::Down => {
                    if key.modifiers.contains(event::KeyModifiers::CONTROL) {
                        // Ctrl+Down: Start move (if not moving) or move down
                        if app.move_state == app_state::MoveState::None {
                            app.start_move();
                        } else {
                            app.move_section_down();
                        }
                    } else if let Some(next) = app.find_next_section() {
                        app.current_section_index = next;
                    }
                }
                KeyCode::Home => {
                    if key.modifiers.contains(event::KeyModifiers::CONTROL) {
                        if app.move_state != app_state::MoveState::None {
                            app.move_section_to_top();
                        }
                    } else if let Some(first) = app.navigate_to_first() {
                        app.current_section_index = first;
                    }
                }
                KeyCode::End => {
                    if key.modifiers.contains(event::KeyModifiers::CONTROL) {
                        if app.move_state != app_state::MoveState::None {
                            app.move_section_to_bottom();
                        }
                    } else if let Some(last) = app.navigate_to_last() {
                        app.current_section_index = last;
                    }
                }
                KeyCode::Char('a') if app.move_state == app_state::MoveState::None => {
                    app.add_after_current();
                }
                KeyCode::Char('d') if app.move_state == app_state::MoveState::None => {
                    app.delete_current();
                }
                KeyCode::Esc => {
                    if app.move_state != app_state::MoveState::None {
                        app.cancel_move();
                    }
                }
                KeyCode::Char(':') => {
                    app.current_view = app_state::View::Command;
                    app.command_buffer.clear();
                    app.message = None;
                }
                KeyCode::Enter => {
                    // Don't enter detail view while moving
                    if app.move_state == app_state::MoveState::None {
                        app.enter_detail_view();
                    }
                }
                _ => {}
            },
            app_state::View::Detail => match key.code {
                KeyCode::Char(':') | KeyCode::Esc => {
                    let normal = app
                        .editor_state
                        .as_ref()
                        .is_some_and(|state| state.mode == edtui::EditorMode::Normal);
                    if !normal {
                        if let Some(ref mut editor_state) = app.editor_state {
                            editor_handler.on_key_event(key, editor_state);
                        }
                    } else if key.code == KeyCode::Esc {
                        app.exit_detail_view(false);
                    } else {
                        app.current_view = app_state::View::Command;
                        app.command_buffer.clear();
                        app.message = None;
                    }
                }
                _ => {
                    if let Some(ref mut editor_state) = app.editor_state {
                        editor_handler.on_key_event(key, editor_state);
                    }
                }
            },
            app_state::View::Command => match key.code {
                KeyCode::Char(c) => {
                    app.command_buffer.push(c);
                }
                KeyCode::Backspace => {
                    app.command_buffer.pop();
                }
                KeyCode::Enter => {
                    let cmd = std::mem::take(&mut app.command_buffer);
                    let editing = app.editor_state.is_some();
                    app.current_view = if editing {
                        app_state::View::Detail
                    } else {
                        app_state::View::List
                    };

                    match cmd.as_str() {
                        "w" => {
                            if app.move_state == app_state::MoveState::Moved {
                                app.save_section_reorder();
                            } else if editing {
                                app.save_current();
                            } else {
                                app.message = Some("Nothing to save".to_string());
                            }
                        }
                        "x" => {
                            if app.move_state == app_state::MoveState::Moved {
                                app.save_section_reorder();
                            } else if editing {
                                app.exit_detail_view(true);
                            }
                        }
                        "q" | "q!" => {
                            if editing {
                                app.exit_detail_view(false);
                            } else if app.move_state != app_state::MoveState::None {
                                app.cancel_move();
                            } else {
                                return Ok(());
                            }
                        }
                        "wn" | "wp" => {
                            if editing {
                                let target = if cmd == "wn" {
                                    app.find_next_section()
                                } else {
                                    app.find_prev_section()
                                };
                                app.exit_detail_view(true);
                                if let Some(target) = target {
                                    app.current_section_index = target;
                                    app.enter_detail_view();
                                } else {
                                    app.message = Some("No more sections".to_string());
                                }
                            }
                        }
                        "a" => {
                            if app.move_state == app_state::MoveState::None {
                                app.add_after_current();
                            } else {
                                app.message = Some("Finish or cancel the move first".to_string());
                            }
                        }
                        _ => {
                            app.message = Some(format!("Unknown command: {cmd}"));
                        }
                    }
                }
                KeyCode::Esc => {
                    app.current_view = if app.editor_state.is_some() {
                        app_state::View::Detail
                    } else {
                        app_state::View::List
                    };
                    app.command_buffer.clear();
                }
                _ => {}
            },
        }
    }
}
