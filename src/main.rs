mod app;
mod braille;
mod collection;
mod color;
mod config;
mod particle;
mod settings;
mod surface;
mod ui;

use anyhow::{Context, Result};
use app::{App, Focus};
use clap::Parser;
use color::Rgb;
use config::AppConfig;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use settings::{ClearMode, MAX_BIND_DISTANCE, MAX_PARTICLES, MAX_RADIUS_LIMIT, MAX_SPEED_LIMIT};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(name = "particle-field")]
#[command(about = "Bouncing, proximity-linked particles in the terminal")]
struct Args {
    // === Particles ===
    /// Number of particles (1-300, default: one per 50 dots of width, at least 15)
    #[arg(short = 'p', long)]
    particles: Option<usize>,

    /// Largest particle radius in dots (min radius-30)
    #[arg(short = 'r', long)]
    radius: Option<f32>,

    /// Upper bound of the per-particle max speed (base speed-30)
    #[arg(short = 's', long)]
    speed: Option<f32>,

    /// Particle color as #RRGGBB
    #[arg(long)]
    color: Option<String>,

    /// Use the rainbow palette instead of a single color
    #[arg(long)]
    rainbow: bool,

    // === Links ===
    /// Link distance between particles (0-400, default grows with the count)
    #[arg(short = 'd', long)]
    distance: Option<f32>,

    /// Link line width (0.1-3.0)
    #[arg(long = "line-width")]
    line_width: Option<f32>,

    /// Link line color as #RRGGBB
    #[arg(long = "line-color")]
    line_color: Option<String>,

    /// Link particles to the mouse cursor
    #[arg(long)]
    cursor: bool,

    /// Clear only around each particle so lines leave trails
    #[arg(long)]
    trails: bool,

    // === Runtime ===
    /// Target frames per second (1-240)
    #[arg(long)]
    fps: Option<u32>,

    /// Seed for reproducible particle layouts
    #[arg(long)]
    seed: Option<u64>,

    /// JSON config file (default: <config dir>/particle-field/config.json if present)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit
    #[arg(long = "print-config")]
    print_config: bool,

    /// Write logs to this file (nothing is logged otherwise)
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long = "log-level", default_value = "info")]
    log_level: Level,
}

/// Install a file-backed subscriber; the terminal itself is never logged to
fn init_logging(path: Option<&Path>, level: Level) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("failed to create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .init();
    Ok(())
}

/// Apply CLI overrides on top of the loaded config, clamped to the panel ranges
fn apply_args(config: &mut AppConfig, args: &Args) -> Result<()> {
    let particle = &mut config.particle;

    if let Some(count) = args.particles {
        config.particles = Some(count.clamp(1, MAX_PARTICLES));
    }
    if let Some(radius) = args.radius {
        particle.max_radius = radius.clamp(particle.min_radius, MAX_RADIUS_LIMIT);
    }
    if let Some(speed) = args.speed {
        particle.max_speed = speed.clamp(particle.speed, MAX_SPEED_LIMIT);
    }
    if args.rainbow {
        particle.set_rainbow(true);
    } else if let Some(hex) = &args.color {
        let rgb = Rgb::parse_hex(hex).context("--color")?;
        particle.set_primary_color(&rgb.to_hex());
    }
    if let Some(width) = args.line_width {
        particle.line_width = width.clamp(0.1, 3.0);
    }
    if let Some(hex) = &args.line_color {
        particle.line_color = Rgb::parse_hex(hex).context("--line-color")?.to_hex();
    }
    if let Some(distance) = args.distance {
        config.bind_distance = Some(distance.clamp(0.0, MAX_BIND_DISTANCE));
    }
    if args.cursor {
        config.cursor.enabled = true;
    }
    if args.trails {
        config.clear_mode = ClearMode::Trails;
    }
    if let Some(fps) = args.fps {
        config.fps = fps.clamp(1, 240);
    }

    config.validate()
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.log_file.as_deref(), args.log_level)?;

    let (mut config, source) = AppConfig::load(args.config.as_deref())?;
    apply_args(&mut config, &args)?;

    if args.print_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    match &source {
        Some(path) => info!(path = %path.display(), "loaded config"),
        None => info!("using default config"),
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = setup_and_run(&mut terminal, &config, args.seed);

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        tracing::error!("exiting with error: {:#}", err);
    }
    res
}

fn frame_area<B: ratatui::backend::Backend>(terminal: &Terminal<B>) -> Result<Rect> {
    let size = terminal.size()?;
    Ok(Rect {
        x: 0,
        y: 0,
        width: size.width,
        height: size.height,
    })
}

fn setup_and_run<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    config: &AppConfig,
    seed: Option<u64>,
) -> Result<()> {
    let (canvas_width, canvas_height) = ui::get_canvas_size(frame_area(terminal)?, false);
    let mut app = App::new(canvas_width, canvas_height, config, seed)?;
    let frame_duration = Duration::from_millis(1000 / u64::from(config.fps.max(1)));
    run_app(terminal, &mut app, frame_duration)
}

/// Bring the surface in line with the current terminal and sidebar state
fn sync_canvas<B: ratatui::backend::Backend>(terminal: &Terminal<B>, app: &mut App) -> Result<()> {
    let (canvas_width, canvas_height) = ui::get_canvas_size(frame_area(terminal)?, app.fullscreen_mode);
    app.resize(canvas_width, canvas_height);
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    frame_duration: Duration,
) -> Result<()> {
    let mut last_frame = Instant::now();

    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        let timeout = frame_duration.saturating_sub(last_frame.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    // Only process Press events
                    if key.kind == KeyEventKind::Press && handle_key(terminal, app, key)? {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => {
                    if matches!(mouse.kind, MouseEventKind::Moved | MouseEventKind::Drag(_)) {
                        let canvas = ui::canvas_inner(frame_area(terminal)?, app.fullscreen_mode);
                        app.mouse_moved(mouse.column, mouse.row, canvas);
                    }
                }
                Event::FocusLost => app.collection.cursor.hide(),
                Event::Resize(width, height) => {
                    let (canvas_width, canvas_height) = ui::get_canvas_size(
                        Rect {
                            x: 0,
                            y: 0,
                            width,
                            height,
                        },
                        app.fullscreen_mode,
                    );
                    app.resize(canvas_width, canvas_height);
                }
                _ => {}
            }
        }

        if last_frame.elapsed() >= frame_duration {
            app.tick();
            last_frame = Instant::now();
        }
    }
}

/// Returns true when the app should quit
fn handle_key<B: ratatui::backend::Backend>(terminal: &Terminal<B>, app: &mut App, key: KeyEvent) -> Result<bool> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Ok(true);
    }

    // === Hex entry swallows keys while open ===
    if app.hex_input.is_some() {
        match key.code {
            KeyCode::Enter => app.confirm_hex_input(),
            KeyCode::Esc => app.cancel_hex_input(),
            KeyCode::Backspace => app.hex_input_backspace(),
            KeyCode::Char(c) => app.hex_input_push(c),
            _ => {}
        }
        return Ok(false);
    }

    match key.code {
        // System controls
        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(true),
        KeyCode::Char(' ') => app.toggle_pause(),
        KeyCode::Char('r') | KeyCode::Char('R') => app.reset(),
        KeyCode::Char('v') | KeyCode::Char('V') => {
            app.toggle_fullscreen();
            sync_canvas(terminal, app)?;
        }
        KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?') => app.toggle_help(),
        KeyCode::Char('#') => app.open_hex_input(),
        KeyCode::Char('+') | KeyCode::Char('=') => {
            app.adjust_particles(5);
            app.focus = Focus::Particles;
        }
        KeyCode::Char('-') | KeyCode::Char('_') => {
            app.adjust_particles(-5);
            app.focus = Focus::Particles;
        }
        KeyCode::Char('[') => {
            app.adjust_distance(-10.0);
            app.focus = Focus::Distance;
        }
        KeyCode::Char(']') => {
            app.adjust_distance(10.0);
            app.focus = Focus::Distance;
        }
        KeyCode::Char('b') | KeyCode::Char('B') => {
            app.toggle_rainbow();
            app.focus = Focus::Rainbow;
        }
        KeyCode::Char('c') | KeyCode::Char('C') => {
            app.toggle_cursor_links();
            app.focus = Focus::CursorLink;
        }
        KeyCode::Char('t') | KeyCode::Char('T') => {
            app.cycle_clear_mode();
            app.focus = Focus::ClearMode;
        }

        // Navigation
        KeyCode::Tab => app.next_focus(),
        KeyCode::BackTab => app.prev_focus(),
        KeyCode::Up => {
            if !app.show_help {
                if app.focus.is_param() {
                    app.adjust_focused_up();
                } else {
                    app.scroll_controls_up();
                }
            }
        }
        KeyCode::Down => {
            if !app.show_help {
                if app.focus.is_param() {
                    app.adjust_focused_down();
                } else {
                    let visible = ui::get_controls_visible_lines(frame_area(terminal)?.height);
                    app.scroll_controls_down(ui::CONTROLS_CONTENT_LINES.saturating_sub(visible));
                }
            }
        }
        KeyCode::Esc => {
            if app.show_help {
                app.toggle_help();
            } else if app.focus.is_param() {
                app.focus = Focus::Controls;
            }
        }
        KeyCode::Char('j') | KeyCode::Char('J') => {
            if app.show_help {
                app.scroll_help_down(ui::HELP_CONTENT_LINES);
            }
        }
        KeyCode::Char('k') | KeyCode::Char('K') => {
            if app.show_help {
                app.scroll_help_up();
            }
        }
        _ => {}
    }

    Ok(false)
}
