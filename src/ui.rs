use crate::app::{App, Focus};
use crate::braille;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const SIDEBAR_WIDTH: u16 = 24;

/// Max scroll for help content (generous to account for text wrapping on small screens)
pub const HELP_CONTENT_LINES: u16 = 40;

/// Number of lines in controls content
pub const CONTROLS_CONTENT_LINES: u16 = 14;

// UI color scheme
const BORDER_COLOR: Color = Color::Cyan;
const HIGHLIGHT_COLOR: Color = Color::Yellow;
const TEXT_COLOR: Color = Color::White;
const DIM_TEXT_COLOR: Color = Color::Gray;

/// Creates a standard styled block with rounded borders
fn styled_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR))
        .title(title)
}

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if app.fullscreen_mode {
        render_canvas(frame, area, app);
    } else {
        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .split(area);

        render_sidebar(frame, layout[0], app);
        render_canvas(frame, layout[1], app);
    }

    if app.show_help {
        render_help_overlay(frame, area, app);
    }

    if app.hex_input.is_some() {
        render_hex_input(frame, area, app);
    }
}

/// Inner canvas rect (inside its border) for a frame of the given size
pub fn canvas_inner(frame_area: Rect, fullscreen: bool) -> Rect {
    let offset = if fullscreen { 0 } else { SIDEBAR_WIDTH.min(frame_area.width) };
    Rect {
        x: frame_area.x + offset + 1,
        y: frame_area.y + 1,
        width: frame_area.width.saturating_sub(offset + 2),
        height: frame_area.height.saturating_sub(2),
    }
}

/// Calculate the canvas size (excluding borders)
pub fn get_canvas_size(frame_area: Rect, fullscreen: bool) -> (u16, u16) {
    let inner = canvas_inner(frame_area, fullscreen);
    (inner.width, inner.height)
}

/// Visible lines in the controls box for a terminal of the given height
pub fn get_controls_visible_lines(terminal_height: u16) -> u16 {
    // status (5) + params (13) + controls borders (2)
    terminal_height.saturating_sub(5 + 13 + 2)
}

fn render_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),  // Status
            Constraint::Length(13), // Parameters
            Constraint::Min(4),     // Controls
        ])
        .split(area);

    render_status_box(frame, sections[0], app);
    render_params_box(frame, sections[1], app);
    render_controls_box(frame, sections[2], app);
}

fn render_status_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" Particle Field ");
    let collection = &app.collection;

    let (status_text, status_color) = if collection.paused {
        ("PAUSED", HIGHLIGHT_COLOR)
    } else {
        ("RUNNING", Color::Green)
    };

    let content = vec![
        Line::from(Span::styled(
            format!("{} particles", collection.particles.len()),
            Style::default().fg(TEXT_COLOR),
        )),
        Line::from(Span::styled(
            format!("{} links  f{}", app.last_links, collection.frames),
            Style::default().fg(DIM_TEXT_COLOR),
        )),
        Line::from(Span::styled(status_text, Style::default().fg(status_color))),
    ];

    let paragraph = Paragraph::new(content).block(block);
    frame.render_widget(paragraph, area);
}

fn on_off(value: bool) -> &'static str {
    if value {
        "On"
    } else {
        "Off"
    }
}

fn render_params_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" Parameters ");

    let make_line = |label: &str, value: String, focused: bool, enabled: bool| {
        let prefix = if focused { "> " } else { "  " };
        let style = if focused {
            Style::default().fg(HIGHLIGHT_COLOR)
        } else if enabled {
            Style::default().fg(TEXT_COLOR)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Line::from(Span::styled(format!("{}{}: {}", prefix, label, value), style))
    };

    let collection = &app.collection;
    let config = &collection.config;
    let cursor = &collection.cursor_settings;

    let distance = if collection.bind_distance == app.default_bind_distance() {
        format!("{:.0} (auto)", collection.bind_distance)
    } else {
        format!("{:.0}", collection.bind_distance)
    };

    let content = vec![
        make_line("Particles", collection.count.to_string(), app.focus == Focus::Particles, true),
        make_line(
            "Color",
            config.primary_color().to_string(),
            app.focus == Focus::Color,
            !config.rainbow,
        ),
        make_line("Rainbow", on_off(config.rainbow).to_string(), app.focus == Focus::Rainbow, true),
        make_line("Radius", format!("{:.1}", config.max_radius), app.focus == Focus::Radius, true),
        make_line("Distance", distance, app.focus == Focus::Distance, true),
        make_line("Speed", format!("{:.0}", config.max_speed), app.focus == Focus::Speed, true),
        make_line("Line", format!("{:.1}", config.line_width), app.focus == Focus::LineWidth, true),
        make_line("Line col", config.line_color.clone(), app.focus == Focus::LineColor, true),
        make_line("Cursor", on_off(cursor.enabled).to_string(), app.focus == Focus::CursorLink, true),
        make_line(
            "Cursor dist",
            format!("{:.0}", cursor.bind_distance),
            app.focus == Focus::CursorDistance,
            cursor.enabled,
        ),
        make_line(
            "Clear",
            collection.clear_mode.name().to_string(),
            app.focus == Focus::ClearMode,
            true,
        ),
    ];

    // Calculate scroll to keep focused item visible based on actual area
    let focus_line = app.focus.line_index();
    let visible_height = area.height.saturating_sub(2); // minus borders
    let content_height = content.len() as u16;

    let scroll = if visible_height == 0 || visible_height >= content_height {
        0 // No scrolling needed
    } else if focus_line >= visible_height {
        // Scroll to show focused line at bottom of visible area
        focus_line.saturating_sub(visible_height - 1)
    } else {
        0 // Focus is within first visible lines
    };

    let paragraph = Paragraph::new(content).block(block).scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_controls_box(frame: &mut Frame, area: Rect, app: &App) {
    let key_style = Style::default().fg(HIGHLIGHT_COLOR);
    let desc_style = Style::default().fg(DIM_TEXT_COLOR);

    // Helper to create a control line
    let make_control = |key: &str, desc: &str| -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("{:>5}", key), key_style),
            Span::styled(format!(" {}", desc), desc_style),
        ])
    };

    let content = vec![
        make_control("Space", "pause/resume"),
        make_control("Tab", "next parameter"),
        make_control("↑/↓", "adjust"),
        make_control("#", "type hex color"),
        make_control("R", "regenerate"),
        make_control("+/-", "particles"),
        make_control("[/]", "bind distance"),
        make_control("B", "rainbow"),
        make_control("C", "cursor links"),
        make_control("T", "trails"),
        make_control("V", "hide panel"),
        make_control("H", "help"),
        make_control("Esc", "unfocus"),
        make_control("Q", "quit"),
    ];

    let content_height = content.len() as u16;
    let visible_height = area.height.saturating_sub(2); // minus borders
    let max_scroll = content_height.saturating_sub(visible_height);

    let title = if max_scroll > 0 {
        " Controls (↑↓) "
    } else {
        " Controls "
    };

    let block = styled_block(title);

    let paragraph = Paragraph::new(content)
        .block(block)
        .scroll((app.controls_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_canvas(frame: &mut Frame, area: Rect, app: &App) {
    let background = app.surface.background.to_color();
    let block = styled_block("").style(Style::default().bg(background));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cells = braille::render_to_braille(&app.surface, inner.width, inner.height);

    let buf = frame.buffer_mut();
    for cell in cells {
        let x = inner.x + cell.x;
        let y = inner.y + cell.y;

        if x < inner.x + inner.width && y < inner.y + inner.height {
            if let Some(target) = buf.cell_mut((x, y)) {
                target
                    .set_char(cell.char)
                    .set_style(Style::default().fg(cell.color).bg(background));
            }
        }
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect, app: &App) {
    // Center the help dialog within the canvas
    let canvas_x = if app.fullscreen_mode { 0 } else { SIDEBAR_WIDTH };
    let canvas_width = area.width.saturating_sub(canvas_x);

    let help_width = 56.min(canvas_width.saturating_sub(4));
    let help_height = area.height.saturating_sub(4).min(30);
    let x = canvas_x + (canvas_width.saturating_sub(help_width)) / 2;
    let y = (area.height.saturating_sub(help_height)) / 2;

    let help_area = Rect {
        x: area.x + x,
        y: area.y + y,
        width: help_width,
        height: help_height,
    };

    frame.render_widget(Clear, help_area);

    let heading = Style::default().fg(HIGHLIGHT_COLOR);
    let content = vec![
        Line::from(""),
        Line::from(Span::styled("PARTICLE FIELD", Style::default().fg(BORDER_COLOR))),
        Line::from(""),
        Line::from("Glowing discs drift and bounce off the edges, speeding up on each hit until they reach their top speed and drop back. Particles closer than the bind distance are joined by a line."),
        Line::from(""),
        Line::from(Span::styled("PARAMETERS (Tab, then Up/Down):", heading)),
        Line::from("Particles, Color, Rainbow, Radius and Speed regenerate the particles. Distance, Line width and Line color apply immediately."),
        Line::from(""),
        Line::from(Span::styled("COLORS:", heading)),
        Line::from("Up/Down cycles swatches. Press # on Color or Line col to type #RRGGBB, Enter to apply, Esc to cancel. Rainbow disables Color."),
        Line::from(""),
        Line::from(Span::styled("CURSOR:", heading)),
        Line::from("With cursor links on, the mouse becomes a particle and every particle within Cursor dist links to it."),
        Line::from(""),
        Line::from(Span::styled("CLEAR MODE:", heading)),
        Line::from("Full wipes the canvas every frame. Trails wipes only around each particle, so lines linger."),
        Line::from(""),
        Line::from(Span::styled("BASIC CONTROLS:", heading)),
        Line::from("Space=Pause, R=Regenerate, V=Hide panel, +/-=Particles, [/]=Distance, Q=Quit"),
        Line::from(""),
    ];

    let content_height = content.len() as u16;
    let visible_height = help_height.saturating_sub(2); // minus borders
    let max_scroll = content_height.saturating_sub(visible_height);

    let title = if max_scroll > 0 {
        " Help (J/K scroll, H to close) "
    } else {
        " Help (H to close) "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(HIGHLIGHT_COLOR))
        .title(title);

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.help_scroll, 0));

    frame.render_widget(paragraph, help_area);
}

fn render_hex_input(frame: &mut Frame, area: Rect, app: &App) {
    let Some(input) = &app.hex_input else {
        return;
    };

    let width = 30.min(area.width);
    let height = 5.min(area.height);
    let popup = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    };

    frame.render_widget(Clear, popup);

    let label = if input.target == Focus::LineColor {
        " Line color "
    } else {
        " Particle color "
    };

    let valid = crate::color::is_hex_color(&input.buffer);
    let content = vec![
        Line::from(Span::styled(
            format!("{}_", input.buffer),
            Style::default().fg(if valid { Color::Green } else { TEXT_COLOR }),
        )),
        Line::from(Span::styled("Enter apply, Esc cancel", Style::default().fg(DIM_TEXT_COLOR))),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(HIGHLIGHT_COLOR))
        .title(label);

    frame.render_widget(Paragraph::new(content).block(block), popup);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_canvas_size_accounts_for_sidebar() {
        let area = Rect { x: 0, y: 0, width: 120, height: 40 };
        assert_eq!(get_canvas_size(area, false), (120 - SIDEBAR_WIDTH - 2, 38));
        assert_eq!(get_canvas_size(area, true), (118, 38));
        assert_eq!(canvas_inner(area, false).x, SIDEBAR_WIDTH + 1);
    }

    #[test]
    fn test_tiny_terminal_does_not_underflow() {
        let area = Rect { x: 0, y: 0, width: 10, height: 1 };
        assert_eq!(get_canvas_size(area, false), (0, 0));
    }

    #[test]
    fn test_render_draws_particles() {
        let area = Rect { x: 0, y: 0, width: 100, height: 30 };
        let (w, h) = get_canvas_size(area, false);
        let mut app = App::new(w, h, &AppConfig::default(), Some(11)).unwrap();
        app.tick();

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();

        let buffer = terminal.backend().buffer();
        let braille_cells = buffer
            .content()
            .iter()
            .filter(|c| c.symbol().chars().any(|ch| ('\u{2801}'..='\u{28FF}').contains(&ch)))
            .count();
        assert!(braille_cells > 0);
    }

    #[test]
    fn test_render_with_overlays() {
        let mut app = App::new(60, 20, &AppConfig::default(), Some(5)).unwrap();
        app.toggle_help();
        app.focus = Focus::Color;
        app.open_hex_input();

        let mut terminal = Terminal::new(TestBackend::new(84, 22)).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();
    }
}
