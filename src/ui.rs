use crate::app::{App, InputMode};
use crate::braille::BrailleCanvas;
use crate::category;
use crate::map::{MapLayers, Popup};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
    Frame,
};

const SIDEBAR_WIDTH: u16 = 30;

/// Attribution required for OpenStreetMap data
pub const ATTRIBUTION: &str = "© OpenStreetMap contributors";

struct Areas {
    sidebar: Rect,
    map: Rect,
    status: Rect,
}

fn split(area: Rect) -> Areas {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Sidebar + map
            Constraint::Length(1), // Status bar
        ])
        .split(area);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(10)])
        .split(rows[0]);
    Areas {
        sidebar: cols[0],
        map: cols[1],
        status: rows[1],
    }
}

fn map_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
}

/// Screen area of the map canvas for a terminal of the given size
pub fn map_inner_area(area: Rect) -> Rect {
    map_block().inner(split(area).map)
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let areas = split(frame.area());
    render_sidebar(frame, app, areas.sidebar);
    render_map(frame, app, areas.map);
    render_status_bar(frame, app, areas.status);
}

fn render_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let locale = app.settings().render.locale;
    let categories = category::list_categories();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(categories.len() as u16 + 2),
            Constraint::Min(0),
        ])
        .split(area);

    // Search box
    let searching = app.input_mode == InputMode::Search;
    let search_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if searching {
            Color::Yellow
        } else {
            Color::DarkGray
        }))
        .title(Span::styled(
            format!(" {} [/] ", locale.search_title()),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
    let search_line = if app.search_text.is_empty() && !searching {
        Line::from(Span::styled(
            locale.search_placeholder(),
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut spans = vec![Span::raw(app.search_text.as_str())];
        if searching {
            spans.push(Span::styled("▏", Style::default().fg(Color::Yellow)));
        }
        Line::from(spans)
    };
    frame.render_widget(Paragraph::new(search_line).block(search_block), chunks[0]);

    // Category buttons
    let lines: Vec<Line> = categories
        .iter()
        .enumerate()
        .map(|(idx, cat)| {
            let text = format!(" {} {}", idx + 1, locale.category_label(cat));
            let style = if cat.key == app.active.key {
                Style::default()
                    .fg(Color::White)
                    .bg(Color::Blue)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            let width = SIDEBAR_WIDTH as usize - 2;
            Line::from(Span::styled(format!("{text:<width$}"), style))
        })
        .collect();
    let category_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" {} [Tab] ", locale.categories_title()));
    frame.render_widget(Paragraph::new(lines).block(category_block), chunks[1]);

    // Result summary
    let summary = if app.is_loading() {
        Span::styled(locale.loading(), Style::default().fg(Color::Yellow))
    } else {
        Span::styled(
            locale.results(app.markers().len()),
            Style::default().fg(Color::Green),
        )
    };
    let help = Style::default().fg(Color::DarkGray);
    let info = vec![
        Line::from(summary),
        Line::default(),
        Line::from(Span::styled("n/p  marker", help)),
        Line::from(Span::styled("c    close popup", help)),
        Line::from(Span::styled("hjkl pan  +/- zoom", help)),
        Line::from(Span::styled("r    reset  q quit", help)),
    ];
    frame.render_widget(
        Paragraph::new(info),
        chunks[2].inner(ratatui::layout::Margin::new(1, 0)),
    );
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let locale = app.settings().render.locale;
    let mut title = vec![Span::styled(
        format!(" {} ", locale.category_label(app.active)),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];
    if app.is_loading() {
        title.push(Span::styled(
            format!(" {} ", locale.loading()),
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ));
    }
    let block = map_block().title(Line::from(title));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Size the viewport to what is actually on screen
    let mut viewport = app.map.viewport.clone();
    viewport.width = inner.width as usize * 2;
    viewport.height = inner.height as usize * 4;

    let layers = app
        .map_renderer
        .render(inner.width as usize, inner.height as usize, &viewport);

    let to_cell = |(px, py): (i32, i32)| -> Option<(u16, u16)> {
        if px < 0 || py < 0 {
            return None;
        }
        let (cx, cy) = ((px / 2) as u16, (py / 4) as u16);
        (cx < inner.width && cy < inner.height).then_some((cx, cy))
    };

    let markers: Vec<(u16, u16, bool)> = app
        .markers()
        .iter()
        .enumerate()
        .filter_map(|(idx, m)| {
            to_cell(viewport.project(m.coordinate.lon, m.coordinate.lat))
                .map(|(cx, cy)| (cx, cy, app.selected == Some(idx)))
        })
        .collect();

    let map_widget = MapWidget {
        layers,
        markers,
        cursor_pos: app.mouse_pixel_pos().and_then(to_cell),
    };
    frame.render_widget(map_widget, inner);

    if let Some(marker) = app.selected_marker() {
        let anchor = to_cell(viewport.project(marker.coordinate.lon, marker.coordinate.lat));
        if let Some((cx, cy)) = anchor {
            render_popup(frame, &marker.popup, inner, (inner.x + cx, inner.y + cy));
        }
    }
}

/// Custom widget that renders the braille basemap with marker glyphs overlaid
struct MapWidget {
    layers: MapLayers,
    markers: Vec<(u16, u16, bool)>,
    cursor_pos: Option<(u16, u16)>,
}

impl MapWidget {
    /// Render a braille canvas layer with a specific color
    fn render_layer(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        for (cx, cy, ch) in canvas.dots() {
            if cx >= area.width as usize || cy >= area.height as usize {
                continue;
            }
            let (x, y) = (area.x + cx as u16, area.y + cy as u16);
            buf[(x, y)].set_char(ch).set_fg(color);
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Back to front: coastlines, borders, markers, cursor
        Self::render_layer(&self.layers.coastlines, Color::Cyan, area, buf);
        Self::render_layer(&self.layers.borders, Color::Yellow, area, buf);

        // Selected marker last so it stays on top of neighbours in the same cell
        let mut markers = self.markers;
        markers.sort_by_key(|&(_, _, selected)| selected);
        for (cx, cy, selected) in markers {
            let (glyph, style) = if selected {
                ('◉', Style::default().fg(Color::LightYellow).add_modifier(Modifier::BOLD))
            } else {
                ('●', Style::default().fg(Color::Red))
            };
            buf[(area.x + cx, area.y + cy)].set_char(glyph).set_style(style);
        }

        if let Some((cx, cy)) = self.cursor_pos {
            buf[(area.x + cx, area.y + cy)].set_char('╋').set_fg(Color::Red);
        }
    }
}

/// Place a popup box beside its marker, kept inside `bounds`
fn popup_rect(popup: &Popup, bounds: Rect, anchor: (u16, u16)) -> Rect {
    let width = (popup.width() as u16 + 4).min(bounds.width);
    let height = (popup.lines.len() as u16 + 3).min(bounds.height);
    let (ax, ay) = anchor;

    let right = bounds.x + bounds.width;
    let x = if ax + 2 + width <= right {
        ax + 2
    } else {
        ax.saturating_sub(width + 1).max(bounds.x)
    };
    let bottom = bounds.y + bounds.height;
    let y = ay.min(bottom.saturating_sub(height)).max(bounds.y);
    Rect::new(x, y, width, height)
}

fn render_popup(frame: &mut Frame, popup: &Popup, bounds: Rect, anchor: (u16, u16)) {
    let rect = popup_rect(popup, bounds, anchor);

    let mut lines = vec![Line::from(Span::styled(
        popup.title.as_str(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    for line in &popup.lines {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{}: ", line.label),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(line.value.as_str()),
        ]));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .style(Style::default().fg(Color::White).bg(Color::Black))
            .wrap(Wrap { trim: false }),
        rect,
    );
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let settings = &app.map_renderer.settings;

    let status = Line::from(vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" (", Style::default().fg(Color::DarkGray)),
        Span::styled(app.lod_level(), Style::default().fg(Color::Magenta)),
        Span::styled(") ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            if settings.show_borders { "[B]order " } else { "[b]order " },
            Style::default().fg(if settings.show_borders { Color::Green } else { Color::DarkGray }),
        ),
        Span::styled("| ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(ATTRIBUTION, Style::default().fg(Color::Gray)),
    ]);

    frame.render_widget(Paragraph::new(status), area);
}
