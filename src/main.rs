use anyhow::Result;
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::layout::Rect;
use ratatui::DefaultTerminal;
use std::sync::Arc;
use std::time::Duration;
use tui_poi::app::{App, InputMode};
use tui_poi::config::Config;
use tui_poi::transport::HttpTransport;
use tui_poi::worker::{Dispatcher, Services};
use tui_poi::{data, headless, logging, ui};

fn main() -> Result<()> {
    let config = Config::parse();
    logging::init(config.log_file.as_deref(), config.headless)?;
    let settings = config.view_settings()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;
    let transport = HttpTransport::new(&config.user_agent, config.http_timeout())?;
    let services = Arc::new(Services::new(transport, &config));

    if config.headless {
        return runtime.block_on(headless::run(&config, &settings, services.as_ref()));
    }

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let size = terminal.size()?;
    let map_area = ui::map_inner_area(Rect::new(0, 0, size.width, size.height));
    let mut app = App::new(settings, map_area);
    data::load_basemap(&mut app.map_renderer, &config.data_dir);

    let dispatcher = Dispatcher::new(runtime.handle().clone(), services);
    let result = run(&mut terminal, &mut app, &dispatcher);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    // Outstanding requests are abandoned
    runtime.shutdown_background();
    result
}

/// Handle mouse events for panning, zooming and marker picking
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        // Scroll wheel zooms towards the mouse position
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        // Horizontal scroll for panning (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        MouseEventKind::Down(MouseButton::Left) => app.press(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.handle_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.end_drag(),
        _ => {}
    }
}

fn handle_search_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_search(),
        KeyCode::Esc => app.cancel_search(),
        KeyCode::Backspace => app.pop_search_char(),
        KeyCode::Char(ch) => app.push_search_char(ch),
        _ => {}
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),

        // Pan with hjkl or arrow keys
        KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
        KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
        KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6),
        KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6),

        // Zoom
        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
        KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

        KeyCode::Char('/') => app.start_search(),

        // Categories
        KeyCode::Tab => app.next_category(),
        KeyCode::Char(ch @ '1'..='9') => app.select_category_index(ch as usize - '1' as usize),

        // Popups
        KeyCode::Char('n') => app.select_next_marker(),
        KeyCode::Char('p') => app.select_prev_marker(),
        KeyCode::Char('c') => app.close_popup(),

        KeyCode::Char('b') | KeyCode::Char('B') => app.map_renderer.toggle_borders(),

        // Reset view
        KeyCode::Char('r') | KeyCode::Char('0') => app.reset_view(),

        _ => {}
    }
}

fn run(
    terminal: &mut DefaultTerminal,
    app: &mut App,
    dispatcher: &Dispatcher<HttpTransport>,
) -> Result<()> {
    app.on_map_ready();

    loop {
        // Apply finished requests, then react to completed moves
        dispatcher.drain_into(app);
        app.tick();
        dispatcher.dispatch_all(app);

        terminal.draw(|frame| ui::render(frame, app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                // Only handle key press events (not release)
                Event::Key(key) if key.kind == KeyEventKind::Press => match app.input_mode {
                    InputMode::Search => handle_search_key(app, key),
                    InputMode::Normal => handle_key(app, key),
                },
                Event::Mouse(mouse) => handle_mouse(app, mouse),
                Event::Resize(width, height) => {
                    app.resize(ui::map_inner_area(Rect::new(0, 0, width, height)));
                }
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
