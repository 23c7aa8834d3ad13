use std::io;
use std::sync::Arc;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use coinwire_core::{scheduler::RefreshTimer, Aggregator, AppConfig, CycleTrigger};
use coinwire_tui::{
    app::{App, Mode},
    event::{AppEvent, EventHandler, RefreshResult},
    input::{apply_action, handle_key_event, Action},
    widgets::{ArticleListWidget, FilterBarWidget, PopupWidget, StatusBarWidget},
};

pub async fn run(config: Arc<AppConfig>) -> Result<()> {
    let aggregator = Aggregator::from_config(&config)?;
    if aggregator.sources().is_empty() {
        warn!("All news sources are disabled; nothing will be fetched");
    }

    // Setup terminal
    restore_terminal_on_panic();
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, SetTitle("Coinwire"))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, config, aggregator).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Leave raw mode and the alternate screen before the panic message prints
fn restore_terminal_on_panic() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        previous(info);
    }));
}

async fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    config: Arc<AppConfig>,
    aggregator: Aggregator,
) -> Result<()> {
    let mut app = App::new(config.clone());
    let event_handler = EventHandler::new(config.ui.tick_rate_ms);

    // Finished cycles come back here
    let (refresh_tx, mut refresh_rx) = mpsc::unbounded_channel::<RefreshResult>();

    // Timer requests; the loop decides whether they start a cycle
    let (trigger_tx, mut trigger_rx) = mpsc::unbounded_channel::<CycleTrigger>();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let timer = tokio::spawn(RefreshTimer::from_config(&config, trigger_tx).run(shutdown_rx));

    // Load initial data
    start_cycle(&mut app, &aggregator, CycleTrigger::Initial, &refresh_tx);

    // Main loop
    loop {
        // Process any completed refresh operations (non-blocking)
        while let Ok(result) = refresh_rx.try_recv() {
            info!("{:?} cycle finished", result.trigger());
            app.apply_refresh(result);
        }

        while let Ok(trigger) = trigger_rx.try_recv() {
            start_cycle(&mut app, &aggregator, trigger, &refresh_tx);
        }

        terminal.draw(|frame| draw(frame, &app))?;

        if let Some(event) = event_handler.next()? {
            match event {
                AppEvent::Key(key) => {
                    let action = handle_key_event(key, &app);
                    handle_action(&mut app, action, &aggregator, &refresh_tx);
                }
                AppEvent::Resize(_, _) => {}
                AppEvent::Tick => app.tick(),
            }
        }

        if app.should_quit {
            break;
        }
    }

    let _ = shutdown_tx.send(true);
    if let Err(e) = timer.await {
        warn!("Refresh timer task failed: {}", e);
    }

    Ok(())
}

fn draw(frame: &mut Frame, app: &App) {
    let size = frame.area();

    // Filter bar, cards, status bar
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(size);

    FilterBarWidget::render(frame, layout[0], app);
    ArticleListWidget::render(frame, layout[1], app);
    StatusBarWidget::render(frame, layout[2], app);

    if app.mode == Mode::Help {
        PopupWidget::render_help(frame, &app.theme);
    }
}

/// Spawn a fetch cycle unless one is already running
fn start_cycle(
    app: &mut App,
    aggregator: &Aggregator,
    trigger: CycleTrigger,
    refresh_tx: &mpsc::UnboundedSender<RefreshResult>,
) {
    if !app.request_refresh(trigger) {
        return;
    }

    let aggregator = aggregator.clone();
    let tx = refresh_tx.clone();

    // Spawn refresh as background task
    tokio::spawn(async move {
        let result = aggregator.run_detached().await;
        if tx.send(RefreshResult::from_cycle(trigger, result)).is_err() {
            warn!("{:?} cycle finished after the UI closed", trigger);
        }
    });
}

fn handle_action(
    app: &mut App,
    action: Action,
    aggregator: &Aggregator,
    refresh_tx: &mpsc::UnboundedSender<RefreshResult>,
) {
    match apply_action(app, action) {
        Some(Action::Quit) => app.should_quit = true,
        Some(Action::Refresh) => start_cycle(app, aggregator, CycleTrigger::Manual, refresh_tx),
        Some(Action::OpenInBrowser) => match app.link_to_open().map(str::to_string) {
            Some(url) => match open::that(&url) {
                Ok(()) => app.set_status("Opened in browser"),
                Err(e) => app.set_status(format!("Failed to open browser: {}", e)),
            },
            None => app.set_status("This article has no link"),
        },
        _ => {}
    }
}
