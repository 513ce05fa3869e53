use crate::app::App;
use crate::highlight::Styler;
use crate::hint::HintLevel;
use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event as CEvent, KeyCode, KeyModifiers,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use std::{
    io,
    time::{Duration, Instant},
};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Clear, Paragraph},
};

pub const EMPTY_PROBLEM_MSG: &str = "Please enter a problem description.";

/// Events published by a stream task, tagged with the request
/// generation that spawned it.
pub enum UiEvent {
    Fragment(u64, String),
    Done(u64),
    Failed(u64, String),
}

pub async fn run_ui<F, Fut>(
    app: &mut App,
    cancel_token: CancellationToken,
    mut on_submit: F,
) -> Result<()>
where
    F: FnMut(HintLevel, String, u64, CancellationToken, UnboundedSender<UiEvent>) -> Fut
        + Send
        + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<UiEvent>();
    let spinner = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    let styler = Styler::new();
    let mut idx = 0;
    let mut last_tick = Instant::now();
    let border_style = Style::default().fg(Color::DarkGray);
    let input_title = format!(
        " Problem · F1 {} · F2 {} · F3 {} ",
        HintLevel::Broad.name(),
        HintLevel::Technical.name(),
        HintLevel::StepByStep.name()
    );

    loop {
        while let Ok(evt) = rx.try_recv() {
            app.apply(evt);
        }

        if app.loading() && last_tick.elapsed() >= Duration::from_millis(100) {
            idx = (idx + 1) % spinner.len();
            last_tick = Instant::now();
        }

        terminal.draw(|f| {
            let size = f.size();
            f.render_widget(Clear, size);

            let hint_title = if app.loading() {
                format!(" Hint {} ", spinner[idx])
            } else {
                " Hint ".to_string()
            };

            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(8), Constraint::Min(1)])
                .split(size);
            let input_area = chunks[0];
            let hint_area = chunks[1];

            f.render_widget(
                Paragraph::new(app.problem.as_ref()).block(
                    Block::default()
                        .title(input_title.clone())
                        .borders(Borders::ALL)
                        .border_style(border_style),
                ),
                input_area,
            );

            let inner = Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .inner(hint_area);
            let wrap_width = inner.width as usize;

            if app.loading() && app.hint.is_empty() {
                f.render_widget(
                    Paragraph::new(Spans::from(Span::styled(
                        format!("{} waiting for the model", spinner[idx]),
                        Style::default().fg(Color::DarkGray),
                    )))
                    .block(
                        Block::default()
                            .title(hint_title)
                            .borders(Borders::ALL)
                            .border_style(border_style),
                    ),
                    hint_area,
                );
            } else {
                let lines = styler.style_hint(&app.hint, wrap_width);

                let visible = inner.height;
                let total = lines.len() as u16;
                let max_scroll = total.saturating_sub(visible);
                app.scroll = if app.scroll == u16::MAX {
                    max_scroll
                } else {
                    app.scroll.min(max_scroll)
                };

                f.render_widget(
                    Paragraph::new(lines).scroll((app.scroll, 0)).block(
                        Block::default()
                            .title(hint_title)
                            .borders(Borders::ALL)
                            .border_style(border_style),
                    ),
                    hint_area,
                );
            }

            let row = app.problem.matches('\n').count() as u16;
            let col = app.problem.rsplit('\n').next().unwrap_or("").len() as u16;
            let x = (input_area.x + 1 + col).min(input_area.x + input_area.width.saturating_sub(2));
            let y = (input_area.y + 1 + row).min(input_area.y + input_area.height.saturating_sub(2));
            f.set_cursor(x, y);
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let CEvent::Key(k) = event::read()? {
                match (k.code, k.modifiers) {
                    (KeyCode::Char('c'), m) if m.contains(KeyModifiers::CONTROL) => break,
                    (KeyCode::Up, _) => app.scroll_up(),
                    (KeyCode::Down, _) => app.scroll_down(),
                    (KeyCode::PageUp, _) => (0..5).for_each(|_| app.scroll_up()),
                    (KeyCode::PageDown, _) => (0..5).for_each(|_| app.scroll_down()),
                    (KeyCode::F(n), _) => {
                        if let Some(level) = HintLevel::from_fkey(n) {
                            if !app.loading() {
                                if app.problem.trim().is_empty() {
                                    app.show_notice(EMPTY_PROBLEM_MSG);
                                } else {
                                    let generation = app.begin_request();
                                    let fut = on_submit(
                                        level,
                                        app.problem.clone(),
                                        generation,
                                        cancel_token.clone(),
                                        tx.clone(),
                                    );
                                    tokio::spawn(fut);
                                }
                            }
                        }
                    }
                    (KeyCode::Char(c), _) => app.push_char(c),
                    (KeyCode::Backspace, _) => app.backspace(),
                    (KeyCode::Enter, _) => app.push_newline(),
                    _ => {}
                }
            }
        }

        if cancel_token.is_cancelled() {
            break;
        }
    }

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}
