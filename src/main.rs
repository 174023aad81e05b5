use std::{cell::RefCell, io, rc::Rc};

use cat_clicker::config::EngineConfig;
use cat_clicker::engine::Snapshot;
use cat_clicker::state::{MessageLog, ResourceId, TierId};
use cat_clicker::time::GameTime;
use cat_clicker::{Action, GameEngine};
use ratzilla::event::KeyCode;
use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};
use ratzilla::ratatui::{Frame, Terminal};
use ratzilla::{DomBackend, WebRenderer};

#[cfg(target_arch = "wasm32")]
type Store = cat_clicker::save::LocalStorageStore;
#[cfg(not(target_arch = "wasm32"))]
type Store = cat_clicker::save::FileStore;

#[cfg(target_arch = "wasm32")]
fn open_store() -> Store {
    cat_clicker::save::LocalStorageStore::new("cat_clicker:")
}

#[cfg(not(target_arch = "wasm32"))]
fn open_store() -> Store {
    cat_clicker::save::FileStore::new(".")
}

/// Milliseconds from `performance.now()`, falling back to `Date.now()`.
fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map_or_else(js_sys::Date::now, |p| p.now())
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();

    let config = EngineConfig::builtin();
    let mut engine = GameEngine::with_config(open_store(), config.clone()).map_err(|e| {
        web_sys::console::warn_1(&format!("Cat Clicker: failed to start: {e}").into());
        io::Error::new(io::ErrorKind::InvalidData, e.to_string())
    })?;
    if engine.resume() {
        web_sys::console::log_1(&"Cat Clicker: save restored".into());
    }

    let engine = Rc::new(RefCell::new(engine));
    let clock = RefCell::new(GameTime::new(config.max_frame_delta_ms));
    let backend = DomBackend::new()?;
    let mut terminal = Terminal::new(backend)?;

    terminal.on_key_event({
        let engine = engine.clone();
        move |key_event| {
            if let KeyCode::Char(c) = key_event.code {
                if let Some(action) = Action::from_key(c) {
                    engine.borrow_mut().dispatch(action);
                }
            }
        }
    });

    terminal.draw_web(move |f| {
        let elapsed = clock.borrow_mut().update(now_ms());
        let mut eng = engine.borrow_mut();
        eng.advance(elapsed);
        render(f, &eng.snapshot(), eng.log());
    });

    Ok(())
}

fn render(f: &mut Frame, snapshot: &Snapshot, log: &MessageLog) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(f.area());

    let title = Paragraph::new(Line::from(Span::styled(
        "Cat Clicker - click your way to space!",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )))
    .block(Block::default().borders(Borders::ALL))
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(5)])
        .split(columns[0]);

    render_stats(f, snapshot, left[0]);
    render_actions(f, snapshot, left[1]);
    render_log(f, log, columns[1]);

    let help = Paragraph::new(Line::from(Span::styled(
        "[S] Save  [L] Load",
        Style::default().fg(Color::DarkGray),
    )))
    .block(Block::default().borders(Borders::ALL))
    .alignment(Alignment::Center);
    f.render_widget(help, chunks[2]);
}

fn render_stats(f: &mut Frame, snapshot: &Snapshot, area: Rect) {
    let mut lines: Vec<Line> = ResourceId::all()
        .iter()
        .map(|&id| {
            let r = snapshot.resource(id);
            Line::from(format!("{:<8} {:>10}  (+{}/s)", id.name(), r.amount, r.rate))
        })
        .collect();
    for &id in TierId::all() {
        let tier = snapshot.tier(id);
        let label = tier.label.unwrap_or("?");
        let suffix = if tier.maxed { " (max)" } else { "" };
        lines.push(Line::from(format!("{:<8} {label}{suffix}", id.name())));
    }
    let stats = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green))
            .title(" Stats "),
    );
    f.render_widget(stats, area);
}

fn render_actions(f: &mut Frame, snapshot: &Snapshot, area: Rect) {
    let key_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let catch = snapshot.tier(TierId::Catch);
    let food = snapshot.resource(ResourceId::Food);

    let mut items = vec![ListItem::new(Line::from(vec![
        Span::styled(format!(" [{}] ", Action::Catch.key().to_ascii_uppercase()), key_style),
        Span::raw(format!(
            "Catch {} (+{} food)",
            catch.label.unwrap_or("?"),
            food.multiplier
        )),
    ]))];

    for p in snapshot.purchases.iter().filter(|p| p.visible) {
        let key = Action::Purchase(p.id).key().to_ascii_uppercase();
        let text = if p.maxed {
            format!("{} (max)", p.name)
        } else {
            format!("{} ({} {})", p.name, p.cost, p.cost_resource.name().to_lowercase())
        };
        let style = if p.enabled() {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        items.push(ListItem::new(Line::from(vec![
            Span::styled(format!(" [{key}] "), key_style),
            Span::styled(text, style),
        ])));
    }

    let actions = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Actions "),
    );
    f.render_widget(actions, area);
}

fn render_log(f: &mut Frame, log: &MessageLog, area: Rect) {
    let lines: Vec<Line> = log
        .entries()
        .iter()
        .map(|entry| {
            let style = if entry.is_important {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(Span::styled(entry.text.as_str(), style))
        })
        .collect();

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    // Keep the newest message on screen once wrapped lines overflow.
    let inner_height = area.height.saturating_sub(2) as usize;
    let total = paragraph.line_count(area.width.saturating_sub(2));
    let scroll = total.saturating_sub(inner_height) as u16;

    let widget = paragraph.scroll((scroll, 0)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue))
            .title(" Info "),
    );
    f.render_widget(widget, area);
}
