//! Ratatui-based dashboard.
//!
//! The dashboard provides a settings panel for choosing a category, a ticker
//! and a year window, then renders the selected ticker's close, daily return,
//! cumulative return and volume.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Terminal,
};

use crate::app::pipeline::{self, DataSource, LoadOutput};
use crate::domain::{Category, ReturnSet, RunConfig, YearRange};
use crate::error::AppError;
use crate::report::fmt_pct;
use crate::view::{date_from_day_number, ChartView, SeriesToggles};

mod plotters_chart;

use plotters_chart::{ReturnsChart, CLOSE_COLOR, CUMULATIVE_COLOR, DAILY_COLOR, VOLUME_COLOR};

/// Start the dashboard.
///
/// Data is loaded before the terminal switches to raw mode, so load errors are
/// reported like any other command's.
pub fn run(config: RunConfig) -> Result<(), AppError> {
    let load = pipeline::load(&config)?;
    let mut app = Dashboard::new(config, load);

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Settings panel rows, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Category,
    Ticker,
    StartYear,
    EndYear,
}

impl Field {
    const ALL: [Field; 4] = [Field::Category, Field::Ticker, Field::StartYear, Field::EndYear];
}

struct Dashboard {
    config: RunConfig,
    source: DataSource,
    set: ReturnSet,
    category: Category,
    ticker_idx: usize,
    /// Loaded data span; `None` only when nothing was loaded.
    bounds: Option<YearRange>,
    range: Option<YearRange>,
    toggles: SeriesToggles,
    selected_field: usize,
    status: String,
    view: ChartView,
}

impl Dashboard {
    fn new(config: RunConfig, load: LoadOutput) -> Self {
        let category = config
            .category
            .or_else(|| load.set.tickers.first().and_then(|t| Category::of(t)))
            .unwrap_or(Category::Stocks);

        let mut app = Self {
            config,
            source: load.source.clone(),
            set: ReturnSet::default(),
            category,
            ticker_idx: 0,
            bounds: None,
            range: None,
            toggles: SeriesToggles::default(),
            selected_field: 0,
            status: String::new(),
            view: ChartView::default(),
        };
        app.install(load);
        app.ticker_idx = app
            .set
            .tickers
            .iter()
            .find_map(|t| category.tickers().iter().position(|c| *c == t.as_str()))
            .unwrap_or(0);
        app.recompute();
        app
    }

    /// Replace the loaded data; the year window is kept, clamped to the new span.
    fn install(&mut self, load: LoadOutput) {
        self.bounds = load.set.full_range();
        self.range = match (self.range, self.bounds) {
            (Some(range), Some(bounds)) => Some(range.clamp_to(bounds)),
            _ => self.bounds,
        };
        self.source = load.source;
        self.status = format!(
            "{} rows from {} ({} skipped)",
            load.set.rows.len(),
            self.source.describe(),
            load.ingest.row_errors.len()
        );
        self.set = load.set;
        self.recompute();
    }

    fn ticker(&self) -> &'static str {
        let tickers = self.category.tickers();
        tickers[self.ticker_idx.min(tickers.len() - 1)]
    }

    fn recompute(&mut self) {
        self.view = ChartView::build(&self.set, self.ticker(), self.range, self.toggles);
    }

    /// Switch the ticker list; keep the current ticker if the new list has it.
    fn set_category(&mut self, category: Category) {
        let current = self.ticker();
        self.category = category;
        self.ticker_idx = category
            .tickers()
            .iter()
            .position(|t| *t == current)
            .unwrap_or(0);
        self.recompute();
    }

    fn step_ticker(&mut self, delta: i32) {
        let n = self.category.tickers().len() as i32;
        self.ticker_idx = (self.ticker_idx as i32 + delta).rem_euclid(n) as usize;
        self.recompute();
    }

    fn adjust_start(&mut self, delta: i32) {
        let (Some(range), Some(bounds)) = (self.range, self.bounds) else {
            return;
        };
        let start = (range.start + delta).clamp(bounds.start, range.end);
        self.range = Some(YearRange::new(start, range.end));
        self.recompute();
    }

    fn adjust_end(&mut self, delta: i32) {
        let (Some(range), Some(bounds)) = (self.range, self.bounds) else {
            return;
        };
        let end = (range.end + delta).clamp(range.start, bounds.end);
        self.range = Some(YearRange::new(range.start, end));
        self.recompute();
    }

    fn toggle(&mut self, key: char) {
        let t = &mut self.toggles;
        let (name, on) = match key {
            'c' => {
                t.close = !t.close;
                ("close", t.close)
            }
            'd' => {
                t.daily = !t.daily;
                ("daily return", t.daily)
            }
            'g' => {
                t.cumulative = !t.cumulative;
                ("cumulative return", t.cumulative)
            }
            'v' => {
                t.volume = !t.volume;
                ("volume", t.volume)
            }
            _ => return,
        };
        self.status = format!("{name}: {}", if on { "shown" } else { "hidden" });
        self.recompute();
    }

    fn reload(&mut self, refresh: bool) {
        let config = RunConfig {
            refresh,
            ..self.config.clone()
        };
        match pipeline::load(&config) {
            Ok(load) => self.install(load),
            Err(err) => {
                log::warn!("reload failed: {err}");
                self.status = format!("Reload failed: {err}");
            }
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Apply one key press; returns `true` to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field + 1 < Field::ALL.len() {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Char(c @ ('c' | 'd' | 'g' | 'v')) => self.toggle(c),
            KeyCode::Char('r') => self.reload(false),
            KeyCode::Char('R') => self.reload(true),
            _ => {}
        }
        false
    }

    fn adjust_field(&mut self, delta: i32) {
        match Field::ALL[self.selected_field] {
            Field::Category => {
                let next = if delta >= 0 {
                    self.category.next()
                } else {
                    self.category.prev()
                };
                self.set_category(next);
                self.status = format!("category: {}", self.category.display_name());
            }
            Field::Ticker => {
                self.step_ticker(delta);
                self.status = format!("ticker: {}", self.ticker());
            }
            Field::StartYear => self.adjust_start(delta),
            Field::EndYear => self.adjust_end(delta),
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("sr", Style::default().fg(Color::Cyan)),
            Span::raw(" | daily & cumulative returns"),
        ]));

        let range = self
            .range
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        let last = self.view.last_cumulative().map(|g| g - 1.0);
        let label = crate::domain::sector_label(self.ticker())
            .map(|s| format!(" ({s})"))
            .unwrap_or_default();

        lines.push(Line::from(Span::styled(
            format!(
                "{}{label} | {range} | n={} | total {}",
                self.ticker(),
                self.view.close.len(),
                fmt_pct(last, 2),
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(7)])
            .split(area);

        self.draw_chart(frame, chunks[0]);

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);
        self.draw_settings(frame, bottom[0]);
        self.draw_legend(frame, bottom[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .title(format!("{} | {}", self.ticker(), self.category.display_name()))
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        if self.view.is_empty() {
            let msg = Paragraph::new(format!("No data for {} in the selected years.", self.ticker()))
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        }

        let (chart_rect, insets) = chart_layout(inner);
        let widget = ReturnsChart {
            view: &self.view,
            toggles: self.toggles,
            x_label: "date",
            y_label: "value",
            fmt_x: fmt_axis_date,
            fmt_y: fmt_axis_value,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, self.view.x_bounds, self.view.y_bounds);
        }
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let (start, end) = match self.range {
            Some(r) => (r.start.to_string(), r.end.to_string()),
            None => ("-".to_string(), "-".to_string()),
        };

        let items = vec![
            ListItem::new(format!("Category: {}", self.category.display_name())),
            ListItem::new(format!("Ticker: {}", self.ticker())),
            ListItem::new(format!("From: {start}")),
            ListItem::new(format!("To: {end}")),
        ];

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_legend(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let entry = |key: &str, name: &str, on: bool, rgb: plotters::style::RGBColor| {
            let plotters::style::RGBColor(r, g, b) = rgb;
            let mut style = Style::default().fg(Color::Rgb(r, g, b));
            if !on {
                style = style.fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT);
            }
            Line::from(vec![
                Span::styled(format!("[{key}] "), Style::default().fg(Color::Gray)),
                Span::styled(name.to_string(), style),
            ])
        };

        let t = self.toggles;
        let lines = vec![
            entry("c", "Close", t.close, CLOSE_COLOR),
            entry("d", "Daily Return", t.daily, DAILY_COLOR),
            entry("g", "Cumulative Return", t.cumulative, CUMULATIVE_COLOR),
            entry("v", "Volume", t.volume, VOLUME_COLOR),
        ];
        let p = Paragraph::new(Text::from(lines)).block(Block::default().title("Series").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  c/d/g/v series  r reload  R refetch  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn fmt_axis_date(v: f64) -> String {
    date_from_day_number(v)
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_default()
}

fn fmt_axis_value(v: f64) -> String {
    format!("{v:.2}")
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 9,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = fmt_axis_date(x_val);
        let label_len = label.len() as u16;
        let start = x.saturating_sub(label_len / 2);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = fmt_axis_value(y_val);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("date")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }
}
