//! TUI layout and widget rendering.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, List, ListItem, ListState, Paragraph};

use super::runtime::App;
use super::style;
use crate::trend::Source;

/// Historical and forecast line points for one county.
struct Series {
    name: String,
    historical: Vec<(f64, f64)>,
    forecast: Vec<(f64, f64)>,
}

/// Renders the full TUI frame.
pub fn render(frame: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Min(10),   // selector + chart
            Constraint::Length(5), // growth panel
            Constraint::Length(1), // footer
        ])
        .split(frame.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(22), Constraint::Min(30)])
        .split(rows[1]);

    render_header(frame, app, rows[0]);
    render_selector(frame, app, body[0]);
    render_chart(frame, app, body[1]);
    render_growth(frame, app, rows[2]);
    render_footer(frame, rows[3]);
}

/// Header bar: model backend, horizon, marked count.
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let header = Line::from(vec![
        Span::styled(
            " EV-FORECAST ",
            Style::default()
                .fg(style::HEADER_FG)
                .bg(style::HEADER_BG)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            " model={} │ horizon={} months │ marked {}/{} ",
            app.model_name(),
            app.horizon(),
            app.marked.len(),
            app.max_compare(),
        )),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

/// County list with the cursor highlighted and marked counties tagged.
fn render_selector(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .counties
        .iter()
        .map(|name| {
            if app.is_marked(name) {
                ListItem::new(format!("* {name}")).style(Style::default().fg(style::MARKED))
            } else {
                ListItem::new(format!("  {name}"))
            }
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().title(" Counties ").borders(Borders::ALL))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default().with_selected(Some(app.cursor));
    frame.render_stateful_widget(list, area, &mut state);
}

fn chart_series(app: &App) -> Vec<Series> {
    app.results
        .iter()
        .map(|r| {
            let mut historical = Vec::new();
            let mut forecast = Vec::new();
            for p in &r.trend {
                let point = (style::month_x(p.date), p.cumulative_ev);
                match p.source {
                    Source::Historical => historical.push(point),
                    Source::Forecast => forecast.push(point),
                }
            }
            // Start the forecast line at the last historical point so the two meet.
            if let Some(&join) = historical.last() {
                forecast.insert(0, join);
            }
            Series {
                name: r.county.clone(),
                historical,
                forecast,
            }
        })
        .collect()
}

/// Cumulative EV adoption chart, solid for history and dotted for forecast.
fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    let series = chart_series(app);

    let all: Vec<&[(f64, f64)]> = series
        .iter()
        .flat_map(|s| [s.historical.as_slice(), s.forecast.as_slice()])
        .collect();
    let y_bounds = style::auto_bounds_y(&all);
    let xs = all.iter().flat_map(|s| s.iter()).map(|&(x, _)| x);
    let x_lo = xs.clone().fold(f64::INFINITY, f64::min);
    let x_hi = xs.fold(f64::NEG_INFINITY, f64::max);
    let (x_lo, x_hi) = if x_lo.is_finite() {
        (x_lo, x_hi.max(x_lo + 1.0))
    } else {
        (0.0, 1.0)
    };

    let mut datasets = Vec::with_capacity(series.len() * 2);
    for (idx, s) in series.iter().enumerate() {
        let color = style::county_color(idx);
        datasets.push(
            Dataset::default()
                .name(format!("{} (historical)", s.name))
                .marker(symbols::Marker::Braille)
                .style(Style::default().fg(color))
                .data(&s.historical),
        );
        datasets.push(
            Dataset::default()
                .name(format!("{} (forecast)", s.name))
                .marker(symbols::Marker::Dot)
                .style(Style::default().fg(color).add_modifier(Modifier::DIM))
                .data(&s.forecast),
        );
    }

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(" Cumulative EV Adoption ")
                .borders(Borders::ALL),
        )
        .x_axis(
            Axis::default()
                .title("month")
                .bounds([x_lo, x_hi])
                .labels(vec![style::month_label(x_lo), style::month_label(x_hi)]),
        )
        .y_axis(
            Axis::default()
                .title("EVs")
                .bounds(y_bounds)
                .labels(vec![
                    format!("{:.0}", y_bounds[0]),
                    format!("{:.0}", y_bounds[1]),
                ]),
        );

    frame.render_widget(chart, area);
}

/// Growth summary per displayed county, or the latest warning.
fn render_growth(frame: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = if let Some(warning) = &app.warning {
        vec![Line::from(Span::styled(
            format!("  {warning}"),
            Style::default().fg(style::WARNING).add_modifier(Modifier::BOLD),
        ))]
    } else {
        app.results
            .iter()
            .enumerate()
            .map(|(idx, r)| {
                let text = match r.growth.pct {
                    Some(_) => format!(
                        "  {}: {:.0} -> {:.0}, {}",
                        r.county, r.growth.historical_total, r.growth.forecast_total, r.growth
                    ),
                    None => format!("  {}: {}", r.county, r.growth),
                };
                Line::from(Span::styled(
                    text,
                    Style::default().fg(style::county_color(idx)),
                ))
            })
            .collect()
    };

    let block = Block::default().title(" Growth ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Footer with keybinding hints.
fn render_footer(frame: &mut Frame, area: Rect) {
    let footer = Paragraph::new(Line::from(Span::styled(
        " q:Quit  ↑/↓:Move  Space:Mark  Enter:Forecast  x:Clear",
        Style::default().fg(style::FOOTER_FG),
    )));
    frame.render_widget(footer, area);
}
