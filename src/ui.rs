use crate::app::{App, PaneFocus};
use crate::panel::{PanelItem, PanelState, PanelView};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::{Alignment, Color, Line, Modifier, Span, Style};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};

const PANEL_WIDTH: u16 = 40;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(frame.area());

    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(75), Constraint::Percentage(25)])
        .split(outer[0]);

    draw_chart(frame, app, main[0]);
    draw_logs(frame, app, main[1]);
    draw_status_bar(frame, app, outer[1]);

    if let Some(view) = app.panel.as_ref().map(|panel| panel.view())
        && view.state == PanelState::Open
    {
        let area = sidebar_rect(PANEL_WIDTH, outer[0]);
        draw_panel(frame, &view, area);
    }
}

fn draw_chart(frame: &mut Frame, app: &mut App, area: Rect) {
    let border_style = if app.focus == PaneFocus::Chart && !app.panel_is_open() {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let title = match app.active_label() {
        Some(label) => format!(" Site map: {label} "),
        None => " Site map ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    let Some(chart) = app.chart_mut() else {
        let text = if app.busy {
            "Loading tree data..."
        } else {
            "No tree loaded."
        };
        frame.render_widget(Paragraph::new(text).block(block), area);
        return;
    };

    chart.sync_list_scroll(area.height.saturating_sub(2) as usize);
    let items: Vec<ListItem> = chart
        .rows()
        .iter()
        .map(|row| ListItem::new(chart.row_label(row)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    let mut state = ListState::default().with_offset(chart.list_scroll());
    if !chart.is_empty() {
        state.select(Some(chart.selected_index));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_panel(frame: &mut Frame, view: &PanelView, area: Rect) {
    frame.render_widget(Clear, area);

    let inner_width = area.width.saturating_sub(4) as usize;
    let mut focused_row = None;
    let items: Vec<ListItem> = view
        .items
        .iter()
        .enumerate()
        .map(|(row, item)| match item {
            PanelItem::Divider => ListItem::new(Line::from(Span::styled(
                "─".repeat(inner_width),
                Style::default().fg(Color::DarkGray),
            ))),
            PanelItem::Button {
                label,
                count,
                active,
                focused,
                ..
            } => {
                if *focused {
                    focused_row = Some(row);
                }
                let label_style = if *active {
                    Style::default()
                        .fg(Color::LightGreen)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                let count_text = count.to_string();
                let label_width = inner_width.saturating_sub(count_text.len() + 3);
                ListItem::new(Line::from(vec![
                    Span::raw(if *active { "● " } else { "  " }),
                    Span::styled(format!("{label:<label_width$}"), label_style),
                    Span::raw(" "),
                    Span::styled(count_text, Style::default().fg(Color::Gray)),
                ]))
            }
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(format!(" {} ", view.title))
                .title_bottom(Line::from(" Enter: apply  Esc/x: close ").alignment(Alignment::Right))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::LightYellow)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    state.select(focused_row);
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_logs(frame: &mut Frame, app: &App, area: Rect) {
    let border_style = if app.focus == PaneFocus::Log {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let end = app.logs.len().saturating_sub(app.log_tail_offset);
    let visible = area.height.saturating_sub(2) as usize;
    let start = end.saturating_sub(visible);
    let lines: Vec<Line> = app.logs[start..end]
        .iter()
        .map(|line| Line::from(line.as_str()))
        .collect();

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Log ")
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let busy = if app.busy { "LOADING" } else { "READY" };
    let toggle_style = if app.panel_is_open() {
        Style::default().bg(Color::Cyan).fg(Color::Black)
    } else {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    };
    let source = app.source.as_deref().unwrap_or("(no data)");

    let text = Line::from(vec![
        Span::styled(
            format!(" {busy} "),
            if app.busy {
                Style::default().bg(Color::Yellow).fg(Color::Black)
            } else {
                Style::default().bg(Color::DarkGray).fg(Color::White)
            },
        ),
        Span::raw(" "),
        Span::styled(" ☰  Categories [c] ", toggle_style),
        Span::raw("  "),
        Span::styled(source.to_string(), Style::default().fg(Color::Gray)),
        Span::raw("  "),
        Span::styled(
            "tab focus | j/k move | l/h expand/collapse | q quit",
            Style::default().fg(Color::Gray),
        ),
    ]);

    let paragraph = Paragraph::new(text).alignment(Alignment::Left);
    frame.render_widget(paragraph, area);
}

fn sidebar_rect(width: u16, area: Rect) -> Rect {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(width.min(area.width)), Constraint::Min(0)])
        .split(area)[0]
}
