use crate::app::{App, BackendEvent, PaneFocus};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub(crate) fn handle_backend_event(app: &mut App, event: BackendEvent) -> Result<()> {
    match event {
        BackendEvent::TreeLoaded { tree } => {
            app.busy = false;
            app.install_tree(tree)?;
        }
        BackendEvent::Error { context, message } => {
            app.busy = false;
            app.log(format!("error[{context}]: {message}"));
        }
    }

    Ok(())
}

pub(crate) fn handle_key_event(app: &mut App, key: KeyEvent) -> Result<()> {
    if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return Ok(());
    }

    if app.panel_is_open() {
        handle_panel_key(app, key)
    } else {
        handle_key_without_panel(app, key);
        Ok(())
    }
}

fn handle_panel_key(app: &mut App, key: KeyEvent) -> Result<()> {
    match key.code {
        KeyCode::Esc | KeyCode::Char('x') => app.close_panel(),
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => {
            if let Some(panel) = app.panel.as_mut() {
                panel.focus_next();
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if let Some(panel) = app.panel.as_mut() {
                panel.focus_prev();
            }
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            app.apply_focused_filter()?;
        }
        _ => {}
    }

    Ok(())
}

fn handle_key_without_panel(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('c') => {
            if !app.toggle_panel() {
                app.log("categories unavailable: tree not loaded yet".to_string());
            }
        }
        KeyCode::Tab => app.focus = app.focus.next(),
        KeyCode::Char('j') | KeyCode::Down => match app.focus {
            PaneFocus::Chart => {
                if let Some(chart) = app.chart_mut() {
                    chart.select_next();
                }
            }
            PaneFocus::Log => {
                app.scroll_log_down(1);
            }
        },
        KeyCode::Char('k') | KeyCode::Up => match app.focus {
            PaneFocus::Chart => {
                if let Some(chart) = app.chart_mut() {
                    chart.select_prev();
                }
            }
            PaneFocus::Log => {
                app.scroll_log_up(1);
            }
        },
        KeyCode::PageDown if app.focus == PaneFocus::Log => {
            app.scroll_log_down(20);
        }
        KeyCode::PageUp if app.focus == PaneFocus::Log => {
            app.scroll_log_up(20);
        }
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Enter => {
            if let Some(chart) = app.chart_mut() {
                chart.expand_selected();
            }
        }
        KeyCode::Char('h') | KeyCode::Left => {
            if let Some(chart) = app.chart_mut() {
                chart.collapse_selected_or_parent();
            }
        }
        _ => {}
    }
}
