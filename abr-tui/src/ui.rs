//! UI rendering using ratatui
//!
//! Rendering also records where the tab strip and table cells landed, so
//! mouse input can be mapped back onto the components.

use abr_core::{Page, TabSpan};
use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;

/// Primary accent color
const ACCENT: Color = Color::Cyan;
/// Secondary color for less important elements
const SECONDARY: Color = Color::DarkGray;
/// Highlight color for the active tab
const HIGHLIGHT: Color = Color::Yellow;
/// Dim text color
const DIM: Color = Color::Rgb(100, 100, 100);

/// Columns between adjacent tabs (the separator)
const TAB_GAP: u16 = 1;

/// Render the entire UI
pub fn render(frame: &mut Frame, app: &mut App) {
    let [header, tabs, content, status] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Min(5),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_header(frame, app, header);

    if app.current_page().is_none() {
        let message = Paragraph::new("No pages available for this session")
            .alignment(Alignment::Center)
            .style(Style::default().fg(DIM));
        frame.render_widget(message, content);
    } else {
        render_tab_bar(frame, app, tabs);
        render_table(frame, app, content);
    }

    render_status_bar(frame, app, status);
}

/// Page navigation line: "1:Tasks  2:Work Orders ..."
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let current = app.current_page().map(|p| p.page());
    let mut spans = vec![Span::styled(
        " ABR ",
        Style::default().bg(ACCENT).fg(Color::Black).add_modifier(Modifier::BOLD),
    )];
    for page in app.pages() {
        let number = Page::ALL.iter().position(|p| *p == page).unwrap_or(0) + 1;
        let style = if Some(page) == current {
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(SECONDARY)
        };
        spans.push(Span::styled(format!(" {}:{} ", number, page.title()), style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_tab_bar(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(view) = app.current_page_mut() else {
        return;
    };

    let block = Block::default()
        .title(format!(" {} ", view.page().title()))
        .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(SECONDARY));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut spans = Vec::new();
    let mut widths = Vec::new();
    for (i, item) in view.bar().items().iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("│", Style::default().fg(SECONDARY)));
        }
        let mut style = if item.active {
            Style::default().fg(HIGHLIGHT).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        if item.dragging {
            style = style.add_modifier(Modifier::REVERSED);
        }
        let span = Span::styled(format!(" {} ({}) ", item.label, item.count), style);
        widths.push(span.width() as u16);
        spans.push(span);
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), inner);

    view.bar_mut()
        .set_layout(TabSpan::sequential(widths, inner.x, TAB_GAP));
    app.layout.tab_row = Rect { height: 1, ..inner };
}

fn render_table(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(view) = app.current_page() else {
        return;
    };

    let block = Block::default()
        .title(format!(
            " {} · {} · {}/page ",
            view.range_label(),
            view.page_label(),
            view.page_size()
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(SECONDARY));
    let inner = block.inner(area);

    if view.is_empty() {
        let placeholder = Paragraph::new(view.empty_message())
            .alignment(Alignment::Center)
            .style(Style::default().fg(DIM))
            .block(block);
        frame.render_widget(placeholder, area);
        app.layout.table_body = Rect::default();
        app.layout.columns.clear();
        return;
    }

    let widths = view.column_widths();
    let header = Row::new(view.headers())
        .style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = view.page_cells().into_iter().map(Row::new).collect();
    let table = Table::new(rows, widths.iter().copied())
        .header(header)
        .column_spacing(1)
        .flex(Flex::Start)
        .block(block);
    frame.render_widget(table, area);

    // same split the table performs internally
    let columns = Layout::horizontal(widths)
        .spacing(1)
        .flex(Flex::Start)
        .split(inner);
    app.layout.columns = columns.to_vec();
    app.layout.table_body = Rect {
        y: inner.y.saturating_add(1),
        height: inner.height.saturating_sub(1),
        ..inner
    };
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let who = match app.session() {
        Some(session) => format!(" {} ({}) ", session.user_id, session.role),
        None => " signed out ".to_string(),
    };
    let dragging = app
        .current_page()
        .is_some_and(|view| view.bar().is_dragging());

    let message = if dragging {
        "drag to reorder · Esc cancel".to_string()
    } else {
        app.status_message.clone().unwrap_or_else(|| {
            "q quit · [ ] page · ←/→ tab · </> move tab · n/p rows · +/- size · R reset".to_string()
        })
    };

    let line = Line::from(vec![
        Span::styled(who, Style::default().bg(ACCENT).fg(Color::Black)),
        Span::styled(format!(" {} ", app.backend_label()), Style::default().fg(SECONDARY)),
        Span::raw(" "),
        Span::styled(message, Style::default().fg(DIM)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{AppEvent, AppOptions};
    use crate::data;
    use crate::page::Record;
    use abr_core::{Role, Session, TabOrderStore, TableOptions};
    use crossterm::event::{KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
    use tokio::runtime::Handle;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    fn app(role: Role) -> (App, UnboundedReceiver<AppEvent>) {
        let (tx, rx) = unbounded_channel();
        let app = App::new(
            AppOptions {
                session: Some(Session {
                    user_id: "user1".into(),
                    role,
                }),
                table: TableOptions::default(),
                backend_label: "offline".into(),
            },
            TabOrderStore::in_memory(),
            Handle::current(),
            tx,
        )
        .unwrap();
        (app, rx)
    }

    fn draw(terminal: &mut Terminal<TestBackend>, app: &mut App) {
        terminal.draw(|frame| render(frame, app)).unwrap();
    }

    fn line(buffer: &Buffer, y: u16) -> String {
        (0..buffer.area.width)
            .map(|x| buffer[(x, y)].symbol().to_string())
            .collect()
    }

    /// Column of the first char of `needle` on row `y`
    fn find(buffer: &Buffer, y: u16, needle: &str) -> u16 {
        let text = line(buffer, y);
        let byte = text.find(needle).unwrap();
        text[..byte].chars().count() as u16
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[tokio::test]
    async fn renders_tabs_and_rows() {
        let (mut app, _rx) = app(Role::Viewer);
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        draw(&mut terminal, &mut app);

        let buffer = terminal.backend().buffer();
        assert!(line(buffer, 0).contains("1:Tasks"));
        assert!(line(buffer, 0).contains("2:Work Orders"));
        assert!(!line(buffer, 0).contains("Users"));
        assert!(line(buffer, 2).contains("All (34)"));
        assert!(line(buffer, 4).contains("1-10 of 34"));
        assert!(line(buffer, 5).contains("Title"));
        assert!(line(buffer, 6).contains("T-001"));
        assert!(line(buffer, 19).contains("user1 (viewer)"));
    }

    #[tokio::test]
    async fn drag_on_rendered_tabs_reorders() {
        let (mut app, mut rx) = app(Role::Viewer);
        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        draw(&mut terminal, &mut app);

        let buffer = terminal.backend().buffer().clone();
        let all_x = find(&buffer, 2, "All (");
        let done_x = find(&buffer, 2, "Done (");

        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), all_x, 2));
        app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), done_x + 4, 2));
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), done_x + 10, 2));

        assert_eq!(
            app.current_page().unwrap().bar().order(),
            vec!["open", "in_progress", "blocked", "done", "all"]
        );
        match rx.recv().await.unwrap() {
            AppEvent::TabsReordered { page, order } => {
                assert_eq!(page, Page::Tasks);
                assert_eq!(order.last().map(String::as_str), Some("all"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn click_on_tab_selects_it() {
        let (mut app, mut rx) = app(Role::Viewer);
        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        draw(&mut terminal, &mut app);

        let buffer = terminal.backend().buffer().clone();
        let open_x = find(&buffer, 2, "Open (");
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), open_x, 2));
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), open_x, 2));

        assert_eq!(app.current_page().unwrap().bar().active_id(), Some("open"));
        assert!(matches!(
            rx.recv().await.unwrap(),
            AppEvent::TabSelected { ref id, .. } if id == "open"
        ));
    }

    #[tokio::test]
    async fn cell_action_and_row_click() {
        let (mut app, mut rx) = app(Role::Viewer);
        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        draw(&mut terminal, &mut app);

        let buffer = terminal.backend().buffer().clone();
        let action_x = find(&buffer, 6, "[open]");
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), action_x + 1, 6));
        app.handle_event(rx.recv().await.unwrap());
        let expected = format!("Opened task: {}", data::tasks()[0].describe());
        assert_eq!(app.status_message.as_deref(), Some(expected.as_str()));

        let id_x = find(&buffer, 7, "T-002");
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), id_x, 7));
        app.handle_event(rx.recv().await.unwrap());
        assert!(app.status_message.as_deref().unwrap().starts_with("Selected T-002"));
    }

    #[tokio::test]
    async fn empty_tab_shows_placeholder() {
        let (mut app, mut rx) = app(Role::Admin);
        app.goto(Page::Users);
        // users: All, Active, Invited, Disabled (no disabled accounts)
        app.select_tab(-1);
        app.handle_event(rx.recv().await.unwrap());

        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        draw(&mut terminal, &mut app);

        let buffer = terminal.backend().buffer();
        let body: String = (4..19).map(|y| line(buffer, y)).collect();
        assert!(body.contains("No results."));
        assert!(!body.contains("Email"));
        assert!(app.layout.cell_at(10, 6).is_none());
    }
}
