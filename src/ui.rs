use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders},
    Frame,
};

use crate::app::{App, Focus};
use crate::components::breadcrumb::{BreadcrumbWidget, CrumbMenuWidget};
use crate::components::file_list::FileListWidget;
use crate::components::sidebar::SidebarWidget;
use crate::components::status_bar::StatusBarWidget;
use crate::nav::controller::Listing;

fn pane_block(title: String, focused: bool) -> Block<'static> {
    let border = if focused { Color::Cyan } else { Color::DarkGray };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
}

/// Render the application UI.
pub fn render(app: &mut App, frame: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let crumbs = app.nav.breadcrumb();
    let selected_crumb = (app.focus == Focus::Breadcrumb).then_some(app.crumb_index);
    frame.render_widget(BreadcrumbWidget::new(&crumbs, selected_crumb), chunks[0]);

    // Panes appear only once the restored layout is in place.
    if let Some(layout) = app.panes.layout() {
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(layout.sidebar().round() as u16),
                Constraint::Percentage(layout.content().round() as u16),
            ])
            .split(chunks[1]);

        let visible_height = panes[0].height.saturating_sub(2) as usize;
        app.nav.sidebar.update_scroll(visible_height);
        app.nav.update_scroll(visible_height);

        let sidebar_focused = app.focus == Focus::Sidebar;
        let sidebar = SidebarWidget::new(&app.nav.sidebar, sidebar_focused)
            .block(pane_block(" Volumes ".to_string(), sidebar_focused));
        frame.render_widget(sidebar, panes[0]);

        let files_focused = app.focus == Focus::Files;
        let title = format!(" {} ", app.nav.route());
        let files = FileListWidget::new(&app.nav, files_focused).block(pane_block(title, files_focused));
        frame.render_widget(files, panes[1]);
    }

    if let Some(menu) = &app.crumb_menu {
        let widget = CrumbMenuWidget::new(menu);
        let (width, height) = widget.size();
        let x = BreadcrumbWidget::offset_of(&crumbs, app.crumb_index);
        let area = Rect::new(chunks[0].x + x, chunks[0].y + 1, width, height).intersection(frame.area());
        frame.render_widget(widget, area);
    }

    let path = app.nav.route().to_string();
    let info = match app.nav.listing() {
        Listing::Pending => String::new(),
        Listing::Loaded(entries) => format!("{} items", entries.len()),
        Listing::Failed(_) => "unavailable".to_string(),
    };
    let mut status = StatusBarWidget::new(&path, &info);
    if let Some((msg, is_error, _)) = &app.status_message {
        status = status.status_message(msg, *is_error);
    }
    frame.render_widget(status, chunks[2]);
}
