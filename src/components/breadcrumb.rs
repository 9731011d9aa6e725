use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Widget},
};

use crate::app::CrumbMenu;
use crate::nav::path::Crumb;

const SEPARATOR: &str = " › ";

/// One-line breadcrumb bar. `selected` highlights a crumb when the bar has
/// focus.
pub struct BreadcrumbWidget<'a> {
    crumbs: &'a [Crumb],
    selected: Option<usize>,
}

impl<'a> BreadcrumbWidget<'a> {
    pub fn new(crumbs: &'a [Crumb], selected: Option<usize>) -> Self {
        Self { crumbs, selected }
    }

    /// Column at which crumb `index` starts, for placing the group menu.
    pub fn offset_of(crumbs: &[Crumb], index: usize) -> u16 {
        crumbs
            .iter()
            .take(index)
            .map(|c| c.label().chars().count() + SEPARATOR.chars().count())
            .sum::<usize>() as u16
            + 1
    }
}

impl Widget for BreadcrumbWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let mut spans = vec![Span::raw(" ")];
        for (i, crumb) in self.crumbs.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(SEPARATOR, Style::default().fg(Color::DarkGray)));
            }
            let mut style = match crumb {
                Crumb::Visible { current: true, .. } => Style::default().add_modifier(Modifier::BOLD),
                Crumb::Visible { .. } => Style::default().fg(Color::Cyan),
                Crumb::Collapsed { .. } => Style::default().fg(Color::Yellow),
            };
            if self.selected == Some(i) {
                style = style.add_modifier(Modifier::REVERSED);
            }
            spans.push(Span::styled(crumb.label().to_string(), style));
        }
        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}

/// Drop-down listing the segments folded into a collapsed crumb.
pub struct CrumbMenuWidget<'a> {
    menu: &'a CrumbMenu,
}

impl<'a> CrumbMenuWidget<'a> {
    pub fn new(menu: &'a CrumbMenu) -> Self {
        Self { menu }
    }

    /// Size needed to show every entry inside a border.
    pub fn size(&self) -> (u16, u16) {
        let widest = self
            .menu
            .hidden
            .iter()
            .map(|t| t.label.chars().count())
            .max()
            .unwrap_or(0);
        (widest as u16 + 4, self.menu.hidden.len() as u16 + 2)
    }
}

impl Widget for CrumbMenuWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let block = Block::default().borders(Borders::ALL);
        let inner = block.inner(area);
        block.render(area, buf);

        for (i, target) in self.menu.hidden.iter().enumerate().take(inner.height as usize) {
            let style = if i == self.menu.selected {
                Style::default().bg(Color::Blue).fg(Color::Black)
            } else {
                Style::default()
            };
            let line = Line::from(Span::styled(format!(" {}", target.label), style));
            buf.set_line(inner.x, inner.y + i as u16, &line, inner.width);
        }
    }
}
