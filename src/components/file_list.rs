use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::nav::controller::{IconView, Listing, NavigationController};

/// Marker drawn for files whose icon the host extracted.
const EXTRACTED_ICON: &str = "◆ ";

/// Contents of the current directory, one entry per row.
pub struct FileListWidget<'a> {
    nav: &'a NavigationController,
    focused: bool,
    block: Option<Block<'a>>,
}

impl<'a> FileListWidget<'a> {
    pub fn new(nav: &'a NavigationController, focused: bool) -> Self {
        Self {
            nav,
            focused,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for FileListWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = match &self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.clone().render(area, buf);
                inner
            }
            None => area,
        };
        if inner_area.height == 0 || inner_area.width == 0 {
            return;
        }

        let dim = Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC);
        let entries = match self.nav.listing() {
            Listing::Pending => {
                buf.set_line(inner_area.x, inner_area.y, &Line::styled("Loading…", dim), inner_area.width);
                return;
            }
            Listing::Loaded(entries) if entries.is_empty() => {
                buf.set_line(inner_area.x, inner_area.y, &Line::styled("(empty)", dim), inner_area.width);
                return;
            }
            Listing::Failed(_) => {
                buf.set_line(inner_area.x, inner_area.y, &Line::styled("(empty)", dim), inner_area.width);
                return;
            }
            Listing::Loaded(entries) => entries,
        };

        let base = self.nav.route().as_host_path();
        let visible = entries
            .iter()
            .enumerate()
            .skip(self.nav.scroll_offset)
            .take(inner_area.height as usize);

        for (row, (idx, entry)) in visible.enumerate() {
            let y = inner_area.y + row as u16;
            let icon = match self.nav.icon_for(entry) {
                IconView::Extracted => EXTRACTED_ICON,
                IconView::Glyph(glyph) => glyph,
            };
            let base_style = if entry.is_dir {
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let style = if idx == self.nav.selected_index && self.focused {
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD)
            } else if idx == self.nav.selected_index {
                base_style.add_modifier(Modifier::REVERSED)
            } else {
                base_style
            };

            let line = Line::from(vec![
                Span::styled(icon, style),
                Span::styled(entry.relative_name(&base), style),
            ]);
            buf.set_line(inner_area.x, y, &line, inner_area.width);
        }
    }
}
