use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::nav::tree::{Affordance, FlatItem, RowKind, SidebarTree};

/// Sidebar widget: the volume tree drawn with box-drawing characters.
pub struct SidebarWidget<'a> {
    tree: &'a SidebarTree,
    focused: bool,
    block: Option<Block<'a>>,
}

impl<'a> SidebarWidget<'a> {
    pub fn new(tree: &'a SidebarTree, focused: bool) -> Self {
        Self {
            tree,
            focused,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Indentation prefix. Walks back through the rows to find whether each
    /// ancestor was the last of its siblings.
    fn build_prefix(item: &FlatItem, items: &[FlatItem], item_index: usize) -> String {
        if item.depth == 0 {
            return String::new();
        }

        let mut prefix = String::new();
        for d in 1..item.depth {
            let ancestor_is_last = items[..item_index]
                .iter()
                .rev()
                .take_while(|row| row.depth >= d)
                .find(|row| row.depth == d)
                .is_some_and(|row| row.is_last_sibling);
            prefix.push_str(if ancestor_is_last { "   " } else { "│  " });
        }
        prefix.push_str(if item.is_last_sibling { "└──" } else { "├──" });
        prefix
    }

    fn indicator(kind: &RowKind) -> &'static str {
        match kind {
            RowKind::Node { affordance, .. } => match affordance {
                Affordance::Pending => "· ",
                Affordance::Leaf => "  ",
                Affordance::Collapsed => "▸ ",
                Affordance::Expanded => "▾ ",
            },
            RowKind::Loading => "",
        }
    }

    fn row_style(kind: &RowKind) -> Style {
        match kind {
            RowKind::Node { .. } => Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            RowKind::Loading => Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::ITALIC),
        }
    }
}

impl Widget for SidebarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = match &self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.clone().render(area, buf);
                inner
            }
            None => area,
        };

        let items = &self.tree.flat_items;
        let visible_height = inner_area.height as usize;
        if items.is_empty() || visible_height == 0 {
            return;
        }

        let visible = items
            .iter()
            .enumerate()
            .skip(self.tree.scroll_offset)
            .take(visible_height);

        for (row, (idx, item)) in visible.enumerate() {
            let y = inner_area.y + row as u16;
            let style = if idx == self.tree.selected_index && self.focused {
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD)
            } else if idx == self.tree.selected_index {
                Self::row_style(&item.kind).add_modifier(Modifier::REVERSED)
            } else {
                Self::row_style(&item.kind)
            };

            let content = format!(
                "{}{}{}",
                Self::build_prefix(item, items, idx),
                Self::indicator(&item.kind),
                item.name
            );
            let line = Line::from(Span::styled(content, style));
            buf.set_line(inner_area.x, y, &line, inner_area.width);
        }
    }
}
