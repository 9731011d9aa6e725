use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

const KEY_HINTS: &str = " Tab:focus Space:expand o:open e:edit y:copy r:reload [/]:resize q:quit ";

/// Bottom bar: current path and entry info, or a transient status message.
pub struct StatusBarWidget<'a> {
    path_str: &'a str,
    info: &'a str,
    status_message: Option<&'a str>,
    is_error: bool,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(path_str: &'a str, info: &'a str) -> Self {
        Self {
            path_str,
            info,
            status_message: None,
            is_error: false,
        }
    }

    pub fn status_message(mut self, msg: &'a str, is_error: bool) -> Self {
        self.status_message = Some(msg);
        self.is_error = is_error;
        self
    }
}

/// Keep the last `budget` characters, marking the cut with `...`.
fn truncate_front(s: &str, budget: usize) -> String {
    let len = s.chars().count();
    if len <= budget {
        return s.to_string();
    }
    if budget <= 3 {
        return s.chars().take(budget).collect();
    }
    let tail: String = s.chars().skip(len - (budget - 3)).collect();
    format!("...{tail}")
}

impl Widget for StatusBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let width = area.width as usize;

        if let Some(msg) = self.status_message {
            let style = if self.is_error {
                Style::default().bg(Color::Red).fg(Color::White)
            } else {
                Style::default().fg(Color::Green)
            };
            let display: String = format!("{:<width$}", msg, width = width)
                .chars()
                .take(width)
                .collect();
            buf.set_line(area.x, area.y, &Line::from(Span::styled(display, style)), area.width);
            return;
        }

        let hints_len = KEY_HINTS.chars().count();
        let remaining = width.saturating_sub(hints_len);
        let info_len = self.info.chars().count();
        let path_display = truncate_front(self.path_str, remaining.saturating_sub(info_len + 1));
        let gap = remaining
            .saturating_sub(path_display.chars().count())
            .saturating_sub(info_len);

        let spans = vec![
            Span::styled(path_display, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" ".repeat(gap)),
            Span::styled(self.info, Style::default().fg(Color::Cyan)),
            Span::styled(KEY_HINTS, Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)),
        ];
        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}
