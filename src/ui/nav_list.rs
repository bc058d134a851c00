use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Widget},
};

use crate::drawer::{DrawerItem, ItemKind, NavBadge, NavListSnapshot};
use crate::util::{display_width, format_count, strip_control_chars, truncate_to_width};

const FILTERED_MESSAGE: &str = "ⓘ Subscriptions are filtered";
const CACHE_FULL: &str = "[cache full]";
const FAILURE_MARKER: &str = "⚠";

/// Styles used by the drawer rows.
#[derive(Debug, Clone, Copy)]
pub struct NavStyles {
    pub normal: Style,
    pub selected: Style,
    pub badge: Style,
    pub divider: Style,
    pub failure: Style,
}

impl Default for NavStyles {
    fn default() -> Self {
        Self {
            normal: Style::default(),
            selected: Style::default().bg(Color::DarkGray).fg(Color::White),
            badge: Style::default().add_modifier(Modifier::BOLD),
            divider: Style::default().fg(Color::DarkGray),
            failure: Style::default().fg(Color::Red),
        }
    }
}

/// Per-render inputs supplied by the host view.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Columns of indentation per tree layer.
    pub indent_per_layer: usize,
    /// Highlighted row, if any.
    pub selected: Option<usize>,
    pub styles: NavStyles,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            indent_per_layer: 2,
            selected: None,
            styles: NavStyles::default(),
        }
    }
}

/// Widget drawing every row of a snapshot, one row per line.
pub struct NavListView<'a> {
    ctx: &'a RenderContext,
    snapshot: &'a NavListSnapshot,
}

impl<'a> NavListView<'a> {
    pub fn new(ctx: &'a RenderContext, snapshot: &'a NavListSnapshot) -> Self {
        Self { ctx, snapshot }
    }
}

impl Widget for NavListView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let width = usize::from(area.width);
        let items: Vec<ListItem> = (0..self.snapshot.len())
            .map(|position| ListItem::new(row_line(self.ctx, self.snapshot, position, width)))
            .collect();
        List::new(items).render(area, buf);
    }
}

/// Build the line for one row, laid out to `width` columns.
pub fn row_line(
    ctx: &RenderContext,
    snapshot: &NavListSnapshot,
    position: usize,
    width: usize,
) -> Line<'static> {
    let styles = &ctx.styles;
    let base = if ctx.selected == Some(position) {
        styles.selected
    } else {
        styles.normal
    };

    match snapshot.kind_at(position) {
        ItemKind::NavEntry(tag) => {
            let badge = match snapshot.badge(tag) {
                NavBadge::None => None,
                NavBadge::Count(n) => Some(format_count(n)),
                NavBadge::CacheFull => Some(CACHE_FULL.to_string()),
            };
            layout(String::new(), tag.label(), Vec::new(), badge, width, base, styles)
        }
        ItemKind::Divider => {
            if snapshot.subscriptions_filtered() {
                Line::from(Span::styled(
                    truncate_to_width(FILTERED_MESSAGE, width).into_owned(),
                    styles.divider,
                ))
            } else {
                Line::from(Span::styled("─".repeat(width), styles.divider))
            }
        }
        ItemKind::TreeNode(item) => {
            let indent = " ".repeat(item.layer() as usize * ctx.indent_per_layer);
            let counter = item.counter();
            match item {
                DrawerItem::Folder(folder) => {
                    let prefix = format!("{indent}{} ", if folder.is_open { "▾" } else { "▸" });
                    let badge = (!folder.is_open && counter > 0).then(|| format_count(counter));
                    layout(prefix, &folder.name, Vec::new(), badge, width, base, styles)
                }
                DrawerItem::Feed(feed) => {
                    let markers = if feed.feed.last_update_failed {
                        vec![Span::styled(FAILURE_MARKER, styles.failure)]
                    } else {
                        Vec::new()
                    };
                    let badge = (counter > 0).then(|| format_count(counter));
                    layout(indent, item.title(), markers, badge, width, base, styles)
                }
            }
        }
    }
}

/// `prefix title ... markers badge`, with the title truncated to fit.
fn layout(
    prefix: String,
    title: &str,
    markers: Vec<Span<'static>>,
    badge: Option<String>,
    width: usize,
    base: Style,
    styles: &NavStyles,
) -> Line<'static> {
    let title = strip_control_chars(title);
    let marker_width: usize = markers.iter().map(|m| display_width(&m.content) + 1).sum();
    let badge_width = badge.as_deref().map_or(0, |b| display_width(b) + 1);
    let title_width = width
        .saturating_sub(display_width(&prefix))
        .saturating_sub(marker_width + badge_width);
    let title = truncate_to_width(&title, title_width).into_owned();

    let used = display_width(&prefix) + display_width(&title) + marker_width + badge_width;
    let padding = width.saturating_sub(used);

    let mut spans = vec![
        Span::styled(prefix, base),
        Span::styled(title, base),
        Span::styled(" ".repeat(padding), base),
    ];
    for marker in markers {
        spans.push(marker);
        spans.push(Span::styled(" ", base));
    }
    if let Some(badge) = badge {
        spans.push(Span::styled(" ", base));
        spans.push(Span::styled(badge, styles.badge.patch(base)));
    }
    Line::from(spans)
}

/// Render a snapshot into an off-screen buffer of `width` columns.
pub fn render_to_buffer(ctx: &RenderContext, snapshot: &NavListSnapshot, width: u16) -> Buffer {
    let height = u16::try_from(snapshot.len()).unwrap_or(u16::MAX);
    let area = Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);
    NavListView::new(ctx, snapshot).render(area, &mut buf);
    buf
}

/// Plain-text rows of a buffer, trailing spaces removed.
pub fn buffer_lines(buf: &Buffer) -> Vec<String> {
    let area = buf.area;
    (area.top()..area.bottom())
        .map(|y| {
            let mut line = String::new();
            let mut skip = 0;
            for x in area.left()..area.right() {
                let Some(cell) = buf.cell((x, y)) else {
                    continue;
                };
                // Wide symbols span several cells
                if skip > 0 {
                    skip -= 1;
                    continue;
                }
                let symbol = cell.symbol();
                skip = display_width(symbol).saturating_sub(1);
                line.push_str(symbol);
            }
            line.trim_end().to_string()
        })
        .collect()
}
