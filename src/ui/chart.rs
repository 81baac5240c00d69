use crate::config::{Palette, Rgba};
use crate::export::format_percent;
use crate::model::{BreakdownRow, BreakdownTable, Target};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn to_color(c: Rgba) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

/// Colors for each declared category of `target`, in column order.
pub fn category_colors(target: Target, palette: &Palette) -> Vec<Color> {
    let colors = match target {
        Target::Registry => vec![palette.red, palette.green, palette.gray],
        Target::Os | Target::Dbms | Target::Virtualization => vec![
            palette.red,
            palette.green,
            palette.orange,
            palette.dark_gray,
            palette.gray,
        ],
    };
    colors.into_iter().map(to_color).collect()
}

/// Cuts `label` to `max` characters, marking the cut with `...`.
pub fn truncate_label(label: &str, max: usize) -> String {
    if label.chars().count() > max {
        let head: String = label.chars().take(max).collect();
        format!("{head}...")
    } else {
        label.to_string()
    }
}

/// Splits `width` cells between shares so the segments add up to exactly
/// `width` (largest remainder first) when the shares sum to 1.
pub fn segment_widths(shares: &[f64], width: u16) -> Vec<u16> {
    let total = f64::from(width);
    let exact: Vec<f64> = shares.iter().map(|s| s.max(0.0) * total).collect();
    let mut widths: Vec<u16> = exact.iter().map(|e| e.floor() as u16).collect();

    let target: u16 = (shares.iter().map(|s| s.max(0.0)).sum::<f64>() * total)
        .round()
        .min(total) as u16;
    let mut assigned: u16 = widths.iter().sum();

    let mut order: Vec<usize> = (0..shares.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = exact[a] - exact[a].floor();
        let rb = exact[b] - exact[b].floor();
        rb.partial_cmp(&ra).unwrap_or(std::cmp::Ordering::Equal)
    });
    for i in order {
        if assigned >= target {
            break;
        }
        if exact[i] > f64::from(widths[i]) {
            widths[i] += 1;
            assigned += 1;
        }
    }
    widths
}

fn stacked_bar(row: &BreakdownRow, colors: &[Color], width: u16) -> Vec<Span<'static>> {
    segment_widths(&row.shares, width)
        .into_iter()
        .enumerate()
        .filter(|(_, w)| *w > 0)
        .map(|(i, w)| {
            let color = colors.get(i).copied().unwrap_or(Color::Gray);
            Span::styled(" ".repeat(usize::from(w)), Style::default().bg(color))
        })
        .collect()
}

fn legend(table: &BreakdownTable, colors: &[Color], row: Option<&BreakdownRow>) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, category) in table.categories.iter().enumerate() {
        let share = row.map(|r| r.shares[i]);
        if share == Some(0.0) {
            continue;
        }
        let color = colors.get(i).copied().unwrap_or(Color::Gray);
        spans.push(Span::styled("■ ", Style::default().fg(color)));
        let text = match share {
            Some(s) => format!("{category} {}  ", format_percent(s)),
            None => format!("{category}  "),
        };
        spans.push(Span::raw(text));
    }
    Line::from(spans)
}

/// Draws a breakdown as stacked horizontal bars, one per visible class.
///
/// A single visible class is drawn as one labelled proportion bar; no
/// visible class shows "No data".
#[allow(clippy::too_many_arguments)]
pub fn draw_chart(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    table: &BreakdownTable,
    is_visible: &dyn Fn(&str) -> bool,
    colors: &[Color],
    truncate_len: usize,
    border_style: Style,
) {
    let rows: Vec<&BreakdownRow> = table.rows.iter().filter(|r| is_visible(&r.class)).collect();
    let block = Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner_width = area.width.saturating_sub(2);

    let lines: Vec<Line> = match rows.as_slice() {
        [] => {
            let empty = Paragraph::new("No data")
                .alignment(Alignment::Center)
                .style(Style::default().add_modifier(Modifier::BOLD))
                .block(block);
            frame.render_widget(empty, area);
            return;
        }
        [row] => vec![
            Line::from(Span::styled(
                truncate_label(&row.class, truncate_len),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(stacked_bar(row, colors, inner_width)),
            Line::from(stacked_bar(row, colors, inner_width)),
            Line::default(),
            legend(table, colors, Some(row)),
        ],
        rows => {
            let label_width = rows
                .iter()
                .map(|r| truncate_label(&r.class, truncate_len).chars().count())
                .max()
                .unwrap_or(0)
                .min(usize::from(inner_width / 3));
            let bar_width = inner_width.saturating_sub(label_width as u16 + 1);

            let mut lines: Vec<Line> = rows
                .iter()
                .map(|row| {
                    let label = truncate_label(&row.class, truncate_len);
                    let label: String = label.chars().take(label_width).collect();
                    let mut spans = vec![Span::raw(format!("{label:<label_width$} "))];
                    spans.extend(stacked_bar(row, colors, bar_width));
                    Line::from(spans)
                })
                .collect();
            lines.push(Line::default());
            lines.push(legend(table, colors, None));
            lines
        }
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_label("Учётные системы", 7), "Учётные...");
        assert_eq!(truncate_label("ERP", 7), "ERP");
    }

    #[test]
    fn segments_fill_the_bar_exactly() {
        let widths = segment_widths(&[1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0], 10);
        assert_eq!(widths.iter().sum::<u16>(), 10);
        assert_eq!(widths, vec![4, 3, 3]);

        assert_eq!(segment_widths(&[0.5, 0.0, 0.5], 9).iter().sum::<u16>(), 9);
        assert_eq!(segment_widths(&[1.0, 0.0], 20), vec![20, 0]);
    }

    #[test]
    fn zero_shares_get_no_cells() {
        assert_eq!(segment_widths(&[0.0, 0.0], 10), vec![0, 0]);
    }

    #[test]
    fn presence_targets_have_five_colors() {
        let palette = crate::config::AppConfig::default().palette();
        assert_eq!(category_colors(Target::Os, &palette).len(), 5);
        assert_eq!(
            category_colors(Target::Registry, &palette),
            vec![
                Color::Rgb(220, 20, 60),
                Color::Rgb(0, 176, 80),
                Color::Rgb(200, 200, 200)
            ]
        );
    }
}
