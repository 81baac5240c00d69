use crate::config::{params_by_group, ParamKind};
use crate::export::format_percent;
use crate::model::{FilterAxis, Target, CLASS_HEADER, COUNT_HEADER};
use crate::ui::app::{App, FocusPanel, View};
use crate::ui::chart::{category_colors, draw_chart, truncate_label};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, List, ListItem, Paragraph, Row, Scrollbar, ScrollbarOrientation,
        ScrollbarState, Table, Tabs,
    },
    Frame,
};

const BRAND_DARK: Color = Color::Rgb(0x1F, 0x2F, 0x3C);
const BRAND_SELECT_BG: Color = Color::Rgb(0xC3, 0xD3, 0xE0);
const BRAND_GREEN: Color = Color::Rgb(0x82, 0x9A, 0x68);
const BRAND_ORANGE: Color = Color::Rgb(0x9E, 0x68, 0x3C);
const BRAND_MUTED: Color = Color::Rgb(0x71, 0x65, 0x65);
const BRAND_ERROR: Color = Color::Rgb(0xB0, 0x3A, 0x2E);

const HEADER_STYLE: Style = Style::new().fg(BRAND_DARK).add_modifier(Modifier::BOLD);
const SELECTED_STYLE: Style = Style::new()
    .bg(BRAND_SELECT_BG)
    .fg(BRAND_DARK)
    .add_modifier(Modifier::BOLD);
const COUNT_COLOR: Color = BRAND_GREEN;

fn focus_border(focused: bool) -> Style {
    if focused {
        Style::default().fg(BRAND_ORANGE)
    } else {
        Style::default()
    }
}

fn frame_chunks(frame: &Frame) -> [Rect; 3] {
    Layout::vertical([
        Constraint::Length(3), // Header
        Constraint::Min(10),   // Main content
        Constraint::Length(3), // Footer
    ])
    .areas(frame.area())
}

pub fn draw_dashboard(frame: &mut Frame, app: &App) {
    let [header, main, footer] = frame_chunks(frame);
    draw_header(frame, header, app);

    let [filters, charts] =
        Layout::horizontal([Constraint::Percentage(25), Constraint::Percentage(75)]).areas(main);
    draw_filters(frame, filters, app);

    let [top, bottom] =
        Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(charts);
    let [tl, tr] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(top);
    let [bl, br] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(bottom);

    let palette = app.config.palette();
    let truncate_len = usize::try_from(app.config.plot_truncate_len).unwrap_or(0);
    for (target, area) in Target::ALL.into_iter().zip([tl, tr, bl, br]) {
        if let Some(table) = app.tables.get(&target) {
            draw_chart(
                frame,
                area,
                target.title(),
                table,
                &|class: &str| app.is_checked(target, class),
                &category_colors(target, &palette),
                truncate_len,
                Style::default(),
            );
        }
    }

    draw_footer(
        frame,
        footer,
        app,
        " Tab View | ↑↓ Filter | Space Toggle | a All/None | o Reload | q Quit ",
    );
}

pub fn draw_breakdown(frame: &mut Frame, app: &App, target: Target) {
    let [header, main, footer] = frame_chunks(frame);
    draw_header(frame, header, app);

    // table_min_width is in pixels; roughly 8 per terminal cell
    let min_table = u16::try_from(app.config.table_min_width / 8).unwrap_or(u16::MAX);
    let [filters, table, chart] = Layout::horizontal([
        Constraint::Percentage(22),
        Constraint::Min(min_table),
        Constraint::Percentage(38),
    ])
    .areas(main);

    draw_filters(frame, filters, app);
    draw_table(frame, table, app, target);

    if let Some(data) = app.tables.get(&target) {
        draw_chart(
            frame,
            chart,
            target.title(),
            data,
            &|class: &str| app.is_checked(target, class),
            &category_colors(target, &app.config.palette()),
            usize::try_from(app.config.plot_truncate_len).unwrap_or(0),
            Style::default(),
        );
    }

    draw_footer(
        frame,
        footer,
        app,
        " Tab View | ←→ Panel | Space Toggle | a All/None | e Export CSV | o Reload | q Quit ",
    );
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let title = match app.engine.dataset() {
        Some(dataset) => format!(
            " Inventory Dashboard | {} | {} systems | {} shown ",
            dataset.source,
            dataset.len(),
            app.engine.matching_records()
        ),
        None => " Inventory Dashboard | no data loaded ".to_string(),
    };

    let tabs = Tabs::new(View::ALL.iter().map(|v| v.title()))
        .select(app.view_index)
        .style(Style::default().fg(BRAND_MUTED))
        .highlight_style(HEADER_STYLE.add_modifier(Modifier::UNDERLINED))
        .block(
            Block::default()
                .title(Span::styled(title, HEADER_STYLE))
                .borders(Borders::ALL),
        );

    frame.render_widget(tabs, area);
}

fn draw_filters(frame: &mut Frame, area: Rect, app: &App) {
    let is_focused = app.focus_panel == FocusPanel::Filters;

    // Axis headers interleave with options; track the line of the selection
    let mut items: Vec<ListItem> = Vec::new();
    let mut selected_line = 0;
    let mut entry = 0;
    for axis in FilterAxis::ALL {
        let options = app.engine.options(axis);
        let checked = options
            .iter()
            .filter(|v| app.engine.is_selected(axis, v))
            .count();
        items.push(ListItem::new(Line::from(vec![
            Span::styled(axis.title(), HEADER_STYLE),
            Span::styled(
                format!(" ({checked}/{})", options.len()),
                Style::default().fg(COUNT_COLOR),
            ),
        ])));

        for value in options {
            let is_selected = entry == app.selected_filter;
            if is_selected {
                selected_line = items.len();
            }
            let mark = if app.engine.is_selected(axis, value) {
                "[x] "
            } else {
                "[ ] "
            };
            let style = if is_selected && is_focused {
                SELECTED_STYLE
            } else {
                Style::default()
            };
            items.push(ListItem::new(Line::from(vec![
                Span::raw(mark),
                Span::styled(value.clone(), style),
            ])));
            entry += 1;
        }
    }

    let visible = usize::from(area.height.saturating_sub(2));
    let scroll_offset = (selected_line + 1).saturating_sub(visible);
    let total = items.len();
    let items: Vec<ListItem> = items.into_iter().skip(scroll_offset).collect();

    let list = List::new(items).block(
        Block::default()
            .title(" Filters ")
            .borders(Borders::ALL)
            .border_style(focus_border(is_focused)),
    );
    frame.render_widget(list, area);

    if total > visible {
        draw_scrollbar(frame, area, total, selected_line);
    }
}

fn draw_table(frame: &mut Frame, area: Rect, app: &App, target: Target) {
    let is_focused = app.focus_panel == FocusPanel::Table;
    let Some(data) = app.tables.get(&target) else {
        return;
    };

    // Calculate visible area (subtract 3 for borders and header)
    let visible_rows = usize::from(area.height).saturating_sub(3);
    let scroll_offset = (app.selected_row + 1).saturating_sub(visible_rows);

    let mut header = vec![String::new(), CLASS_HEADER.to_string()];
    header.extend(data.categories.iter().cloned());
    header.push(COUNT_HEADER.to_string());
    let header = Row::new(header).style(HEADER_STYLE).height(1);

    let truncate_len = usize::try_from(app.config.plot_truncate_len).unwrap_or(0);
    let rows: Vec<Row> = data
        .rows
        .iter()
        .enumerate()
        .skip(scroll_offset)
        .take(visible_rows)
        .map(|(i, row)| {
            let is_selected = i == app.selected_row;
            let style = if is_selected && is_focused {
                SELECTED_STYLE
            } else if is_selected {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let check = if app.is_checked(target, &row.class) {
                "✓"
            } else {
                " "
            };

            let mut cells = vec![check.to_string(), truncate_label(&row.class, truncate_len)];
            cells.extend(row.shares.iter().map(|s| format_percent(*s)));
            cells.push(row.count.to_string());
            Row::new(cells).style(style)
        })
        .collect();

    let mut widths = vec![Constraint::Length(2), Constraint::Min(12)];
    widths.extend(data.categories.iter().map(|c| {
        Constraint::Length(u16::try_from(c.chars().count().max(4)).unwrap_or(u16::MAX))
    }));
    widths.push(Constraint::Length(7));

    let title = format!(
        " {} ({} classes, {} systems) ",
        target.title(),
        data.rows.len(),
        data.total_count()
    );
    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(focus_border(is_focused)),
    );
    frame.render_widget(table, area);

    if data.rows.len() > visible_rows {
        draw_scrollbar(frame, area, data.rows.len(), app.selected_row);
    }
}

pub fn draw_settings(frame: &mut Frame, app: &App) {
    let [header, main, footer] = frame_chunks(frame);
    draw_header(frame, header, app);

    let [list, help] = Layout::vertical([Constraint::Min(5), Constraint::Length(4)]).areas(main);

    let mut rows: Vec<Row> = Vec::new();
    let mut group = "";
    for (i, spec) in params_by_group().into_iter().enumerate() {
        if spec.group != group {
            group = spec.group;
            rows.push(Row::new(vec![group.to_string()]).style(HEADER_STYLE));
        }
        let value = app
            .config
            .get(spec.key)
            .map_or_else(|| "-".to_string(), |v| v.to_string());
        let kind = match spec.kind {
            ParamKind::Number { min, max } => format!("{min}..{max}"),
            ParamKind::FilePath => "file".to_string(),
            ParamKind::Color => "color".to_string(),
        };
        let style = if i == app.selected_param {
            SELECTED_STYLE
        } else {
            Style::default()
        };
        let reload = if spec.require_reload { "reload" } else { "" };
        rows.push(
            Row::new(vec![
                format!("  {}", spec.label),
                value,
                kind,
                reload.to_string(),
            ])
            .style(style),
        );
    }

    let widths = [
        Constraint::Percentage(35),
        Constraint::Percentage(35),
        Constraint::Percentage(18),
        Constraint::Percentage(12),
    ];
    let table = Table::new(rows, widths).block(
        Block::default()
            .title(" Settings ")
            .borders(Borders::ALL)
            .border_style(focus_border(true)),
    );
    frame.render_widget(table, list);

    let tooltip = app.selected_spec().map_or("", |s| s.tooltip);
    let help_text = Paragraph::new(tooltip)
        .style(Style::default().fg(BRAND_MUTED))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help_text, help);

    draw_footer(
        frame,
        footer,
        app,
        " Tab View | ↑↓ Select | +/- Adjust | r Reset | s Save | q Quit ",
    );
}

fn draw_scrollbar(frame: &mut Frame, area: Rect, total: usize, position: usize) {
    let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
        .begin_symbol(Some("↑"))
        .end_symbol(Some("↓"));
    let mut scrollbar_state = ScrollbarState::new(total).position(position);

    let scrollbar_area = Rect {
        x: area.x + area.width - 1,
        y: area.y + 1,
        width: 1,
        height: area.height.saturating_sub(2),
    };
    frame.render_stateful_widget(scrollbar, scrollbar_area, &mut scrollbar_state);
}

fn draw_footer(frame: &mut Frame, area: Rect, app: &App, help: &str) {
    let line = match &app.status {
        Some(status) if status.starts_with("Error") => Line::from(vec![
            Span::styled(help, Style::default().fg(BRAND_MUTED)),
            Span::styled(status.as_str(), Style::default().fg(BRAND_ERROR)),
        ]),
        Some(status) => Line::from(vec![
            Span::styled(help, Style::default().fg(BRAND_MUTED)),
            Span::styled(status.as_str(), Style::default().fg(BRAND_GREEN)),
        ]),
        None => Line::from(Span::styled(help, Style::default().fg(BRAND_MUTED))),
    };

    let footer = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}
