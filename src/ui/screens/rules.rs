use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::truncate;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(
            format!(" Categorization Rules ({}) ", app.import_rules.len()),
            Style::default()
                .fg(theme::TEXT_DIM)
                .add_modifier(Modifier::BOLD),
        ));

    if app.import_rules.is_empty() {
        let msg = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No categorization rules yet",
                theme::dim_style(),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Add rules with :rule <pattern> <category>",
                theme::dim_style(),
            )),
            Line::from(Span::styled(
                "e.g. :rule kroger Food",
                Style::default().fg(theme::ACCENT),
            )),
        ])
        .centered()
        .block(block);
        f.render_widget(msg, area);
        return;
    }

    let header_cells = ["Pattern", "Type", "Category", "Priority"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .import_rules
        .iter()
        .enumerate()
        .skip(app.rule_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, rule)| {
            // Rules pointing at a category the ledger no longer has never fire
            let known = app.ledger.resolve_name(&rule.category).is_some();
            let style = if i == app.rule_index {
                theme::selected_style()
            } else if !known {
                theme::dim_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };

            Row::new(vec![
                Cell::from(truncate(&rule.pattern, 36)),
                Cell::from(if rule.is_regex { "regex" } else { "contains" }),
                Cell::from(truncate(&rule.category, 20)),
                Cell::from(rule.priority.to_string()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Min(20),
        Constraint::Length(10),
        Constraint::Length(22),
        Constraint::Length(9),
    ];

    let table = Table::new(rows, widths).header(header).block(block);
    f.render_widget(table, area);
}
