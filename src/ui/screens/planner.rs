use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use rust_decimal::Decimal;

use crate::models::whole_percent;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{create_progress_bar, format_amount, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Totals banner
            Constraint::Min(3),    // Categories
        ])
        .split(area);

    render_summary(f, chunks[0], app);
    if app.ledger.is_empty() {
        render_empty(f, chunks[1]);
    } else {
        render_categories(f, chunks[1], app);
    }
}

fn render_summary(f: &mut Frame, area: Rect, app: &App) {
    let summary = app.ledger.summary();
    let label = Style::default()
        .fg(theme::TEXT_DIM)
        .add_modifier(Modifier::BOLD);

    let line = Line::from(vec![
        Span::styled(" Total Budget: ", label),
        Span::styled(
            format_amount(summary.total_budget),
            Style::default().fg(theme::ACCENT),
        ),
        Span::styled("   Total Expenses: ", label),
        Span::styled(format_amount(summary.total_spent), theme::expense_style()),
        Span::styled("   Remaining: ", label),
        Span::styled(
            format_amount(summary.total_remaining),
            theme::remaining_style(summary.total_remaining).add_modifier(Modifier::BOLD),
        ),
    ]);

    let banner = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                format!(" {} mode ", app.ledger.mode()),
                Style::default().fg(theme::TEXT_DIM),
            )),
    );
    f.render_widget(banner, area);
}

fn render_categories(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .ledger
        .progress_by_category()
        .into_iter()
        .enumerate()
        .skip(app.category_scroll)
        .take(area.height.saturating_sub(2) as usize)
        .map(|(i, (cat, progress))| {
            let color = theme::band_color(progress.band);
            let style = if i == app.category_index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<18}", truncate(&cat.name, 17)), style),
                Span::styled(
                    format!(
                        "{:>12} / {:<12} ",
                        format_amount(cat.spent),
                        format_amount(cat.budget)
                    ),
                    Style::default().fg(color),
                ),
                Span::styled(
                    create_progress_bar(progress.progress, 20),
                    Style::default().fg(color),
                ),
                Span::styled(
                    format!(" {:>3}%", progress.percent()),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("  {}", progress.band), theme::dim_style()),
                Span::styled(overspend_note(progress.ratio), theme::expense_style()),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                format!(" Categories ({}) ", app.ledger.len()),
                Style::default()
                    .fg(theme::TEXT_DIM)
                    .add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(list, area);
}

/// The bar stops at 100%; say how far past the budget a category went.
fn overspend_note(ratio: Option<Decimal>) -> String {
    match ratio {
        Some(r) if r > Decimal::ONE => {
            format!("  {}% used", whole_percent(r))
        }
        None => "  no budget".to_string(),
        _ => String::new(),
    }
}

fn render_empty(f: &mut Frame, area: Rect) {
    let msg = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("No budget categories yet", theme::dim_style())),
        Line::from(""),
        Line::from(Span::styled(
            "Add one with :category <name> <budget>",
            theme::dim_style(),
        )),
    ])
    .centered()
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                " Categories ",
                Style::default()
                    .fg(theme::TEXT_DIM)
                    .add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(msg, area);
}
