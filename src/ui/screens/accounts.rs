use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::feed::Snapshot;
use crate::ui::app::{AccountRow, App};
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let Some(snapshot) = &app.snapshot else {
        render_empty(f, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);

    render_totals(f, chunks[0], snapshot);
    render_accounts(f, chunks[1], app);
}

fn render_totals(f: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let label = Style::default()
        .fg(theme::TEXT_DIM)
        .add_modifier(Modifier::BOLD);
    let net_worth = snapshot.net_worth();

    let line = Line::from(vec![
        Span::styled(" Assets: ", label),
        Span::styled(
            format_amount(snapshot.total_assets()),
            Style::default().fg(theme::GREEN),
        ),
        Span::styled("   Liabilities: ", label),
        Span::styled(
            format_amount(snapshot.total_liabilities()),
            theme::expense_style(),
        ),
        Span::styled("   Net Worth: ", label),
        Span::styled(
            format_amount(net_worth),
            theme::remaining_style(net_worth).add_modifier(Modifier::BOLD),
        ),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_accounts(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .account_rows()
        .into_iter()
        .enumerate()
        .skip(app.account_scroll)
        .take(area.height.saturating_sub(2) as usize)
        .map(|(i, row)| {
            let selected = i == app.account_index;
            let line = match row {
                AccountRow::Institution(inst) => Line::from(Span::styled(
                    inst.name.clone(),
                    Style::default()
                        .fg(theme::ACCENT)
                        .add_modifier(Modifier::BOLD),
                )),
                AccountRow::Kind(kind) => Line::from(Span::styled(
                    format!("  {kind}"),
                    Style::default().fg(theme::YELLOW),
                )),
                AccountRow::Account(acct) => {
                    let balance_style = if acct.kind.is_liability() {
                        theme::expense_style()
                    } else {
                        theme::normal_style()
                    };
                    let available = acct
                        .available
                        .map(|a| format!("  available {}", format_amount(a)))
                        .unwrap_or_default();
                    Line::from(vec![
                        Span::styled(
                            format!("    {:<28}", truncate(&acct.name, 27)),
                            theme::normal_style(),
                        ),
                        Span::styled(
                            format!("{:<14}", truncate(&acct.subtype, 13)),
                            theme::dim_style(),
                        ),
                        Span::styled(format!("{:>14}", format_amount(acct.balance)), balance_style),
                        Span::styled(available, theme::dim_style()),
                    ])
                }
            };
            let item = ListItem::new(line);
            if selected {
                item.style(theme::selected_style())
            } else {
                item
            }
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                format!(" Accounts: {} ", app.snapshot_path.as_deref().unwrap_or("")),
                Style::default()
                    .fg(theme::TEXT_DIM)
                    .add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(list, area);
}

fn render_empty(f: &mut Frame, area: Rect) {
    let msg = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "No accounts loaded.",
            theme::dim_style().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Load an aggregator snapshot with :snapshot <file.json>",
            theme::dim_style(),
        )),
    ])
    .centered()
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY)),
    );
    f.render_widget(msg, area);
}
