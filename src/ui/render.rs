use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use super::app::{App, InputMode, Screen};
use super::commands;
use super::theme;

const KEY_BINDINGS: &[(&str, &str)] = &[
    ("j/k, Up/Down", "Move cursor"),
    ("1-4, Tab/Shift-Tab", "Switch screens"),
    ("g/G, Ctrl-d/u", "Top/Bottom, half page"),
    (":", "Command mode"),
    ("/", "Search expenses"),
    ("Enter or e (Planner)", "Edit the selected budget"),
    ("D (Rules)", "Delete the selected rule"),
    ("s (Accounts)", "Sync the loaded snapshot"),
    ("Esc", "Cancel, clear expense filters"),
    ("Ctrl-q", "Quit"),
];

pub(crate) fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tab bar
            Constraint::Min(5),    // Main content
            Constraint::Length(1), // Status bar
            Constraint::Length(1), // Command bar
        ])
        .split(f.area());

    render_tab_bar(f, chunks[0], app);
    match app.screen {
        Screen::Planner => super::screens::planner::render(f, chunks[1], app),
        Screen::Expenses => super::screens::expenses::render(f, chunks[1], app),
        Screen::Accounts => super::screens::accounts::render(f, chunks[1], app),
        Screen::Rules => super::screens::rules::render(f, chunks[1], app),
    }
    render_status_bar(f, chunks[2], app);
    render_command_bar(f, chunks[3], app);

    if app.show_help {
        render_help_overlay(f, f.area());
    }
}

fn render_tab_bar(f: &mut Frame, area: Rect, app: &App) {
    let dim = Style::default().fg(theme::TEXT_DIM);
    let titles: Vec<Line> = Screen::all()
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let name_style = if *s == app.screen {
                Style::default()
                    .fg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD)
            } else {
                dim
            };
            Line::from(vec![
                Span::styled(format!("{}:", i + 1), dim),
                Span::styled(s.to_string(), name_style),
            ])
        })
        .collect();

    let tabs = Tabs::new(titles)
        .divider(Span::styled(" | ", Style::default().fg(theme::OVERLAY)))
        .style(Style::default().bg(theme::HEADER_BG));
    f.render_widget(tabs, area);
}

fn mode_color(mode: InputMode) -> Color {
    match mode {
        InputMode::Normal => theme::ACCENT,
        InputMode::Command | InputMode::Editing => theme::GREEN,
        InputMode::Search => theme::YELLOW,
        InputMode::Confirm => theme::RED,
    }
}

fn screen_hints(screen: Screen) -> &'static str {
    match screen {
        Screen::Planner => " Enter edit budget | :spend | :revise | ? help ",
        Screen::Expenses => " /search | :filter | :month | ? help ",
        Screen::Accounts => " s sync | :snapshot | ? help ",
        Screen::Rules => " D delete | :rule add | ? help ",
    }
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mode_label = format!(" {} ", app.input_mode);
    let mode_style = Style::default()
        .fg(theme::HEADER_BG)
        .bg(mode_color(app.input_mode))
        .add_modifier(Modifier::BOLD);

    let info = format!(
        " {} | {} | {} mode | {} expenses",
        app.screen,
        app.current_month.as_deref().unwrap_or("All Time"),
        app.ledger.mode(),
        app.expense_count
    );
    let hints = screen_hints(app.screen);
    let pad = (area.width as usize).saturating_sub(mode_label.len() + info.len() + hints.len());

    let bar = Paragraph::new(Line::from(vec![
        Span::styled(mode_label, mode_style),
        Span::styled(info, theme::status_bar_style()),
        Span::styled(" ".repeat(pad), theme::status_bar_style()),
        Span::styled(hints, theme::status_bar_style()),
    ]));
    f.render_widget(bar, area);
}

/// A prompt followed by what has been typed so far, with the cursor column.
fn prompt<'a>(prefix: &'a str, color: Color, input: &'a str) -> (Vec<Span<'a>>, Option<u16>) {
    let cursor = (prefix.chars().count() + input.chars().count()) as u16;
    (
        vec![
            Span::styled(prefix, Style::default().fg(color)),
            Span::styled(input, theme::command_bar_style()),
        ],
        Some(cursor),
    )
}

fn render_command_bar(f: &mut Frame, area: Rect, app: &App) {
    let (spans, cursor) = match app.input_mode {
        InputMode::Command => prompt(":", theme::ACCENT, &app.command_input),
        InputMode::Editing => prompt("budget> ", theme::GREEN, &app.edit_input),
        InputMode::Search => {
            let (mut spans, cursor) = prompt("/", theme::YELLOW, &app.search_input);
            if !app.search_input.is_empty() {
                spans.push(Span::styled(
                    format!("  ({} matches)", app.expenses.len()),
                    theme::dim_style(),
                ));
            }
            (spans, cursor)
        }
        InputMode::Confirm => (
            vec![
                Span::styled(&app.confirm_message, Style::default().fg(theme::YELLOW)),
                Span::styled(" [y/N] ", Style::default().fg(theme::RED)),
            ],
            None,
        ),
        InputMode::Normal if app.status_message.is_empty() => (
            vec![Span::styled(
                " Press : for commands, / to search, ? for help",
                theme::dim_style(),
            )],
            None,
        ),
        InputMode::Normal => (
            vec![Span::styled(&app.status_message, theme::command_bar_style())],
            None,
        ),
    };

    let bar = Paragraph::new(Line::from(spans)).style(Style::default().bg(theme::COMMAND_BG));
    f.render_widget(bar, area);

    if let Some(offset) = cursor {
        f.set_cursor_position((area.x + offset, area.y));
    }
}

fn heading(text: &str) -> Line<'_> {
    Line::from(Span::styled(
        text,
        Style::default()
            .fg(theme::YELLOW)
            .add_modifier(Modifier::BOLD),
    ))
}

fn render_help_overlay(f: &mut Frame, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(
            " BudgetPlanner Help ",
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        heading(" Keys"),
    ];
    lines.extend(KEY_BINDINGS.iter().map(|(keys, action)| {
        Line::from(Span::styled(
            format!("  {keys:<22} {action}"),
            theme::normal_style(),
        ))
    }));

    // One line per command, listed under its longest alias
    let mut cmds: Vec<(&str, &str)> = Vec::new();
    for (&name, cmd) in commands::COMMANDS.iter() {
        match cmds.iter_mut().find(|(_, desc)| *desc == cmd.description) {
            Some(entry) if entry.0.len() < name.len() => entry.0 = name,
            Some(_) => {}
            None => cmds.push((name, cmd.description)),
        }
    }
    cmds.sort_by_key(|(name, _)| *name);

    lines.push(Line::from(""));
    lines.push(heading(" Commands"));
    lines.extend(cmds.iter().map(|(name, desc)| {
        Line::from(Span::styled(
            format!("  :{name:<21} {desc}"),
            theme::normal_style(),
        ))
    }));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " Press any key to close ",
        theme::dim_style(),
    )));

    let height = (lines.len() as u16 + 2).min(area.height.saturating_sub(2));
    let width = 76.min(area.width.saturating_sub(4));
    let popup = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    );

    f.render_widget(Clear, popup);
    let help = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT))
            .style(Style::default().bg(theme::HEADER_BG)),
    );
    f.render_widget(help, popup);
}
