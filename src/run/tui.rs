use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::db::Database;
use crate::import::parse_decimal;
use crate::ledger::BudgetUpdate;
use crate::ui::app::{App, InputMode, PendingAction, Screen};
use crate::ui::commands;
use crate::ui::util::{scroll_down, scroll_to_bottom, scroll_to_top, scroll_up};

pub(crate) fn as_tui(db: &mut Database) -> Result<()> {
    let mut app = App::new();
    app.refresh_all(db)?;
    app.restore_snapshot(db)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, db);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        tracing::error!(error = %e, "tui exited with error");
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    db: &mut Database,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            // Everything but the tab, status and command bars
            let content_height = f.area().height.saturating_sub(3) as usize;
            app.visible_rows = content_height.max(1);
            crate::ui::render::render(f, app);
        })?;

        if let Event::Key(key) = event::read()? {
            if app.show_help {
                app.show_help = false;
                continue;
            }
            match app.input_mode {
                InputMode::Normal => handle_normal_input(key, app, db)?,
                InputMode::Command => handle_command_input(key, app, db)?,
                InputMode::Search => handle_search_input(key, app, db)?,
                InputMode::Editing => handle_editing_input(key, app, db)?,
                InputMode::Confirm => handle_confirm_input(key, app, db)?,
            }
        }
    }
    Ok(())
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('/') => {
            app.input_mode = InputMode::Search;
            app.search_input.clear();
            switch_screen(app, db, Screen::Expenses)?;
        }
        KeyCode::Char('q') | KeyCode::Char('c')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.running = false;
        }
        KeyCode::Char('j') | KeyCode::Down => handle_move_down(app),
        KeyCode::Char('k') | KeyCode::Up => handle_move_up(app),
        KeyCode::Char('1') => switch_screen(app, db, Screen::Planner)?,
        KeyCode::Char('2') => switch_screen(app, db, Screen::Expenses)?,
        KeyCode::Char('3') => switch_screen(app, db, Screen::Accounts)?,
        KeyCode::Char('4') => switch_screen(app, db, Screen::Rules)?,
        KeyCode::Tab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let next = (idx + 1) % screens.len();
            switch_screen(app, db, screens[next])?;
        }
        KeyCode::BackTab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let prev = if idx == 0 { screens.len() - 1 } else { idx - 1 };
            switch_screen(app, db, screens[prev])?;
        }
        KeyCode::Enter | KeyCode::Char('e') if app.screen == Screen::Planner => {
            start_budget_edit(app);
        }
        KeyCode::Esc => handle_escape(app, db)?,
        KeyCode::Char('g') => handle_goto_top(app),
        KeyCode::Char('G') => handle_goto_bottom(app),
        KeyCode::Char('?') => {
            app.show_help = true;
        }
        KeyCode::Char('D') if app.screen == Screen::Rules => {
            commands::handle_command("delete-rule", app, db)?;
        }
        KeyCode::Char('s') if app.screen == Screen::Accounts => {
            commands::handle_command("sync", app, db)?;
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let half_page = app.visible_rows / 2;
            for _ in 0..half_page {
                handle_move_down(app);
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let half_page = app.visible_rows / 2;
            for _ in 0..half_page {
                handle_move_up(app);
            }
        }
        _ => {}
    }
    Ok(())
}

fn start_budget_edit(app: &mut App) {
    if let Some(cat) = app.selected_category() {
        let (name, budget) = (cat.name.clone(), cat.budget);
        app.edit_input = budget.to_string();
        app.input_mode = InputMode::Editing;
        app.set_status(format!("New budget for {name}, Enter to save"));
    }
}

fn handle_command_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let input = app.command_input.clone();
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
            commands::handle_command(&input, app, db)?;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let trimmed = app.command_input.trim_end();
            if let Some(pos) = trimmed.rfind(' ') {
                app.command_input.truncate(pos + 1);
            } else {
                app.command_input.clear();
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
    Ok(())
}

fn handle_search_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.search_input.clear();
            app.refresh_expenses(db)?;
        }
        KeyCode::Backspace => {
            app.search_input.pop();
            reset_expense_cursor(app);
            app.refresh_expenses(db)?;
        }
        KeyCode::Char(c) => {
            app.search_input.push(c);
            reset_expense_cursor(app);
            app.refresh_expenses(db)?;
        }
        _ => {}
    }
    Ok(())
}

fn reset_expense_cursor(app: &mut App) {
    app.expense_index = 0;
    app.expense_scroll = 0;
}

fn handle_editing_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let raw = app.edit_input.trim().to_string();
            let name = app.selected_category().map(|c| c.name.clone());
            match (name, parse_decimal(&raw)) {
                (Some(name), Ok(amount)) if amount >= rust_decimal::Decimal::ZERO => {
                    let ledger = app
                        .ledger
                        .revise_budgets_by_name(&[BudgetUpdate::new(name.clone(), amount)])?;
                    db.save_ledger(&ledger)?;
                    app.refresh_ledger(db)?;
                    app.set_status(format!("Budget set: {name} = {amount}"));
                }
                (Some(_), _) => app.set_status(format!("Invalid amount: {raw}")),
                (None, _) => app.set_status("No category selected"),
            }
            app.edit_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Esc => {
            app.edit_input.clear();
            app.input_mode = InputMode::Normal;
            app.set_status("Edit cancelled");
        }
        KeyCode::Backspace => {
            app.edit_input.pop();
        }
        KeyCode::Char(c) if c.is_ascii_digit() || matches!(c, '.' | ',' | '$') => {
            app.edit_input.push(c);
        }
        _ => {}
    }
    Ok(())
}

fn handle_confirm_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            if let Some(action) = app.pending_action.take() {
                match action {
                    PendingAction::ReviseAll { amounts } => {
                        commands::apply_revision(&amounts, app, db)?;
                    }
                    PendingAction::DeleteRule { id, pattern } => {
                        db.delete_import_rule(id)?;
                        app.refresh_rules(db)?;
                        app.set_status(format!("Deleted rule: '{pattern}'"));
                    }
                }
            }
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.pending_action = None;
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
            app.set_status("Cancelled");
        }
        _ => {}
    }
    Ok(())
}

// ── Navigation helpers ───────────────────────────────────────

fn switch_screen(app: &mut App, db: &mut Database, screen: Screen) -> Result<()> {
    app.screen = screen;
    match screen {
        Screen::Planner => app.refresh_ledger(db)?,
        Screen::Expenses => app.refresh_expenses(db)?,
        Screen::Accounts => {}
        Screen::Rules => app.refresh_rules(db)?,
    }
    app.set_status(format!("{screen}"));
    Ok(())
}

fn handle_escape(app: &mut App, db: &mut Database) -> Result<()> {
    if app.screen == Screen::Expenses
        && (!app.search_input.is_empty() || app.expense_filter_category.is_some())
    {
        app.search_input.clear();
        app.expense_filter_category = None;
        reset_expense_cursor(app);
        app.refresh_expenses(db)?;
        app.set_status("Filters cleared");
    } else {
        app.status_message.clear();
    }
    Ok(())
}

fn handle_move_down(app: &mut App) {
    match app.screen {
        Screen::Planner => {
            let page = app.planner_page();
            scroll_down(
                &mut app.category_index,
                &mut app.category_scroll,
                app.ledger.len(),
                page,
            );
        }
        Screen::Expenses => {
            let page = app.expense_page();
            scroll_down(
                &mut app.expense_index,
                &mut app.expense_scroll,
                app.expenses.len(),
                page,
            );
        }
        Screen::Accounts => {
            let page = app.account_page();
            let len = app.account_rows().len();
            scroll_down(&mut app.account_index, &mut app.account_scroll, len, page);
        }
        Screen::Rules => {
            let page = app.rule_page();
            scroll_down(
                &mut app.rule_index,
                &mut app.rule_scroll,
                app.import_rules.len(),
                page,
            );
        }
    }
}

fn handle_move_up(app: &mut App) {
    match app.screen {
        Screen::Planner => scroll_up(&mut app.category_index, &mut app.category_scroll),
        Screen::Expenses => scroll_up(&mut app.expense_index, &mut app.expense_scroll),
        Screen::Accounts => scroll_up(&mut app.account_index, &mut app.account_scroll),
        Screen::Rules => scroll_up(&mut app.rule_index, &mut app.rule_scroll),
    }
}

fn handle_goto_top(app: &mut App) {
    match app.screen {
        Screen::Planner => scroll_to_top(&mut app.category_index, &mut app.category_scroll),
        Screen::Expenses => scroll_to_top(&mut app.expense_index, &mut app.expense_scroll),
        Screen::Accounts => scroll_to_top(&mut app.account_index, &mut app.account_scroll),
        Screen::Rules => scroll_to_top(&mut app.rule_index, &mut app.rule_scroll),
    }
}

fn handle_goto_bottom(app: &mut App) {
    match app.screen {
        Screen::Planner => {
            let page = app.planner_page();
            scroll_to_bottom(
                &mut app.category_index,
                &mut app.category_scroll,
                app.ledger.len(),
                page,
            );
        }
        Screen::Expenses => {
            let page = app.expense_page();
            scroll_to_bottom(
                &mut app.expense_index,
                &mut app.expense_scroll,
                app.expenses.len(),
                page,
            );
        }
        Screen::Accounts => {
            let page = app.account_page();
            let len = app.account_rows().len();
            scroll_to_bottom(&mut app.account_index, &mut app.account_scroll, len, page);
        }
        Screen::Rules => {
            let page = app.rule_page();
            scroll_to_bottom(
                &mut app.rule_index,
                &mut app.rule_scroll,
                app.import_rules.len(),
                page,
            );
        }
    }
}
