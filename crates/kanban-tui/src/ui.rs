use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use kanban_core::{AppStep, Column, Goal, Task, TaskId};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, BoardInput, GoalField, RegisterField, View, VimMode};

pub fn draw(f: &mut Frame, app: &App) {
    match app.view {
        View::Login => draw_login(f, app),
        View::Register => draw_register(f, app),
        View::Board => draw_board(f, app),
        View::Goals => draw_goals(f, app),
    }

    if let Some(ref warning) = app.warning_message {
        draw_message_popup(f, " Warning ", warning, Color::Yellow);
    }

    if let Some(ref error) = app.error_message {
        draw_message_popup(f, " Error ", error, Color::Red);
    }

    if app.loading {
        draw_loading_overlay(f, &app.loading_message);
    }
}

fn draw_login(f: &mut Frame, app: &App) {
    let area = centered_rect(50, 50, f.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // User list
            Constraint::Length(1), // Hint
        ])
        .split(area);

    let items: Vec<ListItem> = app
        .users
        .iter()
        .enumerate()
        .map(|(i, user)| {
            let style = if i == app.selected_user_idx {
                Style::default().bg(Color::DarkGray).fg(Color::White)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::raw("  "),
                Span::styled(&user.name, style),
                Span::raw("  "),
                Span::styled(format!("({})", user.email), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" Login ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(list, chunks[0]);

    let hint = Paragraph::new("j/k: select | Enter: login | r: register | q: quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(hint, chunks[1]);
}

fn draw_register(f: &mut Frame, app: &App) {
    let area = f.area();

    // Center the form
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Length(11),
            Constraint::Percentage(30),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(50),
            Constraint::Percentage(25),
        ])
        .split(vertical[1]);

    let form_area = horizontal[1];
    let form_block = Block::default()
        .title(" Register ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = form_block.inner(form_area);
    f.render_widget(form_block, form_area);

    let form_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Name
            Constraint::Length(3), // Email
            Constraint::Length(1), // Hint
            Constraint::Min(0),
        ])
        .split(inner);

    let fields = [
        (RegisterField::Name, " Name ", app.register_name.as_str()),
        (RegisterField::Email, " Email ", app.register_email.as_str()),
    ];

    for (i, (field, title, value)) in fields.iter().enumerate() {
        let style = if app.register_field == *field {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };
        let block = Block::default()
            .title(*title)
            .borders(Borders::ALL)
            .border_style(style);
        f.render_widget(Paragraph::new(*value).block(block), form_chunks[i]);
    }

    let mode_text = match app.vim_mode {
        VimMode::Normal => "'i' edit | Enter submit | Esc back | 'q' quit",
        VimMode::Insert => "Type to enter | Tab next field | Esc normal | Enter submit",
    };
    let hint = Paragraph::new(mode_text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(hint, form_chunks[2]);

    if app.vim_mode == VimMode::Insert {
        let (idx, value) = match app.register_field {
            RegisterField::Name => (0, app.register_name.as_str()),
            RegisterField::Email => (1, app.register_email.as_str()),
        };
        f.set_cursor_position((
            cursor_x(form_chunks[idx].x + 1, value),
            form_chunks[idx].y + 1,
        ));
    }
}

fn draw_board(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),      // Header
            Constraint::Percentage(60), // Columns
            Constraint::Min(0),         // Comments of the selected task
            Constraint::Length(1),      // Status bar
        ])
        .split(f.area());

    draw_header(f, chunks[0], app);
    draw_columns(f, chunks[1], app);
    draw_comments(f, chunks[2], app);
    draw_status_bar(f, chunks[3], app);

    if let Some(input) = app.board_input {
        draw_input_popup(f, app, input);
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let email = app
        .kanban
        .current_user()
        .map(|u| u.email.as_str())
        .unwrap_or("");

    let header = Paragraph::new(vec![Line::from(vec![
        Span::styled(
            "KANBAN",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::styled(app.user_name(), Style::default().fg(Color::Yellow)),
        Span::raw(" "),
        Span::styled(email, Style::default().fg(Color::DarkGray)),
    ])])
    .block(Block::default().borders(Borders::BOTTOM));

    f.render_widget(header, area);
}

fn draw_columns(f: &mut Frame, area: Rect, app: &App) {
    let column_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let dragging = app.kanban.dragging();

    for (i, column) in Column::ALL.into_iter().enumerate() {
        let is_selected = column == app.selected_column;
        let border_style = match (is_selected, dragging.is_some()) {
            (true, true) => Style::default().fg(Color::Magenta),
            (true, false) => Style::default().fg(Color::Cyan),
            _ => Style::default().fg(Color::DarkGray),
        };

        let tasks = app.column_tasks(column);
        let visible_height = column_chunks[i].height.saturating_sub(2) as usize;
        // Keep the selection on screen
        let offset = if is_selected {
            app.selected_task.saturating_sub(visible_height.saturating_sub(1))
        } else {
            0
        };

        let lines: Vec<Line> = tasks
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible_height)
            .map(|(j, &task)| task_line(task, is_selected && j == app.selected_task, dragging))
            .collect();

        let body = if tasks.is_empty() {
            let placeholder = match column {
                Column::Incomplete => "Press 'n' to add a task",
                Column::Completed => "Finished tasks show up here",
            };
            Paragraph::new(Span::styled(placeholder, Style::default().fg(Color::DarkGray)))
        } else {
            Paragraph::new(lines)
        };

        let widget = body.block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(format!(" {} ({}) ", column.title(), tasks.len())),
        );

        f.render_widget(widget, column_chunks[i]);
    }
}

fn task_line(task: &Task, selected: bool, dragging: Option<TaskId>) -> Line<'_> {
    let bg_style = if selected {
        Style::default().bg(Color::DarkGray)
    } else {
        Style::default()
    };

    let (marker, marker_color) = if dragging == Some(task.id) {
        ("⇄", Color::Magenta)
    } else if task.completed {
        ("✓", Color::Green)
    } else {
        ("○", Color::Blue)
    };

    let text_style = if task.completed {
        bg_style.fg(Color::Gray).add_modifier(Modifier::CROSSED_OUT)
    } else {
        bg_style.fg(Color::White)
    };

    let mut spans = vec![
        Span::styled(" ", bg_style),
        Span::styled(marker, bg_style.fg(marker_color)),
        Span::styled(" ", bg_style),
        Span::styled(task.text.as_str(), text_style),
    ];
    if !task.comments.is_empty() {
        spans.push(Span::styled(
            format!("  [{}]", task.comments.len()),
            bg_style.fg(Color::DarkGray),
        ));
    }

    Line::from(spans)
}

fn draw_comments(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let Some(task) = app.selected() else {
        f.render_widget(Paragraph::new("").block(block.title(" Comments ")), area);
        return;
    };

    let lines: Vec<Line> = if task.comments.is_empty() {
        vec![Line::from(Span::styled(
            "No comments",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ))]
    } else {
        task.comments
            .iter()
            .map(|comment| {
                Line::from(vec![
                    Span::styled(
                        comment.author_name.as_str(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(" "),
                    Span::styled(
                        comment.created_at.format("%Y-%m-%d").to_string(),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw("  "),
                    Span::raw(comment.content.as_str()),
                ])
            })
            .collect()
    };

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(block.title(format!(" Comments: {} ", task.text)));
    f.render_widget(widget, area);
}

fn draw_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let (mode, mode_color, hints) = if app.kanban.dragging().is_some() {
        ("MOVE", Color::Magenta, "h/l: pick column | Enter/m: drop | Esc: cancel")
    } else if app.board_input.is_some() {
        ("INSERT", Color::Green, "Enter: save | Esc: cancel")
    } else {
        (
            "NORMAL",
            Color::Blue,
            "n: new | c: comment | x: toggle | m: move | g: goals | L: logout | q: quit",
        )
    };

    let status = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {} ", mode),
            Style::default().bg(mode_color).fg(Color::White),
        ),
        Span::raw(" "),
        Span::styled(hints, Style::default().fg(Color::DarkGray)),
    ]));

    f.render_widget(status, area);
}

fn draw_input_popup(f: &mut Frame, app: &App, input: BoardInput) {
    let area = centered_rect(60, 20, f.area());
    f.render_widget(Clear, area);

    let title = match input {
        BoardInput::NewTask => " New Task ".to_string(),
        BoardInput::Comment(id) => {
            let text = app.kanban.task(id).map(|t| t.text.as_str()).unwrap_or("");
            format!(" Comment on: {} ", text)
        }
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    f.render_widget(Paragraph::new(app.input.as_str()).block(block), area);
    f.set_cursor_position((cursor_x(inner.x, &app.input), inner.y));
}

fn draw_goals(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    draw_header(f, chunks[0], app);

    let hints = match app.step {
        AppStep::Welcome => {
            let welcome = Paragraph::new(format!("Welcome, {}!", app.user_name()))
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title(" Goals "));
            f.render_widget(welcome, chunks[1]);
            "Esc: back"
        }
        AppStep::Goals => {
            draw_goal_form(f, chunks[1], app);
            "Tab/↑↓: field | Enter: save | Esc: cancel"
        }
        AppStep::Dashboard => {
            let items: Vec<ListItem> = app
                .goals
                .iter()
                .enumerate()
                .map(|(i, goal)| {
                    let style = if i == app.selected_goal {
                        Style::default().bg(Color::DarkGray).fg(Color::White)
                    } else {
                        Style::default()
                    };
                    let status = goal.status.as_deref().unwrap_or("active");
                    let mut spans = vec![
                        Span::raw("  "),
                        Span::styled(goal.title.as_str(), style),
                        Span::raw("  "),
                        Span::styled(format!("[{}]", status), Style::default().fg(Color::Green)),
                    ];
                    if let Some(date) = goal.target_date {
                        spans.push(Span::styled(
                            format!("  due {}", date.format("%Y-%m-%d")),
                            Style::default().fg(Color::DarkGray),
                        ));
                    }
                    ListItem::new(Line::from(spans))
                })
                .collect();

            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(chunks[1]);

            let list = List::new(items).block(
                Block::default()
                    .title(format!(" Goals ({}) ", app.goals.len()))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            );
            f.render_widget(list, body[0]);
            draw_goal_details(f, body[1], app.goals.get(app.selected_goal));
            "n: new goal | d: mark done | j/k: select | Esc: board | q: quit"
        }
    };

    let status = Paragraph::new(Line::from(vec![
        Span::styled(" GOALS ", Style::default().bg(Color::Green).fg(Color::White)),
        Span::raw(" "),
        Span::styled(hints, Style::default().fg(Color::DarkGray)),
    ]));
    f.render_widget(status, chunks[2]);
}

fn draw_goal_form(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" New Goal ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(inner);

    for (i, field) in GoalField::ALL.iter().enumerate() {
        let style = if app.goal_field == *field {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };
        let block = Block::default()
            .title(field.label())
            .borders(Borders::ALL)
            .border_style(style);
        f.render_widget(
            Paragraph::new(app.goal_form.field(*field)).block(block),
            rows[i],
        );
    }

    let idx = app.goal_field as usize;
    f.set_cursor_position((
        cursor_x(rows[idx].x + 1, app.goal_form.field(app.goal_field)),
        rows[idx].y + 1,
    ));
}

fn draw_goal_details(f: &mut Frame, area: Rect, goal: Option<&Goal>) {
    let block = Block::default()
        .title(" Details ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let Some(goal) = goal else {
        f.render_widget(block, area);
        return;
    };

    let label = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::from(Span::styled(
            goal.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    let sections = [
        ("Description", goal.description.as_deref()),
        ("Strengths", goal.strengths.as_deref()),
        ("Weaknesses", goal.weaknesses.as_deref()),
    ];
    for (title, text) in sections {
        if let Some(text) = text {
            lines.push(Line::from(Span::styled(title, label)));
            lines.push(Line::from(text));
            lines.push(Line::from(""));
        }
    }
    if let Some(date) = goal.target_date {
        lines.push(Line::from(vec![
            Span::styled("Target date: ", label),
            Span::raw(date.format("%Y-%m-%d").to_string()),
        ]));
    }

    let details = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(block);
    f.render_widget(details, area);
}

/// Column just past `text` when it starts at `x`, in terminal cells.
fn cursor_x(x: u16, text: &str) -> u16 {
    let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
    x.saturating_add(width)
}

fn draw_loading_overlay(f: &mut Frame, message: &str) {
    let area = centered_rect(40, 10, f.area());

    f.render_widget(Clear, area);

    let text = Paragraph::new(message)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(text, area);
}

fn draw_message_popup(f: &mut Frame, title: &str, message: &str, color: Color) {
    let area = centered_rect(60, 20, f.area());

    f.render_widget(Clear, area);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));

    let text = Paragraph::new(message)
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: true })
        .block(block);

    f.render_widget(text, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_counts_wide_characters_twice() {
        assert_eq!(cursor_x(2, "abc"), 5);
        assert_eq!(cursor_x(2, "田中太郎"), 10);
        assert_eq!(cursor_x(0, "佐藤 a"), 6);
    }

    #[test]
    fn cursor_never_overflows() {
        assert_eq!(cursor_x(u16::MAX - 1, "田中"), u16::MAX);
    }
}
