use ratatui::prelude::*;
use ratatui::widgets::{Block, Cell, Clear, Paragraph, Row, Table, Tabs};

use crate::explain::{AssessmentResult, RankedContribution};
use crate::output::{bar_cells, format_score, format_value, truncate_label};
use crate::tui::app::{App, FlashKind, InputMode, View};
use crate::tui::theme::ThemeColors;

/// Width of the feature name column in the contribution chart
const LABEL_WIDTH: usize = 24;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    if area.height < 8 || area.width < 40 {
        let msg = Paragraph::new("Terminal too small").alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    // Layout: Title(1) + Tabs(1) + Body(fill) + Status(1)
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(area);

    render_title(frame, chunks[0], app);
    render_tabs(frame, chunks[1], app);
    match app.current_view {
        View::Record => render_record(frame, chunks[2], app),
        View::Assessment => render_assessment(frame, chunks[2], app),
    }
    render_status_bar(frame, chunks[3], app);

    match app.input_mode {
        InputMode::EditField => render_edit_popup(frame, app),
        InputMode::AccountInput => render_account_popup(frame, app),
        InputMode::Help => render_help_popup(frame, &app.theme),
        InputMode::Normal => {}
    }

    if app.is_busy() {
        render_loading_overlay(frame, app);
    }
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let title = "Risk Lens";
    let left_len = title.len();
    let right_len = app.backend_label.chars().count();
    let padding_len = (area.width as usize).saturating_sub(left_len + right_len);

    let line = Line::from(vec![
        Span::styled(title, Style::default().fg(app.theme.title_color).bold()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(app.backend_label.clone(), Style::default().fg(app.theme.muted)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let selected = match app.current_view {
        View::Record => 0,
        View::Assessment => 1,
    };

    let tabs = Tabs::new(vec!["Record", "Assessment"])
        .select(selected)
        .style(app.theme.tab_inactive_style)
        .highlight_style(app.theme.tab_active_style.reversed())
        .divider(" | ");

    frame.render_widget(tabs, area);
}

fn render_record(frame: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).split(area);
    let theme = &app.theme;

    let rows: Vec<Row> = app
        .form
        .record
        .iter()
        .enumerate()
        .map(|(idx, (spec, value))| {
            let row_style = if idx % 2 == 1 {
                Style::default().bg(theme.row_alt_bg)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(format!("{}.", idx + 1)).style(Style::default().fg(theme.index_color)),
                Cell::from(spec.name),
                Cell::from(value.to_string()),
                Cell::from(spec.kind.label()).style(Style::default().fg(theme.kind_color)),
            ])
            .style(row_style)
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Length(22),
        Constraint::Fill(1),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["#", "Field", "Value", "Kind"])
                .style(theme.header_style)
                .bottom_margin(1),
        )
        .row_highlight_style(theme.row_selected);

    let footer = match app.form.last_account {
        Some(account) => Line::from(vec![
            Span::styled("Last account number: ", Style::default().fg(theme.muted)),
            Span::styled(account.to_string(), Style::default().fg(theme.flash_success).bold()),
        ]),
        None => Line::from(Span::styled(
            "No record submitted yet",
            Style::default().fg(theme.muted),
        )),
    };
    frame.render_widget(Paragraph::new(footer), chunks[1]);

    frame.render_stateful_widget(table, chunks[0], &mut app.form.table_state);
}

fn render_assessment(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;

    let Some(result) = &app.assessment.result else {
        let text = if app.assess_pending {
            "Assessing..."
        } else {
            "No assessment loaded. Press a to assess an account."
        };
        let msg = Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.muted));
        frame.render_widget(msg, area);
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(1), // Account
        Constraint::Length(1), // Decision
        Constraint::Length(1),
        Constraint::Length(1), // Chart heading
        Constraint::Fill(1),
    ])
    .split(area);

    let account = app
        .assessment
        .account
        .map(|a| a.to_string())
        .unwrap_or_else(|| "?".to_string());
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Account: ", Style::default().fg(theme.muted)),
            Span::raw(account),
        ])),
        chunks[0],
    );

    let decision_color = if result.decision.is_approved() {
        theme.approved
    } else {
        theme.rejected
    };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Prediction: ", Style::default().fg(theme.muted)),
            Span::styled(result.decision.label(), Style::default().fg(decision_color).bold()),
        ])),
        chunks[1],
    );

    frame.render_widget(
        Paragraph::new(Span::styled("Top Feature Impacts", theme.header_style)),
        chunks[3],
    );

    let lines = contribution_lines(result, theme, chunks[4].width as usize);
    frame.render_widget(Paragraph::new(lines), chunks[4]);
}

/// Chart lines for the displayed contributions, bars sized to `width`.
fn contribution_lines(result: &AssessmentResult, theme: &ThemeColors, width: usize) -> Vec<Line<'static>> {
    let explanation = result.explain();
    if explanation.is_empty() {
        return vec![Line::from(Span::styled(
            "No feature contributions returned.",
            Style::default().fg(theme.muted),
        ))];
    }

    // rank(4) + label + gaps(4) + axis(1) + score(9) + value(10)
    let fixed = 4 + LABEL_WIDTH + 4 + 1 + 9 + 10;
    let half_width = (width.saturating_sub(fixed) / 2).clamp(4, 30);
    let max = explanation.max_magnitude();

    let mut lines: Vec<Line> = explanation
        .displayed()
        .iter()
        .enumerate()
        .map(|(idx, c)| contribution_line(idx, c, max, half_width, theme))
        .collect();

    let hidden = explanation.hidden_count();
    if hidden > 0 {
        lines.push(Line::from(Span::styled(
            format!("(+{} more not shown)", hidden),
            Style::default().fg(theme.muted),
        )));
    }
    lines
}

fn contribution_line(
    idx: usize,
    contribution: &RankedContribution,
    max: f64,
    half_width: usize,
    theme: &ThemeColors,
) -> Line<'static> {
    let filled = bar_cells(contribution.score, max, half_width);
    let bar = "█".repeat(filled);
    let pad = " ".repeat(half_width - filled);
    let bar_style = Style::default().fg(theme.bar_color(contribution.score));

    let (left, right) = if contribution.score < 0.0 {
        (
            vec![Span::raw(pad), Span::styled(bar, bar_style)],
            vec![Span::raw(" ".repeat(half_width))],
        )
    } else {
        (
            vec![Span::raw(" ".repeat(half_width))],
            vec![Span::styled(bar, bar_style), Span::raw(pad)],
        )
    };

    let value = contribution
        .value
        .as_ref()
        .map(format_value)
        .unwrap_or_default();

    let mut spans = vec![
        Span::styled(format!("{:>3}.", idx + 1), Style::default().fg(theme.index_color)),
        Span::raw(format!(
            " {:<width$}  ",
            truncate_label(&contribution.feature, LABEL_WIDTH),
            width = LABEL_WIDTH
        )),
    ];
    spans.extend(left);
    spans.push(Span::styled("│", Style::default().fg(theme.bar_axis)));
    spans.extend(right);
    spans.push(Span::styled(
        format!("  {:>9}", format_score(contribution.score)),
        bar_style,
    ));
    spans.push(Span::styled(format!("  {}", value), Style::default().fg(theme.muted)));
    Line::from(spans)
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let text = if let Some((ref msg, kind, _)) = app.flash_message {
        let msg_color = match kind {
            FlashKind::Success => theme.flash_success,
            FlashKind::Error => theme.flash_error,
            FlashKind::Info => theme.flash_info,
        };
        Line::from(Span::styled(msg.clone(), Style::default().fg(msg_color)))
    } else {
        let hints: &[(&str, &str)] = match app.current_view {
            View::Record => &[
                ("j/k", ":nav "),
                ("Enter", ":edit "),
                ("s", ":submit "),
                ("Tab", ":assessment "),
                ("?", ":help "),
                ("q", ":quit"),
            ],
            View::Assessment => &[
                ("a", ":assess "),
                ("Tab", ":record "),
                ("?", ":help "),
                ("q", ":quit"),
            ],
        };

        let mut spans = Vec::new();
        for (i, (key, label)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(*key, Style::default().fg(theme.status_key_color)));
            spans.push(Span::raw(*label));
        }
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(theme.status_bar_bg)),
        area,
    );
}

/// Single-line text prompt with a cursor and a hint row
fn render_input_popup(frame: &mut Frame, theme: &ThemeColors, title: String, input: &str, hint: &str) {
    let popup_area = centered_rect_fixed(50, 4, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(Span::styled(title, theme.popup_title))
        .border_style(Style::default().fg(theme.popup_border))
        .style(Style::default().bg(theme.popup_bg));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(inner);
    frame.render_widget(Paragraph::new(format!("{}|", input)), chunks[0]);
    frame.render_widget(
        Paragraph::new(hint).style(Style::default().fg(theme.muted)),
        chunks[1],
    );
}

fn render_edit_popup(frame: &mut Frame, app: &App) {
    let field = app.selected_field().unwrap_or("field");
    render_input_popup(
        frame,
        &app.theme,
        format!(" Edit {} ", field),
        &app.edit_buffer,
        "Enter: set | Esc: cancel",
    );
}

fn render_account_popup(frame: &mut Frame, app: &App) {
    render_input_popup(
        frame,
        &app.theme,
        " Assess Account ".to_string(),
        &app.assessment.account_input,
        "Enter: assess | Esc: cancel",
    );
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect { x, y, width, height }
}

fn render_help_popup(frame: &mut Frame, theme: &ThemeColors) {
    let popup_area = centered_rect_fixed(50, 14, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(Span::styled(" Keyboard Shortcuts ", theme.popup_title))
        .border_style(Style::default().fg(theme.popup_border));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key_style = Style::default().fg(theme.status_key_color).bold();
    let entries = [
        ("j / Down      ", "Next field"),
        ("k / Up        ", "Previous field"),
        ("Enter / e     ", "Edit field (Record tab)"),
        ("s             ", "Submit record"),
        ("a             ", "Assess an account"),
        ("Tab           ", "Toggle Record/Assessment"),
        ("?             ", "Show/hide this help"),
        ("q / Ctrl-c    ", "Quit"),
    ];

    let mut help_lines: Vec<Line> = entries
        .iter()
        .map(|(key, desc)| Line::from(vec![Span::styled(*key, key_style), Span::raw(*desc)]))
        .collect();
    help_lines.push(Line::from(""));
    help_lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(theme.muted),
    )));

    frame.render_widget(Paragraph::new(help_lines), inner);
}

fn render_loading_overlay(frame: &mut Frame, app: &App) {
    let popup_area = centered_rect_fixed(30, 3, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered();
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let spinner_chars = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    let spinner = spinner_chars[app.spinner_frame % spinner_chars.len()];

    let text = if app.submit_pending {
        format!("{} Submitting...", spinner)
    } else {
        format!("{} Assessing...", spinner)
    };

    frame.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(app.theme.title_color)),
        inner,
    );
}
