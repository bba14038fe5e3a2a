pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::App;
pub use theme::{resolve_theme, ThemeColors};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::task::JoinHandle;

use crate::backend::{self, BackendClient, BackendError, Submission};
use crate::explain::AssessmentResult;
use crate::record::AccountId;
use app::{Action, InputMode, TaskKind, View};
use event::{Event, EventHandler};

type SubmitTask = JoinHandle<Result<Submission, BackendError>>;
type AssessTask = (AccountId, JoinHandle<Result<AssessmentResult, BackendError>>);

pub async fn run_tui(mut app: App, client: BackendClient) -> anyhow::Result<()> {
    // Buffer log output while the TUI owns the terminal
    crate::stderr_buffer::activate();

    // Sets up panic hooks that restore the terminal
    let mut terminal = ratatui::init();
    let mut events = EventHandler::new(250);

    let mut pending_submit: Option<SubmitTask> = None;
    let mut pending_assess: Option<AssessTask> = None;

    let result = loop {
        if let Err(e) = terminal.draw(|frame| ui::draw(frame, &mut app)) {
            break Err(e.into());
        }

        let Some(event) = events.next().await else {
            break Err(anyhow::anyhow!("terminal input stream closed"));
        };

        match event {
            Event::Key(key) => match handle_key_event(&mut app, key) {
                Some(Action::Submit(record)) => {
                    let client = client.clone();
                    pending_submit = Some(tokio::spawn(async move {
                        backend::submit_record(&client, &record).await
                    }));
                }
                Some(Action::Assess(account)) => {
                    let client = client.clone();
                    pending_assess = Some((
                        account,
                        tokio::spawn(async move { backend::assess(&client, account).await }),
                    ));
                }
                None => {}
            },
            Event::Tick => {
                app.update_flash();
                app.advance_spinner();
            }
        }

        if pending_submit.as_ref().is_some_and(|h| h.is_finished()) {
            if let Some(handle) = pending_submit.take() {
                match handle.await {
                    Ok(outcome) => app.finish_submit(outcome),
                    Err(e) => app.abort_pending(TaskKind::Submit, e.to_string()),
                }
            }
        }

        if pending_assess.as_ref().is_some_and(|(_, h)| h.is_finished()) {
            if let Some((account, handle)) = pending_assess.take() {
                match handle.await {
                    Ok(outcome) => app.finish_assess(account, outcome),
                    Err(e) => app.abort_pending(TaskKind::Assess, e.to_string()),
                }
            }
        }

        if app.should_quit {
            break Ok(());
        }
    };

    ratatui::restore();

    // Flush buffered log lines now that the terminal is restored
    for msg in crate::stderr_buffer::drain() {
        eprintln!("{}", msg);
    }

    result
}

fn handle_key_event(app: &mut App, key: KeyEvent) -> Option<Action> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return None;
    }

    match app.input_mode {
        InputMode::Normal => match key.code {
            KeyCode::Char('q') => app.should_quit = true,

            KeyCode::Tab => app.toggle_view(),
            KeyCode::Char('?') => app.show_help(),

            KeyCode::Char('s') => return app.request_submit(),
            KeyCode::Char('a') => app.start_account_input(),

            KeyCode::Char('j') | KeyCode::Down if app.current_view == View::Record => app.next_row(),
            KeyCode::Char('k') | KeyCode::Up if app.current_view == View::Record => {
                app.previous_row()
            }
            KeyCode::Enter | KeyCode::Char('e') => match app.current_view {
                View::Record => app.start_edit(),
                View::Assessment => app.start_account_input(),
            },

            _ => {}
        },
        InputMode::EditField => match key.code {
            KeyCode::Enter => app.confirm_edit(),
            KeyCode::Esc => app.cancel_edit(),
            KeyCode::Backspace => {
                app.edit_buffer.pop();
            }
            KeyCode::Char(c) if !c.is_control() => app.edit_buffer.push(c),
            _ => {}
        },
        InputMode::AccountInput => match key.code {
            KeyCode::Enter => return app.confirm_account_input(),
            KeyCode::Esc => app.cancel_account_input(),
            KeyCode::Backspace => {
                app.assessment.account_input.pop();
            }
            KeyCode::Char(c) if !c.is_control() => app.assessment.account_input.push(c),
            _ => {}
        },
        InputMode::Help => app.dismiss_help(),
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ApplicantRecord;

    fn app() -> App {
        App::new(ApplicantRecord::default(), ThemeColors::dark(), "http://test".to_string())
    }

    fn press(app: &mut App, code: KeyCode) -> Option<Action> {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_edit_field_via_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::EditField);
        press(&mut app, KeyCode::Backspace);
        type_text(&mut app, "1");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.form.record.get("FLAG_OWN_CAR").map(|v| v.to_string()), Some("1".into()));
    }

    #[test]
    fn test_submit_key_yields_action_once() {
        let mut app = app();
        assert!(matches!(press(&mut app, KeyCode::Char('s')), Some(Action::Submit(_))));
        assert!(press(&mut app, KeyCode::Char('s')).is_none());
    }

    #[test]
    fn test_account_prompt_yields_assess() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "1042");
        assert_eq!(press(&mut app, KeyCode::Enter), Some(Action::Assess(AccountId(1042))));
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_quit_keys() {
        let mut ctrl_c = app();
        handle_key_event(&mut ctrl_c, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(ctrl_c.should_quit);

        let mut other = app();
        press(&mut other, KeyCode::Char('q'));
        assert!(other.should_quit);

        // Ctrl-C also quits from inside a prompt
        let mut prompting = app();
        press(&mut prompting, KeyCode::Char('a'));
        handle_key_event(&mut prompting, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(prompting.should_quit);
    }

    #[test]
    fn test_typing_q_in_prompt_does_not_quit() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        assert_eq!(app.assessment.account_input, "q");
    }

    #[test]
    fn test_help_dismissed_by_any_key() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.input_mode, InputMode::Help);
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.input_mode, InputMode::Normal);
    }
}
