use std::time::Instant;

use crate::backend::{BackendError, Submission};
use crate::explain::AssessmentResult;
use crate::record::{AccountId, ApplicantRecord, CANONICAL_FIELDS};
use crate::tui::theme::ThemeColors;

/// Seconds a flash message stays in the status bar
const FLASH_SECS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View {
    Record,
    Assessment,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    EditField,
    AccountInput,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlashKind {
    Success,
    Error,
    Info,
}

/// Background request kinds; at most one of each runs at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TaskKind {
    Submit,
    Assess,
}

impl TaskKind {
    pub fn label(&self) -> &'static str {
        match self {
            TaskKind::Submit => "submit",
            TaskKind::Assess => "assess",
        }
    }
}

/// Work the event loop must start on the app's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Submit(ApplicantRecord),
    Assess(AccountId),
}

/// The applicant form. Owned by the Record tab only.
pub struct RecordForm {
    pub record: ApplicantRecord,
    pub table_state: ratatui::widgets::TableState,
    /// Account number from the most recent successful submission
    pub last_account: Option<AccountId>,
}

/// The assessment viewer. Owned by the Assessment tab only.
pub struct AssessmentPanel {
    pub account_input: String,
    pub account: Option<AccountId>,
    pub result: Option<AssessmentResult>,
}

pub struct App {
    pub form: RecordForm,
    pub assessment: AssessmentPanel,
    pub current_view: View,
    pub input_mode: InputMode,
    pub edit_buffer: String,
    pub flash_message: Option<(String, FlashKind, Instant)>,
    pub submit_pending: bool,
    pub assess_pending: bool,
    pub should_quit: bool,
    pub spinner_frame: usize,
    pub theme: ThemeColors,
    pub backend_label: String,
}

impl App {
    pub fn new(record: ApplicantRecord, theme: ThemeColors, backend_label: String) -> Self {
        let mut table_state = ratatui::widgets::TableState::default();
        table_state.select(Some(0));

        Self {
            form: RecordForm {
                record,
                table_state,
                last_account: None,
            },
            assessment: AssessmentPanel {
                account_input: String::new(),
                account: None,
                result: None,
            },
            current_view: View::Record,
            input_mode: InputMode::Normal,
            edit_buffer: String::new(),
            flash_message: None,
            submit_pending: false,
            assess_pending: false,
            should_quit: false,
            spinner_frame: 0,
            theme,
            backend_label,
        }
    }

    pub fn next_row(&mut self) {
        let len = self.form.record.len();
        if len == 0 {
            return;
        }
        let i = match self.form.table_state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.form.table_state.select(Some(i));
    }

    pub fn previous_row(&mut self) {
        let len = self.form.record.len();
        if len == 0 {
            return;
        }
        let i = match self.form.table_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.form.table_state.select(Some(i));
    }

    pub fn selected_field(&self) -> Option<&'static str> {
        self.form
            .table_state
            .selected()
            .and_then(|i| CANONICAL_FIELDS.get(i))
            .map(|spec| spec.name)
    }

    pub fn toggle_view(&mut self) {
        self.current_view = match self.current_view {
            View::Record => View::Assessment,
            View::Assessment => View::Record,
        };
    }

    /// Open the edit popup pre-filled with the selected field's value
    pub fn start_edit(&mut self) {
        if let Some((_, value)) = self
            .form
            .table_state
            .selected()
            .and_then(|i| self.form.record.get_at(i))
        {
            self.edit_buffer = value.to_string();
            self.input_mode = InputMode::EditField;
        }
    }

    /// Apply the edit buffer to the selected field only
    pub fn confirm_edit(&mut self) {
        let selected = self.form.table_state.selected();
        let name = self.selected_field();
        let buffer = std::mem::take(&mut self.edit_buffer);
        self.input_mode = InputMode::Normal;

        if let (Some(index), Some(name)) = (selected, name) {
            if let Some(value) = self.form.record.set_at(index, &buffer) {
                let kind = if value.is_numeric() { "number" } else { "text" };
                let msg = format!("Set {} = {} ({})", name, value, kind);
                self.show_flash(msg, FlashKind::Info);
            }
        }
    }

    pub fn cancel_edit(&mut self) {
        self.edit_buffer.clear();
        self.input_mode = InputMode::Normal;
    }

    /// Returns the record to send, or None when a submission is already in flight.
    pub fn request_submit(&mut self) -> Option<Action> {
        if self.submit_pending {
            self.show_flash("Submission already in progress".to_string(), FlashKind::Error);
            return None;
        }
        self.submit_pending = true;
        Some(Action::Submit(self.form.record.clone()))
    }

    /// Apply a finished submission. On failure the form is left as it was.
    pub fn finish_submit(&mut self, result: Result<Submission, BackendError>) {
        self.submit_pending = false;
        match result {
            Ok(submission) => {
                self.form.last_account = Some(submission.account);
                self.assessment.account_input = submission.account.to_string();
                self.show_flash(
                    format!("Record inserted (account {})", submission.account),
                    FlashKind::Success,
                );
            }
            Err(e) => self.show_flash(format!("Failed to insert: {}", e), FlashKind::Error),
        }
    }

    pub fn start_account_input(&mut self) {
        self.input_mode = InputMode::AccountInput;
    }

    pub fn cancel_account_input(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Parse the account prompt. Invalid input never reaches the backend.
    pub fn confirm_account_input(&mut self) -> Option<Action> {
        self.input_mode = InputMode::Normal;

        let account = match self.assessment.account_input.parse::<AccountId>() {
            Ok(account) => account,
            Err(e) => {
                self.show_flash(format!("Error: {}", e), FlashKind::Error);
                return None;
            }
        };

        if self.assess_pending {
            self.show_flash("Assessment already in progress".to_string(), FlashKind::Error);
            return None;
        }

        self.assess_pending = true;
        // The old result belongs to the old account
        self.assessment.result = None;
        self.assessment.account = Some(account);
        Some(Action::Assess(account))
    }

    /// Replace the shown result wholesale, or clear it on failure.
    pub fn finish_assess(&mut self, account: AccountId, result: Result<AssessmentResult, BackendError>) {
        self.assess_pending = false;
        self.assessment.account = Some(account);
        match result {
            Ok(result) => {
                let msg = format!("Assessment loaded for account {}", account);
                self.assessment.result = Some(result);
                self.show_flash(msg, FlashKind::Success);
            }
            Err(e) => {
                self.assessment.result = None;
                self.show_flash(format!("Error: {}", e), FlashKind::Error);
            }
        }
    }

    /// A background task died before reporting; release its trigger.
    pub fn abort_pending(&mut self, task: TaskKind, reason: String) {
        match task {
            TaskKind::Submit => self.submit_pending = false,
            TaskKind::Assess => self.assess_pending = false,
        }
        self.show_flash(
            format!("Failed: {} task crashed: {}", task.label(), reason),
            FlashKind::Error,
        );
    }

    pub fn is_busy(&self) -> bool {
        self.submit_pending || self.assess_pending
    }

    pub fn update_flash(&mut self) {
        if let Some((_, _, timestamp)) = self.flash_message {
            if timestamp.elapsed().as_secs() >= FLASH_SECS {
                self.flash_message = None;
            }
        }
    }

    pub fn show_flash(&mut self, msg: String, kind: FlashKind) {
        self.flash_message = Some((msg, kind, Instant::now()));
    }

    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    pub fn dismiss_help(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Advance the loading spinner animation frame
    pub fn advance_spinner(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
    }
}
