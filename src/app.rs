use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::ai::Summarizer;
use crate::config::Config;
use crate::db::{HistoryStore, KeyValueStore, Session, SqliteStore};
use crate::error::{Result, SummaryError};
use crate::models::{SummaryFormat, SummaryResult};
use crate::services::{export, Clipboard, NoembedResolver, SystemClipboard};
use crate::tui::AppAction;
use crate::workflow::{SummaryPipeline, SummaryWorkflow, WorkflowState};

const SPINNER_FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

type SummaryTask = JoinHandle<std::result::Result<SummaryResult, SummaryError>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Summary,
    History,
    Detail(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Url,
    Search,
    Login,
    ConfirmDelete(String),
}

pub struct App {
    // UI State
    pub view: View,
    pub input_mode: InputMode,
    pub url_input: String,
    pub search_input: String,
    pub login_input: String,
    pub format: SummaryFormat,
    pub selected_index: usize,
    pub show_help: bool,
    pub status_message: Option<String>,
    spinner_frame: usize,

    // Async state
    in_flight: Option<SummaryTask>,
    history_rx: watch::Receiver<Vec<SummaryResult>>,

    // Services
    pub session: Session,
    pub history: Arc<HistoryStore>,
    pub workflow: SummaryWorkflow,
    export_dir: PathBuf,
    clipboard: Box<dyn Clipboard>,
}

impl App {
    pub async fn new(config: &Config) -> Result<Self> {
        let storage: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::new(&config.db_path).await?);
        let session = Session::load(Arc::clone(&storage)).await;
        let history = Arc::new(HistoryStore::load(storage).await);

        let resolver = Arc::new(NoembedResolver::new(config.metadata_endpoint.clone())?);
        let summarizer = Arc::new(Summarizer::new(
            config.gemini_api_key.clone(),
            config.model.clone(),
        )?);
        if config.gemini_api_key.is_none() {
            tracing::warn!("No Gemini API key configured; summaries will fail");
        } else {
            tracing::info!("Summaries will use {}", summarizer.model_version());
        }

        let pipeline = SummaryPipeline::new(resolver, summarizer, Arc::clone(&history));

        Ok(Self::with_parts(
            session,
            history,
            SummaryWorkflow::new(pipeline),
            config.default_format,
            PathBuf::from(&config.export_dir),
        ))
    }

    fn with_parts(
        session: Session,
        history: Arc<HistoryStore>,
        workflow: SummaryWorkflow,
        format: SummaryFormat,
        export_dir: PathBuf,
    ) -> Self {
        let input_mode = if session.is_logged_in() {
            InputMode::Normal
        } else {
            InputMode::Login
        };
        let history_rx = history.subscribe();

        Self {
            view: View::Summary,
            input_mode,
            url_input: String::new(),
            search_input: String::new(),
            login_input: String::new(),
            format,
            selected_index: 0,
            show_help: false,
            status_message: None,
            spinner_frame: 0,
            in_flight: None,
            history_rx,
            session,
            history,
            workflow,
            export_dir,
            clipboard: Box::new(SystemClipboard),
        }
    }

    pub fn input_active(&self) -> bool {
        matches!(
            self.input_mode,
            InputMode::Url | InputMode::Search | InputMode::Login
        )
    }

    pub fn confirm_active(&self) -> bool {
        matches!(self.input_mode, InputMode::ConfirmDelete(_))
    }

    /// History entries matching the current search, newest first.
    pub fn visible_history(&self) -> Vec<SummaryResult> {
        self.history.search(&self.search_input)
    }

    /// The result the current view is showing, if any.
    pub fn current_result(&self) -> Option<SummaryResult> {
        match &self.view {
            View::Summary => match self.workflow.state() {
                WorkflowState::Success(result) => Some(result.clone()),
                _ => None,
            },
            View::History => self.visible_history().get(self.selected_index).cloned(),
            View::Detail(id) => self.history.get(id),
        }
    }

    pub fn tick_spinner(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
    }

    pub fn spinner(&self) -> char {
        SPINNER_FRAMES[self.spinner_frame]
    }

    pub async fn handle_action(&mut self, action: AppAction) -> Result<bool> {
        match action {
            AppAction::Quit => return Ok(true),

            AppAction::ShowHelp => self.show_help = true,
            AppAction::HideHelp => self.show_help = false,

            AppAction::SwitchView => {
                self.view = match self.view {
                    View::Summary => View::History,
                    View::History | View::Detail(_) => View::Summary,
                };
                self.selected_index = 0;
            }

            AppAction::Back => match self.view {
                View::Detail(_) => self.view = View::History,
                View::History if !self.search_input.is_empty() => {
                    self.search_input.clear();
                    self.selected_index = 0;
                }
                _ => {}
            },

            AppAction::MoveUp => {
                if self.view == View::History && self.selected_index > 0 {
                    self.selected_index -= 1;
                }
            }

            AppAction::MoveDown => {
                let len = self.visible_history().len();
                if self.view == View::History && len > 0 && self.selected_index < len - 1 {
                    self.selected_index += 1;
                }
            }

            AppAction::Select => match self.view {
                View::Summary => self.submit(),
                View::History => {
                    if let Some(result) = self.current_result() {
                        self.view = View::Detail(result.id);
                    }
                }
                View::Detail(_) => {}
            },

            AppAction::EditUrl => {
                self.view = View::Summary;
                self.input_mode = InputMode::Url;
            }

            AppAction::CycleFormat => {
                self.format = self.format.cycle();
            }

            AppAction::StartSearch => {
                if self.view == View::History {
                    self.input_mode = InputMode::Search;
                }
            }

            AppAction::Delete => {
                if matches!(self.view, View::History | View::Detail(_)) {
                    if let Some(result) = self.current_result() {
                        self.input_mode = InputMode::ConfirmDelete(result.id);
                    }
                }
            }

            AppAction::ConfirmYes => {
                if let InputMode::ConfirmDelete(id) = &self.input_mode {
                    let id = id.clone();
                    self.history.delete(&id).await;
                    if self.view == View::Detail(id) {
                        self.view = View::History;
                    }
                    self.status_message = Some("Summary deleted".to_string());
                }
                self.input_mode = InputMode::Normal;
            }

            AppAction::ConfirmNo => {
                self.input_mode = InputMode::Normal;
            }

            AppAction::OpenInBrowser => {
                if let Some(result) = self.current_result() {
                    let _ = open::that(&result.video_url);
                }
            }

            AppAction::ExportText => self.export(export::write_text),
            AppAction::ExportPdf => self.export(export::write_pdf),
            AppAction::CopySummary => self.copy_summary(),

            AppAction::Logout => {
                self.session.logout().await?;
                self.workflow.reset();
                self.status_message = None;
                self.view = View::Summary;
                self.input_mode = InputMode::Login;
            }

            AppAction::InputChar(c) => {
                if let Some(buffer) = self.input_buffer() {
                    buffer.push(c);
                }
                if self.input_mode == InputMode::Search {
                    self.selected_index = 0;
                }
            }

            AppAction::InputBackspace => {
                if let Some(buffer) = self.input_buffer() {
                    buffer.pop();
                }
            }

            AppAction::InputConfirm => match self.input_mode {
                InputMode::Url => {
                    self.input_mode = InputMode::Normal;
                    self.submit();
                }
                InputMode::Search => self.input_mode = InputMode::Normal,
                InputMode::Login => self.login().await,
                _ => {}
            },

            AppAction::InputCancel => match self.input_mode {
                InputMode::Search => {
                    self.search_input.clear();
                    self.selected_index = 0;
                    self.input_mode = InputMode::Normal;
                }
                InputMode::Login => self.login_input.clear(),
                _ => self.input_mode = InputMode::Normal,
            },
        }

        Ok(false)
    }

    fn input_buffer(&mut self) -> Option<&mut String> {
        match self.input_mode {
            InputMode::Url => Some(&mut self.url_input),
            InputMode::Search => Some(&mut self.search_input),
            InputMode::Login => Some(&mut self.login_input),
            _ => None,
        }
    }

    async fn login(&mut self) {
        match self.session.login(&self.login_input).await {
            Ok(user) => {
                self.status_message = Some(format!("Welcome, {}", user.name));
                self.login_input.clear();
                self.input_mode = InputMode::Normal;
            }
            Err(e) => {
                self.status_message = Some(e.to_string());
            }
        }
    }

    /// Start a submission for the current URL and format.
    ///
    /// A previous submission still in flight keeps running and will land in
    /// history, but only the newest one is shown.
    fn submit(&mut self) {
        if !self.session.is_logged_in() {
            self.input_mode = InputMode::Login;
            return;
        }

        let url = self.url_input.clone();
        self.status_message = None;
        if let Some(previous) = self.in_flight.take() {
            if !previous.is_finished() {
                tracing::debug!("Superseding an unfinished summary request");
            }
        }
        self.in_flight = self.workflow.spawn(&url, self.format);
    }

    /// Poll for a finished submission (non-blocking).
    pub async fn poll_summary_result(&mut self) {
        let finished = self
            .in_flight
            .as_ref()
            .is_some_and(|handle| handle.is_finished());
        if !finished {
            return;
        }

        if let Some(handle) = self.in_flight.take() {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("Summary task failed: {}", e);
                    Err(SummaryError::UnexpectedError)
                }
            };
            self.workflow.complete(outcome);
        }
    }

    /// Keep the selection inside the list after history changes.
    pub fn poll_history(&mut self) {
        if !self.history_rx.has_changed().unwrap_or(false) {
            return;
        }
        self.history_rx.borrow_and_update();

        let len = self.visible_history().len();
        if len == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= len {
            self.selected_index = len - 1;
        }
    }

    fn copy_summary(&mut self) {
        let Some(result) = self.current_result() else {
            return;
        };

        self.status_message = Some(match self.clipboard.set_text(&result.summary) {
            Ok(()) => "Copied".to_string(),
            Err(e) => {
                tracing::error!("Failed to copy summary: {}", e);
                format!("Copy failed: {e}")
            }
        });
    }

    fn export(&mut self, write: fn(&std::path::Path, &SummaryResult) -> Result<PathBuf>) {
        let Some(result) = self.current_result() else {
            return;
        };

        self.status_message = Some(match write(&self.export_dir, &result) {
            Ok(path) => format!("Saved {}", path.display()),
            Err(e) => {
                tracing::error!("Failed to export summary: {}", e);
                format!("Export failed: {e}")
            }
        });
    }
}
