use std::collections::HashMap;
use std::time::Instant;
use ratatui::layout::Rect;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use crate::api::{ApiClient, ApiError, ChatReply, ChatRequest, ForwardRequest, InverseRequest};
use crate::chat::{ChatLog, ChatRole};
use crate::form::{FieldId, Fields};
use crate::i18n::Strings;
use crate::request::{Operation, RequestToken, RequestTracker};
use crate::session::Session;
use crate::tabs::{Tab, TabController};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connection {
    Checking,
    Connected,
    Disconnected,
}

/// What a finished request produced
#[derive(Debug)]
pub enum Reply {
    Health,
    Chat(ChatReply),
    Json(Value),
}

/// Sent back to the UI loop by a request task
#[derive(Debug)]
pub struct Completion {
    pub token: RequestToken,
    pub result: Result<Reply, ApiError>,
}

/// Contents of the forward/inverse result area
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Empty,
    Loading,
    Ready(String),
    Failed,
    Cancelled,
}

impl Output {
    pub fn display(&self, strings: &Strings, frame: u8) -> String {
        match self {
            Output::Empty => strings.output_empty.to_string(),
            Output::Loading => spinner(strings, frame),
            Output::Ready(text) => text.clone(),
            Output::Failed => format!("❌ {}", strings.api_error),
            Output::Cancelled => strings.cancelled.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct ResultPane {
    pub output: Output,
    pub scroll: u16,
}

impl ResultPane {
    fn new() -> Self {
        Self { output: Output::Empty, scroll: 0 }
    }

    fn set(&mut self, output: Output) {
        self.output = output;
        self.scroll = 0;
    }
}

/// Loading indicator: hourglass glyph plus the localized loading text
pub fn spinner(strings: &Strings, frame: u8) -> String {
    let glyph = if frame % 2 == 0 { "⏳" } else { "⌛" };
    format!("{} {}", glyph, strings.loading)
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub session: Session,
    pub tabs: TabController,
    pub focus: usize, // index into the active tab's fields; one past the end is the button

    // Panels
    pub fields: Fields,
    pub chat: ChatLog,
    pub forward: ResultPane,
    pub inverse: ResultPane,
    pub connection: Connection,

    // Requests
    pub api: ApiClient,
    pub requests: RequestTracker,
    tasks: HashMap<Operation, JoinHandle<()>>,

    // Animation state
    pub animation_frame: u8,

    // Chat area size, updated during render for scroll calculations
    pub chat_width: u16,
    pub chat_height: u16,
    // Panel areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
    pub output_area: Option<Rect>,
}

impl App {
    pub fn new(session: Session) -> Self {
        let api = ApiClient::new(session.api_base());
        let fields = Fields::new(session.language().strings());

        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            session,
            tabs: TabController::new(),
            focus: 0,

            fields,
            chat: ChatLog::new(),
            forward: ResultPane::new(),
            inverse: ResultPane::new(),
            connection: Connection::Checking,

            api,
            requests: RequestTracker::new(),
            tasks: HashMap::new(),

            animation_frame: 0,

            chat_width: 0,
            chat_height: 0,
            chat_area: None,
            output_area: None,
        }
    }

    pub fn strings(&self) -> &'static Strings {
        self.session.language().strings()
    }

    // Language

    pub fn toggle_language(&mut self) {
        self.session.toggle_language();
        self.apply_language();
    }

    /// Re-localize everything that caches a string
    fn apply_language(&mut self) {
        self.fields.apply_language(self.strings());
        info!(lang = self.session.language().code(), "language changed");
    }

    // Tabs and focus

    pub fn show_tab(&mut self, tab: Tab, now: Instant) {
        if tab != self.tabs.active() {
            self.focus = 0;
        }
        self.tabs.show_tab(tab, now);
    }

    pub fn active_fields(&self) -> &'static [FieldId] {
        FieldId::for_tab(self.tabs.active())
    }

    /// The field with focus, or `None` when the button is focused
    pub fn focused_field(&self) -> Option<FieldId> {
        self.active_fields().get(self.focus).copied()
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % (self.active_fields().len() + 1);
    }

    pub fn focus_prev(&mut self) {
        let slots = self.active_fields().len() + 1;
        self.focus = (self.focus + slots - 1) % slots;
    }

    // Controls

    pub fn operation_for(tab: Tab) -> Operation {
        match tab {
            Tab::Chat => Operation::Chat,
            Tab::Forward => Operation::Forward,
            Tab::Inverse => Operation::Inverse,
        }
    }

    pub fn control_enabled(&self, op: Operation) -> bool {
        !self.requests.is_busy(op)
    }

    /// Button text: the action name, or the loading text while busy
    pub fn control_label(&self, op: Operation) -> &'static str {
        let s = self.strings();
        if self.requests.is_busy(op) {
            return s.loading;
        }
        match op {
            Operation::Chat => s.btn_send,
            Operation::Forward => s.btn_search,
            Operation::Inverse => s.btn_predict,
            Operation::Health => s.status_checking,
        }
    }

    // Starting requests. Each returns `None` when nothing should be sent.

    pub fn begin_health(&mut self) -> RequestToken {
        self.connection = Connection::Checking;
        self.requests.issue(Operation::Health)
    }

    pub fn begin_chat(&mut self) -> Option<(RequestToken, ChatRequest)> {
        if !self.control_enabled(Operation::Chat) {
            return None;
        }
        let message = self.fields.get(FieldId::ChatInput).text()?.to_string();

        self.chat.add_message(ChatRole::User, message.clone());
        self.fields.get_mut(FieldId::ChatInput).clear();
        self.chat.push_pending();
        self.follow_chat();

        let token = self.requests.issue(Operation::Chat);
        Some((token, ChatRequest { message, lang: self.session.language() }))
    }

    pub fn begin_forward(&mut self) -> Option<(RequestToken, ForwardRequest)> {
        if !self.control_enabled(Operation::Forward) {
            return None;
        }
        let request = self.fields.forward_request(self.session.language());
        self.forward.set(Output::Loading);
        Some((self.requests.issue(Operation::Forward), request))
    }

    pub fn begin_inverse(&mut self) -> Option<(RequestToken, InverseRequest)> {
        if !self.control_enabled(Operation::Inverse) {
            return None;
        }
        let request = self.fields.inverse_request(self.session.language());
        self.inverse.set(Output::Loading);
        Some((self.requests.issue(Operation::Inverse), request))
    }

    pub fn track(&mut self, token: RequestToken, handle: JoinHandle<()>) {
        // A replaced handle belongs to a request that is already stale
        self.tasks.insert(token.op, handle);
    }

    // Finishing requests

    pub fn complete(&mut self, completion: Completion) {
        let Completion { token, result } = completion;
        if !self.requests.finish(token) {
            debug!(?token, "discarding stale response");
            return;
        }
        self.tasks.remove(&token.op);

        if let Err(e) = &result {
            warn!(op = ?token.op, error = %e, "request failed");
        }

        match token.op {
            Operation::Health => {
                self.connection = match result {
                    Ok(_) => Connection::Connected,
                    Err(_) => Connection::Disconnected,
                };
            }
            Operation::Chat => {
                let text = match result {
                    Ok(Reply::Chat(reply)) => reply.text(),
                    Ok(other) => {
                        warn!(?other, "unexpected reply to chat request");
                        self.strings().api_error.to_string()
                    }
                    Err(_) => self.strings().api_error.to_string(),
                };
                self.chat.remove_pending();
                self.chat.add_message(ChatRole::Assistant, text);
                self.follow_chat();
            }
            Operation::Forward | Operation::Inverse => {
                let output = match result {
                    Ok(Reply::Json(value)) => Output::Ready(
                        serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()),
                    ),
                    Ok(other) => {
                        warn!(?other, "unexpected reply to lookup request");
                        Output::Failed
                    }
                    Err(_) => Output::Failed,
                };
                if token.op == Operation::Forward {
                    self.forward.set(output);
                } else {
                    self.inverse.set(output);
                }
            }
        }
    }

    /// Abandon the in-flight request for `op`. Returns false if nothing was running.
    pub fn cancel(&mut self, op: Operation) -> bool {
        if !self.requests.cancel(op) {
            return false;
        }
        if let Some(handle) = self.tasks.remove(&op) {
            handle.abort();
        }
        info!(?op, "request cancelled");

        let cancelled = self.strings().cancelled;
        match op {
            Operation::Chat => {
                self.chat.remove_pending();
                self.chat.add_message(ChatRole::Assistant, cancelled);
                self.follow_chat();
            }
            Operation::Forward => self.forward.set(Output::Cancelled),
            Operation::Inverse => self.inverse.set(Output::Cancelled),
            Operation::Health => self.connection = Connection::Disconnected,
        }
        true
    }

    /// Tick animation frame and settle tab transitions (called by Tick event)
    pub fn tick(&mut self, now: Instant) {
        self.tabs.tick(now);
        let busy = [Operation::Chat, Operation::Forward, Operation::Inverse, Operation::Health]
            .into_iter()
            .any(|op| self.requests.is_busy(op));
        if busy {
            self.animation_frame = self.animation_frame.wrapping_add(1);
        }
    }

    fn follow_chat(&mut self) {
        self.chat.scroll_to_bottom(self.chat_width, self.chat_height);
    }
}
