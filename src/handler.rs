use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Instant;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use futures_util::FutureExt;
use ratatui::layout::Rect;
use tracing::error;
use crate::api::ApiError;
use crate::app::{App, Completion, InputMode, Reply};
use crate::request::RequestToken;
use crate::tabs::Tab;
use crate::tui::{self, AppEvent, EventSender};

pub fn handle_event(app: &mut App, event: AppEvent, tx: &EventSender) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key, tx),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick(Instant::now()),
        AppEvent::Completion(completion) => app.complete(completion),
    }
    Ok(())
}

/// Run `request` on the runtime and report its result back to the UI loop.
fn spawn_request<F>(app: &mut App, token: RequestToken, tx: &EventSender, request: F)
where
    F: Future<Output = Result<Reply, ApiError>> + Send + 'static,
{
    let tx = tx.clone();
    let handle = tokio::spawn(async move {
        let result = match AssertUnwindSafe(tui::request_scope(request)).catch_unwind().await {
            Ok(result) => result,
            Err(_) => {
                error!(op = ?token.op, "request task panicked");
                Err(ApiError::TaskPanicked)
            }
        };
        // The receiver is gone only when the app is shutting down
        let _ = tx.send(AppEvent::Completion(Completion { token, result }));
    });
    app.track(token, handle);
}

pub fn start_health_check(app: &mut App, tx: &EventSender) {
    let token = app.begin_health();
    let api = app.api.clone();
    spawn_request(app, token, tx, async move { api.health().await.map(|_| Reply::Health) });
}

/// Submit the form of the active tab
pub fn submit(app: &mut App, tx: &EventSender) {
    let api = app.api.clone();
    match app.tabs.active() {
        Tab::Chat => {
            if let Some((token, request)) = app.begin_chat() {
                spawn_request(app, token, tx, async move {
                    api.chat(&request).await.map(Reply::Chat)
                });
            }
        }
        Tab::Forward => {
            if let Some((token, request)) = app.begin_forward() {
                spawn_request(app, token, tx, async move {
                    api.forward(&request).await.map(Reply::Json)
                });
            }
        }
        Tab::Inverse => {
            if let Some((token, request)) = app.begin_inverse() {
                spawn_request(app, token, tx, async move {
                    api.inverse(&request).await.map(Reply::Json)
                });
            }
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent, tx: &EventSender) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Global keys that work in any mode
    match key.code {
        KeyCode::Char('c') if ctrl => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('r') if ctrl => {
            start_health_check(app, tx);
            return;
        }
        KeyCode::F(n @ 1..=3) => {
            app.show_tab(Tab::ALL[(n - 1) as usize], Instant::now());
            return;
        }
        KeyCode::F(4) => {
            app.toggle_language();
            return;
        }
        KeyCode::PageDown => {
            scroll_active(app, 10, true);
            return;
        }
        KeyCode::PageUp => {
            scroll_active(app, 10, false);
            return;
        }
        _ => {}
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key, tx),
        InputMode::Editing => handle_editing_mode(app, key, tx),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent, tx: &EventSender) {
    match key.code {
        // Quit
        KeyCode::Char('q') => app.should_quit = true,

        // Tab switching
        KeyCode::Char(c @ '1'..='3') => {
            let idx = c as usize - '1' as usize;
            app.show_tab(Tab::ALL[idx], Instant::now());
        }
        KeyCode::Char(']') | KeyCode::Right => {
            app.show_tab(app.tabs.active().next(), Instant::now());
        }
        KeyCode::Char('[') | KeyCode::Left => {
            app.show_tab(app.tabs.active().prev(), Instant::now());
        }

        // Focus
        KeyCode::Char('j') | KeyCode::Down | KeyCode::Tab => app.focus_next(),
        KeyCode::Char('k') | KeyCode::Up | KeyCode::BackTab => app.focus_prev(),

        // Language
        KeyCode::Char('L') => app.toggle_language(),

        // Edit the focused field, or press the focused button
        KeyCode::Enter | KeyCode::Char('i') => {
            if app.focused_field().is_some() {
                app.input_mode = InputMode::Editing;
            } else if key.code == KeyCode::Enter {
                submit(app, tx);
            }
        }

        // Cancel whatever the active panel is waiting for
        KeyCode::Esc => {
            app.cancel(App::operation_for(app.tabs.active()));
        }

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent, tx: &EventSender) {
    let Some(id) = app.focused_field() else {
        // Focus is on the button; nothing to edit
        app.input_mode = InputMode::Normal;
        return;
    };

    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => submit(app, tx),
        KeyCode::Tab => {
            app.focus_next();
            if app.focused_field().is_none() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::BackTab => {
            app.focus_prev();
            if app.focused_field().is_none() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Backspace => app.fields.get_mut(id).backspace(),
        KeyCode::Delete => app.fields.get_mut(id).delete(),
        KeyCode::Left => app.fields.get_mut(id).left(),
        KeyCode::Right => app.fields.get_mut(id).right(),
        KeyCode::Home => app.fields.get_mut(id).home(),
        KeyCode::End => app.fields.get_mut(id).end(),
        KeyCode::Char(c) => {
            // Numeric fields only take characters that can appear in a number
            if !id.is_numeric() || c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E') {
                app.fields.get_mut(id).insert(c);
            }
        }
        _ => {}
    }
}

fn scroll_active(app: &mut App, lines: u16, down: bool) {
    let scroll = match app.tabs.active() {
        Tab::Chat => &mut app.chat.scroll,
        Tab::Forward => &mut app.forward.scroll,
        Tab::Inverse => &mut app.inverse.scroll,
    };
    *scroll = if down {
        scroll.saturating_add(lines)
    } else {
        scroll.saturating_sub(lines)
    };
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    let over_text = [app.chat_area, app.output_area]
        .into_iter()
        .flatten()
        .any(|r| point_in_rect(x, y, r));
    if !over_text {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => scroll_active(app, 3, true),
        MouseEventKind::ScrollUp => scroll_active(app, 3, false),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Output;
    use crate::form::FieldId;
    use crate::i18n::Language;
    use crate::request::Operation;
    use crate::session::Session;
    use tokio::sync::mpsc;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn app_with(base: &str) -> App {
        App::new(Session::new(Language::English, base, None))
    }

    fn unreachable_base() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}/api", addr)
    }

    #[tokio::test]
    async fn typing_and_enter_sends_chat() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut app = app_with(&unreachable_base());

        for c in "best MOFs for CO2?".chars() {
            handle_event(&mut app, key(KeyCode::Char(c)), &tx).unwrap();
        }
        handle_event(&mut app, key(KeyCode::Enter), &tx).unwrap();
        assert_eq!(app.chat.messages()[0].content, "best MOFs for CO2?");
        assert!(app.chat.messages()[1].pending);

        // Network failure comes back through the channel
        let event = rx.recv().await.unwrap();
        handle_event(&mut app, event, &tx).unwrap();

        let msgs = app.chat.messages();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[1].content, Language::English.strings().api_error);
        assert!(app.control_enabled(Operation::Chat));
    }

    #[tokio::test]
    async fn numeric_fields_reject_letters() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = app_with(&unreachable_base());
        handle_event(&mut app, key(KeyCode::F(2)), &tx).unwrap();
        assert_eq!(app.tabs.active(), Tab::Forward);

        // Move to the selectivity field and type
        handle_event(&mut app, key(KeyCode::Tab), &tx).unwrap();
        assert_eq!(app.focused_field(), Some(FieldId::SelectivityMin));
        for c in "2x5".chars() {
            handle_event(&mut app, key(KeyCode::Char(c)), &tx).unwrap();
        }
        assert_eq!(app.fields.get(FieldId::SelectivityMin).value, "25");
    }

    #[tokio::test]
    async fn escape_cancels_lookup() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = app_with(&unreachable_base());
        handle_event(&mut app, key(KeyCode::F(3)), &tx).unwrap();
        handle_event(&mut app, key(KeyCode::Enter), &tx).unwrap();
        assert!(!app.control_enabled(Operation::Inverse));

        // First Esc leaves editing, second one cancels
        handle_event(&mut app, key(KeyCode::Esc), &tx).unwrap();
        handle_event(&mut app, key(KeyCode::Esc), &tx).unwrap();
        assert!(app.control_enabled(Operation::Inverse));
    }

    #[tokio::test]
    async fn f4_toggles_language() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = app_with(&unreachable_base());
        handle_event(&mut app, key(KeyCode::F(4)), &tx).unwrap();
        assert_eq!(app.session.language(), Language::Arabic);
    }

    #[tokio::test]
    async fn panicking_request_fails_inside_request_scope() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut app = app_with(&unreachable_base());
        let (token, _) = app.begin_inverse().unwrap();

        let (seen_tx, seen_rx) = tokio::sync::oneshot::channel();
        spawn_request(&mut app, token, &tx, async move {
            let _ = seen_tx.send(tui::in_request_task());
            if token.op == Operation::Inverse {
                panic!("request blew up");
            }
            Ok(Reply::Health)
        });

        // The panic hook sees the task as a request task and leaves the terminal alone
        assert!(seen_rx.await.unwrap());

        let event = rx.recv().await.unwrap();
        assert!(matches!(
            &event,
            AppEvent::Completion(c) if matches!(c.result, Err(ApiError::TaskPanicked))
        ));
        handle_event(&mut app, event, &tx).unwrap();
        assert_eq!(app.inverse.output, Output::Failed);
        assert!(app.control_enabled(Operation::Inverse));
    }
}
