use std::time::Instant;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
};
use crate::app::{spinner, App, Connection, InputMode, ResultPane};
use crate::chat::ChatRole;
use crate::form::FieldId;
use crate::i18n::TextDirection;
use crate::tabs::Tab;

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("**") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("**") else {
            break;
        };
        if start > 0 {
            spans.push(Span::raw(rest[..start].to_string()));
        }
        if end > 0 {
            spans.push(Span::styled(
                after[..end].to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        }
        rest = &after[end + 2..];
    }

    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_string()));
    }

    Line::from(spans)
}

fn alignment(app: &App) -> Alignment {
    match app.session.direction() {
        TextDirection::Ltr => Alignment::Left,
        TextDirection::Rtl => Alignment::Right,
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, tab bar, body, footer
    let [header_area, tabs_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_tab_bar(app, frame, tabs_area);

    app.chat_area = None;
    app.output_area = None;
    match app.tabs.active() {
        Tab::Chat => render_chat(app, frame, body_area),
        Tab::Forward | Tab::Inverse => render_lookup(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);
}

/// Style of the active panel while it fades in
fn fade_style(app: &App) -> Style {
    let opacity = app.tabs.opacity(app.tabs.active(), Instant::now());
    if opacity < 0.5 {
        Style::default().fg(Color::DarkGray)
    } else if opacity < 1.0 {
        Style::default().fg(Color::Gray)
    } else {
        Style::default()
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let s = app.strings();
    let (status, status_color) = match app.connection {
        Connection::Checking => (s.status_checking, Color::Yellow),
        Connection::Connected => (s.status_connected, Color::LightGreen),
        Connection::Disconnected => (s.status_disconnected, Color::LightRed),
    };

    let title = Line::from(vec![
        Span::styled(" MOF-LabAssist ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{} ", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(status, Style::default().fg(status_color)),
        Span::raw(" "),
        Span::styled(
            format!("[{}] {}", app.session.language().code(), app.session.api_base()),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_tab_bar(app: &App, frame: &mut Frame, area: Rect) {
    let s = app.strings();
    let now = Instant::now();
    // A tab whose panel is still fading out is dimmed
    let titles = [s.tab_chat, s.tab_forward, s.tab_inverse]
        .into_iter()
        .zip(Tab::ALL)
        .enumerate()
        .map(|(i, (title, tab))| {
            let fading = tab != app.tabs.active() && app.tabs.is_displayed(tab, now);
            let style = if fading {
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC)
            } else {
                Style::default()
            };
            Line::styled(format!(" F{} {} ", i + 1, title), style)
        });
    let selected = Tab::ALL.iter().position(|t| *t == app.tabs.active()).unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan).bold())
        .divider("│");
    frame.render_widget(tabs, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let [log_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    app.chat_area = Some(log_area);
    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_height = log_area.height.saturating_sub(2);
    app.chat_width = log_area.width.saturating_sub(2);

    let s = app.strings();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" {} ", s.tab_chat));

    let text = if app.chat.is_empty() {
        Text::from(Span::styled(s.chat_empty, Style::default().fg(Color::DarkGray)))
    } else {
        let mut lines: Vec<Line> = Vec::new();
        for msg in app.chat.messages() {
            let (label, color) = match msg.role {
                ChatRole::User => (s.you, Color::Cyan),
                ChatRole::Assistant => (s.bot, Color::Yellow),
            };
            lines.push(Line::from(Span::styled(
                format!("{}:", label),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
            if msg.pending {
                lines.push(Line::from(Span::styled(
                    spinner(s, app.animation_frame),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                )));
            } else {
                for line in msg.content.lines() {
                    lines.push(parse_markdown_line(line));
                }
            }
            lines.push(Line::default());
        }
        Text::from(lines)
    };

    let log = Paragraph::new(text)
        .block(block)
        .style(fade_style(app))
        .alignment(alignment(app))
        .wrap(Wrap { trim: true })
        .scroll((app.chat.scroll, 0));
    frame.render_widget(log, log_area);

    let [field_area, button_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(button_width(app, Tab::Chat)),
    ])
    .areas(input_area);
    render_field(app, frame, field_area, FieldId::ChatInput);
    render_button(app, frame, button_area, Tab::Chat);
}

fn render_lookup(app: &mut App, frame: &mut Frame, area: Rect) {
    let tab = app.tabs.active();
    let s = app.strings();
    let fields = FieldId::for_tab(tab);

    let [form_area, output_area] = Layout::horizontal([
        Constraint::Percentage(40),
        Constraint::Percentage(60),
    ])
    .areas(area);

    let title = if tab == Tab::Forward { s.forward_title } else { s.inverse_title };
    let form_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" {} ", title));
    let form_inner = form_block.inner(form_area);
    frame.render_widget(form_block, form_area);

    let mut rows: Vec<Constraint> = fields.iter().map(|_| Constraint::Length(3)).collect();
    rows.push(Constraint::Length(3));
    rows.push(Constraint::Min(0));
    let slots = Layout::vertical(rows).split(form_inner);

    for (i, id) in fields.iter().enumerate() {
        render_field(app, frame, slots[i], *id);
    }
    render_button(app, frame, slots[fields.len()], tab);

    app.output_area = Some(output_area);
    let pane: &ResultPane = if tab == Tab::Forward { &app.forward } else { &app.inverse };
    let output = Paragraph::new(pane.output.display(s, app.animation_frame))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .style(fade_style(app))
        .alignment(alignment(app))
        .wrap(Wrap { trim: false })
        .scroll((pane.scroll, 0));
    frame.render_widget(output, output_area);
}

fn render_field(app: &App, frame: &mut Frame, area: Rect, id: FieldId) {
    let field = app.fields.get(id);
    let focused = app.focused_field() == Some(id);
    let editing = focused && app.input_mode == InputMode::Editing;

    let border_color = if editing {
        Color::Yellow
    } else if focused {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let content = if field.value.is_empty() {
        Span::styled(field.placeholder, Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(field.value.as_str())
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);
    let input = Paragraph::new(Line::from(content))
        .block(block)
        .alignment(alignment(app));
    frame.render_widget(input, area);

    if editing && inner.width > 0 {
        let len = field.value.chars().count() as u16;
        let cursor = field.cursor as u16;
        let offset = match app.session.direction() {
            TextDirection::Ltr => cursor,
            TextDirection::Rtl => inner.width.saturating_sub(len).saturating_add(cursor),
        };
        let x = inner.x + offset.min(inner.width - 1);
        frame.set_cursor_position((x, inner.y));
    }
}

fn button_width(app: &App, tab: Tab) -> u16 {
    let label = app.control_label(App::operation_for(tab));
    label.chars().count() as u16 + 6
}

fn render_button(app: &App, frame: &mut Frame, area: Rect, tab: Tab) {
    let op = App::operation_for(tab);
    let focused = app.focused_field().is_none();
    let enabled = app.control_enabled(op);

    let style = if !enabled {
        Style::default().fg(Color::DarkGray)
    } else if focused {
        Style::default().fg(Color::Black).bg(Color::Cyan).bold()
    } else {
        Style::default().fg(Color::Cyan)
    };

    let button = Paragraph::new(Span::styled(format!(" {} ", app.control_label(op)), style))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray })),
        );
    frame.render_widget(button, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let s = app.strings();
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " EDIT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut spans = vec![
        Span::styled(mode_text, mode_style),
        Span::raw(" "),
        Span::styled(" F1-F3 ", key_style),
        Span::styled(format!(" {} ", s.hint_tabs), label_style),
    ];

    match app.input_mode {
        InputMode::Normal => spans.extend(vec![
            Span::styled(" Enter ", key_style),
            Span::styled(format!(" {} ", s.hint_edit), label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(format!(" {} ", s.hint_cancel), label_style),
            Span::styled(" q ", key_style),
            Span::styled(format!(" {} ", s.hint_quit), label_style),
        ]),
        InputMode::Editing => spans.extend(vec![
            Span::styled(" Enter ", key_style),
            Span::styled(format!(" {} ", s.hint_submit), label_style),
            Span::styled(" Tab ", key_style),
            Span::styled(" ⇄ ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" NORMAL ", label_style),
        ]),
    }
    spans.extend(vec![
        Span::styled(" F4 ", key_style),
        Span::styled(format!(" {} ", s.hint_lang), label_style),
    ]);

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Language;
    use crate::session::Session;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen_text(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(160, 32)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn bold_markdown_is_split_into_spans() {
        let line = parse_markdown_line("try **UiO-66** first");
        let parts: Vec<&str> = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(parts, vec!["try ", "UiO-66", " first"]);
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));

        let unclosed = parse_markdown_line("a **b");
        assert_eq!(unclosed.spans.len(), 1);
    }

    #[test]
    fn renders_placeholder_and_send_button() {
        let mut app = App::new(Session::new(Language::English, "http://localhost:8000/api", None));
        let screen = screen_text(&mut app);
        assert!(screen.contains("best MOFs for CO2?"));
        assert!(screen.contains("Send"));
        assert!(screen.contains("MOF-LabAssist"));
    }

    #[test]
    fn forward_tab_lists_all_fields() {
        let mut app = App::new(Session::new(Language::English, "http://localhost:8000/api", None));
        app.show_tab(Tab::Forward, Instant::now());
        let screen = screen_text(&mut app);
        for id in FieldId::for_tab(Tab::Forward) {
            assert!(screen.contains(id.placeholder(app.strings())), "{id:?}");
        }
        assert!(screen.contains("Search"));
        assert!(app.output_area.is_some());
        assert!(app.chat_area.is_none());
    }
}
