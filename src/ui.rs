use knowyourbody_core::{BodyRegion, Sender};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use crate::app::{figure_area, region_rect, App, ChatView, FocusPane, InputMode, Page};
use crate::content;

const ACCENT: Color = Color::Cyan;

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.char_indices().peekable();
    let mut current_text = String::new();

    while let Some((_, c)) = chars.next() {
        if c == '*' && chars.peek().map(|(_, c)| *c) == Some('*') {
            // Consume the second *
            chars.next();

            // Push any accumulated plain text
            if !current_text.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_text)));
            }

            // Find closing **
            let mut bold_text = String::new();
            let mut found_close = false;

            while let Some((_, c)) = chars.next() {
                if c == '*' && chars.peek().map(|(_, c)| *c) == Some('*') {
                    chars.next(); // consume second *
                    found_close = true;
                    break;
                }
                bold_text.push(c);
            }

            if found_close && !bold_text.is_empty() {
                spans.push(Span::styled(
                    bold_text,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            } else {
                // No closing **, treat as literal
                current_text.push_str("**");
                current_text.push_str(&bold_text);
            }
        } else {
            current_text.push(c);
        }
    }

    // Push any remaining text
    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.page {
        Page::Home => render_home(app, frame, body_area),
        Page::Learn => render_learn(app, frame, body_area),
        Page::Chat => render_chat(app, frame, body_area),
        Page::About => render_about(frame, body_area),
    }

    render_footer(app, frame, footer_area);

    if app.show_profile_modal {
        render_profile_modal(frame, area);
    }
}

fn render_header(app: &mut App, frame: &mut Frame, area: Rect) {
    let title = format!(" {} ", content::APP_NAME);
    let title_width = title.chars().count() as u16;
    let mut spans = vec![Span::styled(title, Style::default().fg(ACCENT).bold())];
    let mut x = area.x + title_width + 2;
    spans.push(Span::raw("  "));

    // The app name doubles as a link home
    app.tab_areas.clear();
    app.tab_areas.push((Page::Home, Rect::new(area.x, area.y, title_width, 1)));
    for (i, page) in Page::ALL.iter().enumerate() {
        let label = format!(" {} {} ", i + 1, page.title());
        let width = label.chars().count() as u16;
        let style = if *page == app.page {
            Style::default().fg(Color::Black).bg(ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        app.tab_areas.push((*page, Rect::new(x, area.y, width, 1)));
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
        x += width + 1;
    }

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = format!(" {} ", app.page.title().to_uppercase());

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);
    let hint = |key: &'static str, label: &'static str| {
        [
            Span::styled(format!(" {} ", key), key_style),
            Span::styled(format!(" {} ", label), label_style),
        ]
    };

    let mut hints: Vec<Span> = Vec::new();
    if app.show_profile_modal {
        hints.extend(hint("Esc", "close"));
    } else {
        match (app.page, app.input_mode) {
            (Page::Home, _) => {
                hints.extend(hint("h/l", "choose"));
                hints.extend(hint("Enter", "open"));
            }
            (Page::Learn, _) => {
                hints.extend(hint("j/k", "scroll"));
            }
            (Page::Chat, InputMode::Editing) => {
                hints.extend(hint("Enter", "send"));
                hints.extend(hint("Esc", "stop typing"));
            }
            (Page::Chat, InputMode::Normal) => {
                let body_focused = app
                    .chat
                    .as_ref()
                    .is_some_and(|c| c.focus == FocusPane::BodyMap);
                if body_focused {
                    hints.extend(hint("j/k", "region"));
                    hints.extend(hint("Enter", "ask"));
                } else {
                    hints.extend(hint("j/k", "scroll"));
                }
                hints.extend(hint("Tab", "focus"));
                hints.extend(hint("i", "type"));
                hints.extend(hint("p", "profile"));
            }
            (Page::About, _) => {}
        }
        if app.input_mode == InputMode::Normal {
            hints.extend(hint("1-4", "pages"));
            hints.extend(hint("q", "quit"));
        }
    }

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_home(app: &App, frame: &mut Frame, area: Rect) {
    let [_, content_area, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(7),
        Constraint::Fill(1),
    ])
    .areas(area);

    let buttons: Vec<Span> = content::HOME_ACTIONS
        .iter()
        .enumerate()
        .flat_map(|(i, label)| {
            let style = if i == app.home_selection {
                Style::default().fg(Color::Black).bg(ACCENT).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(ACCENT)
            };
            [Span::styled(format!("[ {} ]", label), style), Span::raw("   ")]
        })
        .collect();

    let text = Text::from(vec![
        Line::from(Span::styled(
            content::HOME_HEADLINE,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(Span::styled(content::HOME_SUBTITLE, Style::default().fg(Color::Gray))),
        Line::default(),
        Line::from(buttons),
    ]);

    let home = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(home, content_area);
}

fn render_learn(app: &App, frame: &mut Frame, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(
            content::LEARN_TITLE,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(content::LEARN_INTRO, Style::default().fg(Color::Gray))),
        Line::default(),
    ];

    for topic in &content::TOPICS {
        lines.push(Line::from(Span::styled(
            topic.title,
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(topic.desc));
        lines.push(Line::from(Span::styled(
            "Coming Soon...",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
        lines.push(Line::default());
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let learn = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.learn_scroll, 0));
    frame.render_widget(learn, area);
}

fn render_about(frame: &mut Frame, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(
            content::ABOUT_TITLE,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::default(),
    ];
    for paragraph in content::ABOUT_MISSION {
        lines.push(Line::from(paragraph));
        lines.push(Line::default());
    }
    lines.push(Line::from(vec![
        Span::styled("Important: ", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
        Span::styled(content::ABOUT_NOTICE, Style::default().fg(ACCENT)),
    ]));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let about = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(about, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let animation_frame = app.animation_frame;
    let input_mode = app.input_mode;
    let model_name = app.model_name.clone();
    let Some(chat) = app.chat.as_mut() else { return };

    // Body map on the left third, conversation on the right
    let [map_area, chat_area] = Layout::horizontal([
        Constraint::Percentage(33),
        Constraint::Percentage(67),
    ])
    .areas(area);

    let [history_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(chat_area);

    // Store areas for mouse hit-testing
    chat.body_map_area = Some(map_area);
    chat.history_area = Some(history_area);

    render_body_map(chat, frame, map_area);
    render_history(chat, frame, history_area, animation_frame, &model_name);
    render_input(chat, input_mode, frame, input_area);
}

fn render_body_map(chat: &ChatView, frame: &mut Frame, area: Rect) {
    let focused = chat.focus == FocusPane::BodyMap;
    let border_color = if focused { ACCENT } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Body Map ");
    frame.render_widget(block, area);

    let figure = figure_area(area);
    for region in BodyRegion::ALL {
        let rect = region_rect(figure, region);
        if rect.width == 0 || rect.height == 0 {
            continue;
        }

        let highlighted = focused && region == chat.highlighted;
        let style = if highlighted {
            Style::default().fg(Color::Black).bg(ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(ACCENT)
        };

        // Arms overlap the torso and are drawn over it
        frame.render_widget(Clear, rect);
        let label = Paragraph::new(region.label())
            .style(style)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });

        if rect.width >= 3 && rect.height >= 3 {
            let region_block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ACCENT))
                .style(style);
            frame.render_widget(label.block(region_block), rect);
        } else {
            frame.render_widget(label, rect);
        }
    }
}

fn render_history(
    chat: &mut ChatView,
    frame: &mut Frame,
    area: Rect,
    animation_frame: u8,
    model: &str,
) {
    let focused = chat.focus == FocusPane::History;
    let border_color = if focused { ACCENT } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" KnowBot: {} ", model));

    let mut lines: Vec<Line<'static>> = Vec::new();

    if chat.conversation.len() <= 1 {
        lines.push(Line::from(vec![
            Span::styled(
                "Wellness Tip: ",
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            ),
            Span::styled(chat.tip, Style::default().fg(ACCENT)),
        ]));
        lines.push(Line::default());
    }

    for msg in &chat.conversation.messages {
        match msg.sender {
            Sender::User => {
                lines.push(
                    Line::from(Span::styled(
                        "You:",
                        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
                    ))
                    .alignment(Alignment::Right),
                );
                for line in msg.lines() {
                    lines.push(Line::from(line.to_string()).alignment(Alignment::Right));
                }
            }
            Sender::Assistant => {
                lines.push(Line::from(Span::styled(
                    "KnowBot:",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )));
                // Split response into lines and parse markdown
                for line in msg.lines() {
                    lines.push(parse_markdown_line(line));
                }
            }
        }
        lines.push(Line::default());
    }

    if chat.is_busy() {
        lines.push(Line::from(Span::styled(
            "KnowBot:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    // Count wrapped lines at the inner width so the last one can be pinned
    let paragraph = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: true });
    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2);
    let total = u16::try_from(paragraph.line_count(inner_width)).unwrap_or(u16::MAX);
    let max_scroll = total.saturating_sub(inner_height);
    chat.scroll = if chat.follow {
        max_scroll
    } else {
        chat.scroll.min(max_scroll)
    };

    let history = paragraph.block(block).scroll((chat.scroll, 0));
    frame.render_widget(history, area);
}

fn render_input(chat: &ChatView, input_mode: InputMode, frame: &mut Frame, area: Rect) {
    let editing = input_mode == InputMode::Editing;
    let busy = chat.is_busy();
    let border_color = if busy {
        Color::DarkGray
    } else if editing {
        Color::Yellow
    } else {
        Color::Gray
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(if busy { " Waiting for reply... " } else { " Message " });

    let text = if chat.input.is_empty() {
        Span::styled(content::CHAT_PLACEHOLDER, Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(chat.input.as_str())
    };

    let input = Paragraph::new(Line::from(text)).block(block);
    frame.render_widget(input, area);

    if editing && !busy {
        let cursor_x = area.x + 1 + chat.cursor as u16;
        let max_x = area.x + area.width.saturating_sub(2);
        frame.set_cursor_position((cursor_x.min(max_x), area.y + 1));
    }
}

fn render_profile_modal(frame: &mut Frame, area: Rect) {
    let width = area.width.saturating_sub(4).min(60);
    let height = 8.min(area.height);
    let popup = Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    );

    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(format!(" {} ", content::PROFILE_TITLE))
        .title_bottom(Line::from(" Esc to close ").alignment(Alignment::Right));

    let body = Paragraph::new(content::PROFILE_TEXT)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(body, popup);
}
