use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, InputMode, View};
use crate::models::{SummaryFormat, SummaryResult};
use crate::workflow::WorkflowState;

pub fn draw(frame: &mut Frame, app: &App) {
    if app.input_mode == InputMode::Login {
        render_login(frame, app);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(0),    // View body
            Constraint::Length(1), // Status line
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    match &app.view {
        View::Summary => render_summary_view(frame, app, chunks[1]),
        View::History => render_history_view(frame, app, chunks[1]),
        View::Detail(id) => match app.history.get(id) {
            Some(result) => render_result(frame, &result, " Summary ", chunks[1]),
            None => render_message(frame, "This summary was deleted.", Color::DarkGray, chunks[1]),
        },
    }
    render_status(frame, app, chunks[2]);

    if let InputMode::ConfirmDelete(_) = app.input_mode {
        render_confirm_delete(frame);
    }

    if app.show_help {
        render_help(frame);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let view_label = match app.view {
        View::Summary => "Summarize",
        View::History | View::Detail(_) => "History",
    };
    let user = app
        .session
        .current()
        .map(|u| u.name.as_str())
        .unwrap_or("guest");

    let title = format!(" YouTube Summarizer [{view_label}] ");
    let stats = format!(" {} | {} saved summaries", user, app.history.items().len());

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let paragraph = Paragraph::new(stats).style(Style::default().fg(Color::White));
    frame.render_widget(paragraph, inner);
}

fn render_summary_view(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // URL input
            Constraint::Length(3), // Format selector
            Constraint::Min(0),    // Result
        ])
        .split(area);

    let editing = app.input_mode == InputMode::Url;
    let url_text = if editing {
        format!("> {}_", app.url_input)
    } else if app.url_input.is_empty() {
        "Press i to enter a YouTube URL".to_string()
    } else {
        app.url_input.clone()
    };
    let url_block = Block::default()
        .title(" YouTube URL ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { Color::Yellow } else { Color::Blue }));
    frame.render_widget(Paragraph::new(url_text).block(url_block), chunks[0]);

    let formats: Vec<Span> = SummaryFormat::ALL
        .iter()
        .flat_map(|format| {
            let style = if *format == app.format {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Magenta)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            [Span::styled(format!(" {} ", format.label()), style), Span::raw("  ")]
        })
        .collect();
    let format_block = Block::default()
        .title(" Summary Format (f) ")
        .borders(Borders::ALL);
    frame.render_widget(Paragraph::new(Line::from(formats)).block(format_block), chunks[1]);

    match app.workflow.state() {
        WorkflowState::Idle => render_message(
            frame,
            "Paste a YouTube lecture URL and press Enter to get a summary.",
            Color::DarkGray,
            chunks[2],
        ),
        WorkflowState::Validating => {
            render_message(frame, "Checking URL...", Color::DarkGray, chunks[2])
        }
        WorkflowState::Loading => render_message(
            frame,
            &format!("{} Generating summary...", app.spinner()),
            Color::Yellow,
            chunks[2],
        ),
        WorkflowState::Error(message) => render_message(frame, message, Color::Red, chunks[2]),
        WorkflowState::Success(result) => render_result(frame, result, " Summary ", chunks[2]),
    }
}

fn render_history_view(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search
            Constraint::Min(0),    // List
        ])
        .split(area);

    let searching = app.input_mode == InputMode::Search;
    let search_text = if searching {
        format!("> {}_", app.search_input)
    } else if app.search_input.is_empty() {
        "Press / to search by title or keyword".to_string()
    } else {
        app.search_input.clone()
    };
    let search_block = Block::default()
        .title(" Search ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if searching { Color::Yellow } else { Color::Blue }));
    frame.render_widget(Paragraph::new(search_text).block(search_block), chunks[0]);

    let history = app.visible_history();
    if history.is_empty() {
        render_message(
            frame,
            "No Summaries Found\n\nYour generated summaries will appear here. Try summarizing a video!",
            Color::DarkGray,
            chunks[1],
        );
        return;
    }

    let width = chunks[1].width.saturating_sub(6) as usize;
    let items: Vec<ListItem> = history
        .iter()
        .map(|item| {
            let preview = item.summary.lines().next().unwrap_or_default();
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(
                        item.video_title.clone(),
                        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(format!("  {}", item.created_at), Style::default().fg(Color::DarkGray)),
                ]),
                Line::from(Span::styled(
                    truncate(preview, width),
                    Style::default().fg(Color::Gray),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Summary History "))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(app.selected_index));

    frame.render_stateful_widget(list, chunks[1], &mut state);
}

fn render_result(frame: &mut Frame, result: &SummaryResult, title: &str, area: Rect) {
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));

    let paragraph = Paragraph::new(result_lines(result))
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

fn result_lines(result: &SummaryResult) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            result.format.label().to_uppercase(),
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            result.video_title.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            result.video_url.clone(),
            Style::default().fg(Color::Blue),
        )),
        Line::from(Span::styled(
            format!("Thumbnail: {}", result.video_thumbnail),
            Style::default().fg(Color::DarkGray),
        )),
        Line::default(),
    ];
    lines.extend(render_markdown(&result.summary));
    lines
}

fn render_message(frame: &mut Frame, message: &str, color: Color, area: Rect) {
    let paragraph = Paragraph::new(message.to_string())
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let status = if let Some(message) = &app.status_message {
        message.clone()
    } else {
        let hints = match app.view {
            View::Summary => "i:url  f:format  Enter:summarize  Tab:history  t/p:export  c:copy  ?:help  q:quit",
            View::History => "j/k:nav  Enter:open  /:search  d:delete  Tab:summarize  ?:help  q:quit",
            View::Detail(_) => "Esc:back  o:open video  t/p:export  c:copy  d:delete  ?:help  q:quit",
        };
        hints.to_string()
    };

    let paragraph = Paragraph::new(status).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

fn render_login(frame: &mut Frame, app: &App) {
    let area = centered_rect(60, 20, frame.area());

    let block = Block::default()
        .title(" Log in - enter your email ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let inner = block.inner(area);

    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let mut text = vec![Line::from(format!("> {}_", app.login_input))];
    if let Some(message) = &app.status_message {
        text.push(Line::default());
        text.push(Line::from(Span::styled(message.clone(), Style::default().fg(Color::Red))));
    }
    frame.render_widget(Paragraph::new(text), inner);
}

fn render_confirm_delete(frame: &mut Frame) {
    let area = centered_rect(50, 20, frame.area());

    let block = Block::default()
        .title(" Delete Summary ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let paragraph = Paragraph::new(
        "Are you sure you want to permanently delete this summary? This action cannot be undone.\n\n y: delete   n: cancel",
    )
    .block(block)
    .wrap(Wrap { trim: true });

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn render_help(frame: &mut Frame) {
    let area = centered_rect(50, 60, frame.area());

    let help_text = vec![
        "",
        " Summarize:",
        "   i / u    Edit YouTube URL",
        "   f        Cycle summary format",
        "   Enter    Generate summary",
        "",
        " History:",
        "   j / ↓    Move down",
        "   k / ↑    Move up",
        "   Enter    Open summary",
        "   /        Search",
        "   d        Delete summary",
        "   Esc      Back / clear search",
        "",
        " Summary actions:",
        "   o        Open video in browser",
        "   t        Export as .txt",
        "   p        Export as PDF",
        "   c        Copy summary",
        "",
        " General:",
        "   Tab      Switch view",
        "   L        Log out",
        "   ?        Toggle this help",
        "   q        Quit",
        "",
        " Press any key to close",
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(help_text.join("\n"))
        .block(block)
        .style(Style::default().fg(Color::White));

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

/// Just enough markdown for model output: headings, bullets, bold markers.
fn render_markdown(text: &str) -> Vec<Line<'static>> {
    text.lines()
        .map(|raw| {
            let trimmed = raw.trim_start();
            let indent = &raw[..raw.len() - trimmed.len()];

            if let Some(heading) = trimmed.strip_prefix('#') {
                let heading = heading.trim_start_matches('#').trim();
                return Line::from(Span::styled(
                    strip_emphasis(heading),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ));
            }

            let bullet = trimmed
                .strip_prefix("* ")
                .or_else(|| trimmed.strip_prefix("- "))
                .or_else(|| trimmed.strip_prefix("+ "));
            match bullet {
                Some(item) => Line::from(vec![
                    Span::raw(indent.to_string()),
                    Span::styled("• ", Style::default().fg(Color::Magenta)),
                    Span::raw(strip_emphasis(item)),
                ]),
                None => Line::from(Span::raw(strip_emphasis(raw))),
            }
        })
        .collect()
}

fn strip_emphasis(text: &str) -> String {
    text.replace("**", "").replace("__", "")
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let cut: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{cut}...")
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

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn markdown_bullets_and_bold_are_cleaned_up() {
        let lines = render_markdown("## Topics\n* **Ownership** rules\n  - borrowing\nPlain text");
        let rendered: Vec<String> = lines.iter().map(plain).collect();
        assert_eq!(
            rendered,
            vec!["Topics", "• Ownership rules", "  • borrowing", "Plain text"]
        );
    }

    #[test]
    fn result_card_lists_source_and_thumbnail() {
        let result = SummaryResult::new(
            "https://youtu.be/abc123",
            crate::models::VideoDetails {
                title: "Intro to X".to_string(),
                thumbnail: "http://img.example/t.jpg".to_string(),
            },
            "X is a short overview.".to_string(),
            SummaryFormat::Abstract,
            chrono::Utc::now(),
        );

        let rendered: Vec<String> = result_lines(&result).iter().map(plain).collect();
        assert_eq!(rendered[1], "Intro to X");
        assert_eq!(rendered[2], "https://youtu.be/abc123");
        assert_eq!(rendered[3], "Thumbnail: http://img.example/t.jpg");
        assert_eq!(rendered.last().unwrap(), "X is a short overview.");
    }

    #[test]
    fn truncate_respects_width() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer line", 10), "a much ...");
    }
}
