use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation,
        ScrollbarState, Wrap,
    },
};
use lastfive_core::compose::{
    AlternativeView, DefectView, HeatBar, HistoryEventView, Listing, RiskSummaryView, WarningView,
};
use lastfive_core::{
    sanitize, ChatRole, MessageContent, RenderedReport, ReportSource, RiskLevel, SectionBody,
    SectionKind, SessionState, SeverityTier,
};
use crate::app::{App, FocusPane, InputMode, ServiceStatus};

/// Width of a full heatmap bar, in cells
const HEAT_BAR_CELLS: f64 = 24.0;

fn risk_color(level: RiskLevel) -> Color {
    match level {
        RiskLevel::Safe => Color::Green,
        RiskLevel::Caution => Color::Cyan,
        RiskLevel::Warning => Color::Yellow,
        RiskLevel::Danger => Color::LightRed,
        RiskLevel::Run => Color::Red,
    }
}

fn tier_color(tier: SeverityTier) -> Color {
    match tier {
        SeverityTier::High => Color::Red,
        SeverityTier::Medium => Color::Yellow,
        SeverityTier::Low => Color::Green,
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

    // Body: history sidebar on the left, timeline and input on the right
    let [history_area, main_area] = Layout::horizontal([
        Constraint::Length(28),
        Constraint::Min(0),
    ])
    .areas(body_area);

    let [timeline_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(main_area);

    // Store areas for mouse hit-testing
    app.history_area = Some(history_area);
    app.timeline_area = Some(timeline_area);

    render_history(app, frame, history_area);
    render_timeline(app, frame, timeline_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let status = match &app.service_status {
        ServiceStatus::Checking => Span::styled(" checking service… ", Style::default().fg(Color::Gray)),
        ServiceStatus::Online { version, provider } => {
            let mut label = String::from(" ● online");
            if let Some(provider) = provider {
                label.push_str(&format!(" ({})", sanitize(provider)));
            }
            if let Some(version) = version {
                label.push_str(&format!(" api {}", sanitize(version)));
            }
            label.push(' ');
            Span::styled(label, Style::default().fg(Color::Green))
        }
        ServiceStatus::Offline => Span::styled(
            " ○ offline, using local estimates ",
            Style::default().fg(Color::Yellow),
        ),
    };

    let title = Line::from(vec![
        Span::styled(" The Last 5% ", Style::default().fg(Color::Cyan).bold()),
        status,
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.focus {
        FocusPane::Input => " INPUT ",
        FocusPane::Timeline => " REPORT ",
        FocusPane::History => " HISTORY ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = match (app.focus, app.input_mode) {
        (_, InputMode::Editing) => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" analyze ", label_style),
            Span::styled(" @ ", key_style),
            Span::styled(" scenario ", label_style),
            Span::styled(" Tab ", key_style),
            Span::styled(" focus ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" normal ", label_style),
        ],
        (FocusPane::History, InputMode::Normal) => vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" select ", label_style),
            Span::styled(" Enter ", key_style),
            Span::styled(" re-run ", label_style),
            Span::styled(" d ", key_style),
            Span::styled(" clear ", label_style),
        ],
        (_, InputMode::Normal) => vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" section ", label_style),
            Span::styled(" Space ", key_style),
            Span::styled(" toggle ", label_style),
            Span::styled(" ^d/^u ", key_style),
            Span::styled(" scroll ", label_style),
        ],
    };

    if app.input_mode == InputMode::Normal {
        hints.extend(vec![
            Span::styled(" n ", key_style),
            Span::styled(" new ", label_style),
            Span::styled(" i ", key_style),
            Span::styled(" type ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ]);
    }

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    spans.extend(hints);

    let footer = Paragraph::new(Line::from(spans));
    frame.render_widget(footer, area);
}

fn render_history(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::History;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Recent ");

    let visible = app.history.visible();
    if visible.is_empty() {
        let placeholder = Paragraph::new("No analyses yet")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let items: Vec<ListItem> = visible
        .iter()
        .map(|entry| {
            let local = entry.timestamp.with_timezone(&chrono::Local);
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled("● ", Style::default().fg(risk_color(entry.risk_level))),
                    Span::raw(sanitize(&entry.product_name)),
                ]),
                Line::from(Span::styled(
                    format!("  {} · {}", entry.risk_level.as_str(), local.format("%m-%d %H:%M")),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(if focused { Color::Cyan } else { Color::DarkGray })
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.history_state);
}

fn render_timeline(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Timeline;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Analysis ");

    let inner_area = block.inner(area);
    app.timeline_height = inner_area.height;

    let text = if app.session.messages().is_empty() {
        Text::from(vec![
            Line::from(Span::styled(
                "Name a product to hear the 5% of reviews that matter.",
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(Span::styled(
                "Add a scenario after @, e.g. \"robot vacuum @ two cats, long hair\".",
                Style::default().fg(Color::DarkGray),
            )),
        ])
    } else {
        Text::from(timeline_lines(app))
    };

    // Approximate wrapped height so follow mode lands on the last line
    let wrap_width = inner_area.width.max(1) as usize;
    let total: usize = text
        .lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(wrap_width))
        .sum();
    app.total_timeline_lines = total.min(u16::MAX as usize) as u16;

    let max_scroll = app.total_timeline_lines.saturating_sub(app.timeline_height);
    if app.follow_timeline || app.timeline_scroll > max_scroll {
        app.timeline_scroll = max_scroll;
    }

    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.timeline_scroll, 0));

    frame.render_widget(paragraph, area);

    // Render scrollbar
    if app.total_timeline_lines > app.timeline_height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));

        let mut scrollbar_state = ScrollbarState::new(app.total_timeline_lines as usize)
            .position(app.timeline_scroll as usize);

        frame.render_stateful_widget(
            scrollbar,
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

fn timeline_lines(app: &App) -> Vec<Line<'static>> {
    let latest_id = app.session.latest_report().map(|(id, _)| id);
    let cursor = (app.focus == FocusPane::Timeline).then(|| app.selected_section());

    let mut lines: Vec<Line<'static>> = Vec::new();
    for msg in app.session.messages() {
        match (&msg.content, msg.role) {
            (MessageContent::Text(text), ChatRole::User) => {
                lines.push(Line::from(Span::styled(
                    "You:",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(sanitize(text)));
            }
            (MessageContent::Text(text), ChatRole::Assistant) => {
                lines.push(Line::from(sanitize(text)));
            }
            (MessageContent::Loading, _) => {
                // Animated ellipsis: cycles through ".", "..", "..."
                let dots = ".".repeat((app.animation_frame as usize) + 1);
                lines.push(Line::from(Span::styled(
                    format!("Sifting through reviews{}", dots),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                )));
            }
            (MessageContent::Report(rendered), _) => {
                let selected = if latest_id == Some(msg.id) { cursor } else { None };
                report_lines(&app.session, rendered, selected, &mut lines);
            }
        }
        lines.push(Line::default());
    }
    lines
}

fn report_lines(
    session: &SessionState,
    rendered: &RenderedReport,
    selected: Option<SectionKind>,
    lines: &mut Vec<Line<'static>>,
) {
    let score = session.displayed_score(rendered);
    let level = rendered.report.risk_level;

    let mut title = vec![
        Span::styled(
            format!(" {:>3} ", score),
            Style::default().bg(risk_color(level)).fg(Color::Black).bold(),
        ),
        Span::raw(" "),
        Span::styled(
            sanitize(&rendered.report.product_name),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ];
    if rendered.source == ReportSource::Fallback {
        title.push(Span::styled(
            "  offline estimate",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        ));
    }
    lines.push(Line::from(title));

    for section in &rendered.sections.sections {
        let expanded = rendered.disclosure.is_expanded(section.kind);
        let marker = if expanded { "▾" } else { "▸" };
        let header_style = if selected == Some(section.kind) {
            Style::default().bg(Color::Yellow).fg(Color::Black).bold()
        } else {
            Style::default().fg(Color::Magenta).bold()
        };

        let mut header = vec![Span::styled(format!("{} {}", marker, section.title), header_style)];
        if !expanded && section.kind != SectionKind::RiskSummary {
            header.push(Span::styled(
                format!(" ({})", section.item_count()),
                Style::default().fg(Color::DarkGray),
            ));
        }
        lines.push(Line::from(header));

        if expanded {
            section_body_lines(&section.body, lines);
        }
    }
}

fn section_body_lines(body: &SectionBody, lines: &mut Vec<Line<'static>>) {
    match body {
        SectionBody::RiskSummary(view) => risk_summary_lines(view, lines),
        SectionBody::Defects { heatmap, defects } => {
            if let Some(bars) = heatmap {
                heatmap_lines(bars, lines);
            }
            listing_lines(defects, lines, defect_lines);
        }
        SectionBody::ScenarioWarnings(items) => listing_lines(items, lines, warning_lines),
        SectionBody::HistoryEvents(items) => listing_lines(items, lines, history_event_lines),
        SectionBody::Alternatives(items) => listing_lines(items, lines, alternative_lines),
        SectionBody::DataSources(view) => {
            lines.push(Line::from(format!(
                "  {} reviews analyzed, {} filtered as noise",
                view.analyzed_reviews_count, view.noise_filtered
            )));
            match &view.sources {
                Listing::Items(sources) => {
                    lines.push(Line::from(format!("  {}", sources.join(" · "))));
                }
                Listing::Nothing(placeholder) => lines.push(placeholder_line(placeholder)),
            }
        }
    }
}

fn placeholder_line(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!("  {}", text),
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    ))
}

fn listing_lines<T>(
    listing: &Listing<T>,
    lines: &mut Vec<Line<'static>>,
    item_lines: fn(&T, &mut Vec<Line<'static>>),
) {
    match listing {
        Listing::Items(items) => {
            for item in items {
                item_lines(item, lines);
            }
        }
        Listing::Nothing(placeholder) => lines.push(placeholder_line(placeholder)),
    }
}

fn risk_summary_lines(view: &RiskSummaryView, lines: &mut Vec<Line<'static>>) {
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled(
            format!("{} · {}", view.risk_level.as_str().to_uppercase(), view.verdict),
            Style::default().fg(risk_color(view.risk_level)).bold(),
        ),
        Span::styled(format!("  score {}/100", view.risk_score), Style::default().fg(Color::DarkGray)),
    ]));
    if !view.summary.is_empty() {
        lines.push(Line::from(format!("  {}", view.summary)));
    }
}

fn heatmap_lines(bars: &[HeatBar], lines: &mut Vec<Line<'static>>) {
    let label_width = bars
        .iter()
        .map(|bar| bar.dimension.chars().count())
        .max()
        .unwrap_or(0);

    for bar in bars {
        let cells = (bar.width / 100.0 * HEAT_BAR_CELLS).round() as usize;
        let padding = label_width.saturating_sub(bar.dimension.chars().count());
        lines.push(Line::from(vec![
            Span::raw(format!("  {}{} ", bar.dimension, " ".repeat(padding))),
            Span::styled("█".repeat(cells), Style::default().fg(Color::LightRed)),
            Span::styled(
                format!(" {} complaints", bar.complaint_count),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }
}

fn defect_lines(defect: &DefectView, lines: &mut Vec<Line<'static>>) {
    let color = tier_color(defect.tier);
    let meter: String = defect
        .meter
        .iter()
        .map(|filled| if *filled { '■' } else { '□' })
        .collect();

    lines.push(Line::from(vec![
        Span::raw(format!("  {} ", defect.marker)),
        Span::styled(defect.category.clone(), Style::default().bold()),
        Span::raw(" "),
        Span::styled(meter, Style::default().fg(color)),
        Span::styled(
            format!(" {}/10 · {} reports", defect.severity, defect.frequency),
            Style::default().fg(Color::DarkGray),
        ),
    ]));
    lines.push(Line::from(format!("    {}", defect.description)));
    for quote in &defect.quotes {
        lines.push(Line::from(Span::styled(
            format!("    “{}”", quote),
            Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
        )));
    }
    if defect.hidden_quotes > 0 {
        lines.push(Line::from(Span::styled(
            format!("    +{} more", defect.hidden_quotes),
            Style::default().fg(Color::DarkGray),
        )));
    }
}

fn warning_lines(warning: &WarningView, lines: &mut Vec<Line<'static>>) {
    lines.push(Line::from(vec![
        Span::styled("  ⚠ ", Style::default().fg(Color::Yellow)),
        Span::styled(warning.scenario.clone(), Style::default().bold()),
        Span::styled(
            format!("  -{}%", warning.impact_percentage),
            Style::default().fg(Color::Red).bold(),
        ),
    ]));
    if !warning.spec.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("    {}", warning.spec),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Line::from(format!("    {}", warning.message)));
    if !warning.recommendation.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("    → {}", warning.recommendation),
            Style::default().fg(Color::Green),
        )));
    }
}

fn history_event_lines(event: &HistoryEventView, lines: &mut Vec<Line<'static>>) {
    let mut head = vec![
        Span::raw(format!("  {} ", event.marker)),
        Span::styled(event.event_label.clone(), Style::default().bold()),
    ];
    if let Some(date) = &event.date {
        head.push(Span::styled(format!("  {}", date), Style::default().fg(Color::DarkGray)));
    }
    lines.push(Line::from(head));
    lines.push(Line::from(format!("    {}", event.description)));
    if !event.related_models.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("    models: {}", event.related_models.join(", ")),
            Style::default().fg(Color::DarkGray),
        )));
    }
    if !event.source.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("    source: {}", event.source),
            Style::default().fg(Color::DarkGray),
        )));
    }
}

fn alternative_lines(alt: &AlternativeView, lines: &mut Vec<Line<'static>>) {
    let mut head = vec![
        Span::raw("  ✓ "),
        Span::styled(alt.name.clone(), Style::default().fg(Color::Green).bold()),
    ];
    if !alt.price_range.is_empty() {
        head.push(Span::styled(format!("  {}", alt.price_range), Style::default().fg(Color::DarkGray)));
    }
    lines.push(Line::from(head));
    lines.push(Line::from(format!("    {}", alt.advantage)));
    if !alt.solved_defects.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("    fixes: {}", alt.solved_defects.join(", ")),
            Style::default().fg(Color::DarkGray),
        )));
    }
    if let Some(link) = &alt.link {
        lines.push(Line::from(Span::styled(
            format!("    {}", link),
            Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
        )));
    }
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let input_focused = app.focus == FocusPane::Input;
    let border_color = if input_focused || app.input_mode == InputMode::Editing {
        Color::Yellow
    } else {
        Color::DarkGray
    };

    let title = match app.session.pending_request() {
        Some(request) => format!(" Analyzing {} ", sanitize(&request.product_name)),
        None => " Product @ scenario ".to_string(),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Calculate visible portion of input with horizontal scrolling
    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.query_cursor;

    // Calculate scroll offset to keep cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .query_input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);

    frame.render_widget(input, area);

    // Show cursor when editing
    if app.input_mode == InputMode::Editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lastfive_core::{fallback, Failure, HistoryStore, MemoryStore, TransportClient};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn test_app() -> App {
        let client = TransportClient::new("http://127.0.0.1:9", Duration::from_secs(1));
        let history = HistoryStore::open(Box::new(MemoryStore::new()));
        App::with_parts(client.clone(), Arc::new(client), history)
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_fallback_report_renders_expanded_defects() {
        let mut app = test_app();
        let pending = app.session.submit("投影仪A").unwrap();
        app.session.complete(
            pending.ticket,
            Err(Failure::Service { status: 503 }),
            &mut app.history,
            Instant::now() - Duration::from_secs(5),
        );
        app.follow_timeline = false;

        let mut terminal = Terminal::new(TestBackend::new(140, 60)).unwrap();
        terminal.draw(|f| render(&mut app, f)).unwrap();
        let text = screen_text(&terminal);

        assert!(text.contains("offline estimate"));
        assert!(text.contains("▾ Real defects"));
        assert!(text.contains("▸ Scenario warnings"));
        assert!(text.contains("■■■■■■■□□□"));
        assert!(text.contains("Recent"));
    }

    #[test]
    fn test_escape_sequences_never_reach_the_screen() {
        let mut app = test_app();
        let hostile = "Evil\x1b]0;pwned\x07Name";

        let pending = app.session.submit(hostile).unwrap();
        let mut report = fallback::generate("placeholder");
        report.product_name = hostile.to_string();
        app.session.complete(pending.ticket, Ok(report), &mut app.history, Instant::now());
        app.history
            .record("Bad\x1b[2JHist", RiskLevel::Run, chrono::Utc::now())
            .unwrap();
        app.service_status = ServiceStatus::Online {
            version: Some("2.0\x1b[31m".to_string()),
            provider: Some("deep\x07seek".to_string()),
        };
        app.follow_timeline = false;

        let mut terminal = Terminal::new(TestBackend::new(140, 60)).unwrap();
        terminal.draw(|f| render(&mut app, f)).unwrap();
        let text = screen_text(&terminal);

        assert!(!text.contains('\x1b'));
        assert!(!text.contains('\x07'));
        assert!(text.contains("EvilName"));
        assert!(text.contains("BadHist"));
        assert!(text.contains("deepseek"));
    }

    #[test]
    fn test_input_title_names_pending_product() {
        let mut app = test_app();
        app.session.submit("kettle @ hard water").unwrap();

        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        terminal.draw(|f| render(&mut app, f)).unwrap();
        let text = screen_text(&terminal);

        assert!(text.contains("Analyzing kettle"));
        assert!(text.contains("Sifting through reviews"));
    }

    #[test]
    fn test_empty_timeline_shows_prompt() {
        let mut app = test_app();
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|f| render(&mut app, f)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("No analyses yet"));
        assert!(text.contains("The Last 5%"));
    }

    #[test]
    fn test_heat_bar_cells_follow_width() {
        let mut lines = Vec::new();
        let bars = vec![
            HeatBar {
                key: "a".into(),
                dimension: "Durability".into(),
                complaint_count: 20,
                width: 100.0,
                severity_avg: 7.0,
                percentage: 66.7,
            },
            HeatBar {
                key: "b".into(),
                dimension: "Noise".into(),
                complaint_count: 10,
                width: 50.0,
                severity_avg: 4.0,
                percentage: 33.3,
            },
        ];
        heatmap_lines(&bars, &mut lines);
        assert_eq!(lines[0].spans[1].content.chars().count(), 24);
        assert_eq!(lines[1].spans[1].content.chars().count(), 12);
    }
}
