//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`. Every
//! string that comes from the server or the user goes through [`sanitize`]
//! before it reaches the terminal.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::audio::PreviewState;
use crate::capacity::{CapacityState, format_mss};
use crate::jobs::DownloadJob;
use crate::session::{BurnSession, Mode, Session, Severity};

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("gg/G", "top/bottom");
    map.insert("J/K", "move track");
    map.insert("dd", "delete");
    map.insert("x", "shuffle");
    map.insert("C", "clear");
    map.insert("u", "upload");
    map.insert("a", "add URLs");
    map.insert("space/p", "preview");
    map.insert("e", "export");
    map.insert("t", "gaps");
    map.insert("b/B", "burn/dummy burn");
    map.insert("q", "quit");
    map
});

/// What the runtime adds to the session when drawing.
pub struct View<'a> {
    pub header_text: &'a str,
    pub server: &'a str,
    pub prompt: Option<PromptView<'a>>,
    pub confirm_clear: bool,
}

pub struct PromptView<'a> {
    pub title: &'a str,
    pub input: &'a str,
}

/// Strip control characters so server or user text cannot move the cursor,
/// recolour the terminal or break the layout.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c == '\n' || c == '\t' { ' ' } else { c })
        .filter(|c| !c.is_control())
        .collect()
}

fn controls_text() -> String {
    // Keep the rendered order stable and human-friendly.
    let order = [
        "j/k", "gg/G", "J/K", "dd", "x", "C", "u", "a", "space/p", "e", "t", "b/B", "q",
    ];
    order
        .iter()
        .filter_map(|k| CONTROLS_MAP.get(k).map(|v| format!("[{}] {}", k, v)))
        .collect::<Vec<String>>()
        .join(" | ")
}

fn status_text(session: &Session, server: &str) -> String {
    let mut parts: Vec<String> = Vec::new();

    parts.push(format!(" MODE: {}", session.mode().label()));

    let disc = match session.disc_present() {
        None => "checking".to_string(),
        Some(true) => format!("inserted ({})", format_mss(session.capacity_seconds())),
        Some(false) => format!("none, using {}", format_mss(session.capacity_seconds())),
    };
    parts.push(format!("DISC: {disc}"));

    parts.push(format!(
        "GAPS: {}",
        if session.gaps() { "On" } else { "Off" }
    ));

    if session.mode() == Mode::Idle {
        parts.push(format!(
            "BURN: {}",
            if session.can_burn() { "ready" } else { "not ready" }
        ));
    }

    let preview = match session.preview() {
        PreviewState::Idle => "Stopped".to_string(),
        PreviewState::Loading(id) => format!("Loading {}", track_name(session, id)),
        PreviewState::Playing(id) => format!("Playing {}", track_name(session, id)),
    };
    parts.push(format!("PREVIEW: {preview}"));

    parts.push(format!("SERVER: {}", sanitize(server)));
    parts.join(" • ")
}

fn track_name(session: &Session, id: &str) -> String {
    let name = session
        .tracks()
        .iter()
        .find(|t| t.id == id)
        .map_or(id, |t| t.name.as_str());
    sanitize(name)
}

fn capacity_label(cap: &CapacityState) -> String {
    let mut label = format!(
        "{} / {} ({}%)",
        format_mss(cap.used_seconds),
        format_mss(cap.total_seconds),
        cap.percent
    );
    if cap.overflow {
        label.push_str(" OVER CAPACITY");
    }
    label
}

fn job_line(job: &DownloadJob) -> String {
    let what = job
        .result
        .as_ref()
        .map(|r| r.title.as_str())
        .unwrap_or(job.url.as_str());
    let mut line = format!(
        "{:<11} {:>3.0}%  {}",
        job.status.label(),
        job.progress,
        sanitize(what)
    );
    if let Some(err) = &job.error {
        line.push_str(&format!("  ({})", sanitize(err)));
    } else if !job.message.is_empty() {
        line.push_str(&format!("  {}", sanitize(&job.message)));
    }
    line
}

fn burn_label(burn: &BurnSession) -> String {
    let mut label = format!("{:.0}%", burn.percent);
    if let Some(track) = burn.track {
        label.push_str(&format!(" track {track}"));
    }
    if !burn.message.is_empty() {
        label.push_str(&format!(": {}", sanitize(&burn.message)));
    }
    if burn.dummy {
        label.push_str(" [dummy]");
    }
    label
}

fn severity_style(severity: Severity) -> Style {
    let color = match severity {
        Severity::Info => Color::Cyan,
        Severity::Success => Color::Green,
        Severity::Warning => Color::Yellow,
        Severity::Error => Color::Red,
    };
    Style::default().fg(color)
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(3);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn padded(title: &str) -> Block<'_> {
    Block::default().borders(Borders::ALL).title(title).padding(Padding {
        left: 1,
        right: 0,
        top: 0,
        bottom: 0,
    })
}

/// Render the entire UI into the provided `frame` from the session state.
pub fn draw(frame: &mut Frame, session: &Session, view: &View) {
    let jobs = session.jobs().jobs();
    let jobs_height = if session.jobs().is_empty() {
        0
    } else {
        (jobs.len() as u16 + 2).min(8)
    };
    let burn_height = if session.burn().is_some() { 3 } else { 0 };
    let prompt_height = if view.prompt.is_some() { 3 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(jobs_height),
            Constraint::Length(burn_height),
            Constraint::Length(prompt_height),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(view.header_text)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" discburn ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status box: fixed facts on the first line, the latest notice below.
    let mut lines = vec![Line::from(status_text(session, view.server))];
    if let Some(notice) = session.notice() {
        lines.push(Line::from(Span::styled(
            format!(" {}", sanitize(&notice.text)),
            severity_style(notice.severity),
        )));
    }
    let status = Paragraph::new(lines)
        .block(Block::bordered().title(" status "))
        .wrap(Wrap { trim: true });
    frame.render_widget(status, chunks[1]);

    // Capacity
    let cap = session.capacity();
    let ratio = if cap.total_seconds > 0.0 {
        (cap.used_seconds / cap.total_seconds).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let gauge_color = if cap.overflow {
        Color::Red
    } else if cap.percent >= 90 {
        Color::Yellow
    } else {
        Color::Green
    };
    let capacity = Gauge::default()
        .block(Block::bordered().title(" capacity "))
        .gauge_style(Style::default().fg(gauge_color))
        .ratio(ratio)
        .label(capacity_label(&cap));
    frame.render_widget(capacity, chunks[2]);

    // Track list
    {
        let playing = session.preview().active_id();
        let items: Vec<ListItem> = session
            .tracks()
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let marker = if playing == Some(t.id.as_str()) { "♪ " } else { "  " };
                ListItem::new(format!(
                    "{marker}{:>3}. {}  [{}]",
                    i + 1,
                    sanitize(&t.name),
                    format_mss(t.duration)
                ))
            })
            .collect();

        let title = format!(" tracks ({}) ", session.tracks().len());
        let mut list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        if session.mode() != Mode::Idle {
            list = list.style(Style::default().add_modifier(Modifier::DIM));
        }
        let mut state = ListState::default();
        state.select(session.selected());
        frame.render_stateful_widget(list, chunks[3], &mut state);
    }

    // Download jobs
    if !jobs.is_empty() {
        let items: Vec<ListItem> = jobs.iter().map(|j| ListItem::new(job_line(j))).collect();
        let list = List::new(items).block(Block::bordered().title(" downloads "));
        frame.render_widget(list, chunks[4]);
    }

    // Burn progress
    if let Some(burn) = session.burn() {
        let title = match burn.stage.as_deref() {
            Some(stage) => format!(" burn: {} ", sanitize(stage)),
            None => " burn ".to_string(),
        };
        let gauge = Gauge::default()
            .block(Block::bordered().title(title))
            .gauge_style(Style::default().fg(Color::Magenta))
            .ratio((burn.percent / 100.0).clamp(0.0, 1.0))
            .label(burn_label(burn));
        frame.render_widget(gauge, chunks[5]);
    }

    // Prompt
    if let Some(prompt) = &view.prompt {
        let input = Paragraph::new(format!("{}_", sanitize(prompt.input))).block(padded(prompt.title));
        frame.render_widget(input, chunks[6]);
    }

    // Footer
    let footer = Paragraph::new(controls_text())
        .block(padded(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[7]);

    // Clear confirmation overlay, inside the list area.
    if view.confirm_clear {
        let popup = centered_rect_sized(44, 3, chunks[3]);
        frame.render_widget(Clear, popup);
        let ask = Paragraph::new("Clear the whole playlist? (y/n)")
            .alignment(Alignment::Center)
            .block(Block::bordered().title(" confirm "));
        frame.render_widget(ask, popup);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::{AcceptedJob, JobStatus};
    use crate::session::SessionOptions;

    #[test]
    fn sanitize_strips_escape_sequences_and_newlines() {
        assert_eq!(sanitize("a\u{1b}[31mred\u{7}"), "a[31mred");
        assert_eq!(sanitize("two\nlines\tand tab"), "two lines and tab");
        assert_eq!(sanitize("plain ünïcode ♪"), "plain ünïcode ♪");
    }

    #[test]
    fn controls_text_lists_every_binding_in_order() {
        let text = controls_text();
        assert!(text.starts_with("[j/k] up/down"));
        assert!(text.ends_with("[q] quit"));
        assert_eq!(text.matches(" | ").count(), CONTROLS_MAP.len() - 1);
    }

    #[test]
    fn capacity_label_flags_overflow() {
        let cap = CapacityState {
            used_seconds: 422.0,
            total_seconds: 4800.0,
            percent: 9,
            overflow: false,
        };
        assert_eq!(capacity_label(&cap), "7:02 / 80:00 (9%)");

        let over = CapacityState {
            used_seconds: 4801.0,
            percent: 100,
            overflow: true,
            ..cap
        };
        assert!(capacity_label(&over).ends_with("OVER CAPACITY"));
    }

    #[test]
    fn job_line_prefers_title_and_shows_error() {
        let mut job = DownloadJob::pending(AcceptedJob {
            id: "j".into(),
            url: "https://example.com/\u{1b}x".into(),
        });
        assert!(job_line(&job).contains("https://example.com/x"));

        job.status = JobStatus::Failed;
        job.error = Some("HTTP 404".into());
        assert!(job_line(&job).ends_with("(HTTP 404)"));
    }

    #[test]
    fn status_text_reports_mode_disc_and_gaps() {
        let session = Session::new(SessionOptions::default());
        let text = status_text(&session, "http://localhost:3379");
        assert!(text.contains("MODE: Idle"));
        assert!(text.contains("DISC: checking"));
        assert!(text.contains("GAPS: On"));
        assert!(text.contains("PREVIEW: Stopped"));
    }

    #[test]
    fn burn_label_includes_track_and_dummy() {
        let burn = BurnSession {
            dummy: true,
            percent: 25.0,
            message: "Writing".into(),
            track: Some(2),
            stage: Some("burning".into()),
        };
        assert_eq!(burn_label(&burn), "25% track 2: Writing [dummy]");
    }
}
