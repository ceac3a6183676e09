use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use triage_core::dialogue::{SequencerState, TYPING_INDICATOR};
use triage_core::io::MicState;
use triage_core::types::{Sender, Turn};

use crate::tui::App;

const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(f.area());

    draw_chat(f, app, chunks[0]);
    draw_status(f, app, chunks[1]);
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let mic = match (app.voice_available, app.mic) {
        (false, _) => "voice off".to_string(),
        (true, MicState::Ready) => format!("{} Ctrl+R voice", app.mic.label()),
        (true, MicState::Listening) => format!("{} listening...", app.mic.label()),
    };
    let state = match app.seq.state() {
        SequencerState::Idle => "ready",
        SequencerState::ShowingTypingIndicator => "typing",
        SequencerState::RevealingContent => "replying",
    };
    let text = format!(" {state}  |  {mic}  |  Enter send  |  F1-F3 call  |  Ctrl+C quit");

    let para = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(Color::DarkGray),
    )));
    f.render_widget(para, area);
}

/// Lines for one turn, styled by sender and category.
fn turn_lines(turn: &Turn) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    match turn.sender {
        Sender::User => {
            lines.push(Line::from(vec![Span::raw("> "), Span::raw(&turn.content)]));
        }
        Sender::System => {
            lines.push(Line::from(Span::styled(
                format!("! {}", turn.content),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
            )));
        }
        Sender::Bot => {
            let style = if turn.style_class() == "emergency" {
                Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            lines.extend(
                turn.content
                    .split('\n')
                    .map(|l| Line::from(Span::styled(l, style))),
            );
            if !turn.actions.is_empty() {
                let hints: Vec<Span> = turn
                    .actions
                    .iter()
                    .enumerate()
                    .map(|(i, a)| Span::raw(format!("[F{}] {}  ", i + 1, a.tel_uri())).dim())
                    .collect();
                lines.push(Line::from(hints));
            }
        }
    }
    lines
}

fn draw_chat(f: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    for turn in app.seq.log().turns() {
        // Blank line before user turns separates exchanges
        if !lines.is_empty() && turn.sender == Sender::User {
            lines.push(Line::default());
        }
        lines.extend(turn_lines(turn));
    }
    if app.seq.log().is_typing() {
        let frame = SPINNER[app.anim_frame % SPINNER.len()];
        lines.push(Line::from(Span::styled(
            format!("{frame} {TYPING_INDICATOR}"),
            Style::default().dim(),
        )));
    }

    if !lines.is_empty() {
        lines.push(Line::default());
    }
    let input_prefix = "> ";
    lines.push(Line::from(vec![
        Span::raw(input_prefix),
        Span::raw(&app.input),
    ]));

    // Inner width = area minus left/right borders
    let inner_w = area.width.saturating_sub(2) as usize;

    let wrapped_total: u16 = lines.iter().map(|l| wrapped_line_count(l, inner_w)).sum();
    let visible = area.height.saturating_sub(2);
    let scroll = wrapped_total.saturating_sub(visible);
    let scroll = scroll.saturating_sub(app.scroll_offset);

    let block = Block::default().borders(Borders::ALL).title(" health assistant ");
    let para = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    f.render_widget(para, area);

    let before_cursor = format!("{}{}", input_prefix, &app.input[..app.cursor]);
    let (cursor_row, cursor_col) = greedy_cursor_position(&before_cursor, inner_w);

    let input_line_str = format!("{}{}", input_prefix, app.input);
    let input_first_row = wrapped_total.saturating_sub(greedy_wrap_rows(&input_line_str, inner_w));
    let abs_row = input_first_row + cursor_row;
    let vis_row = abs_row.saturating_sub(scroll);

    f.set_cursor_position(Position::new(
        area.x + 1 + cursor_col,
        area.y + 1 + vis_row,
    ));
}

/// How many visual rows a Line occupies when wrapped to `width` columns.
fn wrapped_line_count(line: &Line, width: usize) -> u16 {
    if width == 0 {
        return 1;
    }
    let full: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
    full.split('\n')
        .map(|sub| greedy_wrap_rows(sub, width))
        .sum()
}

/// Visual rows for one unwrapped segment; a char that doesn't fit starts a new row.
fn greedy_wrap_rows(s: &str, width: usize) -> u16 {
    if width == 0 {
        return 1;
    }
    let mut rows: u16 = 1;
    let mut col: usize = 0;
    for ch in s.chars() {
        let cw = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if cw == 0 {
            continue;
        }
        if col + cw > width {
            rows += 1;
            col = cw;
        } else {
            col += cw;
        }
    }
    rows
}

/// Row and column just past the end of `s`, using the same greedy wrap as
/// [`greedy_wrap_rows`]. A full last row puts the cursor at the start of the next.
fn greedy_cursor_position(s: &str, width: usize) -> (u16, u16) {
    if width == 0 {
        return (0, 0);
    }
    let mut row: u16 = 0;
    let mut col: usize = 0;
    for ch in s.chars() {
        let cw = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if cw == 0 {
            continue;
        }
        if col + cw > width {
            row += 1;
            col = cw;
        } else {
            col += cw;
        }
    }
    if col >= width {
        row += 1;
        col = 0;
    }
    (row, col as u16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::triage::select;

    #[test]
    fn wrap_counts_rows() {
        assert_eq!(greedy_wrap_rows("", 10), 1);
        assert_eq!(greedy_wrap_rows("abcdefghij", 10), 1);
        assert_eq!(greedy_wrap_rows("abcdefghijk", 10), 2);
        assert_eq!(greedy_wrap_rows("anything", 0), 1);
    }

    #[test]
    fn cursor_follows_greedy_wrap_of_wide_chars() {
        assert_eq!(greedy_cursor_position("> ab", 10), (0, 4));
        // "> " + 4 emoji (width 2 each) = 10 columns: full row, cursor wraps.
        assert_eq!(greedy_cursor_position("> 😀😀😀😀", 10), (1, 0));
        // Width 9: the fourth emoji does not fit on row 0 and starts row 1 early.
        assert_eq!(greedy_cursor_position("> 😀😀😀😀", 9), (1, 2));
        assert_eq!(greedy_wrap_rows("> 😀😀😀😀", 9), 2);
        assert_eq!(greedy_cursor_position("anything", 0), (0, 0));
    }

    #[test]
    fn emergency_turn_lists_call_hints() {
        let turn = Turn::bot(&select("heart attack"));
        let lines = turn_lines(&turn);
        let last: String = lines
            .last()
            .unwrap()
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert!(last.contains("[F1] tel:108"));
        assert!(last.contains("[F3] tel:18005990019"));
    }

    #[test]
    fn user_turn_is_prefixed() {
        let turn = Turn::user("fever");
        let lines = turn_lines(&turn);
        assert_eq!(lines.len(), 1);
        let text: String = lines[0].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "> fever");
    }
}
