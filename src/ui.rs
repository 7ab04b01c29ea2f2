//! Terminal UI rendering with ratatui

use quadtris::board::{BOARD_HEIGHT, BOARD_WIDTH};
use quadtris::game::{Game, GameState};
use quadtris::leaderboard::LeaderboardEntry;
use quadtris::piece::Direction as Heading;
use quadtris::score::QuadTally;
use quadtris::settings::Settings;
use quadtris::snapshot::{CellView, PieceView, Snapshot};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

const EMPTY: &str = "  ";

/// One board with borders: 10 cells of two columns each, plus 2
const BOARD_BOX_WIDTH: u16 = BOARD_WIDTH as u16 * 2 + 2;
const BOARD_BOX_HEIGHT: u16 = BOARD_HEIGHT as u16 + 2;
/// Next preview and stats column
const SIDE_WIDTH: u16 = 18;

/// What to draw on top of the play field
#[derive(Debug, Clone, Copy)]
pub enum Panel<'a> {
    /// Overlays follow the game state
    Game,
    /// Initials prompt after a qualifying score
    NameEntry { name: &'a str, score: u64 },
    /// Stored high scores, with an optional status line
    Leaderboard {
        entries: &'a [LeaderboardEntry],
        status: Option<&'a str>,
    },
}

/// Map a piece color name onto the terminal palette
fn palette(name: &str) -> Color {
    match name {
        "cyan" => Color::Cyan,
        "blue" => Color::Blue,
        "orange" => Color::Rgb(255, 165, 0),
        "yellow" => Color::Yellow,
        "green" => Color::Green,
        "purple" => Color::Magenta,
        "red" => Color::Red,
        _ => Color::White,
    }
}

/// Render a full frame
pub fn render_game(frame: &mut Frame, game: &Game, settings: &Settings, panel: Panel) {
    let area = frame.area();
    let snapshot = game.snapshot();

    match &snapshot.quad_boards {
        Some(arms) => render_quad(frame, area, &snapshot, arms, settings),
        None => render_single(frame, area, &snapshot, settings),
    }

    match panel {
        Panel::Game => render_state_overlay(frame, area, game),
        Panel::NameEntry { name, score } => render_name_entry(frame, area, name, score),
        Panel::Leaderboard { entries, status } => {
            render_leaderboard(frame, area, entries, status)
        }
    }
}

fn render_single(frame: &mut Frame, area: Rect, snapshot: &Snapshot, settings: &Settings) {
    let game_area = center_rect(area, BOARD_BOX_WIDTH + SIDE_WIDTH, BOARD_BOX_HEIGHT);
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(BOARD_BOX_WIDTH),
            Constraint::Length(SIDE_WIDTH),
        ])
        .split(game_area);

    render_board(
        frame,
        layout[0],
        " QUADTRIS ",
        &snapshot.board,
        snapshot.current_piece.as_ref(),
        Color::White,
        settings,
    );
    render_side(frame, layout[1], snapshot, settings);
}

/// Four arms side by side in UP, DOWN, LEFT, RIGHT order
fn render_quad(
    frame: &mut Frame,
    area: Rect,
    snapshot: &Snapshot,
    arms: &[Vec<Vec<CellView>>; 4],
    settings: &Settings,
) {
    let width = BOARD_BOX_WIDTH * 4 + SIDE_WIDTH;
    let game_area = center_rect(area, width, BOARD_BOX_HEIGHT);
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(BOARD_BOX_WIDTH),
            Constraint::Length(BOARD_BOX_WIDTH),
            Constraint::Length(BOARD_BOX_WIDTH),
            Constraint::Length(BOARD_BOX_WIDTH),
            Constraint::Length(SIDE_WIDTH),
        ])
        .split(game_area);

    for (slot, heading) in Heading::all().into_iter().enumerate() {
        let active = snapshot.quad_direction == Some(heading);
        let piece = snapshot
            .current_piece
            .as_ref()
            .filter(|piece| piece.direction == Some(heading));
        let title = format!(" {} {} ", heading.arrow(), heading.name());
        let border = if active { Color::Yellow } else { Color::Gray };
        render_board(
            frame,
            layout[slot],
            &title,
            &arms[heading.index()],
            piece,
            border,
            settings,
        );
    }
    render_side(frame, layout[4], snapshot, settings);
}

/// Center a rect within another rect
fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Board cells covered by the falling piece
fn piece_cells(piece: &PieceView) -> impl Iterator<Item = (i32, i32)> + '_ {
    piece.shape.iter().enumerate().flat_map(move |(r, row)| {
        row.iter()
            .enumerate()
            .filter(|(_, filled)| **filled != 0)
            .map(move |(c, _)| (piece.x + c as i32, piece.y + r as i32))
    })
}

fn render_board(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    cells: &[Vec<CellView>],
    piece: Option<&PieceView>,
    border: Color,
    settings: &Settings,
) {
    let (block_char, empty_char) = settings.visual.block_chars();
    let block = Block::default()
        .title(title.to_string())
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let falling: Vec<(i32, i32)> = piece.map(|p| piece_cells(p).collect()).unwrap_or_default();
    let piece_color = piece.map(|p| palette(p.kind.color())).unwrap_or(Color::White);

    let lines: Vec<Line> = cells
        .iter()
        .enumerate()
        .map(|(y, row)| {
            let spans: Vec<Span> = row
                .iter()
                .enumerate()
                .map(|(x, cell)| {
                    if falling.contains(&(x as i32, y as i32)) {
                        Span::styled(block_char, Style::default().fg(piece_color))
                    } else if let Some(color) = cell.color {
                        Span::styled(block_char, Style::default().fg(palette(color)))
                    } else {
                        Span::styled(empty_char, Style::default().fg(Color::DarkGray))
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Next preview above the stats panel
fn render_side(frame: &mut Frame, area: Rect, snapshot: &Snapshot, settings: &Settings) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(6)])
        .split(area);

    render_next(frame, layout[0], snapshot, settings);
    render_stats(frame, layout[1], snapshot);
}

fn render_next(frame: &mut Frame, area: Rect, snapshot: &Snapshot, settings: &Settings) {
    let (block_char, _) = settings.visual.block_chars();
    let block = Block::default()
        .title(" NEXT ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let color = palette(snapshot.next_piece.color());
    // Skip blank rows so the preview sits at the top of the box
    let lines: Vec<Line> = snapshot
        .next_piece_shape
        .iter()
        .filter(|row| row.iter().any(|v| *v != 0))
        .map(|row| {
            let spans: Vec<Span> = row
                .iter()
                .map(|v| {
                    if *v != 0 {
                        Span::styled(block_char, Style::default().fg(color))
                    } else {
                        Span::raw(EMPTY)
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

fn stat(lines: &mut Vec<Line>, label: &str, value: String, color: Color) {
    lines.push(Line::from(Span::styled(label.to_string(), Style::default().fg(Color::Gray))));
    lines.push(Line::from(Span::styled(value, Style::default().fg(color).bold())));
}

fn render_stats(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();
    stat(&mut lines, "SCORE", snapshot.score.to_string(), Color::Yellow);
    stat(&mut lines, "LEVEL", snapshot.level.to_string(), Color::Cyan);
    stat(&mut lines, "LINES", snapshot.lines_cleared.to_string(), Color::Green);

    if snapshot.quad_mode {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled("PER ARM", Style::default().fg(Color::Gray))));
        lines.extend(quad_breakdown(&snapshot.quad_scores, &snapshot.quad_lines));
        if let Some(heading) = snapshot.quad_direction {
            lines.push(Line::raw(""));
            lines.push(Line::styled(
                format!("{} {}", heading.arrow(), heading.name()),
                Style::default().fg(Color::Yellow).bold(),
            ));
        }
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn quad_breakdown(scores: &QuadTally, lines: &QuadTally) -> Vec<Line<'static>> {
    Heading::all()
        .into_iter()
        .map(|heading| {
            Line::from(vec![
                Span::styled(heading.arrow(), Style::default().fg(Color::Yellow)),
                Span::raw(format!(
                    " {:>6} {:>3}",
                    scores.get(heading),
                    lines.get(heading)
                )),
            ])
        })
        .collect()
}

fn render_state_overlay(frame: &mut Frame, area: Rect, game: &Game) {
    match game.state {
        GameState::NotStarted => render_overlay(frame, area, "QUADTRIS", "Press P to start"),
        GameState::Paused => render_overlay(frame, area, "PAUSED", "Press P to resume"),
        GameState::GameOver => render_overlay(frame, area, "GAME OVER", "R to restart, Esc to exit"),
        GameState::Abandoned => render_overlay(frame, area, "GAME ENDED", "R to restart, Esc to exit"),
        GameState::Running => {
            // Name the last clear on the top line
            if let Some(label) = game.last_lock.and_then(|report| report.label()) {
                let flash = Paragraph::new(Line::styled(
                    label,
                    Style::default().fg(Color::Magenta).bold(),
                ))
                .alignment(Alignment::Center);
                frame.render_widget(flash, Rect { height: 1, ..area });
            }
        }
    }
}

/// Render an overlay (for pause/game over)
fn render_overlay(frame: &mut Frame, area: Rect, title: &str, subtitle: &str) {
    let popup_area = center_rect(area, 30, 5);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let text = vec![
        Line::styled(title.to_string(), Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
        Line::styled(subtitle.to_string(), Style::default().fg(Color::Gray)),
    ];

    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), inner);
}

fn render_name_entry(frame: &mut Frame, area: Rect, name: &str, score: u64) {
    let popup_area = center_rect(area, 36, 9);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" NEW HIGH SCORE ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let text = vec![
        Line::styled(format!("Score: {}", score), Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
        Line::styled("Enter your initials", Style::default().fg(Color::Gray)),
        Line::styled(format!("[{:<3}]", name), Style::default().fg(Color::White).bold()),
        Line::raw(""),
        Line::styled("Enter to save, Esc to skip", Style::default().fg(Color::DarkGray)),
    ];

    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), inner);
}

fn render_leaderboard(
    frame: &mut Frame,
    area: Rect,
    entries: &[LeaderboardEntry],
    status: Option<&str>,
) {
    let popup_area = center_rect(area, 44, 17);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" LEADERBOARD ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let mut lines = Vec::new();
    if entries.is_empty() {
        lines.push(Line::styled("No high scores yet", Style::default().fg(Color::Gray)));
    }
    for (rank, entry) in entries.iter().enumerate() {
        lines.push(Line::raw(format!(
            "{:>2}. {:<3} {:>7}  L{:<2} {}",
            rank + 1,
            entry.player_name,
            entry.score,
            entry.level,
            entry.date.format("%Y-%m-%d"),
        )));
    }
    lines.push(Line::raw(""));
    if let Some(status) = status {
        lines.push(Line::styled(status.to_string(), Style::default().fg(Color::Red)));
    }
    lines.push(Line::styled("Press any key", Style::default().fg(Color::DarkGray)));

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}
