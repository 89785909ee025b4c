use std::io::{self, Stdout};

use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use worm_game::{Phase, Renderer, Snapshot, Tile, rasterize};

pub type Term = Terminal<CrosstermBackend<Stdout>>;

/// Draws snapshots into the alternate screen, two columns per grid cell.
pub struct TerminalRenderer<'t> {
    terminal: &'t mut Term,
}

impl<'t> TerminalRenderer<'t> {
    pub fn new(terminal: &'t mut Term) -> Self {
        Self { terminal }
    }
}

impl Renderer for TerminalRenderer<'_> {
    type Error = io::Error;

    fn render(&mut self, snapshot: &Snapshot<'_>) -> io::Result<()> {
        let board: Vec<Line> = rasterize(snapshot)
            .rows()
            .map(|row| Line::from(row.iter().map(|&t| tile_span(t)).collect::<Vec<_>>()))
            .collect();

        let title = format!(
            " worm — score: {}  •  best: {}  •  level: {} ",
            snapshot.score, snapshot.high_score, snapshot.level,
        );
        let status = status_line(snapshot);

        // Block adds a 1-char border around the board.
        let outer_w = (snapshot.grid_size * 2).saturating_add(2) as u16;
        let outer_h = snapshot.grid_size.saturating_add(2) as u16;

        self.terminal.draw(|f| {
            let area = f.area();

            // Center the frame within the terminal area.
            let x = area.x.saturating_add(area.width.saturating_sub(outer_w) / 2);
            let y = area.y.saturating_add(area.height.saturating_sub(outer_h) / 2);
            let frame_area = Rect::new(x, y, outer_w, outer_h).intersection(area);

            let block = Block::default()
                .borders(Borders::ALL)
                .title(title.bold())
                .title_bottom(status);
            let para = Paragraph::new(board)
                .block(block)
                .alignment(Alignment::Left);

            f.render_widget(para, frame_area);
        })?;
        Ok(())
    }
}

fn tile_span(tile: Tile) -> Span<'static> {
    let color = match tile {
        Tile::Empty => return Span::raw("  "),
        Tile::Head => Color::LightGreen,
        Tile::Body => Color::Green,
        Tile::Food => Color::LightRed,
        Tile::Obstacle => Color::Gray,
    };
    Span::styled("██", Style::new().fg(color))
}

fn status_line(snapshot: &Snapshot<'_>) -> Line<'static> {
    match snapshot.phase {
        Phase::Ready => Line::from(" Enter to start • hjkl/arrows steer • q quits "),
        Phase::Running => Line::from(" p pauses "),
        Phase::Paused => Line::from(" paused • p resumes ").yellow(),
        Phase::GameOver => {
            let cause = snapshot
                .cause
                .map(|c| c.to_string())
                .unwrap_or_else(|| "game over".to_owned());
            Line::from(format!(" {cause} • r restarts • q quits ")).red()
        }
    }
}
