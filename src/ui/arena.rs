use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};
use tapr::game::{Arena, Point, TargetView};

/// Arena pixels covered by one terminal cell. Cells are roughly twice as
/// tall as they are wide, so circles stay round on screen.
pub const CELL_WIDTH: f64 = 8.0;
pub const CELL_HEIGHT: f64 = 16.0;

pub fn arena_for(rect: Rect) -> Arena {
    Arena {
        width: rect.width as f64 * CELL_WIDTH,
        height: rect.height as f64 * CELL_HEIGHT,
    }
}

/// Arena point at the center of a terminal cell, if the cell is inside `rect`
pub fn cell_center(rect: Rect, column: u16, row: u16) -> Option<Point> {
    if column < rect.left() || column >= rect.right() || row < rect.top() || row >= rect.bottom()
    {
        return None;
    }
    Some(Point::new(
        (column - rect.x) as f64 * CELL_WIDTH + CELL_WIDTH / 2.0,
        (row - rect.y) as f64 * CELL_HEIGHT + CELL_HEIGHT / 2.0,
    ))
}

/// Paints live targets, later spawns on top
pub struct ArenaWidget<'a> {
    targets: &'a [TargetView],
}

impl<'a> ArenaWidget<'a> {
    pub fn new(targets: &'a [TargetView]) -> Self {
        Self { targets }
    }
}

impl Widget for ArenaWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let pending = Style::default().fg(Color::Red).add_modifier(Modifier::BOLD);
        let hit = Style::default().fg(Color::Green).add_modifier(Modifier::BOLD);

        for row in area.top()..area.bottom() {
            for column in area.left()..area.right() {
                let Some(p) = cell_center(area, column, row) else {
                    continue;
                };
                let Some(target) = self.targets.iter().rev().find(|t| t.contains(p)) else {
                    continue;
                };
                if let Some(cell) = buf.cell_mut((column, row)) {
                    if target.hit {
                        cell.set_symbol("░");
                        cell.set_style(hit);
                    } else {
                        cell.set_symbol("█");
                        cell.set_style(pending);
                    }
                }
            }
        }
    }
}
