use crate::app::state::AppState;
use crate::ui::display::{DisplayAdapter, CELL_PX_H, CELL_PX_W};
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use ratatui::Frame;

/// Surface pixels per unit of bar height.
pub const BAR_PIXEL_SCALE: f64 = 6.0;
const BAR_MARGIN_PX: i64 = 2;
const BAR_GAP_PX: i64 = 4;

// partial top cell, in eighths of a cell (index 0 unused)
const EIGHTHS: [char; 8] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇'];

/// One bar in surface pixels, anchored to the bottom edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarRect {
    pub x: i64,
    pub y: f64,
    pub width: i64,
    pub height: f64,
}

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let bg = app.theme.color_background();
    let fg = app.theme.color_bar();
    f.render_widget(Block::default().style(Style::default().bg(bg)), area);

    let cols = area.width as usize;
    let rows = area.height as usize;
    if cols == 0 || rows == 0 {
        return;
    }

    let rects = bar_rects(&app.display, app.bars());
    let style = Style::default().fg(fg).bg(bg);
    let lines: Vec<Line> = rasterize(&rects, cols, rows)
        .into_iter()
        .map(|row| Line::from(Span::styled(row.into_iter().collect::<String>(), style)))
        .collect();

    f.render_widget(Paragraph::new(lines), area);
}

/// Geometry of every active band: each gets an equal slot of the width with a
/// 2 px margin on the left and 4 px trimmed off its width.
pub fn bar_rects(display: &DisplayAdapter, bars: &[f64]) -> Vec<BarRect> {
    let bands = display.bands();
    if bands == 0 {
        return Vec::new();
    }

    let slot = i64::from(display.width()) / bands as i64;
    let surface_h = f64::from(display.height());
    bars.iter()
        .take(bands)
        .enumerate()
        .map(|(i, &bar)| {
            let height = bar * BAR_PIXEL_SCALE;
            BarRect {
                x: slot * i as i64 + BAR_MARGIN_PX,
                y: surface_h - height,
                width: slot - BAR_GAP_PX,
                height,
            }
        })
        .collect()
}

/// Paints bar rectangles onto a `rows` x `cols` cell grid, top row first.
pub fn rasterize(rects: &[BarRect], cols: usize, rows: usize) -> Vec<Vec<char>> {
    let mut grid = vec![vec![' '; cols]; rows];

    for r in rects {
        if r.width <= 0 || r.height <= 0.0 {
            continue;
        }
        let eighths = ((r.height * 8.0 / f64::from(CELL_PX_H)).round() as usize).min(rows * 8);
        if eighths == 0 {
            continue;
        }
        let (full, partial) = (eighths / 8, eighths % 8);

        for col in bar_columns(r.x, r.x + r.width) {
            let Ok(col) = usize::try_from(col) else {
                continue;
            };
            if col >= cols {
                continue;
            }
            for y in 0..full {
                grid[rows - 1 - y][col] = '█';
            }
            if partial > 0 {
                grid[rows - 1 - full][col] = EIGHTHS[partial];
            }
        }
    }

    grid
}

/// Cells whose center falls inside `[x0, x1)`. A bar narrower than a cell
/// still gets the cell under its midpoint.
fn bar_columns(x0: i64, x1: i64) -> Vec<i64> {
    let cell_w = i64::from(CELL_PX_W);
    let first = x0.div_euclid(cell_w);
    let last = (x1 - 1).div_euclid(cell_w);
    let lit: Vec<i64> = (first..=last)
        .filter(|c| {
            let center = c * cell_w + cell_w / 2;
            center >= x0 && center < x1
        })
        .collect();

    if lit.is_empty() {
        vec![((x0 + x1 - 1) / 2).div_euclid(cell_w)]
    } else {
        lit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn display(width: u32, height: u32) -> DisplayAdapter {
        let mut d = DisplayAdapter::new();
        d.on_resize(width, height);
        d
    }

    #[test]
    fn geometry_follows_slot_formula() {
        let d = display(800, 300);
        let bars = vec![1.0; 120];
        let rects = bar_rects(&d, &bars);

        assert_eq!(rects.len(), 100);
        assert_eq!(rects[0], BarRect { x: 2, y: 294.0, width: 4, height: 6.0 });
        assert_eq!(rects[10].x, 82);
        assert_eq!(rects[99].x, 8 * 99 + 2);
    }

    #[test]
    fn narrow_surface_shrinks_bars() {
        // 50 px clamps to 12 bands: slot 4, bar width 0
        let d = display(50, 100);
        let rects = bar_rects(&d, &[5.0; 12]);
        assert_eq!(rects.len(), 12);
        assert!(rects.iter().all(|r| r.width == 0));
        assert!(rasterize(&rects, 12, 12).iter().flatten().all(|&c| c == ' '));
    }

    #[test]
    fn no_surface_no_bars() {
        assert!(bar_rects(&DisplayAdapter::new(), &[1.0; 12]).is_empty());
    }

    #[test]
    fn bars_land_on_alternate_cells() {
        let d = display(800, 240);
        let mut bars = vec![0.0; 100];
        bars[0] = 32.0;
        bars[1] = 2.0;
        let grid = rasterize(&bar_rects(&d, &bars), 200, 30);

        // 32 * 6 = 192 px = 24 full rows
        for row in 6..30 {
            assert_eq!(grid[row][0], '█');
            assert_eq!(grid[row][1], ' ');
        }
        assert_eq!(grid[5][0], ' ');

        // 2 * 6 = 12 px = one full row plus half a cell
        assert_eq!(grid[29][2], '█');
        assert_eq!(grid[28][2], '▄');
        assert_eq!(grid[27][2], ' ');
    }

    #[test]
    fn tall_bars_are_clipped() {
        let rects = [BarRect { x: 2, y: -100.0, width: 4, height: 400.0 }];
        let grid = rasterize(&rects, 4, 3);
        assert!(grid.iter().all(|row| row[0] == '█'));
    }

    #[test]
    fn sub_cell_bar_uses_midpoint() {
        assert_eq!(bar_columns(8, 10), vec![2]);
        assert_eq!(bar_columns(2, 6), vec![0]);
        assert_eq!(bar_columns(2, 14), vec![0, 1, 2]);
    }
}
