//! Rendering layer — all terminal output lives here.
//!
//! Each function receives a mutable writer and an immutable view of the
//! session.  No game logic is performed; this module only translates state
//! into terminal commands.  Field pixels are scaled onto the cells left
//! between the HUD and the hint row.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use duel_shooter::entities::{Player, PlayerColor, PlayerId, Projectile};
use duel_shooter::session::{DropStage, Phase, Session};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HEALTH_HI: Color = Color::Red;
const C_HEALTH_LO: Color = Color::DarkRed;
const C_SHIELD_HI: Color = Color::Cyan;
const C_SHIELD_LO: Color = Color::DarkCyan;
const C_BAR_EMPTY: Color = Color::DarkGrey;
const C_SHIELD_RING: Color = Color::Cyan;
const C_PROJECTILE: Color = Color::Yellow;
const C_HINT: Color = Color::DarkGrey;
const C_OVERLAY: Color = Color::White;

/// Rows taken by the bars and names above the field.
const HUD_ROWS: u16 = 3;
const BAR_CELLS: u16 = 20;

fn player_color(color: PlayerColor) -> Color {
    match color {
        PlayerColor::Blue => Color::Blue,
        PlayerColor::Red => Color::Red,
    }
}

// ── Layout ────────────────────────────────────────────────────────────────────

/// Where the field sits on screen and how pixels map to cells.
#[derive(Clone, Copy, Debug)]
struct Layout {
    cols: u16,
    rows: u16,
    /// Top-left cell inside the border.
    left: u16,
    top: u16,
    inner_cols: u16,
    inner_rows: u16,
    scale_x: f32,
    scale_y: f32,
}

impl Layout {
    fn new(cols: u16, rows: u16, field_w: f32, field_h: f32) -> Self {
        let inner_cols = cols.saturating_sub(2).max(1);
        // HUD + top border + bottom border + hint row
        let inner_rows = rows.saturating_sub(HUD_ROWS + 3).max(1);
        Self {
            cols,
            rows,
            left: 1,
            top: HUD_ROWS + 1,
            inner_cols,
            inner_rows,
            scale_x: inner_cols as f32 / field_w,
            scale_y: inner_rows as f32 / field_h,
        }
    }

    /// Screen cell for a field point, or `None` when it falls outside the field.
    fn cell(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        let cx = (x * self.scale_x).floor();
        let cy = (y * self.scale_y).floor();
        if cx < 0.0 || cy < 0.0 {
            return None;
        }
        let (cx, cy) = (cx as u16, cy as u16);
        if cx >= self.inner_cols || cy >= self.inner_rows {
            return None;
        }
        Some((self.left + cx, self.top + cy))
    }

    fn center_col(&self, text: &str) -> u16 {
        (self.cols / 2).saturating_sub(text.chars().count() as u16 / 2)
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, session: &Session, volume: f32) -> std::io::Result<()> {
    let (cols, rows) = terminal::size()?;
    let arena = session.arena();
    let layout = Layout::new(cols, rows, arena.width, arena.height);

    out.queue(terminal::Clear(terminal::ClearType::All))?;

    match session.phase() {
        Phase::Idle => draw_start_screen(out, &layout)?,
        phase => {
            draw_border(out, &layout)?;
            draw_hud(out, session, &layout)?;
            for shot in &arena.projectiles {
                draw_projectile(out, shot, &layout)?;
            }
            draw_player(out, &arena.player1, &layout)?;
            draw_player(out, &arena.player2, &layout)?;

            match phase {
                _ if session.is_paused() => draw_pause(out, &layout)?,
                Phase::Dropping(DropStage::Briefing { .. }) => {
                    draw_instructions(out, session, &layout)?
                }
                Phase::GameOver { .. } => draw_game_over(out, session, &layout)?,
                _ => {}
            }
        }
    }

    draw_controls_hint(out, &layout, volume)?;

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, layout.rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, layout: &Layout) -> std::io::Result<()> {
    let w = layout.inner_cols as usize;
    let top = layout.top - 1;
    let bottom = layout.top + layout.inner_rows;

    out.queue(style::SetForegroundColor(C_BORDER))?;
    out.queue(cursor::MoveTo(0, top))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w))))?;
    out.queue(cursor::MoveTo(0, bottom))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w))))?;

    for row in layout.top..bottom {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(layout.left + layout.inner_cols, row))?;
        out.queue(Print("│"))?;
    }
    Ok(())
}

// ── HUD (rows 0..HUD_ROWS) ────────────────────────────────────────────────────

/// A bar filled to `value` percent, brighter in its first half.
fn draw_bar<W: Write>(
    out: &mut W,
    col: u16,
    row: u16,
    label: &str,
    value: u8,
    (hi, lo): (Color, Color),
) -> std::io::Result<()> {
    let filled = (u16::from(value) * BAR_CELLS + 50) / 100;
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print(format!("{label:<7}")))?;
    for i in 0..BAR_CELLS {
        let color = if i >= filled {
            C_BAR_EMPTY
        } else if i < BAR_CELLS / 2 {
            hi
        } else {
            lo
        };
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(if i < filled { "█" } else { "░" }))?;
    }
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print(format!(" {value:>3}%")))?;
    Ok(())
}

fn draw_hud<W: Write>(out: &mut W, session: &Session, layout: &Layout) -> std::io::Result<()> {
    // label + bar + " 100%"
    let block = 7 + BAR_CELLS + 5;
    let columns = [
        (PlayerId::Player1, 1),
        (PlayerId::Player2, layout.cols.saturating_sub(block + 1)),
    ];
    for (id, col) in columns {
        let p = session.arena().player(id);
        draw_bar(out, col, 0, "Health", p.health, (C_HEALTH_HI, C_HEALTH_LO))?;
        draw_bar(out, col, 1, "Shield", p.shield, (C_SHIELD_HI, C_SHIELD_LO))?;

        let tag = format!("■ {}  [{}]", session.name(id), session.score(id));
        out.queue(cursor::MoveTo(col, 2))?;
        out.queue(style::SetForegroundColor(player_color(p.color)))?;
        out.queue(Print(tag))?;
    }
    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_player<W: Write>(out: &mut W, p: &Player, layout: &Layout) -> std::io::Result<()> {
    // Only the part below the top edge shows while dropping in
    let visible_h = p.height + p.y.min(0.0);
    if visible_h <= 0.0 {
        return Ok(());
    }
    let cells_w = ((p.width * layout.scale_x).round() as i32).max(1);
    let cells_h = ((visible_h * layout.scale_y).round() as i32).max(1);
    let Some((col0, row0)) = layout.cell(p.x.max(0.0), p.y.max(0.0)) else {
        return Ok(());
    };

    out.queue(style::SetForegroundColor(player_color(p.color)))?;
    let max_col = layout.left + layout.inner_cols;
    let max_row = layout.top + layout.inner_rows;
    for dy in 0..cells_h {
        let row = row0 as i32 + dy;
        if row >= max_row as i32 {
            break;
        }
        let width = (cells_w).min(max_col as i32 - col0 as i32).max(0) as usize;
        out.queue(cursor::MoveTo(col0, row as u16))?;
        out.queue(Print("█".repeat(width)))?;
    }

    if p.shield_active {
        draw_shield_ring(out, col0, row0, cells_w, cells_h, layout)?;
    }
    Ok(())
}

/// Outline one cell outside the fighter's box.
fn draw_shield_ring<W: Write>(
    out: &mut W,
    col0: u16,
    row0: u16,
    cells_w: i32,
    cells_h: i32,
    layout: &Layout,
) -> std::io::Result<()> {
    let left = col0 as i32 - 1;
    let right = col0 as i32 + cells_w;
    let top = row0 as i32 - 1;
    let bottom = row0 as i32 + cells_h;
    let in_field = |c: i32, r: i32| {
        c >= layout.left as i32
            && c < (layout.left + layout.inner_cols) as i32
            && r >= layout.top as i32
            && r < (layout.top + layout.inner_rows) as i32
    };

    out.queue(style::SetForegroundColor(C_SHIELD_RING))?;
    for c in left..=right {
        for r in [top, bottom] {
            if in_field(c, r) {
                out.queue(cursor::MoveTo(c as u16, r as u16))?;
                out.queue(Print("·"))?;
            }
        }
    }
    for r in top + 1..bottom {
        for c in [left, right] {
            if in_field(c, r) {
                out.queue(cursor::MoveTo(c as u16, r as u16))?;
                out.queue(Print("·"))?;
            }
        }
    }
    Ok(())
}

fn draw_projectile<W: Write>(out: &mut W, shot: &Projectile, layout: &Layout) -> std::io::Result<()> {
    if let Some((col, row)) = layout.cell(shot.x, shot.y) {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(C_PROJECTILE))?;
        out.queue(Print("●"))?;
    }
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_lines<W: Write>(
    out: &mut W,
    layout: &Layout,
    lines: &[(&str, Color)],
) -> std::io::Result<()> {
    let start_row = (layout.rows / 2).saturating_sub(lines.len() as u16 / 2);
    for (i, (msg, color)) in lines.iter().enumerate() {
        out.queue(cursor::MoveTo(layout.center_col(msg), start_row + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }
    Ok(())
}

fn draw_start_screen<W: Write>(out: &mut W, layout: &Layout) -> std::io::Result<()> {
    draw_lines(
        out,
        layout,
        &[
            ("★  DUEL  ★", Color::Cyan),
            ("", C_OVERLAY),
            ("ENTER - Start   ESC - Quit", C_OVERLAY),
        ],
    )
}

fn draw_instructions<W: Write>(
    out: &mut W,
    session: &Session,
    layout: &Layout,
) -> std::io::Result<()> {
    let p1 = format!("{}: W A S D move · SPACE fire · Q shield", session.name(PlayerId::Player1));
    let p2 = format!("{}: ← ↑ ↓ → move · ENTER fire · M shield", session.name(PlayerId::Player2));
    draw_lines(
        out,
        layout,
        &[
            (p1.as_str(), Color::Blue),
            (p2.as_str(), Color::Red),
            ("P - Pause", C_OVERLAY),
        ],
    )
}

fn draw_pause<W: Write>(out: &mut W, layout: &Layout) -> std::io::Result<()> {
    draw_lines(
        out,
        layout,
        &[
            ("╔════════════╗", C_OVERLAY),
            ("║   PAUSED   ║", C_OVERLAY),
            ("╚════════════╝", C_OVERLAY),
            ("P - Resume   R - Restart", C_HINT),
        ],
    )
}

fn draw_game_over<W: Write>(
    out: &mut W,
    session: &Session,
    layout: &Layout,
) -> std::io::Result<()> {
    let winner = format!("{} wins!", session.winner_name().unwrap_or_default());
    draw_lines(
        out,
        layout,
        &[
            ("╔════════════════════╗", Color::Red),
            ("║    GAME  OVER      ║", Color::Red),
            ("╚════════════════════╝", Color::Red),
            (winner.as_str(), Color::Yellow),
            ("Y - Play Again  R - Restart  ESC - Quit", C_OVERLAY),
        ],
    )
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, layout: &Layout, volume: f32) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, layout.rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(format!(
        "P : Pause   R : Restart   + / - : Volume {:>3}%   ESC : Quit",
        (volume * 100.0).round() as u32
    )))?;
    Ok(())
}
