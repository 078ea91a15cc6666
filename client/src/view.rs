//! Render-facing snapshot of a session: piece layout, move highlights, and
//! recently fired beams.

use game_core::{BeamSegment, Piece, Pos, TileKind};

/// How long a fired beam stays on screen.
pub const BEAM_DISPLAY_MS: u64 = 1000;

/// One beam segment with the clock reading when it appeared.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedSegment {
    pub segment: BeamSegment,
    pub shown_at_ms: u64,
}

impl TimedSegment {
    pub fn visible_at(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.shown_at_ms) < BEAM_DISPLAY_MS
    }
}

/// Everything a renderer needs for one frame. `flip_view` asks the renderer
/// to draw the board rotated so the player's own pieces sit at the bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub width: u8,
    pub height: u8,
    pub tiles: Vec<TileKind>,
    pub pieces: Vec<Piece>,
    pub highlights: Vec<Pos>,
    pub beams: Vec<BeamSegment>,
    pub flip_view: bool,
}
