use crate::grid::Grid;

/// Predefined patterns for seeding the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// A small oscillator
    Blinker,
    /// A small oscillator
    Toad,
    /// A small stationary pattern
    Block,
    /// A diagonal spaceship
    Glider,
    /// A horizontal spaceship
    LightweightSpaceship,
    /// A pattern that grows indefinitely
    GosperGliderGun,
}

impl Pattern {
    pub const ALL: [Pattern; 6] = [
        Pattern::Block,
        Pattern::Blinker,
        Pattern::Toad,
        Pattern::Glider,
        Pattern::LightweightSpaceship,
        Pattern::GosperGliderGun,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Pattern::Blinker => "Blinker",
            Pattern::Toad => "Toad",
            Pattern::Block => "Block",
            Pattern::Glider => "Glider",
            Pattern::LightweightSpaceship => "Lightweight spaceship",
            Pattern::GosperGliderGun => "Gosper glider gun",
        }
    }

    /// Live cells relative to the pattern's top-left anchor
    pub fn offsets(&self) -> &'static [(i64, i64)] {
        match self {
            Pattern::Blinker => &[(0, 0), (0, 1), (0, 2)],
            Pattern::Toad => &[
                (1, 0), (2, 0), (3, 0),
                (0, 1), (1, 1), (2, 1),
            ],
            Pattern::Block => &[
                (0, 0), (1, 0),
                (0, 1), (1, 1),
            ],
            Pattern::Glider => &[
                (0, 1),
                (1, 2),
                (2, 0), (2, 1), (2, 2),
            ],
            Pattern::LightweightSpaceship => &[
                (0, 1), (0, 3),
                (1, 0),
                (2, 0),
                (3, 0), (3, 3),
                (4, 0), (4, 1), (4, 2),
            ],
            Pattern::GosperGliderGun => &[
                // Left block
                (1, 5), (1, 6),
                (2, 5), (2, 6),

                // Left ship
                (11, 5), (11, 6), (11, 7),
                (12, 4), (12, 8),
                (13, 3), (13, 9),
                (14, 3), (14, 9),
                (15, 6),
                (16, 4), (16, 8),
                (17, 5), (17, 6), (17, 7),
                (18, 6),

                // Right ship
                (21, 3), (21, 4), (21, 5),
                (22, 3), (22, 4), (22, 5),
                (23, 2), (23, 6),
                (25, 1), (25, 2), (25, 6), (25, 7),

                // Right block
                (35, 3), (35, 4),
                (36, 3), (36, 4),
            ],
        }
    }

    /// Set the pattern's cells alive with its anchor at `(x, y)`.
    /// Cells past an edge wrap around like every other grid access.
    pub fn stamp(&self, grid: &mut Grid, x: i64, y: i64) {
        for &(dx, dy) in self.offsets() {
            grid.set(x + dx, y + dy, true);
        }
    }
}
