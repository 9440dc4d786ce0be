/// Honeycomb placement of cards on the board
use crate::viewport::Vec2;

pub const COLUMNS: usize = 5;
pub const CARD_WIDTH: f64 = 304.0;
pub const CARD_HEIGHT: f64 = 400.0;

/// Card geometry used to lay out a board.
///
/// Odd rows are shifted right by half of `spacing_x`, and rows overlap
/// vertically by a quarter card, which gives the staggered hex look.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexLayout {
    pub card_width: f64,
    pub card_height: f64,
    pub spacing_x: f64,
}

impl Default for HexLayout {
    fn default() -> Self {
        HexLayout {
            card_width: CARD_WIDTH,
            card_height: CARD_HEIGHT,
            spacing_x: CARD_WIDTH * 0.85,
        }
    }
}

impl HexLayout {
    /// Top-left position of the card at zero-based `index`
    pub fn position(&self, index: usize) -> Vec2 {
        let row = index / COLUMNS;
        let column = index % COLUMNS;
        let stagger = if row % 2 == 1 { self.spacing_x / 2.0 } else { 0.0 };

        Vec2 {
            x: column as f64 * (self.card_width * 0.85) + stagger,
            y: row as f64 * (self.card_height * 0.75),
        }
    }

    /// Width and height of the area covered by `count` cards
    pub fn extent(&self, count: usize) -> Vec2 {
        if count == 0 {
            return Vec2::ZERO;
        }
        (0..count)
            .map(|i| self.position(i))
            .fold(Vec2::ZERO, |acc, p| Vec2 {
                x: acc.x.max(p.x + self.card_width),
                y: acc.y.max(p.y + self.card_height),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_row() {
        let layout = HexLayout::default();
        assert_eq!(layout.position(0), Vec2::new(0.0, 0.0));
        assert_eq!(layout.position(1), Vec2::new(CARD_WIDTH * 0.85, 0.0));
        assert_eq!(layout.position(4), Vec2::new(4.0 * (CARD_WIDTH * 0.85), 0.0));
    }

    #[test]
    fn test_odd_rows_are_staggered() {
        let layout = HexLayout {
            card_width: 100.0,
            card_height: 200.0,
            spacing_x: 60.0,
        };
        assert_eq!(layout.position(5), Vec2::new(30.0, 150.0));
        assert_eq!(layout.position(7), Vec2::new(200.0, 150.0));
        // even row: no stagger
        assert_eq!(layout.position(10), Vec2::new(0.0, 300.0));
        assert_eq!(layout.position(16), Vec2::new(115.0, 450.0));
    }

    #[test]
    fn test_position_is_deterministic() {
        let layout = HexLayout::default();
        for index in 0..50 {
            assert_eq!(layout.position(index), layout.position(index));
            assert_eq!(layout.position(index), HexLayout::default().position(index));
        }
    }

    #[test]
    fn test_extent() {
        let layout = HexLayout {
            card_width: 100.0,
            card_height: 200.0,
            spacing_x: 60.0,
        };
        assert_eq!(layout.extent(0), Vec2::ZERO);
        assert_eq!(layout.extent(1), Vec2::new(100.0, 200.0));
        assert_eq!(layout.extent(6), Vec2::new(440.0, 350.0));
    }
}
