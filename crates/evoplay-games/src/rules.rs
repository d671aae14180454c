//! Human-readable rule text, served to front-ends and agents as-is.

use evoplay_types::GameKind;

/// Rules for 2048.
pub const RULES_2048: &str = "2048 Game Rules

OBJECTIVE:
The goal is to slide numbered tiles on a grid (4x4 by default; the board in the state shows the actual size) to combine them and create a tile with the number 2048. You win when you reach 2048, but you can continue playing to achieve higher scores.

GAMEPLAY:
- You start with an otherwise empty grid containing two tiles (either 2 or 4).
- On each turn, you slide all tiles in one of four directions: up, down, left, or right.
- When you slide, all tiles move as far as possible in that direction until they hit the edge or another tile.
- If two tiles with the same number collide while moving, they merge into a single tile with double the value.
- A tile produced by a merge does not merge again in the same move: [2,2,2,2] slid left becomes [4,4,0,0].
- After each move, a new tile (either 2 with 90% probability or 4 with 10% probability) appears in a random empty cell.

AVAILABLE ACTIONS:
You can choose one of four directions:
- \"up\": Slide all tiles upward
- \"down\": Slide all tiles downward
- \"left\": Slide all tiles to the left
- \"right\": Slide all tiles to the right

Note: Only actions that would actually change the board state are valid. If a direction would not move any tiles, that action is not available.

GAME OVER CONDITIONS:
The game ends when:
1. The board is completely filled with tiles, AND
2. No valid moves are possible (no tiles can merge in any direction)

When the game is over, you cannot make any more moves. Your final score is the sum of all merged tile values.";

/// Rules for `MergeFall`.
pub const RULES_MERGEFALL: &str = "MergeFall Game Rules

OBJECTIVE:
Drop numbered tiles into a well (5 columns by 6 rows by default; the state reports the actual width and height) and chain merges to score as many points as possible before the well overflows.

GAMEPLAY:
- Each turn you drop the shown next tile into a column. It falls to the lowest empty cell and becomes the active tile.
- Gravity: every tile falls straight down until it rests on the floor or another tile.
- Absorption: if the active tile has any orthogonal neighbour (up, down, left, right) with the same value, it absorbs all of them at once. Absorbing k neighbours multiplies its value by the smallest power of two that is at least k + 1 (one neighbour doubles it, two or three quadruple it, four multiply it by eight).
- Each absorption is one combo step. After an absorption gravity is applied again and the active tile may find new equal neighbours, continuing the chain.
- The turn ends when the active tile has no equal neighbour.

SCORING:
- Points for a turn = final value of the active tile x number of combo steps.
- A drop that merges nothing scores 0 and the tile simply stays where it landed.

NEXT TILE:
- The next tile is a power of two between 2 and the largest tile on the board, biased towards mid-range values. Tiles that would trivially extend your largest tile are rare.

AVAILABLE ACTIONS:
- \"drop <column>\" with column between 0 and width - 1 (for example \"drop 0\"). A bare column number such as \"3\" is also accepted. The state's valid_actions lists every column of the current well.

GAME OVER CONDITIONS:
The well has a hidden row above the visible area. The game ends when, after a drop has fully resolved, any tile is left in that hidden row. A drop into a full column is fine as long as its merges make room.";

/// Rule text for `kind`.
pub const fn rules_for(kind: GameKind) -> &'static str {
    match kind {
        GameKind::Game2048 => RULES_2048,
        GameKind::MergeFall => RULES_MERGEFALL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_sizes_are_described_as_defaults() {
        assert!(RULES_2048.contains("4x4 by default"));
        assert!(!RULES_2048.contains("start with a 4x4"));
        assert!(RULES_MERGEFALL.contains("5 columns by 6 rows by default"));
        assert!(RULES_MERGEFALL.contains("between 0 and width - 1"));
        assert!(!RULES_MERGEFALL.contains("between 0 and 4"));
    }
}
