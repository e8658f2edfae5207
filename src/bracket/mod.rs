pub mod layout;
pub mod positions;

pub use layout::{BracketSlot, first_round_pairings, reorder_for_bracket};
pub use positions::{bracket_positions, bracket_size_for, check_bracket_size, is_power_of_two};
