//! Built-in gate definitions.
//!
//! Each module exposes constructors returning validated gates. Serialized ids
//! are load-bearing: circuits saved with them must keep loading.

pub mod controls;
pub mod half_turn;
pub mod inputs;
pub mod multiplication;
pub mod post_selection;
pub mod quarter_turn;
pub mod spinning;
