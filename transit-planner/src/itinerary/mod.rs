//! Itinerary composer: raw search steps to numbered display instructions.

mod compose;
mod instruction;

pub use compose::{ComposedItinerary, compose};
pub use instruction::{Instruction, InstructionKind};
