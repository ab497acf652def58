pub mod card;
pub mod column;
pub mod error;
pub mod ordering;

pub use card::{Board, BoardWithCards, Card};
pub use column::Column;
pub use error::KanbanError;
