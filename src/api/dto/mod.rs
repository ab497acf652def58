pub mod boards;
pub mod cards;

pub use boards::{CreateBoardRequest, UpdateBoardRequest};
pub use cards::{ChangeColumnRequest, ReorderRequest, UpdateContentRequest};
