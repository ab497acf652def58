pub mod board_service;
pub mod card_service;

pub use board_service::BoardService;
pub use card_service::CardService;
