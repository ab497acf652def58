pub mod db;
pub mod transaction;

pub use transaction::{run_atomic, TxPolicy};
