pub mod clubs;
mod columns;
pub mod connection;
pub mod leagues;
pub mod matches;
pub mod multiplayer;
pub mod participants;
pub mod ratings;
pub mod setup;
pub mod stages;
pub mod tournaments;
pub mod transaction;

pub use connection::{DbConn, DbPool, create_memory_pool, create_pool, get_connection};
pub use transaction::in_transaction;
