pub mod api;
pub mod board;
pub mod error;
pub mod kanban;
pub mod models;
pub mod ops;
pub mod session;
pub mod store;

mod ids;

pub use board::{Column, DragState, Move, Partition};
pub use error::{CoreError, StoreError, ValidationError};
pub use kanban::Kanban;
pub use models::*;
pub use session::Session;
pub use store::{FileSlot, KeyValueSlot, MemorySlot};
