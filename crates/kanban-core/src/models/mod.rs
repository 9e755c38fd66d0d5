mod comment;
mod goal;
mod task;
mod user;

pub use comment::*;
pub use goal::*;
pub use task::*;
pub use user::*;
