//! Request bodies for the remote profile/goal service.

mod goals;
mod profiles;

pub use goals::*;
pub use profiles::*;
