mod card;
mod event;
mod raw;
mod result;

pub use card::*;
pub use event::*;
pub use raw::*;
pub use result::*;
