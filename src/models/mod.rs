pub mod enums;
pub mod notification;

pub use notification::*;
