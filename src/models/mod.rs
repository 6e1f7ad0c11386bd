pub mod company;
pub mod event;
pub mod registration;
pub mod row;

pub use company::*;
pub use event::*;
pub use registration::*;
