pub mod keyboards;
pub mod messages;

pub use messages::{get_text, Lang};
