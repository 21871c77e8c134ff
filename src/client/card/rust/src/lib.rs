/* src/client/card/rust/src/lib.rs */

mod card;
pub mod escape;
pub mod format;

pub use card::{CARD_CLASS, render_card};
pub use escape::escape_html;
