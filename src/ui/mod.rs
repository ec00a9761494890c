/// UI module exports
pub mod popup;

mod categories;
mod range;
mod table;
