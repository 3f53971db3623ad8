pub mod batch;
pub mod command;
pub mod config;
pub mod data;
pub mod homoglyph;
pub mod preprocess;
pub mod record;

#[cfg(test)]
mod it_db;

pub use preprocess::{
    collapse_whitespace, normalize, preprocess_batch, preprocess_text, strip_emoji,
    strip_special_characters,
};
