// src/scrape/mod.rs
pub mod boxscore;
pub mod game;
pub mod pitches;
pub mod player;
pub mod schedule;

use scraper::ElementRef;

/// Concatenated text content of an element, trimmed. Interior whitespace
/// is preserved; outcome tokens like "死　球" are whitespace-sensitive.
pub(crate) fn text_of(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Document `<title>` text, when present.
pub(crate) fn title_of(doc: &scraper::Html) -> Option<String> {
    let title = sel!("title");
    doc.select(&title).next().map(text_of)
}
