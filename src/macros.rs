// src/macros.rs
#[macro_export]
macro_rules! s {
    // String shorthand!

    // Zero-arg → String::new()
    () => {
        ::std::string::String::new()
    };
    // Any single expression — works for literals, consts, or vars
    ($expr:expr) => {
        ::std::string::String::from($expr)
    };
}

/// Compile a static CSS selector. The pattern is a literal, so a parse
/// failure is a programming error, not a runtime condition.
#[macro_export]
macro_rules! sel {
    ($css:expr) => {
        ::scraper::Selector::parse($css).expect(concat!("static selector: ", $css))
    };
}
