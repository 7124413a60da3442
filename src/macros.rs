// src/macros.rs
#[macro_export]
macro_rules! s {
    // String shorthand!

    // Zero-arg → String::new()
    () => {
        ::std::string::String::new()
    };
    // Any single expression: literals, consts or vars
    ($expr:expr) => {
        ::std::string::String::from($expr)
    };
}

/// Month sequence shorthand for fixtures and tests.
///
/// `months![Oct, Nov, Dec]` → `vec![Month::Oct, Month::Nov, Month::Dec]`
#[macro_export]
macro_rules! months {
    ($($m:ident),* $(,)?) => {
        ::std::vec![$($crate::core::parse::Month::$m),*]
    };
}
