pub mod components;
pub mod layout;
pub mod screens;
pub mod theme;

use rust_i18n::t;

/// Translate a key built at runtime, such as `mode.practice`.
pub fn tr(key: &str) -> String {
    t!(key).to_string()
}
