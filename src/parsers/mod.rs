pub mod date;
pub mod fields;
pub mod normalize;

pub use date::*;
pub use fields::*;
pub use normalize::*;

use html_escape::decode_html_entities;

/// Turn carriage returns and newlines into spaces, squeeze runs of spaces
/// and trim both ends.
pub fn clean_whitespace(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    let mut prev_space = false;

    for ch in text.chars() {
        let ch = if ch == '\r' || ch == '\n' { ' ' } else { ch };
        if ch == ' ' {
            if !prev_space {
                cleaned.push(' ');
            }
            prev_space = true;
        } else {
            cleaned.push(ch);
            prev_space = false;
        }
    }

    cleaned.trim().to_string()
}

/// Decode one level of HTML entities. Feed descriptions arrive encoded
/// twice, and the XML parser has already removed the outer level.
pub fn decode_entities_once(text: &str) -> String {
    decode_html_entities(text).into_owned()
}
