//! Naming helpers used to derive collection names and routes from type names.

/// Lowercases the first character.
pub fn lower_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

const fn is_vowel(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')
}

/// English plural of a noun.
///
/// Unchanged when it already ends in `s`, `y` after a consonant becomes
/// `ies`, anything else gets an `s`.
pub fn plural(noun: &str) -> String {
    let chars: Vec<char> = noun.chars().collect();
    if chars.len() < 2 {
        return format!("{noun}s");
    }
    let last = chars[chars.len() - 1];
    let before_last = chars[chars.len() - 2];
    if last == 's' {
        noun.to_string()
    } else if last == 'y' && !is_vowel(before_last) {
        let stem: String = chars[..chars.len() - 1].iter().collect();
        format!("{stem}ies")
    } else {
        format!("{noun}s")
    }
}

/// `ImageGenerations` to `image-generations`.
///
/// A hyphen goes only between a lowercase ASCII letter and the uppercase
/// ASCII letter after it, so acronyms and digits stay joined to their
/// neighbours: `HTTPServer` becomes `httpserver`.
pub fn camel_to_kebab(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    let mut previous: Option<char> = None;
    for c in text.chars() {
        if c.is_ascii_uppercase() && previous.is_some_and(|p| p.is_ascii_lowercase()) {
            out.push('-');
        }
        out.extend(c.to_lowercase());
        previous = Some(c);
    }
    out
}
