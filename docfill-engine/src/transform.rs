//! Text-case transforms applied to resolved values

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Text-case transform applied to a resolved replacement string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transform {
    /// Leave the value untouched
    #[default]
    None,
    /// Uppercase every character
    Uppercase,
    /// Lowercase every character
    Lowercase,
    /// Title-case each word; any non-alphabetic character is a boundary
    Capitalize,
    /// Uppercase only the first character, leave the rest unchanged
    Sentence,
}

impl Transform {
    /// Parse the wire code for a transform. Unrecognized codes fall back
    /// to `None`.
    pub fn parse(code: &str) -> Self {
        match code {
            "none" => Transform::None,
            "uppercase" => Transform::Uppercase,
            "lowercase" => Transform::Lowercase,
            "capitalize" => Transform::Capitalize,
            "sentence" => Transform::Sentence,
            _ => Transform::None,
        }
    }

    /// Wire code for this transform
    pub fn as_str(&self) -> &'static str {
        match self {
            Transform::None => "none",
            Transform::Uppercase => "uppercase",
            Transform::Lowercase => "lowercase",
            Transform::Capitalize => "capitalize",
            Transform::Sentence => "sentence",
        }
    }
}

impl Serialize for Transform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Transform {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(Transform::parse(&code))
    }
}

/// Apply a text-case transform.
///
/// `Capitalize` title-cases each word: the first letter after any
/// non-alphabetic character is uppercased, the rest of the word lowercased,
/// so hyphens and apostrophes start new words (`o'brien` → `O'Brien`).
/// `Sentence` uppercases only the first character of the whole string and
/// leaves everything else untouched. The asymmetry between the two is
/// intentional.
pub fn apply_transform(text: &str, transform: Transform) -> String {
    if text.is_empty() {
        return String::new();
    }
    match transform {
        Transform::None => text.to_string(),
        Transform::Uppercase => text.to_uppercase(),
        Transform::Lowercase => text.to_lowercase(),
        Transform::Capitalize => title_case(text),
        Transform::Sentence => sentence_case(text),
    }
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_letter = false;
    for ch in text.chars() {
        if !ch.is_alphabetic() {
            prev_is_letter = false;
            out.push(ch);
        } else if prev_is_letter {
            out.extend(ch.to_lowercase());
        } else {
            out.extend(ch.to_uppercase());
            prev_is_letter = true;
        }
    }
    out
}

fn sentence_case(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => {
            let mut out: String = first.to_uppercase().collect();
            out.push_str(chars.as_str());
            out
        }
        None => String::new(),
    }
}
