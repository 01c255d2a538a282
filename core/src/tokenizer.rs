use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"[\p{L}\p{N}_]+").expect("valid regex");
}

/// Lazily split `text` into lowercase word tokens.
///
/// A token is a maximal run of letters, digits and underscores; everything
/// else is a delimiter. The iterator borrows a lowercased copy of the input, so
/// callers that need to walk the tokens twice should collect them or call
/// `Tokens::iter` again.
pub fn tokenize(text: &str) -> Tokens {
    Tokens { buffer: text.to_lowercase() }
}

/// Lowercased text ready to be iterated as tokens.
pub struct Tokens {
    buffer: String,
}

impl Tokens {
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        WORD.find_iter(&self.buffer).map(|m| m.as_str())
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.iter().map(str::to_string).collect()
    }
}
