//! Fixed-format 80-byte header records.
//!
//! Layout of a value card:
//!
//! ```text
//! bytes 1-8    keyword, left-justified, space padded
//! bytes 9-10   "= "
//! bytes 11-30  value, right-justified
//! bytes 31-    optional " / comment"
//! ```
//!
//! The line is space padded or truncated to exactly 80 bytes. `END` has
//! no value indicator, value or comment.

use super::ArchiveError;

/// Length of one header card in bytes.
pub const CARD_LEN: usize = 80;

const KEYWORD_LEN: usize = 8;
const VALUE_LEN: usize = 20;
const MIN_STRING_LEN: usize = 8;
const END_KEYWORD: &str = "END";

/// A typed card value.
#[derive(Debug, Clone, PartialEq)]
pub enum CardValue {
    /// Rendered as `T` or `F`.
    Logical(bool),
    /// Rendered as decimal text.
    Integer(i64),
    /// Rendered as the shortest decimal text that round-trips.
    Real(f64),
    /// Rendered quoted, inner text padded to at least 8 characters.
    Text(String),
}

impl CardValue {
    /// Returns the value as an integer, if it is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            CardValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a float, accepting integers.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            CardValue::Real(r) => Some(*r),
            CardValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Returns the unquoted, right-trimmed text of a string value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CardValue::Text(s) => Some(s.trim_end()),
            _ => None,
        }
    }

    /// Returns the value as a boolean, if it is one.
    pub fn as_logical(&self) -> Option<bool> {
        match self {
            CardValue::Logical(b) => Some(*b),
            _ => None,
        }
    }

    fn render(&self) -> String {
        match self {
            CardValue::Logical(true) => "T".to_string(),
            CardValue::Logical(false) => "F".to_string(),
            CardValue::Integer(i) => i.to_string(),
            CardValue::Real(r) => r.to_string(),
            CardValue::Text(s) => {
                let escaped = ascii_only(s).replace('\'', "''");
                format!("'{:<width$}'", escaped, width = MIN_STRING_LEN)
            }
        }
    }
}

/// One header record.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCard {
    keyword: String,
    value: Option<CardValue>,
    comment: Option<String>,
}

impl HeaderCard {
    /// Creates a value card.
    pub fn new(keyword: &str, value: CardValue, comment: Option<&str>) -> Self {
        Self {
            keyword: keyword.to_string(),
            value: Some(value),
            comment: comment.map(str::to_string),
        }
    }

    /// Creates the terminating `END` card.
    pub fn end() -> Self {
        Self {
            keyword: END_KEYWORD.to_string(),
            value: None,
            comment: None,
        }
    }

    /// Returns the keyword.
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Returns the value; `None` only for `END` and commentary cards.
    pub fn value(&self) -> Option<&CardValue> {
        self.value.as_ref()
    }

    /// Returns the comment text.
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Returns true for the terminating card.
    pub fn is_end(&self) -> bool {
        self.keyword == END_KEYWORD
    }

    /// Renders the card to exactly [`CARD_LEN`] ASCII bytes.
    pub fn render(&self) -> [u8; CARD_LEN] {
        let keyword: String = ascii_only(&self.keyword).chars().take(KEYWORD_LEN).collect();

        let line = match &self.value {
            None => keyword,
            Some(value) => {
                let mut line = format!(
                    "{:<kw$}= {:>val$}",
                    keyword,
                    value.render(),
                    kw = KEYWORD_LEN,
                    val = VALUE_LEN
                );
                if let Some(comment) = &self.comment {
                    line.push_str(" / ");
                    line.push_str(&ascii_only(comment));
                }
                line
            }
        };

        let mut card = [b' '; CARD_LEN];
        for (dst, src) in card.iter_mut().zip(line.bytes()) {
            *dst = src;
        }
        card
    }

    /// Parses one 80-byte record. `index` is only used in errors.
    pub fn parse(record: &[u8], index: usize) -> Result<Self, ArchiveError> {
        let malformed = |reason: &str| ArchiveError::MalformedCard {
            index,
            reason: reason.to_string(),
        };

        if record.len() != CARD_LEN {
            return Err(malformed("record is not 80 bytes"));
        }
        let text = std::str::from_utf8(record).map_err(|_| malformed("non-ASCII bytes"))?;
        if !text.is_ascii() {
            return Err(malformed("non-ASCII bytes"));
        }

        let keyword = text[..KEYWORD_LEN].trim_end().to_string();
        if keyword == END_KEYWORD {
            return Ok(Self::end());
        }
        if &text[KEYWORD_LEN..KEYWORD_LEN + 2] != "= " {
            // Commentary card (COMMENT, HISTORY, blank).
            return Ok(Self {
                keyword,
                value: None,
                comment: Some(text[KEYWORD_LEN..].trim_end().to_string()),
            });
        }

        let field = &text[KEYWORD_LEN + 2..];
        let (value, rest) = if field.trim_start().starts_with('\'') {
            parse_string(field.trim_start()).ok_or_else(|| malformed("unterminated string"))?
        } else {
            let (token, rest) = match field.find('/') {
                Some(pos) => (&field[..pos], &field[pos..]),
                None => (field, ""),
            };
            (parse_scalar(token.trim()).ok_or_else(|| malformed("unparseable value"))?, rest)
        };

        let comment = rest
            .trim_start()
            .strip_prefix('/')
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        Ok(Self {
            keyword,
            value: Some(value),
            comment,
        })
    }
}

fn parse_string(field: &str) -> Option<(CardValue, &str)> {
    let bytes = field.as_bytes();
    let mut inner = String::new();
    let mut i = 1;
    while i < bytes.len() {
        if bytes[i] == b'\'' {
            if bytes.get(i + 1) == Some(&b'\'') {
                inner.push('\'');
                i += 2;
                continue;
            }
            return Some((CardValue::Text(inner), &field[i + 1..]));
        }
        inner.push(bytes[i] as char);
        i += 1;
    }
    None
}

fn parse_scalar(token: &str) -> Option<CardValue> {
    match token {
        "T" => Some(CardValue::Logical(true)),
        "F" => Some(CardValue::Logical(false)),
        _ => token
            .parse::<i64>()
            .map(CardValue::Integer)
            .or_else(|_| token.parse::<f64>().map(CardValue::Real))
            .ok(),
    }
}

/// Replaces anything outside printable ASCII with `?`.
fn ascii_only(text: &str) -> String {
    text.chars()
        .map(|c| if (' '..='~').contains(&c) { c } else { '?' })
        .collect()
}
