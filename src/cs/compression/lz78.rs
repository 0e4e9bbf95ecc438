use super::wire::Cursor;
use super::{Encoded, TextCodec};
use crate::cs::error::{Error, Result};
use log::debug;
use std::collections::HashMap;

/// Character appended as the `next` symbol of the final token.
pub const TERMINATOR: char = '$';

/// An LZ78 token.
///
/// Each token is a pair (index, next), where:
/// - `index` is the dictionary index of the longest previously seen phrase that is a prefix of the current input.
/// - `next` is the character that follows it. The last token always carries the terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub index: usize,
    pub next: char,
}

/// LZ78 codec with the `(index,char)` wire form.
#[derive(Debug, Clone, Copy)]
pub struct Lz78 {
    terminator: char,
}

impl Default for Lz78 {
    fn default() -> Self {
        Lz78 {
            terminator: TERMINATOR,
        }
    }
}

impl Lz78 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different terminator character for the final token.
    pub fn with_terminator(terminator: char) -> Self {
        Lz78 { terminator }
    }
}

/// Compress text using the LZ78 algorithm.
///
/// # Algorithm
///
/// 1. Start with a dictionary containing only the empty string at index 0.
/// 2. Extend a buffer one character at a time while `buffer + c` is already in the dictionary.
/// 3. Otherwise output `(index(buffer), c)`, insert `buffer + c` at the next index and clear
///    the buffer.
/// 4. At the end output `(index(buffer), terminator)` for whatever is left in the buffer.
///
/// # Example
///
/// ```
/// use textcodecs::cs::compression::lz78::{compress, Token};
///
/// let tokens = compress("aaaa", '$');
/// assert_eq!(
///     tokens,
///     vec![
///         Token { index: 0, next: 'a' },
///         Token { index: 1, next: 'a' },
///         Token { index: 1, next: '$' },
///     ]
/// );
/// ```
pub fn compress(input: &str, terminator: char) -> Vec<Token> {
    let mut dict: HashMap<String, usize> = HashMap::new();
    dict.insert(String::new(), 0);
    let mut tokens = Vec::new();
    let mut buffer = String::new();
    let mut index = 0;

    for ch in input.chars() {
        buffer.push(ch);
        if let Some(&idx) = dict.get(&buffer) {
            index = idx;
            continue;
        }
        tokens.push(Token { index, next: ch });
        let next_index = dict.len();
        dict.insert(std::mem::take(&mut buffer), next_index);
        index = 0;
    }

    tokens.push(Token {
        index,
        next: terminator,
    });
    tokens
}

/// Rebuild the text from a token sequence.
///
/// Entry `i` of the dictionary is `dictionary[token.index] + token.next` for the `i`-th
/// token; the final character (the terminator) is dropped from the output.
///
/// # Errors
///
/// `FormatError` if a token refers to a phrase that has not been built yet.
pub fn decompress(tokens: &[Token]) -> Result<String> {
    let mut dict: Vec<String> = Vec::with_capacity(tokens.len() + 1);
    dict.push(String::new()); // index 0: empty phrase
    let mut output = String::new();

    for (i, token) in tokens.iter().enumerate() {
        let prefix = dict.get(token.index).ok_or_else(|| {
            Error::format(format!(
                "token {} refers to phrase {} but only {} phrases exist",
                i,
                token.index,
                dict.len()
            ))
        })?;
        let mut phrase = prefix.clone();
        phrase.push(token.next);
        output.push_str(&phrase);
        dict.push(phrase);
    }
    output.pop();
    Ok(output)
}

/// Render tokens as `(index,char)` pairs.
pub fn format_tokens(tokens: &[Token]) -> String {
    let mut out = String::with_capacity(tokens.len() * 5);
    for token in tokens {
        out.push('(');
        out.push_str(&token.index.to_string());
        out.push(',');
        out.push(token.next);
        out.push(')');
    }
    out
}

/// Parse the `(index,char)` wire form.
pub fn parse_tokens(code: &str) -> Result<Vec<Token>> {
    let mut cursor = Cursor::new(code);
    if cursor.is_at_end() {
        return Err(Error::format("lz78 code is empty"));
    }
    let mut tokens = Vec::new();
    while !cursor.is_at_end() {
        cursor.expect('(')?;
        let index = cursor.number()?;
        cursor.expect(',')?;
        let next = cursor.next_char()?;
        cursor.expect(')')?;
        tokens.push(Token { index, next });
    }
    Ok(tokens)
}

impl TextCodec for Lz78 {
    fn name(&self) -> &'static str {
        "lz78"
    }

    fn encode(&self, source: &str) -> Result<Encoded> {
        let tokens = compress(source, self.terminator);
        let encoded = Encoded::new(source, format_tokens(&tokens));
        debug!(
            "lz78: {} chars -> {} tokens, ratio {:.3}",
            source.chars().count(),
            tokens.len(),
            encoded.ratio
        );
        Ok(encoded)
    }

    fn decode(&self, code: &str) -> Result<String> {
        let tokens = parse_tokens(code)?;
        debug!("lz78: decoding {} tokens", tokens.len());
        decompress(&tokens)
    }
}
