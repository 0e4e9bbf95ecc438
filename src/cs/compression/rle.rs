//! Run-length encoding.
//!
//! Every maximal run of one repeated character becomes a `(symbol,count)` pair and the pairs
//! are concatenated without separators:
//!
//! ```text
//! ( "(" c "," n ")" )+
//! ```

use super::wire::Cursor;
use super::{Encoded, TextCodec};
use crate::cs::error::{Error, Result};
use log::debug;

/// Run-length codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rle;

impl Rle {
    pub fn new() -> Self {
        Rle
    }
}

/// Split `input` into maximal runs of identical characters.
///
/// # Examples
///
/// ```
/// use textcodecs::cs::compression::rle::run_length_encode;
///
/// assert_eq!(
///     run_length_encode("aaabbbccd"),
///     vec![('a', 3), ('b', 3), ('c', 2), ('d', 1)]
/// );
/// ```
pub fn run_length_encode(input: &str) -> Vec<(char, usize)> {
    let mut runs: Vec<(char, usize)> = Vec::new();
    for ch in input.chars() {
        match runs.last_mut() {
            Some((symbol, count)) if *symbol == ch => *count += 1,
            _ => runs.push((ch, 1)),
        }
    }
    runs
}

/// Number of characters and UTF-8 bytes `runs` expand to.
///
/// # Errors
///
/// `FormatError` if either total overflows, or the text would be larger than a `String` can
/// hold (`isize::MAX` bytes).
pub fn decoded_size(runs: &[(char, usize)]) -> Result<(usize, usize)> {
    let too_large = || Error::format("run counts describe a text too large to build");
    let mut chars = 0usize;
    let mut bytes = 0usize;
    for &(symbol, count) in runs {
        chars = chars.checked_add(count).ok_or_else(too_large)?;
        let run_bytes = count.checked_mul(symbol.len_utf8()).ok_or_else(too_large)?;
        bytes = bytes.checked_add(run_bytes).ok_or_else(too_large)?;
    }
    if bytes > isize::MAX as usize {
        return Err(too_large());
    }
    Ok((chars, bytes))
}

/// Expand runs back into text.
///
/// # Errors
///
/// `FormatError` if the runs are too long to expand, see [`decoded_size`].
pub fn run_length_decode(runs: &[(char, usize)]) -> Result<String> {
    decoded_size(runs)?;
    let mut result = String::new();
    for &(symbol, count) in runs {
        result.extend(std::iter::repeat(symbol).take(count));
    }
    Ok(result)
}

/// Render runs in the `(c,n)` wire form.
pub fn format_runs(runs: &[(char, usize)]) -> String {
    let mut out = String::with_capacity(runs.len() * 5);
    for &(symbol, count) in runs {
        out.push('(');
        out.push(symbol);
        out.push(',');
        out.push_str(&count.to_string());
        out.push(')');
    }
    out
}

/// Parse the `(c,n)` wire form.
///
/// # Errors
///
/// `FormatError` if `code` is empty or is not a sequence of `(c,n)` pairs.
pub fn parse_runs(code: &str) -> Result<Vec<(char, usize)>> {
    let mut cursor = Cursor::new(code);
    if cursor.is_at_end() {
        return Err(Error::format("run-length code is empty"));
    }
    let mut runs = Vec::new();
    while !cursor.is_at_end() {
        cursor.expect('(')?;
        let symbol = cursor.next_char()?;
        cursor.expect(',')?;
        let count = cursor.number()?;
        cursor.expect(')')?;
        runs.push((symbol, count));
    }
    Ok(runs)
}

impl TextCodec for Rle {
    fn name(&self) -> &'static str {
        "rle"
    }

    fn encode(&self, source: &str) -> Result<Encoded> {
        if source.is_empty() {
            return Err(Error::invalid("run-length encoding needs a non-empty text"));
        }
        let runs = run_length_encode(source);
        let encoded = Encoded::new(source, format_runs(&runs));
        debug!(
            "rle: {} chars -> {} runs, ratio {:.3}",
            source.chars().count(),
            runs.len(),
            encoded.ratio
        );
        Ok(encoded)
    }

    fn decode(&self, code: &str) -> Result<String> {
        let runs = parse_runs(code)?;
        debug!("rle: decoding {} runs", runs.len());
        run_length_decode(&runs)
    }
}
