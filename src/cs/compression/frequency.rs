//! Symbol frequency tables and their textual dictionary form.
//!
//! Huffman and arithmetic coding both append the table they were built from to the end of
//! their output, using the grammar
//!
//! ```text
//! "{" ( "[" c "-" n "]" )+ "}"
//! ```
//!
//! where `c` is any single character (including brackets, braces, dashes, digits and
//! newlines) and `n` is a positive decimal count. The dictionary is always the maximal
//! trailing match of that grammar, so it is located by scanning backwards from the end of
//! the encoded text.

use crate::cs::error::{Error, Result};
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::str::FromStr;

/// Mapping from symbol to the number of times it occurs.
///
/// Symbols iterate in code-point order. Every count is positive and the counts sum to the
/// length of the text the table describes; that sum always fits in `usize`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: BTreeMap<char, usize>,
}

impl FrequencyTable {
    /// Count every character of `text`.
    ///
    /// # Examples
    ///
    /// ```
    /// use textcodecs::cs::compression::frequency::FrequencyTable;
    ///
    /// let table = FrequencyTable::from_text("abracadabra");
    /// assert_eq!(table.get('a'), 5);
    /// assert_eq!(table.total(), 11);
    /// assert_eq!(table.to_dictionary(), "{[a-5][b-2][c-1][d-1][r-2]}");
    /// ```
    pub fn from_text(text: &str) -> Self {
        let mut counts = BTreeMap::new();
        for ch in text.chars() {
            *counts.entry(ch).or_insert(0) += 1;
        }
        FrequencyTable { counts }
    }

    /// Count for `symbol`, zero when it never occurs.
    pub fn get(&self, symbol: char) -> usize {
        self.counts.get(&symbol).copied().unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// `(symbol, count)` pairs in code-point order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.counts.iter(),
        }
    }

    /// Distinct symbols in code-point order.
    pub fn symbols(&self) -> impl Iterator<Item = char> + '_ {
        self.counts.keys().copied()
    }

    /// Serialize as `{[c-n][c-n]...}`.
    pub fn to_dictionary(&self) -> String {
        let mut out = String::with_capacity(2 + self.counts.len() * 6);
        out.push('{');
        for (ch, count) in self.iter() {
            out.push('[');
            out.push(ch);
            out.push('-');
            out.push_str(&count.to_string());
            out.push(']');
        }
        out.push('}');
        out
    }

    /// Parse a string that consists of a dictionary and nothing else.
    pub fn parse_dictionary(text: &str) -> Result<Self> {
        let (payload, table) = FrequencyTable::split_trailing_dictionary(text)?;
        if !payload.is_empty() {
            return Err(Error::format(format!(
                "unexpected {} characters before the dictionary",
                payload.chars().count()
            )));
        }
        Ok(table)
    }

    /// Split `text` into the payload before the trailing dictionary and the parsed table.
    ///
    /// # Errors
    ///
    /// `FormatError` when `text` does not end in a well-formed, non-empty dictionary, when a
    /// count is zero, when a count or the sum of all counts does not fit in `usize`, or when a
    /// symbol appears twice.
    ///
    /// # Examples
    ///
    /// ```
    /// use textcodecs::cs::compression::frequency::FrequencyTable;
    ///
    /// let (payload, table) = FrequencyTable::split_trailing_dictionary("0110{[a-2][b-2]}").unwrap();
    /// assert_eq!(payload, "0110");
    /// assert_eq!(table.get('b'), 2);
    /// ```
    pub fn split_trailing_dictionary(text: &str) -> Result<(&str, FrequencyTable)> {
        let chars: Vec<(usize, char)> = text.char_indices().collect();

        let mut pos = chars.len();
        if pos == 0 || chars[pos - 1].1 != '}' {
            return Err(Error::format("encoded text does not end with a '}' dictionary"));
        }
        pos -= 1;

        // Entries are read right to left; each one is `[`, one symbol, `-`, digits, `]`.
        let mut entries = Vec::new();
        while let Some((start, symbol, digits)) = entry_ending_at(&chars, pos) {
            entries.push((symbol, digits));
            pos = start;
        }

        if entries.is_empty() {
            return Err(Error::format("dictionary has no [symbol-count] entries"));
        }
        if pos == 0 || chars[pos - 1].1 != '{' {
            return Err(Error::format(format!(
                "malformed dictionary entry before character {}",
                pos
            )));
        }
        let open = chars[pos - 1].0;

        let mut counts = BTreeMap::new();
        let mut total = 0usize;
        for (symbol, digits) in entries.into_iter().rev() {
            let count: usize = digits
                .parse()
                .map_err(|_| Error::format(format!("count {:?} for {:?} is out of range", digits, symbol)))?;
            if count == 0 {
                return Err(Error::format(format!("symbol {:?} has a zero count", symbol)));
            }
            total = total.checked_add(count).ok_or_else(|| {
                Error::format(format!("dictionary counts overflow at symbol {:?}", symbol))
            })?;
            if counts.insert(symbol, count).is_some() {
                return Err(Error::format(format!(
                    "symbol {:?} appears twice in the dictionary",
                    symbol
                )));
            }
        }

        Ok((&text[..open], FrequencyTable { counts }))
    }
}

/// Parse one `[c-n]` entry whose closing `]` is at `end - 1`.
///
/// Returns the index of its `[`, the symbol and the digit string.
fn entry_ending_at(chars: &[(usize, char)], end: usize) -> Option<(usize, char, String)> {
    if end == 0 || chars[end - 1].1 != ']' {
        return None;
    }
    let digits_end = end - 1;
    let mut cursor = digits_end;
    while cursor > 0 && chars[cursor - 1].1.is_ascii_digit() {
        cursor -= 1;
    }
    if cursor == digits_end {
        return None;
    }
    let digits_start = cursor;
    // need room for `[`, symbol and `-`
    if digits_start < 3 || chars[digits_start - 1].1 != '-' || chars[digits_start - 3].1 != '[' {
        return None;
    }
    let symbol = chars[digits_start - 2].1;
    let digits = chars[digits_start..digits_end].iter().map(|&(_, c)| c).collect();
    Some((digits_start - 3, symbol, digits))
}

impl fmt::Display for FrequencyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_dictionary())
    }
}

impl FromStr for FrequencyTable {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        FrequencyTable::parse_dictionary(s)
    }
}

/// Iterator over `(symbol, count)` pairs in code-point order.
pub struct Iter<'a> {
    inner: btree_map::Iter<'a, char, usize>,
}

impl Iterator for Iter<'_> {
    type Item = (char, usize);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(&ch, &count)| (ch, count))
    }
}

impl<'a> IntoIterator for &'a FrequencyTable {
    type Item = (char, usize);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_sum_to_length() {
        let text = "this is an example for huffman encoding";
        let table = FrequencyTable::from_text(text);
        assert_eq!(table.total(), text.chars().count());
        assert_eq!(table.get(' '), 6);
        assert_eq!(table.get('z'), 0);
    }

    #[test]
    fn test_symbols_are_in_code_point_order() {
        let table = FrequencyTable::from_text("zyxabc");
        let symbols: Vec<char> = table.symbols().collect();
        assert_eq!(symbols, vec!['a', 'b', 'c', 'x', 'y', 'z']);
    }

    #[test]
    fn test_dictionary_round_trip_with_grammar_characters() {
        let text = "[[--]]{}{9\n9\n";
        let table = FrequencyTable::from_text(text);
        let parsed: FrequencyTable = table.to_dictionary().parse().unwrap();
        assert_eq!(parsed, table);
    }

    #[test]
    fn test_split_keeps_payload() {
        let (payload, table) =
            FrequencyTable::split_trailing_dictionary("{[x-1]}0120{[}-3][a-12]}").unwrap();
        assert_eq!(payload, "{[x-1]}0120");
        assert_eq!(table.get('}'), 3);
        assert_eq!(table.get('a'), 12);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_missing_dictionary() {
        let err = FrequencyTable::split_trailing_dictionary("0101").unwrap_err();
        assert!(matches!(err, Error::FormatError(_)));
        assert!(FrequencyTable::split_trailing_dictionary("").is_err());
    }

    #[test]
    fn test_rejects_malformed_dictionaries() {
        for bad in [
            "{}",
            "{[a-]}",
            "{[a1]}",
            "{[ab-1]}",
            "[a-1]}",
            "{[a-1]",
            "{[a-0]}",
            "{[a-1][a-2]}",
            "{[a-99999999999999999999999999]}",
            "{[a-18446744073709551615][b-1]}",
            "x[a-1]}",
        ] {
            let result = FrequencyTable::split_trailing_dictionary(bad);
            assert!(
                matches!(result, Err(Error::FormatError(_))),
                "expected format error for {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_largest_single_count_is_accepted() {
        let text = format!("{{[a-{}]}}", usize::MAX);
        let table = FrequencyTable::parse_dictionary(&text).unwrap();
        assert_eq!(table.total(), usize::MAX);
        let overflowing = format!("{{[a-{}][b-1]}}", usize::MAX);
        assert!(matches!(
            FrequencyTable::parse_dictionary(&overflowing),
            Err(Error::FormatError(_))
        ));
    }

    #[test]
    fn test_from_str_rejects_leading_payload() {
        assert!("01{[a-1]}".parse::<FrequencyTable>().is_err());
        assert!("{[a-1]}".parse::<FrequencyTable>().is_ok());
        assert_eq!(FrequencyTable::parse_dictionary("{[a-1]}").unwrap().get('a'), 1);
    }
}
