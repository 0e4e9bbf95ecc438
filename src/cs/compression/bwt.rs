//! Burrows-Wheeler Transform implementation.
//!
//! The Burrows-Wheeler Transform (BWT) is a reversible transformation that rearranges
//! characters so that symbols with similar contexts end up next to each other. It does not
//! shrink the text by itself.
//!
//! Text is cut into blocks of at most `block_size` characters. Each block is written as
//!
//! ```text
//! "(" <last column of the sorted rotation matrix> "," <row index of the original> ")"
//! ```
//!
//! Every block except the last holds exactly `block_size` characters, which is what lets the
//! decoder find block boundaries even though the column may contain `(`, `,` and `)`.

use super::wire::Cursor;
use super::{Encoded, TextCodec};
use crate::cs::error::{Error, Result};
use log::{debug, trace};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Block size used by `Bwt::default()`.
pub const DEFAULT_BLOCK_SIZE: usize = 8192;
/// Smallest block size accepted by `Bwt::with_block_size`.
pub const MIN_BLOCK_SIZE: usize = 2;

/// One cyclic rotation of a block.
///
/// `chars` is a window of length `n` into the block written twice, so building a row copies
/// nothing. `original` marks the un-rotated row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rotation<'a> {
    chars: &'a [char],
    original: bool,
}

impl Rotation<'_> {
    pub fn chars(&self) -> &[char] {
        self.chars
    }

    pub fn is_original(&self) -> bool {
        self.original
    }

    fn last(&self) -> char {
        self.chars[self.chars.len() - 1]
    }
}

/// Build all `n` rotations of a block, where `doubled` is the block written twice.
///
/// The output is split into `workers` disjoint ranges, each filled by its own rayon task;
/// no range is touched by more than one task.
pub fn build_rotation_matrix(doubled: &[char], workers: usize) -> Vec<Rotation<'_>> {
    let n = doubled.len() / 2;
    if n == 0 {
        return Vec::new();
    }
    let mut rows = vec![
        Rotation {
            chars: &doubled[..n],
            original: false,
        };
        n
    ];
    let per_worker = n.div_ceil(workers.max(1));
    rows.par_chunks_mut(per_worker)
        .enumerate()
        .for_each(|(worker, range)| {
            let start = worker * per_worker;
            for (offset, row) in range.iter_mut().enumerate() {
                let shift = start + offset;
                *row = Rotation {
                    chars: &doubled[shift..shift + n],
                    original: shift == 0,
                };
            }
        });
    rows
}

/// Applies the Burrows-Wheeler Transform to one block, using `workers` tasks to build the
/// rotation matrix.
///
/// # Returns
///
/// A tuple containing:
/// - The transformed data (the last column of the sorted rotation matrix)
/// - The index of the original input in the sorted matrix
pub fn bwt_transform_with_workers(input: &[char], workers: usize) -> (Vec<char>, usize) {
    if input.is_empty() {
        return (Vec::new(), 0);
    }

    let mut doubled = Vec::with_capacity(2 * input.len());
    doubled.extend_from_slice(input);
    doubled.extend_from_slice(input);

    let mut rows = build_rotation_matrix(&doubled, workers);
    rows.par_sort_unstable();

    let mut orig_index = 0;
    let mut transformed = Vec::with_capacity(input.len());
    for (i, row) in rows.iter().enumerate() {
        transformed.push(row.last());
        if row.is_original() {
            orig_index = i;
        }
    }

    (transformed, orig_index)
}

/// Applies the Burrows-Wheeler Transform to one block.
///
/// # Algorithm
///
/// 1. Form all rotations of the input string.
/// 2. Sort these rotations lexicographically.
/// 3. Extract the last column of this sorted matrix.
/// 4. Also record the index of the original input in the sorted matrix (this is needed for decoding).
///
/// # Examples
///
/// ```
/// use textcodecs::cs::compression::bwt::bwt_transform;
///
/// let input: Vec<char> = "banana".chars().collect();
/// let (transformed, index) = bwt_transform(&input);
/// assert_eq!(transformed.iter().collect::<String>(), "nnbaaa");
/// assert_eq!(index, 3);
/// ```
pub fn bwt_transform(input: &[char]) -> (Vec<char>, usize) {
    bwt_transform_with_workers(input, rayon::current_num_threads())
}

/// Applies the inverse Burrows-Wheeler Transform to recover the original block.
///
/// # Algorithm
///
/// 1. For every position of the transformed column, record its symbol and how many times
///    that symbol occurred earlier in the column.
/// 2. For every symbol, count how many symbols in the column sort before it.
/// 3. Precompute `next[i] = less[symbol at i] + occurrences before i` for every row.
/// 4. Starting from `index`, emit the symbol at the current row and jump to `next[row]`;
///    this yields the block back to front.
///
/// Building the tables costs `O(n log k)` for `n` characters over an alphabet of `k`
/// symbols; the walk itself is `O(n)`. The matrix is never built.
///
/// # Errors
///
/// `FormatError` if `index` is not a row of the matrix.
pub fn bwt_inverse(transformed: &[char], index: usize) -> Result<Vec<char>> {
    let n = transformed.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    if index >= n {
        return Err(Error::format(format!(
            "row index {} is outside a block of {} characters",
            index, n
        )));
    }

    let mut counts: BTreeMap<char, usize> = BTreeMap::new();
    let mut ranks = Vec::with_capacity(n);
    for &ch in transformed {
        let seen = counts.entry(ch).or_insert(0);
        ranks.push(*seen);
        *seen += 1;
    }

    // counts -> number of symbols that sort strictly before each key
    let mut less = counts;
    let mut sum = 0;
    for count in less.values_mut() {
        let here = *count;
        *count = sum;
        sum += here;
    }

    // ranks -> row each position maps to in the first column
    let mut next = ranks;
    for (row, &ch) in next.iter_mut().zip(transformed) {
        *row += less[&ch];
    }

    let mut result = vec!['\0'; n];
    let mut row = index;
    for slot in result.iter_mut().rev() {
        *slot = transformed[row];
        row = next[row];
    }

    Ok(result)
}

/// Split the wire form into `(column, index)` blocks.
///
/// # Errors
///
/// `FormatError` if `code` is empty, a block is not parenthesized, lacks its index, or a
/// block other than the last is shorter than `block_size`.
pub fn parse_blocks(code: &str, block_size: usize) -> Result<Vec<(Vec<char>, usize)>> {
    let mut cursor = Cursor::new(code);
    if cursor.is_at_end() {
        return Err(Error::format("bwt code is empty"));
    }
    let mut blocks = Vec::new();
    while !cursor.is_at_end() {
        cursor.expect('(')?;
        let block_start = cursor.position();
        let (column, index, consumed) = match full_block(cursor.remaining(), block_size)? {
            Some(block) => block,
            None => final_block(cursor.remaining(), block_size, block_start)?,
        };
        blocks.push((column, index));
        cursor.advance(consumed);
    }
    Ok(blocks)
}

/// A block of exactly `block_size` characters followed by `,index)`.
fn full_block(rest: &[char], block_size: usize) -> Result<Option<(Vec<char>, usize, usize)>> {
    if rest.len() < block_size + 3 || rest[block_size] != ',' {
        return Ok(None);
    }
    let digits_start = block_size + 1;
    let mut digits_end = digits_start;
    while digits_end < rest.len() && rest[digits_end].is_ascii_digit() {
        digits_end += 1;
    }
    if digits_end == digits_start || digits_end >= rest.len() || rest[digits_end] != ')' {
        return Ok(None);
    }
    let index = parse_index(&rest[digits_start..digits_end])?;
    Ok(Some((rest[..block_size].to_vec(), index, digits_end + 1)))
}

/// The trailing block: everything up to the last comma is the column.
fn final_block(rest: &[char], block_size: usize, at: usize) -> Result<(Vec<char>, usize, usize)> {
    if rest.last() != Some(&')') {
        return Err(Error::format(format!("block at {} is not closed by ')'", at)));
    }
    let body = &rest[..rest.len() - 1];
    let comma = body
        .iter()
        .rposition(|&c| c == ',')
        .ok_or_else(|| Error::format(format!("block at {} has no row index", at)))?;
    let column = &body[..comma];
    if column.is_empty() || column.len() >= block_size {
        return Err(Error::format(format!(
            "block at {} holds {} characters; a final block must hold 1 to {}",
            at,
            column.len(),
            block_size - 1
        )));
    }
    let digits = &body[comma + 1..];
    if digits.is_empty() || !digits.iter().all(char::is_ascii_digit) {
        return Err(Error::format(format!("block at {} has a malformed row index", at)));
    }
    Ok((column.to_vec(), parse_index(digits)?, rest.len()))
}

fn parse_index(digits: &[char]) -> Result<usize> {
    let text: String = digits.iter().collect();
    text.parse()
        .map_err(|_| Error::format(format!("row index {} is out of range", text)))
}

/// Block-wise Burrows-Wheeler codec.
#[derive(Debug, Clone, Copy)]
pub struct Bwt {
    block_size: usize,
    workers: Option<usize>,
}

impl Default for Bwt {
    fn default() -> Self {
        Bwt {
            block_size: DEFAULT_BLOCK_SIZE,
            workers: None,
        }
    }
}

impl Bwt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use blocks of at most `block_size` characters.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `block_size < MIN_BLOCK_SIZE`.
    pub fn with_block_size(block_size: usize) -> Result<Self> {
        if block_size < MIN_BLOCK_SIZE {
            return Err(Error::invalid(format!(
                "bwt block size must be at least {}, got {}",
                MIN_BLOCK_SIZE, block_size
            )));
        }
        Ok(Bwt {
            block_size,
            workers: None,
        })
    }

    /// Build each rotation matrix with `workers` parallel tasks instead of one per thread.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `workers` is zero.
    pub fn with_workers(self, workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(Error::invalid("bwt needs at least one worker"));
        }
        Ok(Bwt {
            workers: Some(workers),
            ..self
        })
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    fn workers(&self) -> usize {
        self.workers.unwrap_or_else(rayon::current_num_threads)
    }
}

impl TextCodec for Bwt {
    fn name(&self) -> &'static str {
        "bwt"
    }

    fn encode(&self, source: &str) -> Result<Encoded> {
        if source.is_empty() {
            return Err(Error::invalid("burrows-wheeler transform needs a non-empty text"));
        }
        let chars: Vec<char> = source.chars().collect();
        let workers = self.workers();
        let mut code = String::with_capacity(source.len() + 8);
        let mut blocks = 0;
        for block in chars.chunks(self.block_size) {
            let (column, index) = bwt_transform_with_workers(block, workers);
            trace!("bwt: block {} ({} chars) -> row {}", blocks, block.len(), index);
            code.push('(');
            code.extend(column);
            code.push(',');
            code.push_str(&index.to_string());
            code.push(')');
            blocks += 1;
        }
        let encoded = Encoded::new(source, code);
        debug!(
            "bwt: {} chars in {} blocks of up to {}, ratio {:.3}",
            chars.len(),
            blocks,
            self.block_size,
            encoded.ratio
        );
        Ok(encoded)
    }

    fn decode(&self, code: &str) -> Result<String> {
        let blocks = parse_blocks(code, self.block_size)?;
        let mut result = String::with_capacity(code.len());
        for (column, index) in &blocks {
            result.extend(bwt_inverse(column, *index)?);
        }
        debug!("bwt: decoded {} blocks", blocks.len());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn text(v: &[char]) -> String {
        v.iter().collect()
    }

    #[test]
    fn test_bwt_transform_empty() {
        let (transformed, index) = bwt_transform(&[]);
        assert!(transformed.is_empty());
        assert_eq!(index, 0);
    }

    #[test]
    fn test_bwt_transform_single_char() {
        let (transformed, index) = bwt_transform(&['a']);
        assert_eq!(transformed, vec!['a']);
        assert_eq!(index, 0);
    }

    #[test]
    fn test_bwt_transform_banana() {
        let (transformed, index) = bwt_transform(&chars("banana"));
        assert_eq!(text(&transformed), "nnbaaa");
        assert_eq!(index, 3);
    }

    #[test]
    fn test_bwt_transform_mississippi() {
        let (transformed, _) = bwt_transform(&chars("mississippi"));
        assert_eq!(text(&transformed), "pssmipissii");
    }

    #[test]
    fn test_bwt_round_trip() {
        for input in ["banana", "abracadabra", "abababab", "aaaa", "x", "日本語の日本語", "a,b)(c"] {
            let block = chars(input);
            let (transformed, index) = bwt_transform(&block);
            assert_eq!(bwt_inverse(&transformed, index).unwrap(), block, "{}", input);
        }
    }

    #[test]
    fn test_worker_count_does_not_change_output() {
        let block = chars("she sells sea shells by the sea shore");
        let expected = bwt_transform_with_workers(&block, 1);
        for workers in [2, 3, 7, 64, 1000] {
            assert_eq!(bwt_transform_with_workers(&block, workers), expected);
        }
    }

    #[test]
    fn test_rotation_matrix_rows() {
        let doubled = chars("abcabc");
        let rows = build_rotation_matrix(&doubled, 2);
        let rendered: Vec<String> = rows.iter().map(|r| text(r.chars())).collect();
        assert_eq!(rendered, vec!["abc", "bca", "cab"]);
        assert!(rows[0].is_original());
        assert!(!rows[1].is_original() && !rows[2].is_original());
    }

    #[test]
    fn test_inverse_of_long_repetitive_block() {
        let block: Vec<char> = "abcab".repeat(400).chars().chain("zz".chars()).collect();
        let (transformed, index) = bwt_transform_with_workers(&block, 4);
        assert_eq!(bwt_inverse(&transformed, index).unwrap(), block);
    }

    #[test]
    fn test_inverse_rejects_bad_index() {
        assert!(matches!(
            bwt_inverse(&chars("nnbaaa"), 6),
            Err(Error::FormatError(_))
        ));
    }

    #[test]
    fn test_short_text_is_one_block() {
        let codec = Bwt::with_block_size(16).unwrap();
        let encoded = codec.encode("banana").unwrap();
        assert_eq!(encoded.code, "(nnbaaa,3)");
        assert_eq!(parse_blocks(&encoded.code, 16).unwrap().len(), 1);
    }

    #[test]
    fn test_blocks_at_fixed_offsets() {
        let codec = Bwt::with_block_size(4).unwrap();
        let input = "abcdefghij";
        let encoded = codec.encode(input).unwrap();
        let blocks = parse_blocks(&encoded.code, 4).unwrap();
        let lengths: Vec<usize> = blocks.iter().map(|(c, _)| c.len()).collect();
        assert_eq!(lengths, vec![4, 4, 2]);
        let source = chars(input);
        for ((column, index), expected) in blocks.iter().zip(source.chunks(4)) {
            assert_eq!(bwt_inverse(column, *index).unwrap(), expected);
        }
        assert_eq!(codec.decode(&encoded.code).unwrap(), input);
    }

    #[test]
    fn test_exact_multiple_of_block_size() {
        let codec = Bwt::with_block_size(3).unwrap();
        let encoded = codec.encode("abcabc").unwrap();
        assert_eq!(parse_blocks(&encoded.code, 3).unwrap().len(), 2);
        assert_eq!(codec.decode(&encoded.code).unwrap(), "abcabc");
    }

    #[test]
    fn test_delimiters_inside_blocks() {
        let input = "(,),(,)),((,,)),1,2)";
        for size in [2, 3, 5, 8, 64] {
            let codec = Bwt::with_block_size(size).unwrap();
            let encoded = codec.encode(input).unwrap();
            assert_eq!(codec.decode(&encoded.code).unwrap(), input, "block size {}", size);
        }
    }

    #[test]
    fn test_default_configuration() {
        let codec = Bwt::default();
        assert_eq!(codec.block_size(), DEFAULT_BLOCK_SIZE);
        let input = "the default block size keeps short texts in one block";
        let encoded = codec.encode(input).unwrap();
        assert_eq!(codec.decode(&encoded.code).unwrap(), input);
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(matches!(Bwt::with_block_size(1), Err(Error::InvalidArgument(_))));
        assert!(matches!(Bwt::new().with_workers(0), Err(Error::InvalidArgument(_))));
        assert!(matches!(Bwt::new().encode(""), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_malformed_code() {
        let codec = Bwt::with_block_size(4).unwrap();
        for bad in ["", "abc", "(ab,5)", "(ab,)", "(ab,1", "(ab)", "(,0)", "(abcdefg,1)", "(ab,1)x"] {
            assert!(
                matches!(codec.decode(bad), Err(Error::FormatError(_))),
                "expected format error for {:?}",
                bad
            );
        }
    }
}
