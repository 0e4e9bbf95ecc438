//! n-ary Huffman coding (radix 2 to 10).
//!
//! The output is the code-word digits for every input character followed by the frequency
//! table the tree was built from:
//!
//! ```text
//! <digits 0..radix-1>* "{" ( "[" c "-" n "]" )+ "}"
//! ```
//!
//! The decoder rebuilds the same tree from that table, so it must be configured with the
//! same radix as the encoder.

use super::frequency::FrequencyTable;
use super::{Encoded, TextCodec};
use crate::cs::error::{Error, Result};
use log::{debug, trace};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap};

/// Smallest supported radix.
pub const MIN_RADIX: usize = 2;
/// Largest supported radix; code-word digits are single decimal digits.
pub const MAX_RADIX: usize = 10;
/// Radix used by `Huffman::default()`.
pub const DEFAULT_RADIX: usize = 2;

/// Represents a node in the Huffman tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffmanNode {
    /// A leaf node contains a character and its frequency.
    Leaf { ch: char, freq: usize },
    /// An internal node with up to `radix` children and their combined frequency.
    /// Child `i` is reached with digit `i`.
    Internal {
        freq: usize,
        children: Vec<HuffmanNode>,
    },
}

impl HuffmanNode {
    /// Returns the frequency of the node.
    pub fn freq(&self) -> usize {
        match self {
            HuffmanNode::Leaf { freq, .. } => *freq,
            HuffmanNode::Internal { freq, .. } => *freq,
        }
    }
}

/// A helper wrapper for HuffmanNode for use in a BinaryHeap.
///
/// Nodes are ordered by frequency, then by the smallest symbol in their subtree. Subtrees are
/// disjoint, so no two live nodes compare equal and the tree shape is reproducible. The
/// ordering is reversed so the heap pops the lightest node first.
#[derive(Debug, Clone, Eq, PartialEq)]
struct NodeWrapper {
    freq: usize,
    min_symbol: char,
    node: HuffmanNode,
}

impl Ord for NodeWrapper {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .freq
            .cmp(&self.freq)
            .then_with(|| other.min_symbol.cmp(&self.min_symbol))
    }
}

impl PartialOrd for NodeWrapper {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Build a frequency table mapping each character in `input` to its frequency.
pub fn build_frequency_table(input: &str) -> FrequencyTable {
    FrequencyTable::from_text(input)
}

/// Number of nodes combined by the first merge.
///
/// With `m` leaves and radix `r`, a full `r`-ary tree needs `(m - 1) % (r - 1) == 0`. When that
/// does not hold, the first merge takes fewer than `r` nodes so that every later merge can
/// take exactly `r`.
fn first_merge_width(leaves: usize, radix: usize) -> usize {
    if leaves <= radix {
        return radix;
    }
    let rem = (leaves - radix) % (radix - 1);
    if rem == 0 {
        radix
    } else {
        rem + 1
    }
}

/// Build the Huffman tree for `freq_table` with the given radix.
///
/// Returns `None` if the frequency table is empty or `radix` is outside
/// `MIN_RADIX..=MAX_RADIX`. The root is always an internal node, so a table with one symbol
/// still gets the one-digit code `0`. Merged weights never exceed `freq_table.total()`, which
/// fits in `usize`.
pub fn build_huffman_tree(freq_table: &FrequencyTable, radix: usize) -> Option<HuffmanNode> {
    if freq_table.is_empty() || !(MIN_RADIX..=MAX_RADIX).contains(&radix) {
        return None;
    }
    let mut heap: BinaryHeap<NodeWrapper> = freq_table
        .iter()
        .map(|(ch, freq)| NodeWrapper {
            freq,
            min_symbol: ch,
            node: HuffmanNode::Leaf { ch, freq },
        })
        .collect();

    let mut width = first_merge_width(heap.len(), radix);
    loop {
        let mut children = Vec::with_capacity(width);
        let mut freq = 0;
        let mut min_symbol = char::MAX;
        while children.len() < width {
            let Some(lightest) = heap.pop() else { break };
            freq += lightest.freq;
            min_symbol = min_symbol.min(lightest.min_symbol);
            children.push(lightest.node);
        }
        trace!(
            "huffman: merged {} nodes into weight {} ({} left)",
            children.len(),
            freq,
            heap.len()
        );
        let merged = NodeWrapper {
            freq,
            min_symbol,
            node: HuffmanNode::Internal { freq, children },
        };
        if heap.is_empty() {
            return Some(merged.node);
        }
        heap.push(merged);
        width = radix;
    }
}

/// Build the code table mapping characters to their code words.
///
/// Child `i` of an internal node contributes the digit `i`.
pub fn build_code_table(node: &HuffmanNode) -> BTreeMap<char, String> {
    let mut table = BTreeMap::new();
    build_code_table_helper(node, &mut String::new(), &mut table);
    table
}

fn build_code_table_helper(
    node: &HuffmanNode,
    prefix: &mut String,
    table: &mut BTreeMap<char, String>,
) {
    match node {
        HuffmanNode::Leaf { ch, .. } => {
            let code = if prefix.is_empty() {
                "0".to_string()
            } else {
                prefix.clone()
            };
            table.insert(*ch, code);
        }
        HuffmanNode::Internal { children, .. } => {
            for (digit, child) in children.iter().enumerate() {
                prefix.push(char::from(b'0' + digit as u8));
                build_code_table_helper(child, prefix, table);
                prefix.pop();
            }
        }
    }
}

/// Encode the input string using the provided code table.
/// Each character is replaced with its code word.
///
/// # Errors
///
/// `InvalidArgument` if `input` contains a character the table has no code for.
pub fn encode(input: &str, code_table: &BTreeMap<char, String>) -> Result<String> {
    let mut out = String::with_capacity(input.len() * 2);
    for ch in input.chars() {
        let code = code_table
            .get(&ch)
            .ok_or_else(|| Error::invalid(format!("no code word for {:?}", ch)))?;
        out.push_str(code);
    }
    Ok(out)
}

/// Decode a digit string by matching ever longer prefixes against the known code words.
///
/// # Errors
///
/// `FormatError` on a digit outside `0..radix` or when the input ends inside a code word.
pub fn decode(encoded: &str, code_table: &BTreeMap<char, String>, radix: usize) -> Result<String> {
    let words: HashMap<&str, char> = code_table
        .iter()
        .map(|(&ch, code)| (code.as_str(), ch))
        .collect();
    let longest = code_table.values().map(String::len).max().unwrap_or(0);

    let mut result = String::new();
    let mut word = String::with_capacity(longest);
    for (pos, digit) in encoded.chars().enumerate() {
        match digit.to_digit(10) {
            Some(d) if (d as usize) < radix => {}
            _ => {
                return Err(Error::format(format!(
                    "{:?} at {} is not a radix-{} digit",
                    digit, pos, radix
                )))
            }
        }
        word.push(digit);
        if let Some(&ch) = words.get(word.as_str()) {
            result.push(ch);
            word.clear();
        } else if word.len() >= longest {
            return Err(Error::format(format!(
                "no code word matches {:?} ending at {}",
                word, pos
            )));
        }
    }
    if !word.is_empty() {
        return Err(Error::format(format!(
            "code stream ends inside a code word ({:?})",
            word
        )));
    }
    Ok(result)
}

/// n-ary Huffman codec.
#[derive(Debug, Clone, Copy)]
pub struct Huffman {
    radix: usize,
}

impl Default for Huffman {
    fn default() -> Self {
        Huffman {
            radix: DEFAULT_RADIX,
        }
    }
}

impl Huffman {
    /// Create a codec producing code words in base `radix`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` unless `MIN_RADIX <= radix <= MAX_RADIX`.
    pub fn new(radix: usize) -> Result<Self> {
        if !(MIN_RADIX..=MAX_RADIX).contains(&radix) {
            return Err(Error::invalid(format!(
                "huffman radix must be between {} and {}, got {}",
                MIN_RADIX, MAX_RADIX, radix
            )));
        }
        Ok(Huffman { radix })
    }

    pub fn radix(&self) -> usize {
        self.radix
    }

    /// Code words for every symbol of `table`.
    pub fn code_table(&self, table: &FrequencyTable) -> Result<BTreeMap<char, String>> {
        let tree = build_huffman_tree(table, self.radix)
            .ok_or_else(|| Error::invalid("cannot build a huffman tree from an empty table"))?;
        Ok(build_code_table(&tree))
    }
}

impl TextCodec for Huffman {
    fn name(&self) -> &'static str {
        "huffman"
    }

    fn encode(&self, source: &str) -> Result<Encoded> {
        if source.is_empty() {
            return Err(Error::invalid("huffman coding needs a non-empty text"));
        }
        let table = build_frequency_table(source);
        let codes = self.code_table(&table)?;
        let mut code = encode(source, &codes)?;
        let payload_len = code.len();
        code.push_str(&table.to_dictionary());
        let encoded = Encoded::new(source, code);
        debug!(
            "huffman: radix {}, {} symbols, {} chars -> {} digits, ratio {:.3}",
            self.radix,
            table.len(),
            table.total(),
            payload_len,
            encoded.ratio
        );
        Ok(encoded)
    }

    fn decode(&self, code: &str) -> Result<String> {
        let (payload, table) = FrequencyTable::split_trailing_dictionary(code)?;
        let codes = self.code_table(&table)?;
        let decoded = decode(payload, &codes, self.radix)?;
        let decoded_len = decoded.chars().count();
        if decoded_len != table.total() {
            return Err(Error::format(format!(
                "decoded {} symbols but the dictionary describes {}",
                decoded_len,
                table.total()
            )));
        }
        debug!("huffman: radix {}, decoded {} symbols", self.radix, decoded_len);
        Ok(decoded)
    }
}
