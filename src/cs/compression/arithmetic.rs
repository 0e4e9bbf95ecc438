//! Arithmetic coding over exact rational intervals.
//!
//! Every symbol owns a slice of `[0, 1)` proportional to its frequency, in code-point order.
//! Encoding narrows `[left, right)` to the current symbol's slice of the current interval and
//! streams out each decimal digit that `left` and `right` already agree on. The output is
//!
//! ```text
//! <digit>* "{" ( "[" c "-" n "]" )+ "}"
//! ```
//!
//! where the digits spell a decimal fraction inside the final interval and the dictionary
//! is the frequency table (its total is the number of symbols to decode).

use super::frequency::FrequencyTable;
use super::rational::Rational;
use super::{Encoded, TextCodec};
use crate::cs::error::{Error, Result};
use log::{debug, trace};
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use std::collections::HashMap;

/// Cumulative frequency model shared by encoder and decoder.
///
/// `cum_freq[i]..cum_freq[i + 1]` is the slice of `0..total` owned by `symbols[i]`;
/// `cum_freq[0] = 0` and `cum_freq[symbols.len()] = total`.
#[derive(Debug, Clone)]
pub struct SymbolModel {
    pub symbols: Vec<char>,
    pub cum_freq: Vec<usize>,
    pub total: usize,
    positions: HashMap<char, usize>,
}

impl SymbolModel {
    /// Build the model from a frequency table.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the table is empty, `FormatError` if the counts overflow `usize`.
    pub fn new(table: &FrequencyTable) -> Result<Self> {
        if table.is_empty() {
            return Err(Error::invalid("arithmetic coding needs at least one symbol"));
        }
        let mut symbols = Vec::with_capacity(table.len());
        let mut cum_freq = Vec::with_capacity(table.len() + 1);
        let mut positions = HashMap::with_capacity(table.len());
        let mut total = 0usize;
        cum_freq.push(0);
        for (i, (ch, count)) in table.iter().enumerate() {
            symbols.push(ch);
            positions.insert(ch, i);
            total = total
                .checked_add(count)
                .ok_or_else(|| Error::format("symbol counts overflow the model total"))?;
            cum_freq.push(total);
        }
        Ok(SymbolModel {
            symbols,
            cum_freq,
            total,
            positions,
        })
    }

    /// `(low, high)` cumulative counts for `symbol`.
    pub fn range(&self, symbol: char) -> Option<(usize, usize)> {
        self.positions
            .get(&symbol)
            .map(|&i| (self.cum_freq[i], self.cum_freq[i + 1]))
    }

    /// Index of the symbol whose slice contains the count `scaled` (`0 <= scaled < total`).
    ///
    /// Binary search over the sorted cumulative counts.
    pub fn position_of(&self, scaled: usize) -> Option<usize> {
        if scaled >= self.total {
            return None;
        }
        Some(self.cum_freq.partition_point(|&c| c <= scaled) - 1)
    }
}

/// Half-open interval `[left, right)` inside `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    left: Rational,
    right: Rational,
}

impl Interval {
    /// `[0, 1)`.
    pub fn unit() -> Self {
        Interval {
            left: Rational::zero(),
            right: Rational::one(),
        }
    }

    /// # Errors
    ///
    /// `InvalidArgument` unless `0 <= left < right <= 1`.
    pub fn new(left: Rational, right: Rational) -> Result<Self> {
        if left < Rational::zero() || right > Rational::one() || left >= right {
            return Err(Error::invalid(format!(
                "[{}, {}) is not a non-empty interval inside [0, 1]",
                left, right
            )));
        }
        Ok(Interval { left, right })
    }

    pub fn left(&self) -> &Rational {
        &self.left
    }

    pub fn right(&self) -> &Rational {
        &self.right
    }

    pub fn width(&self) -> Rational {
        &self.right - &self.left
    }

    pub fn contains(&self, value: &Rational) -> bool {
        &self.left <= value && value < &self.right
    }

    /// Sub-interval owned by `symbol`, scaled into this interval.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the model does not know `symbol`.
    pub fn narrow(&self, model: &SymbolModel, symbol: char) -> Result<Interval> {
        let (low, high) = model
            .range(symbol)
            .ok_or_else(|| Error::invalid(format!("{:?} is not in the frequency table", symbol)))?;
        let step = &self.width() * &Rational::new(1, model.total)?;
        let left = &self.left + &(&step * &Rational::from(low));
        let right = &self.left + &(&step * &Rational::from(high));
        Ok(Interval { left, right })
    }

    /// Drop the leading decimal digit `digit` from both bounds: `x -> 10x - digit`.
    fn shift_out(&self, digit: &BigInt) -> Interval {
        let ten = Rational::from(10u64);
        let d = Rational::from(digit.clone());
        Interval {
            left: &(&self.left * &ten) - &d,
            right: &(&self.right * &ten) - &d,
        }
    }
}

/// `⌊10·x⌋` for `x` in `[0, 1]`.
fn leading_digit(x: &Rational) -> BigInt {
    (x * &Rational::from(10u64)).floor()
}

fn push_digit(out: &mut String, digit: &BigInt) -> Result<()> {
    let ch = digit
        .to_u32()
        .and_then(|d| char::from_digit(d, 10))
        .ok_or_else(|| Error::invalid(format!("{} is not a decimal digit", digit)))?;
    out.push(ch);
    Ok(())
}

/// Append digits naming a point inside `interval` (bounds already rescaled).
///
/// `⌊10·left⌋ + 1` is used when it falls strictly below `right`; otherwise the digit
/// `⌊10·left⌋` is emitted and the search continues one decimal place further.
fn finish_digits(mut interval: Interval, out: &mut String) -> Result<()> {
    let ten = Rational::from(10u64);
    loop {
        let digit = leading_digit(&interval.left);
        let next = &digit + 1u32;
        if Rational::from(next.clone()) < &interval.right * &ten {
            return push_digit(out, &next);
        }
        push_digit(out, &digit)?;
        interval = interval.shift_out(&digit);
    }
}

/// Encode `text` into a digit string under `model`.
///
/// # Errors
///
/// `InvalidArgument` if `text` is empty or holds a symbol the model does not know.
pub fn encode_digits(text: &str, model: &SymbolModel) -> Result<String> {
    if text.is_empty() {
        return Err(Error::invalid("arithmetic coding needs a non-empty text"));
    }
    let mut interval = Interval::unit();
    let mut digits = String::new();
    for ch in text.chars() {
        interval = interval.narrow(model, ch)?;
        loop {
            let digit = leading_digit(&interval.left);
            if digit != leading_digit(&interval.right) {
                break;
            }
            push_digit(&mut digits, &digit)?;
            interval = interval.shift_out(&digit);
        }
    }
    trace!(
        "arithmetic: {} shared digits, final width {}",
        digits.len(),
        interval.width()
    );
    finish_digits(interval, &mut digits)?;
    Ok(digits)
}

/// Decode `model.total` symbols from a digit string.
///
/// # Errors
///
/// `FormatError` if `digits` contains a non-digit.
pub fn decode_digits(digits: &str, model: &SymbolModel) -> Result<String> {
    let mut value = Rational::from_decimal_digits(digits)?;
    let total = Rational::from(model.total);
    // capacity bounded by the code, not by the declared total
    let mut output = String::with_capacity(model.total.min(digits.len() + 1));

    for i in 0..model.total {
        let scaled = &value * &total;
        let pos = scaled
            .floor()
            .to_usize()
            .and_then(|s| model.position_of(s))
            .ok_or_else(|| Error::format(format!("code value leaves [0, 1) at symbol {}", i)))?;
        output.push(model.symbols[pos]);

        let low = model.cum_freq[pos];
        let high = model.cum_freq[pos + 1];
        value = (&scaled - &Rational::from(low)).checked_div(&Rational::from(high - low))?;
    }
    Ok(output)
}

/// Exact-rational arithmetic codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct Arithmetic;

impl Arithmetic {
    pub fn new() -> Self {
        Arithmetic
    }
}

impl TextCodec for Arithmetic {
    fn name(&self) -> &'static str {
        "arithmetic"
    }

    fn encode(&self, source: &str) -> Result<Encoded> {
        if source.is_empty() {
            return Err(Error::invalid("arithmetic coding needs a non-empty text"));
        }
        let table = FrequencyTable::from_text(source);
        let model = SymbolModel::new(&table)?;
        let mut code = encode_digits(source, &model)?;
        let digit_count = code.len();
        code.push_str(&table.to_dictionary());
        let encoded = Encoded::new(source, code);
        debug!(
            "arithmetic: {} chars over {} symbols -> {} digits, ratio {:.3}",
            model.total,
            model.symbols.len(),
            digit_count,
            encoded.ratio
        );
        Ok(encoded)
    }

    fn decode(&self, code: &str) -> Result<String> {
        let (digits, table) = FrequencyTable::split_trailing_dictionary(code)?;
        let model = SymbolModel::new(&table)?;
        let decoded = decode_digits(digits, &model)?;
        debug!(
            "arithmetic: {} digits -> {} chars",
            digits.len(),
            model.total
        );
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(num: i64, den: i64) -> Rational {
        Rational::new(num, den).unwrap()
    }

    fn model_for(text: &str) -> SymbolModel {
        SymbolModel::new(&FrequencyTable::from_text(text)).unwrap()
    }

    #[test]
    fn test_symbol_model() {
        let model = model_for("abracadabra");
        assert_eq!(model.symbols, vec!['a', 'b', 'c', 'd', 'r']);
        assert_eq!(model.cum_freq, vec![0, 5, 7, 8, 9, 11]);
        assert_eq!(model.total, 11);
        assert_eq!(model.range('c'), Some((7, 8)));
        assert_eq!(model.range('z'), None);
        assert_eq!(model.position_of(0), Some(0));
        assert_eq!(model.position_of(4), Some(0));
        assert_eq!(model.position_of(5), Some(1));
        assert_eq!(model.position_of(10), Some(4));
        assert_eq!(model.position_of(11), None);
    }

    #[test]
    fn test_two_symbol_example() {
        let encoded = Arithmetic.encode("ab").unwrap();
        assert_eq!(encoded.code, "3{[a-1][b-1]}");
        assert_eq!(Arithmetic.decode("3{[a-1][b-1]}").unwrap(), "ab");
    }

    #[test]
    fn test_single_symbol() {
        let encoded = Arithmetic.encode("aaaa").unwrap();
        assert_eq!(encoded.code, "1{[a-4]}");
        assert_eq!(Arithmetic.decode(&encoded.code).unwrap(), "aaaa");
    }

    #[test]
    fn test_width_strictly_decreases() {
        let text = "hello arithmetic coding";
        let model = model_for(text);
        let mut interval = Interval::unit();
        for ch in text.chars() {
            let next = interval.narrow(&model, ch).unwrap();
            assert!(next.width() < interval.width());
            assert!(next.left() >= interval.left() && next.right() <= interval.right());
            interval = next;
        }
    }

    #[test]
    fn test_digits_fall_inside_final_interval() {
        for text in ["hello arithmetic coding", "abababababbbbbbbbbbba", "xyz", "zzzzy"] {
            let model = model_for(text);
            let mut interval = Interval::unit();
            for ch in text.chars() {
                interval = interval.narrow(&model, ch).unwrap();
            }
            let digits = encode_digits(text, &model).unwrap();
            let value = Rational::from_decimal_digits(&digits).unwrap();
            assert!(interval.contains(&value), "{} not inside for {:?}", value, text);
        }
    }

    #[test]
    fn test_final_digit_respects_open_right_bound() {
        // ⌊10·0.25⌋ + 1 = 3 would land exactly on the excluded bound 0.3
        let mut digits = String::new();
        finish_digits(Interval::new(r(1, 4), r(3, 10)).unwrap(), &mut digits).unwrap();
        assert_eq!(digits, "26");

        let mut digits = String::new();
        finish_digits(Interval::new(r(95, 100), Rational::one()).unwrap(), &mut digits).unwrap();
        assert_eq!(digits, "96");
    }

    #[test]
    fn test_encode_decode_simple() {
        let input = "hello arithmetic coding";
        let encoded = Arithmetic.encode(input).unwrap();
        assert_eq!(Arithmetic.decode(&encoded.code).unwrap(), input);
    }

    #[test]
    fn test_encode_decode_longer() {
        // long enough that f64 bounds would have collapsed many times over
        let input = "The quick brown fox jumps over the lazy dog. Arithmetic coding is cool! "
            .repeat(4);
        let encoded = Arithmetic.encode(&input).unwrap();
        assert_eq!(Arithmetic.decode(&encoded.code).unwrap(), input);
    }

    #[test]
    fn test_unicode_and_dictionary_characters() {
        let input = "{[ä-1]}\n—{}[]-9";
        let encoded = Arithmetic.encode(input).unwrap();
        assert_eq!(Arithmetic.decode(&encoded.code).unwrap(), input);
    }

    #[test]
    fn test_interval_validation() {
        assert!(Interval::new(r(1, 2), r(1, 2)).is_err());
        assert!(Interval::new(r(-1, 2), r(1, 2)).is_err());
        assert!(Interval::new(r(0, 1), r(3, 2)).is_err());
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(Arithmetic.encode(""), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_counts_overflowing_the_total() {
        let code = format!("5{{[a-{}][b-1]}}", usize::MAX);
        assert!(matches!(Arithmetic.decode(&code), Err(Error::FormatError(_))));
    }

    #[test]
    fn test_malformed_code() {
        for bad in ["", "123", "12x{[a-1][b-1]}", "12{[a-1][b-1]", "12{}"] {
            assert!(
                matches!(Arithmetic.decode(bad), Err(Error::FormatError(_))),
                "expected format error for {:?}",
                bad
            );
        }
    }
}
