pub mod cs;

pub use cs::compression::{
    Arithmetic, Bwt, CodecKind, Encoded, FrequencyTable, Huffman, Lz78, Rational, Rle, TextCodec,
};
pub use cs::error::{Error, Result};
