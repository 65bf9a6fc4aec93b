//! Persistence codec for simulation edit sets: `_type`-tagged JSON values and
//! compact URL-safe tokens.

pub mod tagged;
pub mod token;

pub use tagged::{parse_date, TaggedValue};
pub use token::{decode_token, decode_token_with_limit, encode_token, DEFAULT_COMPRESSION_LEVEL, MAX_DECODED_LEN};
