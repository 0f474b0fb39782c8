//! Misc utils

use ethers::{types::Address, utils::to_checksum};

/// Serializes an address in checksum form
pub fn as_checksum_addr<S>(val: &Address, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_str(&to_checksum(val, None))
}
