use ethers::{abi::AbiDecode, types::Bytes};
use thiserror::Error;

/// Contract interaction errors
#[derive(Debug, Error, Clone)]
pub enum ContractsError {
    /// Contract call failed (revert or transport)
    #[error("contract call error: {inner}")]
    Call {
        /// The inner error message
        inner: String,
    },

    /// Data decoding error
    #[error("decode error: {inner}")]
    Decode {
        /// The inner error message
        inner: String,
    },
}

pub(crate) fn call_error<E: std::fmt::Display>(err: E) -> ContractsError {
    ContractsError::Call { inner: err.to_string() }
}

/// Selector of the solidity `Error(string)` revert
const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// Decodes a human-readable reason from raw revert data when it carries the
/// standard `Error(string)` wrapper, `None` otherwise
pub fn decode_revert_string(data: &Bytes) -> Option<String> {
    if data.len() >= 4 && data[0..4] == ERROR_STRING_SELECTOR {
        String::decode(&data[4..]).ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::abi::AbiEncode;

    #[test]
    fn decode_error_string_revert() {
        let reason = "SafeERC20: low-level call failed".to_string();
        let data: Bytes =
            [ERROR_STRING_SELECTOR.to_vec(), reason.clone().encode()].concat().into();
        assert_eq!(decode_revert_string(&data), Some(reason));
    }

    #[test]
    fn decode_opaque_revert() {
        assert_eq!(decode_revert_string(&Bytes::from_static(b"\x01\x02\x03\x04\x05")), None);
        assert_eq!(decode_revert_string(&Bytes::default()), None);
    }
}
