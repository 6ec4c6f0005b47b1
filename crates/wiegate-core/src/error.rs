use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Frame errors
    #[error("Invalid bit value: {0} (expected 0 or 1)")]
    InvalidBit(u8),

    #[error("Empty frame: at least one bit is required")]
    EmptyFrame,

    #[error("Frame too long: {bits} bits exceeds the {max}-bit limit")]
    FrameTooLong { bits: usize, max: usize },

    // UID errors
    #[error("Invalid UID: {0}")]
    InvalidUid(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let cases = [
            (Error::InvalidBit(2), "Invalid bit value: 2"),
            (Error::EmptyFrame, "Empty frame"),
            (Error::FrameTooLong { bits: 65, max: 64 }, "65 bits exceeds the 64-bit limit"),
            (Error::InvalidUid("zz".to_string()), "Invalid UID: zz"),
        ];
        for (error, expected) in cases {
            assert!(error.to_string().contains(expected), "{error}");
        }
    }
}
