//! Token identifier.

use core::fmt;

/// Opaque identifier of a token bound to a pool.
///
/// Wraps a fixed-size `[u8; 32]` byte array; all byte sequences are valid,
/// so construction is infallible.  [`TokenAddress::from_symbol`] builds a
/// readable identifier from a ticker for tests and simulations.
///
/// # Examples
///
/// ```
/// use weighted_amm::domain::TokenAddress;
///
/// let weth = TokenAddress::from_symbol("WETH");
/// assert_eq!(weth.to_string(), "WETH");
/// assert_ne!(weth, TokenAddress::from_symbol("DAI"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenAddress([u8; 32]);

impl TokenAddress {
    /// Creates a `TokenAddress` from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Creates an address whose leading bytes spell `symbol`, zero padded.
    /// Symbols longer than 32 bytes are truncated.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Self {
        let mut bytes = [0u8; 32];
        for (slot, byte) in bytes.iter_mut().zip(symbol.bytes()) {
            *slot = byte;
        }
        Self(bytes)
    }

    /// Returns the underlying 32-byte representation.
    #[must_use]
    pub const fn as_bytes(&self) -> [u8; 32] {
        self.0
    }

    fn symbol(&self) -> Option<&str> {
        let len = self.0.iter().position(|b| *b == 0).unwrap_or(32);
        let (head, tail) = self.0.split_at(len);
        if head.is_empty() || tail.iter().any(|b| *b != 0) {
            return None;
        }
        if !head.iter().all(|b| b.is_ascii_graphic()) {
            return None;
        }
        core::str::from_utf8(head).ok()
    }
}

impl fmt::Display for TokenAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(symbol) = self.symbol() {
            return f.write_str(symbol);
        }
        f.write_str("0x")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}
