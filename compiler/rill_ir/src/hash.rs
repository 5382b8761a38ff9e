//! Content addresses for version-controlled objects.

use std::fmt;

/// The content address of a version-controlled object.
///
/// Hashes are computed by `rill_vc` over a canonical byte encoding; this
/// crate only defines the type because AST nodes embed resolved hashes.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VCObjectHash(pub [u8; 32]);

impl VCObjectHash {
    /// All-zero hash, used as a placeholder in tests.
    pub const ZERO: VCObjectHash = VCObjectHash([0; 32]);

    #[inline]
    pub const fn new(bytes: [u8; 32]) -> Self {
        VCObjectHash(bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for VCObjectHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for VCObjectHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Full hex is noise in test output; eight leading chars identify.
        write!(f, "VCObjectHash({:.8})", self.to_string())
    }
}
