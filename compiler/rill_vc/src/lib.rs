//! Rill VC - content-addressed identities for scripts and their parts.
//!
//! Functions, modules, and enums are stored and referenced by the hash of a
//! canonical byte encoding. The encoding ignores irrelevant source
//! annotations (comments, brackets, module sugar), renders lexically bound
//! names as scope indices so alpha-equivalent functions share a hash, and
//! embeds the hashes of referenced objects, making object identity a
//! Merkle graph over the dependency relation.

mod encode;
mod object;

pub use object::{dependencies, VCObject, VCObjectPred};

use rill_ir::VCObjectHash;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

/// Hash a canonical byte encoding.
pub(crate) fn digest(bytes: &[u8]) -> VCObjectHash {
    let out = Sha256::digest(bytes);
    VCObjectHash::new(out.into())
}

/// Deterministic hash for a prelude builtin.
///
/// Builtins have no stored object; their identity is a namespaced marker
/// encoding. The pinned environment, the cast bridge, and elaboration all
/// derive the same address from the same qualified name.
pub fn builtin_hash(qualified_name: &str) -> VCObjectHash {
    let mut bytes = Vec::with_capacity(qualified_name.len() + 16);
    bytes.push(0x50);
    bytes.extend_from_slice(b"rill/builtin/");
    bytes.extend_from_slice(qualified_name.as_bytes());
    digest(&bytes)
}

/// The content address of the builtin `bool` enum.
///
/// Booleans are an ordinary two-constructor enum; everything that needs to
/// recognize them (the evaluator's `if`/`assert`, the cast bridge) shares
/// this hash.
pub fn bool_enum_hash() -> VCObjectHash {
    static HASH: OnceLock<VCObjectHash> = OnceLock::new();
    *HASH.get_or_init(|| {
        VCObject::Enum {
            name: "bool".into(),
            constructors: ["true".to_string(), "false".to_string()].into(),
        }
        .content_hash()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_hashes_are_stable_and_distinct() {
        assert_eq!(builtin_hash("Base.+"), builtin_hash("Base.+"));
        assert_ne!(builtin_hash("Base.+"), builtin_hash("Base.-"));
    }

    #[test]
    fn bool_enum_hash_matches_its_object() {
        let obj = VCObject::Enum {
            name: "bool".into(),
            constructors: ["false".to_string(), "true".to_string()].into(),
        };
        assert_eq!(bool_enum_hash(), obj.content_hash());
    }
}
