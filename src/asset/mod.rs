//! Static assets: sources, content identities and substitution rules.

mod identity;
mod replace;
mod source;

pub use identity::{ContentIdentity, IdentityError, IdentityMap};
pub use replace::{ReplacementRule, ReplacementRules};
pub use source::{
    AssetEntry, AssetRoot, AssetSource, BundleSource, DirSource, EntryKind, is_hidden_name, join,
};
