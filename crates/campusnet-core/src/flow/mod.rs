//! Typed structures exchanged with the topology/flow authority.
//!
//! The controller never threads loosely-typed maps through its pipeline:
//! authority answers are decoded into `AttachmentPoint`/`Hop` at the boundary,
//! and flow rules are built as `RuleDescriptor` before any wire encoding.

pub mod path;
pub mod rule;

pub use path::{AttachmentPoint, Hop};
pub use rule::{
    RuleAction, RuleDescriptor, RuleMatch, RuleRef, DEFAULT_FORWARDING_PRIORITY, ETH_TYPE_ARP,
    ETH_TYPE_IPV4,
};
