//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod badge;
mod member;
mod sync;

pub use badge::{BadgeCode, RoleId, RoleMapping};
pub use member::{IdentityHint, Member, MemberId};
pub use sync::{MemberSummary, OutcomeKind, RoleCounts, RoleGrantOutcome, SyncSummary};
