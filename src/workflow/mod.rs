//! The release and post-release (bump) phases.
//!
//! Both phases are strictly linear. A failed gate aborts before anything
//! downstream runs; nothing already committed, tagged or pushed is rolled back.

mod bump;
mod confirm;
mod release;

pub use bump::{bump_version, BumpOutcome};
pub use confirm::{confirm_version, prompt_for_version};
pub use release::{check_preconditions, release, ReleaseOutcome};
