//! Builders that turn the flat accumulator into the template context.
//!
//! Every builder reads [`FormFields`] through the typed models and returns a
//! partial [`ContextMap`]. Missing optional sections are left out; nothing
//! here fails.

mod beneficiaries;
mod executor;
mod personal;
mod poa;

pub use beneficiaries::{build_beneficiaries_context, collect_beneficiaries};
pub use executor::build_executor_context;
pub use personal::{build_personal_context, pronoun_for};
pub use poa::build_poa_context;

use crate::models::{ContextMap, FormFields, WillContext, fields, keys};

/// `mirror_will`, `mirror_poa` and `mirror_notes` as chosen on the review
/// page.
pub fn build_mirror_options(fields: &FormFields) -> ContextMap {
    let mut ctx = ContextMap::new();
    ctx.insert(keys::MIRROR_WILL.into(), fields.flag(fields::MIRROR_WILL).into());
    ctx.insert(keys::MIRROR_POA.into(), fields.flag(fields::MIRROR_POA).into());
    ctx.insert(keys::MIRROR_NOTES.into(), fields.trimmed(fields::MIRROR_NOTES).into());
    ctx
}

/// Merges every builder's output into one context.
pub fn build_will_context(fields: &FormFields) -> WillContext {
    let mut ctx = WillContext::new();
    ctx.extend(build_poa_context(fields));
    ctx.extend(build_executor_context(fields));
    ctx.extend(build_beneficiaries_context(fields));
    ctx.extend(build_personal_context(fields));
    ctx.extend(build_mirror_options(fields));
    ctx
}
