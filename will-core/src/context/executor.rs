use crate::formatting::format_date;
use crate::models::{ContextMap, ExecutorSet, FormFields, keys};

/// Executor names, relations and display dates, the primary executor's
/// address subfields, and the optional wassiyat and specific-gift clauses.
pub fn build_executor_context(fields: &FormFields) -> ContextMap {
    let set = ExecutorSet::from_fields(fields);

    let mut ctx = ContextMap::new();
    ctx.insert(keys::EXECUTOR_NAME_ONE.into(), set.primary.name.into());
    ctx.insert(keys::EXECUTOR_DOB_ONE.into(), format_date(&set.primary.dob).into());
    ctx.insert(keys::RELATION_EXECUTOR_ONE.into(), set.primary.relation.into());
    for (key, value) in keys::EXECUTOR_ADDRESS.iter().zip(set.primary.address.parts()) {
        ctx.insert((*key).into(), value.into());
    }

    ctx.insert(keys::INCLUDE_SECOND_EXECUTOR.into(), set.secondary.is_some().into());
    if let Some(second) = set.secondary {
        ctx.insert(keys::EXECUTOR_NAME_SECOND.into(), second.name.into());
        ctx.insert(keys::EXECUTOR_DOB_SECOND.into(), format_date(&second.dob).into());
        ctx.insert(keys::RELATION_EXECUTOR_SECOND.into(), second.relation.into());
    }

    if let Some(percentage) = set.wassiyat_percentage {
        ctx.insert(keys::WASSIYAT_PERCENTAGE.into(), percentage.into());
    }
    if let Some(gift) = set.specific_gift {
        ctx.insert(keys::SPECIFIC_GIFT.into(), gift.into());
    }
    ctx
}
