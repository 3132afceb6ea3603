use rust_decimal::Decimal;

use crate::formatting::{equal_share, format_date, format_share, parse_share_or_zero, title_case};
use crate::models::fields::{self, MAX_BENEFICIARY_SLOTS};
use crate::models::{Beneficiary, BeneficiarySlot, ContextMap, ContextValue, FormFields, keys};

/// Beneficiaries that have a name, a relation and a date of birth, with
/// shares settled.
///
/// Equal shares (or shares that add up to nothing) give every beneficiary
/// `round(100 / N, 2)`.
pub fn collect_beneficiaries(fields: &FormFields) -> Vec<Beneficiary> {
    let mut beneficiaries: Vec<Beneficiary> = (1..=MAX_BENEFICIARY_SLOTS)
        .map(|slot| BeneficiarySlot::read(fields, slot))
        .filter(BeneficiarySlot::is_complete)
        .map(|slot| Beneficiary {
            slot: slot.slot,
            relation: title_case(&slot.relation),
            name: title_case(&slot.name),
            dob: format_date(&slot.dob),
            share: parse_share_or_zero(&slot.share),
        })
        .collect();

    let total: Decimal = beneficiaries.iter().map(|b| b.share).sum();
    if fields.flag(fields::EQUAL_SHARES) || total <= Decimal::ZERO {
        let share = equal_share(beneficiaries.len());
        for beneficiary in &mut beneficiaries {
            beneficiary.share = share;
        }
    }
    beneficiaries
}

fn beneficiary_entry(beneficiary: Beneficiary) -> ContextValue {
    let mut entry = ContextMap::new();
    entry.insert("relation".into(), beneficiary.relation.into());
    entry.insert("name".into(), beneficiary.name.into());
    entry.insert("dob".into(), beneficiary.dob.into());
    entry.insert("share".into(), format_share(beneficiary.share).into());
    entry.into()
}

/// `beneficiaries` list with two-decimal share strings, plus
/// `has_beneficiaries` and `equal_shares`.
pub fn build_beneficiaries_context(fields: &FormFields) -> ContextMap {
    let beneficiaries = collect_beneficiaries(fields);
    let has_beneficiaries = !beneficiaries.is_empty();

    let mut ctx = ContextMap::new();
    ctx.insert(
        keys::BENEFICIARIES.into(),
        ContextValue::List(beneficiaries.into_iter().map(beneficiary_entry).collect()),
    );
    ctx.insert(keys::HAS_BENEFICIARIES.into(), has_beneficiaries.into());
    ctx.insert(keys::EQUAL_SHARES.into(), fields.flag(fields::EQUAL_SHARES).into());
    ctx
}
