use crate::formatting::{compose_address, format_date};
use crate::models::{Applicant, ContextMap, FormFields, keys};

/// Possessive pronoun printed in the will for the applicant's gender.
pub fn pronoun_for(gender: &str) -> &'static str {
    match gender.trim().to_lowercase().as_str() {
        "male" => "HIS",
        "female" => "HER",
        _ => "THEIR",
    }
}

/// Applicant identity, address subfields, composed address and pronoun.
pub fn build_personal_context(fields: &FormFields) -> ContextMap {
    let applicant = Applicant::from_fields(fields);
    let address = compose_address(&applicant.address);
    let pronoun = pronoun_for(&applicant.gender);

    let mut ctx = ContextMap::new();
    ctx.insert(keys::NAME.into(), applicant.name.into());
    ctx.insert(keys::DOB.into(), format_date(&applicant.dob).into());
    ctx.insert(keys::PHONE.into(), applicant.phone.into());
    ctx.insert(keys::EMAIL.into(), applicant.email.into());
    ctx.insert(keys::PRONOUN.into(), pronoun.into());
    ctx.insert(keys::GENDER.into(), applicant.gender.into());
    for (key, value) in keys::APPLICANT_ADDRESS.iter().zip(applicant.address.parts()) {
        ctx.insert((*key).into(), value.into());
    }
    ctx.insert(keys::ADDRESS.into(), address.clone().into());
    ctx.insert(keys::ADDRESS_ALIAS.into(), address.into());
    ctx
}
