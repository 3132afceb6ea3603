//! Reciprocal ("mirror") will for the applicant's spouse.
//!
//! The mirror is derived from the main [`WillContext`]: the spouse, who must
//! be the primary executor, becomes the applicant and the applicant becomes
//! the executor. POA tracks held by the spouse are re-pointed at the
//! original applicant.

use thiserror::Error;
use tracing::debug;

use crate::document::uppercase_all;
use crate::formatting::compose_address;
use crate::models::{AddressParts, MirrorWillContext, PoaTrack, WillContext, keys};

const SPOUSE_TERMS: [&str; 3] = ["wife", "husband", "spouse"];
const SPOUSE: &str = "SPOUSE";
const MIRROR_SUFFIX: &str = "(MIRROR WILL)";

/// The primary executor is not the applicant's spouse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot create mirror will - spouse must be primary executor (relation: '{relation}')")]
pub struct EligibilityError {
    pub relation: String,
}

/// Case-insensitive substring match against wife/husband/spouse.
pub fn is_spouse_relation(relation: &str) -> bool {
    let relation = relation.to_lowercase();
    SPOUSE_TERMS.iter().any(|term| relation.contains(term))
}

/// Succeeds when `context` may be mirrored.
pub fn check_eligibility(context: &WillContext) -> Result<(), EligibilityError> {
    let relation = context.text(keys::RELATION_EXECUTOR_ONE);
    if is_spouse_relation(relation) {
        Ok(())
    } else {
        Err(EligibilityError {
            relation: relation.to_string(),
        })
    }
}

/// Opposite gender and its pronoun. Anything other than male/female keeps
/// its value and gets `THEIR`.
pub fn mirrored_gender(gender: &str) -> (String, &'static str) {
    match gender.trim().to_lowercase().as_str() {
        "male" => ("FEMALE".to_string(), "HER"),
        "female" => ("MALE".to_string(), "HIS"),
        _ => (gender.to_string(), "THEIR"),
    }
}

fn read_address(
    context: &WillContext,
    names: &[&str; 6],
) -> AddressParts {
    let [number, street, city, region, province, postal] =
        names.map(|k| context.text(k).to_string());
    AddressParts {
        street_number: number,
        street_name: street,
        city,
        regional_municipality: region,
        province,
        postal_code: postal,
    }
}

fn write_address(
    context: &mut WillContext,
    names: &[&str; 6],
    parts: &AddressParts,
) {
    for (key, value) in names.iter().zip(parts.parts()) {
        context.insert(*key, value);
    }
}

/// Builds the spouse's will from `original` without modifying it.
///
/// Deterministic: the same input always yields the same mirror.
pub fn derive_mirror(original: &WillContext) -> Result<MirrorWillContext, EligibilityError> {
    check_eligibility(original)?;

    let mut ctx = original.clone();

    let applicant_name = original.text(keys::NAME).to_string();
    let applicant_dob = original.text(keys::DOB).to_string();
    let applicant_address = read_address(original, &keys::APPLICANT_ADDRESS);
    let executor_address = read_address(original, &keys::EXECUTOR_ADDRESS);

    ctx.insert(keys::NAME, original.text(keys::EXECUTOR_NAME_ONE));
    ctx.insert(keys::DOB, original.text(keys::EXECUTOR_DOB_ONE));
    ctx.insert(keys::EXECUTOR_NAME_ONE, applicant_name.clone());
    ctx.insert(keys::EXECUTOR_DOB_ONE, applicant_dob.clone());
    ctx.insert(keys::RELATION_EXECUTOR_ONE, SPOUSE);

    if !executor_address.is_empty() {
        write_address(&mut ctx, &keys::APPLICANT_ADDRESS, &executor_address);
        write_address(&mut ctx, &keys::EXECUTOR_ADDRESS, &applicant_address);
    }

    let (gender, pronoun) = mirrored_gender(original.text(keys::GENDER));
    ctx.insert(keys::GENDER, gender);
    ctx.insert(keys::PRONOUN, pronoun);

    let new_address = compose_address(&read_address(&ctx, &keys::APPLICANT_ADDRESS));

    for track in PoaTrack::ALL {
        let slot = track.primary_slot();
        if !ctx.flag(track.include_key()) || !is_spouse_relation(ctx.text(&slot.key("relation"))) {
            continue;
        }
        debug!("mirror: {} attorney becomes the original applicant", track);
        ctx.insert(slot.key("name"), applicant_name.clone());
        ctx.insert(slot.key("relation"), SPOUSE);
        ctx.insert(slot.key("dob"), applicant_dob.clone());
        ctx.insert(slot.key("address"), new_address.clone());
    }

    ctx.insert(keys::ADDRESS, new_address.clone());
    ctx.insert(keys::ADDRESS_ALIAS, new_address);
    ctx.insert(keys::IS_MIRROR, true);
    let display = format!("{} {}", ctx.text(keys::NAME), MIRROR_SUFFIX);
    ctx.insert(keys::NAME_DISPLAY, display);

    Ok(MirrorWillContext::new(uppercase_all(&ctx)))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::ContextValue;

    fn base_context() -> WillContext {
        let mut ctx = WillContext::new();
        for (key, value) in [
            ("name", "Jane Doe"),
            ("gender", "Female"),
            ("pronoun", "HER"),
            ("dob", "01 May 1980"),
            ("street_number", "1"),
            ("street_name", "Main St"),
            ("city", "Springfield"),
            ("regional_municipality", "Metro County"),
            ("province", "ON"),
            ("postal_code", "A1A1A1"),
            ("executor_name_one", "John Doe"),
            ("executor_dob_one", "02 Mar 1978"),
            ("relation_executor_one", "Husband"),
        ] {
            ctx.insert(key, value);
        }
        ctx
    }

    fn with_executor_address(mut ctx: WillContext) -> WillContext {
        for (key, value) in [
            ("exec1_street_number", "9"),
            ("exec1_street_name", "Elm Rd"),
            ("exec1_city", "Shelbyville"),
            ("exec1_regional_municipality", ""),
            ("exec1_province", "ON"),
            ("exec1_postal_code", "B2B2B2"),
        ] {
            ctx.insert(key, value);
        }
        ctx
    }

    // =========================================================================
    // eligibility
    // =========================================================================

    #[test]
    fn spouse_terms_match_case_insensitively() {
        assert!(is_spouse_relation("Wife"));
        assert!(is_spouse_relation("HUSBAND"));
        assert!(is_spouse_relation("common-law spouse"));
        assert!(!is_spouse_relation("Friend"));
        assert!(!is_spouse_relation(""));
    }

    #[test]
    fn friend_executor_is_rejected_and_input_untouched() {
        let mut ctx = base_context();
        ctx.insert("relation_executor_one", "Friend");
        let before = ctx.clone();

        let err = derive_mirror(&ctx).unwrap_err();

        assert_eq!(err.relation, "Friend");
        assert_eq!(ctx, before);
    }

    // =========================================================================
    // swap
    // =========================================================================

    #[test]
    fn identity_swapped_and_executor_is_spouse() {
        let mirror = derive_mirror(&base_context()).unwrap();
        let ctx = mirror.context();

        assert_eq!(ctx.text("name"), "JOHN DOE");
        assert_eq!(ctx.text("dob"), "02 MAR 1978");
        assert_eq!(ctx.text("executor_name_one"), "JANE DOE");
        assert_eq!(ctx.text("executor_dob_one"), "01 MAY 1980");
        assert_eq!(ctx.text("relation_executor_one"), "SPOUSE");
        assert_eq!(ctx.text("name_display"), "JOHN DOE (MIRROR WILL)");
        assert_eq!(ctx.get("is_mirror"), Some(&ContextValue::Bool(true)));
    }

    #[test]
    fn address_kept_without_executor_address() {
        let mirror = derive_mirror(&base_context()).unwrap();

        assert_eq!(mirror.context().text("address"), "1 MAIN ST, SPRINGFIELD, ON A1A1A1");
        assert_eq!(mirror.context().text("city"), "SPRINGFIELD");
    }

    #[test]
    fn addresses_swapped_with_executor_address() {
        let mirror = derive_mirror(&with_executor_address(base_context())).unwrap();
        let ctx = mirror.context();

        assert_eq!(ctx.text("street_name"), "ELM RD");
        assert_eq!(ctx.text("regional_municipality"), "");
        assert_eq!(ctx.text("exec1_street_name"), "MAIN ST");
        assert_eq!(ctx.text("exec1_regional_municipality"), "METRO COUNTY");
        assert_eq!(ctx.text("address"), "9 ELM RD, SHELBYVILLE, ON B2B2B2");
        assert_eq!(ctx.text("full_address"), "9 ELM RD, SHELBYVILLE, ON B2B2B2");
    }

    #[test]
    fn gender_and_pronoun_mapping() {
        assert_eq!(mirrored_gender("Male"), ("FEMALE".to_string(), "HER"));
        assert_eq!(mirrored_gender("Female"), ("MALE".to_string(), "HIS"));
        assert_eq!(mirrored_gender(""), (String::new(), "THEIR"));
        assert_eq!(mirrored_gender("Other"), ("Other".to_string(), "THEIR"));
    }

    #[test]
    fn spouse_held_poa_points_at_original_applicant() {
        let mut ctx = with_executor_address(base_context());
        ctx.insert("include_poa", true);
        ctx.insert("poa_name_one", "John Doe");
        ctx.insert("poa_relation_one", "husband");
        ctx.insert("poa_dob_one", "02 Mar 1978");
        ctx.insert("include_poa_personal_care", true);
        ctx.insert("poa_name_three", "Sis Doe");
        ctx.insert("poa_relation_three", "Sister");

        let mirror = derive_mirror(&ctx).unwrap();
        let m = mirror.context();

        assert_eq!(m.text("poa_name_one"), "JANE DOE");
        assert_eq!(m.text("poa_relation_one"), "SPOUSE");
        assert_eq!(m.text("poa_dob_one"), "01 MAY 1980");
        assert_eq!(m.text("poa_address_one"), "9 ELM RD, SHELBYVILLE, ON B2B2B2");
        assert_eq!(m.text("poa_name_three"), "SIS DOE");
        assert_eq!(m.text("poa_relation_three"), "SISTER");
    }

    #[test]
    fn spouse_held_personal_care_poa_is_swapped() {
        let mut ctx = base_context();
        ctx.insert("include_poa_personal_care", true);
        ctx.insert("poa_name_three", "John Doe");
        ctx.insert("poa_relation_three", "Wife");
        ctx.insert("poa_dob_three", "02 Mar 1978");
        ctx.insert("poa_address_three", "elsewhere");

        let mirror = derive_mirror(&ctx).unwrap();
        let m = mirror.context();

        assert_eq!(m.text("poa_name_three"), "JANE DOE");
        assert_eq!(m.text("poa_relation_three"), "SPOUSE");
        assert_eq!(m.text("poa_dob_three"), "01 MAY 1980");
        assert_eq!(m.text("poa_address_three"), "1 MAIN ST, SPRINGFIELD, ON A1A1A1");
        assert_eq!(m.text("poa_name_one"), "");
    }

    #[test]
    fn poa_not_swapped_when_track_excluded() {
        let mut ctx = base_context();
        ctx.insert("poa_name_one", "John Doe");
        ctx.insert("poa_relation_one", "Husband");

        let mirror = derive_mirror(&ctx).unwrap();

        assert_eq!(mirror.context().text("poa_name_one"), "JOHN DOE");
    }

    #[test]
    fn derivation_is_deterministic() {
        let ctx = with_executor_address(base_context());

        assert_eq!(derive_mirror(&ctx), derive_mirror(&ctx));
    }

    #[test]
    fn original_context_unchanged_after_mirror() {
        let ctx = with_executor_address(base_context());
        let before = ctx.clone();

        let _ = derive_mirror(&ctx).unwrap();

        assert_eq!(ctx, before);
    }
}
