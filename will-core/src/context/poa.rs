use crate::formatting::{display_address, format_date};
use crate::models::{AddressParts, Attorney, AttorneySlot, ContextMap, FormFields, PowerOfAttorney};

fn insert_attorney(
    ctx: &mut ContextMap,
    slot: AttorneySlot,
    attorney: Attorney,
) {
    // Attorney addresses are printed without the regional municipality.
    let address = display_address(&AddressParts {
        regional_municipality: String::new(),
        ..attorney.address
    });
    ctx.insert(slot.key("name"), attorney.name.into());
    ctx.insert(slot.key("relation"), attorney.relation.into());
    ctx.insert(slot.key("dob"), format_date(&attorney.dob).into());
    ctx.insert(slot.key("address"), address.into());
}

/// Entries for every included POA track and its alternate, if any.
pub fn build_poa_context(fields: &FormFields) -> ContextMap {
    let poa = PowerOfAttorney::from_fields(fields);

    let mut ctx = ContextMap::new();
    for designation in [poa.general, poa.personal_care].into_iter().flatten() {
        let track = designation.track;
        ctx.insert(track.include_key().into(), true.into());
        insert_attorney(&mut ctx, track.primary_slot(), designation.attorney);
        if let Some(alternate) = designation.alternate {
            insert_attorney(&mut ctx, track.alternate_slot(), alternate);
        }
    }
    ctx
}
