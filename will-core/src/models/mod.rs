pub mod fields;
mod form;
mod party;
mod step;
mod will_context;

pub use fields::{AttorneySlot, PoaTrack};
pub use form::{FormAccumulator, FormFields, FormValue};
pub use party::{
    AddressParts, Applicant, Attorney, Beneficiary, BeneficiarySlot, Executor, ExecutorSet,
    PoaDesignation, PowerOfAttorney,
};
pub use step::{FormStep, StepPosition};
pub use will_context::{ContextMap, ContextValue, MirrorWillContext, WillContext, keys};
