use std::fmt;

use serde::{Deserialize, Serialize};

use super::fields;

/// The five ordered pages of the will intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FormStep {
    Personal,
    Executors,
    Beneficiaries,
    PowerOfAttorney,
    Review,
}

impl FormStep {
    pub const ALL: [FormStep; 5] = [
        Self::Personal,
        Self::Executors,
        Self::Beneficiaries,
        Self::PowerOfAttorney,
        Self::Review,
    ];

    /// 1-based page number as shown to the user.
    pub fn number(self) -> u8 {
        match self {
            Self::Personal => 1,
            Self::Executors => 2,
            Self::Beneficiaries => 3,
            Self::PowerOfAttorney => 4,
            Self::Review => 5,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Personal),
            2 => Some(Self::Executors),
            3 => Some(Self::Beneficiaries),
            4 => Some(Self::PowerOfAttorney),
            5 => Some(Self::Review),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Personal => "Personal information",
            Self::Executors => "Executors",
            Self::Beneficiaries => "Beneficiaries",
            Self::PowerOfAttorney => "Power of attorney",
            Self::Review => "Review",
        }
    }

    /// Where the cursor lands after this step is accepted.
    pub fn next(self) -> StepPosition {
        match self {
            Self::Personal => StepPosition::Step(Self::Executors),
            Self::Executors => StepPosition::Step(Self::Beneficiaries),
            Self::Beneficiaries => StepPosition::Step(Self::PowerOfAttorney),
            Self::PowerOfAttorney => StepPosition::Step(Self::Review),
            Self::Review => StepPosition::Complete,
        }
    }

    /// Whether `key` belongs to this step's field namespace.
    ///
    /// The pages post disjoint key sets; this is the partition batch intake
    /// uses to split one flat record back into per-step payloads.
    pub fn owns_field(
        self,
        key: &str,
    ) -> bool {
        match self {
            Self::Personal => {
                fields::PERSONAL_REQUIRED.contains(&key) || fields::ADDRESS_PARTS.contains(&key)
            }
            Self::Executors => {
                key.starts_with("exec1_")
                    || key.starts_with("exec2_")
                    || key.starts_with("wassiyat_")
                    || key.starts_with("specific_gift_")
                    || key == fields::INCLUDE_SECOND_EXECUTOR
            }
            Self::Beneficiaries => key.starts_with("beneficiary_") || key == fields::EQUAL_SHARES,
            Self::PowerOfAttorney => {
                key.starts_with("poa_")
                    || key.starts_with("include_poa")
                    || key.starts_with("second_poa")
            }
            Self::Review => key == fields::TERMS_AGREEMENT || key.starts_with("mirror_"),
        }
    }
}

impl fmt::Display for FormStep {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "step {} ({})", self.number(), self.title())
    }
}

/// Cursor of the step state machine.
///
/// Ordering follows form progression: every `Step` sorts before `Complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StepPosition {
    Step(FormStep),
    Complete,
}

impl StepPosition {
    /// Storage code: `"1"`..`"5"` or `"complete"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Step(FormStep::Personal) => "1",
            Self::Step(FormStep::Executors) => "2",
            Self::Step(FormStep::Beneficiaries) => "3",
            Self::Step(FormStep::PowerOfAttorney) => "4",
            Self::Step(FormStep::Review) => "5",
            Self::Complete => "complete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "complete" => Some(Self::Complete),
            other => other
                .parse::<u8>()
                .ok()
                .and_then(FormStep::from_number)
                .map(Self::Step),
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl Default for StepPosition {
    fn default() -> Self {
        Self::Step(FormStep::Personal)
    }
}

impl fmt::Display for StepPosition {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Step(step) => step.fmt(f),
            Self::Complete => f.write_str("complete"),
        }
    }
}
