use serde::{Deserialize, Serialize};

use crate::config::TOTAL_STEPS;
use crate::labels::Labels;

/// The six wizard stages, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    BasicInfo,
    MainComplaint,
    Medications,
    Questions,
    Attachment,
    Summary,
}

impl Step {
    pub const ALL: [Step; TOTAL_STEPS as usize] = [
        Self::BasicInfo,
        Self::MainComplaint,
        Self::Medications,
        Self::Questions,
        Self::Attachment,
        Self::Summary,
    ];

    pub const FIRST: Step = Self::BasicInfo;
    pub const LAST: Step = Self::Summary;

    /// 1-based position.
    pub fn number(self) -> u8 {
        match self {
            Self::BasicInfo => 1,
            Self::MainComplaint => 2,
            Self::Medications => 3,
            Self::Questions => 4,
            Self::Attachment => 5,
            Self::Summary => 6,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.get(usize::from(number).checked_sub(1)?).copied()
    }

    /// `None` at the last step.
    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    /// `None` at the first step.
    pub fn previous(self) -> Option<Self> {
        Self::from_number(self.number() - 1)
    }

    pub fn title(self, labels: &Labels) -> &'static str {
        labels.step_titles[usize::from(self.number() - 1)]
    }

    /// Fraction of the wizard completed, for a progress bar.
    pub fn progress(self) -> f32 {
        f32::from(self.number()) / f32::from(TOTAL_STEPS)
    }
}
