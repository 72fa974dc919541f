use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Qualitative band derived from a rating score, ordered worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    HighRisk,
    CautionAdvised,
    ConsiderInvesting,
    VeryAttractive,
}

impl Tier {
    pub const ALL: [Self; 4] = [
        Self::HighRisk,
        Self::CautionAdvised,
        Self::ConsiderInvesting,
        Self::VeryAttractive,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HighRisk => "high-risk",
            Self::CautionAdvised => "caution-advised",
            Self::ConsiderInvesting => "consider-investing",
            Self::VeryAttractive => "very-attractive",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::HighRisk => "High risk",
            Self::CautionAdvised => "Caution advised",
            Self::ConsiderInvesting => "Consider investing",
            Self::VeryAttractive => "Very attractive",
        }
    }

    /// Lowest score (inclusive) that falls in this tier.
    pub const fn min_score(self) -> u8 {
        match self {
            Self::HighRisk => 0,
            Self::CautionAdvised => 50,
            Self::ConsiderInvesting => 65,
            Self::VeryAttractive => 80,
        }
    }
}

impl Display for Tier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a score to its tier. Boundaries are inclusive on the lower end.
pub fn classify_tier(score: u8) -> Tier {
    Tier::ALL
        .into_iter()
        .rev()
        .find(|tier| score >= tier.min_score())
        .unwrap_or(Tier::HighRisk)
}
