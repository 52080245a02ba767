//! Termination codes reported by the solver.

use std::fmt;

/// Why the solver stopped.
///
/// "Still running" is represented as `Option<ExitStatus>::None` by the code
/// that produces these, never as a variant. The last three variants indicate
/// implementation bugs and should never be observed on valid input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// The lower bound of the trust-region radius was reached.
    SmallTrRadius,
    /// A feasible point with objective value at or below the target was found.
    FtargetAchieved,
    /// The evaluation budget was spent.
    MaxFunReached,
    /// The trust-region iteration budget was spent.
    MaxTrReached,
    /// NaN or infinity occurred in an iterate.
    NanInfX,
    /// Rounding errors were becoming damaging.
    DamagingRounding,
    /// The progress callback requested termination.
    CallbackTerminate,
    /// The objective function returned NaN or +infinity.
    NanInfF,
    /// NaN or infinity occurred in the internal linear model.
    NanInfModel,
    /// A trust-region step failed to reduce the model.
    TrSubproblemFailed,
}

impl ExitStatus {
    /// Whether this code indicates an implementation bug rather than an
    /// expected termination condition.
    pub fn is_bug(self) -> bool {
        matches!(
            self,
            Self::NanInfF | Self::NanInfModel | Self::TrSubproblemFailed
        )
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::SmallTrRadius => "the trust-region radius reached its lower bound",
            Self::FtargetAchieved => "the target objective value was achieved",
            Self::MaxFunReached => "the evaluation budget was spent",
            Self::MaxTrReached => "the trust-region iteration budget was spent",
            Self::NanInfX => "NaN or infinity occurred in an iterate",
            Self::DamagingRounding => "rounding errors were becoming damaging",
            Self::CallbackTerminate => "the callback requested termination",
            Self::NanInfF => "the objective function returned NaN or +infinity",
            Self::NanInfModel => "NaN or infinity occurred in the model",
            Self::TrSubproblemFailed => "a trust-region step failed to reduce the model",
        };
        write!(f, "{msg}")
    }
}
