//! Hard input errors.
//!
//! Most shape and pairing preconditions are caller errors checked with
//! `debug_assert!` only. The checks below are enforced in every build
//! because violating them would silently corrupt the constraint layout.

use thiserror::Error;

/// An input the solver refuses to work with.
#[derive(Debug, Error)]
pub enum InputError {
    /// The supplied starting constraint vector does not have `m_nlcon`
    /// entries.
    #[error("nlconstr0 has {got} entries but m_nlcon = {expected}")]
    NlConstr0Size { got: usize, expected: usize },
}
