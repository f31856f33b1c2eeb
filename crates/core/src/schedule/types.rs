use alloc::vec::Vec;

use derive_more::From;

/// Identifies a transaction within a schedule.
///
/// The textual grammar writes it as the decimal digits following the
/// operation letter, e.g. the `3` in `w3(x)`. Ordering is numeric, which is
/// what makes serial-order enumeration deterministic.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From)]
pub struct TransactionId(pub u64);

impl core::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of an [`Operation`], without its payload.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OpKind {
    Read,
    Write,
    Commit,
    Abort,
}

/// A single step of a schedule.
///
/// Only reads and writes carry a variable. `compensating` marks a write that
/// undoes an earlier write of an aborted transaction; such writes only appear
/// in expanded schedules, never in a raw input.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "op", rename_all = "lowercase"))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operation<Variable> {
    Read {
        transaction: TransactionId,
        variable: Variable,
    },
    Write {
        transaction: TransactionId,
        variable: Variable,
        #[cfg_attr(feature = "serde", serde(default))]
        compensating: bool,
    },
    Commit {
        transaction: TransactionId,
    },
    Abort {
        transaction: TransactionId,
    },
}

impl<Variable> Operation<Variable> {
    pub const fn read(transaction: TransactionId, variable: Variable) -> Self {
        Self::Read {
            transaction,
            variable,
        }
    }

    pub const fn write(transaction: TransactionId, variable: Variable) -> Self {
        Self::Write {
            transaction,
            variable,
            compensating: false,
        }
    }

    /// A write undoing an earlier write of `transaction` on `variable`.
    pub const fn compensating_write(transaction: TransactionId, variable: Variable) -> Self {
        Self::Write {
            transaction,
            variable,
            compensating: true,
        }
    }

    pub const fn commit(transaction: TransactionId) -> Self {
        Self::Commit { transaction }
    }

    pub const fn abort(transaction: TransactionId) -> Self {
        Self::Abort { transaction }
    }

    #[must_use]
    pub const fn transaction(&self) -> TransactionId {
        match self {
            Self::Read { transaction, .. }
            | Self::Write { transaction, .. }
            | Self::Commit { transaction }
            | Self::Abort { transaction } => *transaction,
        }
    }

    /// The accessed variable, `None` for commits and aborts.
    #[must_use]
    pub const fn variable(&self) -> Option<&Variable> {
        match self {
            Self::Read { variable, .. } | Self::Write { variable, .. } => Some(variable),
            Self::Commit { .. } | Self::Abort { .. } => None,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> OpKind {
        match self {
            Self::Read { .. } => OpKind::Read,
            Self::Write { .. } => OpKind::Write,
            Self::Commit { .. } => OpKind::Commit,
            Self::Abort { .. } => OpKind::Abort,
        }
    }

    #[must_use]
    pub const fn is_compensating(&self) -> bool {
        matches!(
            self,
            Self::Write {
                compensating: true,
                ..
            }
        )
    }

    /// Returns `true` for commits and aborts.
    #[must_use]
    pub const fn is_terminator(&self) -> bool {
        matches!(self, Self::Commit { .. } | Self::Abort { .. })
    }
}

/// An interleaved sequence of operations. Position is the only notion of time.
pub type Schedule<Variable> = Vec<Operation<Variable>>;
