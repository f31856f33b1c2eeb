//! Conflict-serializability analysis of transaction schedules.
//!
//! `sercop_core` decides whether a schedule, an interleaving of reads,
//! writes, commits and aborts issued by several transactions, is equivalent
//! to some serial execution of those transactions. It supports four classes:
//!
//! 1. **CSR** (conflict serializable) -- the conflict graph over transactions
//!    is acyclic.
//! 2. **XCSR** (extended CSR) -- CSR, and still CSR after every abort is
//!    expanded into compensating writes followed by a commit.
//! 3. **OCSR** (order-preserving CSR) -- some equivalent serial order keeps
//!    every transaction that committed before another one started ahead of
//!    it.
//! 4. **COCSR** (commit-order-preserving CSR) -- the order of commits in the
//!    schedule is itself an equivalent serial order.
//!
//! COCSR implies OCSR, and both XCSR and OCSR imply CSR.
//!
//! The serial orders equivalent to a CSR schedule are the topological
//! orderings of its conflict graph. They are produced lazily and
//! deterministically by [`SerialOrders`](consistency::SerialOrders); OCSR and
//! COCSR filter them, so both can be bounded with an enumeration cap.
//!
//! # Entry points
//!
//! [`check()`] decides a single class and returns either a [`Witness`] or an
//! [`Error`](consistency::error::Error) explaining the violation.
//! [`analyze()`] decides several classes at once and returns a [`Report`]
//! with the conflict edges and, on request, every serial order.
//!
//! ```rust,ignore
//! use sercop_core::{check, Class};
//!
//! match check(&schedule, Class::Ocsr) {
//!     Ok(witness) => println!("order preserving: {witness:?}"),
//!     Err(err) => println!("violation: {err}"),
//! }
//! ```
//!
//! # Crate features
//!
//! - **`serde`** -- enables `Serialize`/`Deserialize` derives on schedules,
//!   witnesses, errors and reports.
//! - **`schemars`** -- additionally derives `JsonSchema` for the same types.
//!
//! This crate is `no_std` compatible (requires `alloc`). The textual schedule
//! parser lives in the separate `sercop_parser` crate.

#![cfg_attr(not(any(test, feature = "schemars")), no_std)]
extern crate alloc;

pub mod consistency;
pub mod graph;
pub mod schedule;

pub use consistency::{
    analyze, check, check_with_limit, AnalysisOptions, Class, Report, Verdict, Witness,
};
pub use schedule::types::{Operation, TransactionId};
pub use schedule::Schedule;
