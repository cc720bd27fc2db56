//! Payment Rail Seam
//!
//! The value-transfer collaborator, specified at its interface only. The
//! rail moves payment currency between an investor and the ledger's
//! custodial balance; it is atomic, all-or-nothing, and the caller is
//! already authenticated by the platform.

use lib_types::{Address, Amount};

use crate::errors::EstateResult;

/// External value-transfer mechanism
///
/// Implementations are provided by the enclosing platform. A failed
/// transfer must move nothing; the ledger treats any error as an
/// instruction to abort the surrounding operation with no state mutated.
pub trait PaymentRail: Send + Sync {
    /// Move `amount` from `from` into the custodial balance
    fn transfer_in(&self, from: &Address, amount: Amount) -> EstateResult<()>;

    /// Move `amount` from the custodial balance out to `to`
    fn transfer_out(&self, to: &Address, amount: Amount) -> EstateResult<()>;
}
