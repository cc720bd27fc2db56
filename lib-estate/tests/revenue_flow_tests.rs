//! Revenue distribution flows: purchase, deposit, lazy settlement, withdrawal

use std::sync::Mutex;

use anyhow::Result;
use lib_estate::{EstateError, EstateKernel, EstateResult, PaymentRail};
use lib_types::{Address, Amount};

/// Rail with a custodial balance and switchable failure injection
struct FlakyRail {
    custody: Mutex<Amount>,
    reject_in: Mutex<bool>,
    reject_out: Mutex<bool>,
}

impl FlakyRail {
    fn new() -> Self {
        Self {
            custody: Mutex::new(0),
            reject_in: Mutex::new(false),
            reject_out: Mutex::new(false),
        }
    }

    fn custody(&self) -> Amount {
        *self.custody.lock().unwrap()
    }

    fn reject_inbound(&self, reject: bool) {
        *self.reject_in.lock().unwrap() = reject;
    }

    fn reject_outbound(&self, reject: bool) {
        *self.reject_out.lock().unwrap() = reject;
    }
}

impl PaymentRail for FlakyRail {
    fn transfer_in(&self, _from: &Address, amount: Amount) -> EstateResult<()> {
        if *self.reject_in.lock().unwrap() {
            return Err(EstateError::TransferFailed("payment declined".to_string()));
        }
        *self.custody.lock().unwrap() += amount;
        Ok(())
    }

    fn transfer_out(&self, _to: &Address, amount: Amount) -> EstateResult<()> {
        if *self.reject_out.lock().unwrap() {
            return Err(EstateError::TransferFailed("payout declined".to_string()));
        }
        *self.custody.lock().unwrap() -= amount;
        Ok(())
    }
}

fn registrar() -> Address {
    Address::new([9u8; 32])
}

fn holder(id: u8) -> Address {
    Address::new([id; 32])
}

/// supply 100, price 10
fn setup() -> Result<(EstateKernel, u64)> {
    let mut kernel = EstateKernel::new(registrar());
    let id = kernel.register_property(
        "Harbor Lofts".to_string(),
        "Rotterdam".to_string(),
        100,
        10,
        registrar(),
        0,
    )?;
    Ok((kernel, id))
}

#[test]
fn worked_example_purchase_deposit_withdraw() -> Result<()> {
    let (mut kernel, id) = setup()?;
    let rail = FlakyRail::new();
    let buyer = holder(1);

    // 20 units at price 10: cost 200
    kernel.purchase_units(id, 20, buyer, 1, &rail)?;
    assert_eq!(rail.custody(), 200);
    assert_eq!(kernel.balance_of(id, &buyer), 20);
    assert_eq!(kernel.issued_units(id), 20);

    // deposit 100 over 20 issued units: increment 5
    kernel.deposit_revenue(id, 100, registrar(), 2, &rail)?;
    assert_eq!(kernel.get_pool(id).unwrap().revenue_per_unit, 5);
    assert_eq!(kernel.claimable(id, &buyer), 100);

    // withdraw pays 20 * 5 = 100 and settles fully
    let paid = kernel.withdraw_income(id, buyer, 3, &rail)?;
    assert_eq!(paid, 100);
    assert_eq!(rail.custody(), 200);
    assert_eq!(kernel.claimable(id, &buyer), 0);

    Ok(())
}

#[test]
fn second_withdraw_without_deposit_fails() -> Result<()> {
    let (mut kernel, id) = setup()?;
    let rail = FlakyRail::new();
    let buyer = holder(1);

    kernel.purchase_units(id, 20, buyer, 1, &rail)?;
    kernel.deposit_revenue(id, 100, registrar(), 2, &rail)?;
    kernel.withdraw_income(id, buyer, 3, &rail)?;

    assert_eq!(
        kernel.withdraw_income(id, buyer, 4, &rail),
        Err(EstateError::NoIncomeAvailable)
    );
    Ok(())
}

#[test]
fn withdraw_without_units_fails() -> Result<()> {
    let (mut kernel, id) = setup()?;
    let rail = FlakyRail::new();

    assert_eq!(
        kernel.withdraw_income(id, holder(1), 1, &rail),
        Err(EstateError::InsufficientBalance { have: 0, need: 1 })
    );
    Ok(())
}

#[test]
fn late_buyer_cannot_claim_earlier_revenue() -> Result<()> {
    let (mut kernel, id) = setup()?;
    let rail = FlakyRail::new();

    kernel.purchase_units(id, 20, holder(1), 1, &rail)?;
    kernel.deposit_revenue(id, 100, registrar(), 2, &rail)?;

    // second buyer enters after the first deposit
    kernel.purchase_units(id, 30, holder(2), 3, &rail)?;
    assert_eq!(kernel.claimable(id, &holder(2)), 0);
    assert_eq!(kernel.claimable(id, &holder(1)), 100);

    // next deposit accrues to both, proportionally: 100 / 50 = 2
    kernel.deposit_revenue(id, 100, registrar(), 4, &rail)?;
    assert_eq!(kernel.claimable(id, &holder(1)), 100 + 40);
    assert_eq!(kernel.claimable(id, &holder(2)), 60);

    Ok(())
}

// Documented quirk: a holder buying additional units keeps the claim
// baseline from their first purchase, so revenue deposited before the
// top-up is claimable for the new units as well.
#[test]
fn repeat_buyer_keeps_first_purchase_baseline() -> Result<()> {
    let (mut kernel, id) = setup()?;
    let rail = FlakyRail::new();
    let buyer = holder(1);

    kernel.purchase_units(id, 20, buyer, 1, &rail)?;
    kernel.deposit_revenue(id, 100, registrar(), 2, &rail)?; // accumulator 5
    assert_eq!(kernel.claimable(id, &buyer), 100);

    kernel.purchase_units(id, 10, buyer, 3, &rail)?;

    // 30 units x (5 - 0): the 10 new units claim the pre-top-up deposit too
    assert_eq!(kernel.claimable(id, &buyer), 150);
    Ok(())
}

#[test]
fn deposit_dust_stays_in_custody() -> Result<()> {
    let (mut kernel, id) = setup()?;
    let rail = FlakyRail::new();

    kernel.purchase_units(id, 30, holder(1), 1, &rail)?;

    // 100 / 30 = 3, remainder 10 is never distributed
    kernel.deposit_revenue(id, 100, registrar(), 2, &rail)?;
    assert_eq!(kernel.get_pool(id).unwrap().revenue_per_unit, 3);
    assert_eq!(kernel.get_pool(id).unwrap().total_revenue, 100);
    assert_eq!(kernel.claimable(id, &holder(1)), 90);

    let custody_before = rail.custody();
    kernel.withdraw_income(id, holder(1), 3, &rail)?;
    assert_eq!(rail.custody(), custody_before - 90);

    Ok(())
}

#[test]
fn deposit_before_any_purchase_moves_no_accumulator() -> Result<()> {
    let (mut kernel, id) = setup()?;
    let rail = FlakyRail::new();

    kernel.deposit_revenue(id, 500, registrar(), 1, &rail)?;
    assert_eq!(kernel.get_pool(id).unwrap().revenue_per_unit, 0);
    assert_eq!(kernel.get_pool(id).unwrap().total_revenue, 500);

    // a later buyer starts at baseline 0 == accumulator 0
    kernel.purchase_units(id, 20, holder(1), 2, &rail)?;
    assert_eq!(kernel.claimable(id, &holder(1)), 0);
    Ok(())
}

#[test]
fn failed_inbound_transfer_leaves_purchase_unapplied() -> Result<()> {
    let (mut kernel, id) = setup()?;
    let rail = FlakyRail::new();

    rail.reject_inbound(true);
    let result = kernel.purchase_units(id, 20, holder(1), 1, &rail);
    assert!(matches!(result, Err(EstateError::TransferFailed(_))));

    assert_eq!(kernel.balance_of(id, &holder(1)), 0);
    assert_eq!(kernel.issued_units(id), 0);
    assert_eq!(rail.custody(), 0);
    Ok(())
}

#[test]
fn failed_inbound_transfer_leaves_deposit_unapplied() -> Result<()> {
    let (mut kernel, id) = setup()?;
    let rail = FlakyRail::new();
    kernel.purchase_units(id, 20, holder(1), 1, &rail)?;

    rail.reject_inbound(true);
    let result = kernel.deposit_revenue(id, 100, registrar(), 2, &rail);
    assert!(matches!(result, Err(EstateError::TransferFailed(_))));

    assert_eq!(kernel.get_pool(id).unwrap().revenue_per_unit, 0);
    assert_eq!(kernel.get_pool(id).unwrap().total_revenue, 0);
    Ok(())
}

#[test]
fn failed_outbound_transfer_restores_claim_checkpoint() -> Result<()> {
    let (mut kernel, id) = setup()?;
    let rail = FlakyRail::new();
    let buyer = holder(1);

    kernel.purchase_units(id, 20, buyer, 1, &rail)?;
    kernel.deposit_revenue(id, 100, registrar(), 2, &rail)?;

    rail.reject_outbound(true);
    let result = kernel.withdraw_income(id, buyer, 3, &rail);
    assert!(matches!(result, Err(EstateError::TransferFailed(_))));

    // the claim survives the failed payout and succeeds once the rail recovers
    assert_eq!(kernel.claimable(id, &buyer), 100);
    rail.reject_outbound(false);
    assert_eq!(kernel.withdraw_income(id, buyer, 4, &rail)?, 100);
    Ok(())
}

#[test]
fn withdraw_on_inactive_property_fails() -> Result<()> {
    let (mut kernel, id) = setup()?;
    let rail = FlakyRail::new();
    let buyer = holder(1);

    kernel.purchase_units(id, 20, buyer, 1, &rail)?;
    kernel.deposit_revenue(id, 100, registrar(), 2, &rail)?;
    kernel.deactivate_property(id, registrar())?;

    assert_eq!(
        kernel.withdraw_income(id, buyer, 3, &rail),
        Err(EstateError::InactiveProperty(id))
    );
    Ok(())
}
