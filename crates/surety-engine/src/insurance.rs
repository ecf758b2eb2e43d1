//! Insurance Ledger
//!
//! Policies, passenger credit balances and treasury totals. Payouts are pull-based:
//! crediting only moves value into a passenger's on-ledger balance, and the passenger
//! withdraws it in a separate transaction. Finalization therefore never depends on a
//! transfer succeeding.
//!
//! Multi-entry updates (`credit_payout`) compute every new balance before writing any
//! of them, so an overflow rejects the whole call without partial effects.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use surety_core::{AccountId, Amount, FlightKey, PayoutRatio, Result, SuretyError};

use crate::flights::FlightRegistry;

/// Insurance held by one passenger on one flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Account that bought the policy and receives its payout
    pub passenger: AccountId,
    /// Insured flight
    pub flight: FlightKey,
    /// Premium escrowed at purchase
    pub premium: Amount,
    /// Set once the payout has been credited; never cleared
    pub payout_credited: bool,
}

/// A single credit applied by `credit_payout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutCredit {
    /// Account whose balance is credited
    pub passenger: AccountId,
    /// Insured flight
    pub flight: FlightKey,
    /// Value added to the passenger's balance
    pub amount: Amount,
}

/// Running totals of value held by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Treasury {
    /// Premiums paid into escrow
    pub premiums_escrowed: Amount,
    /// Airline participation fees collected
    pub airline_fees: Amount,
    /// Oracle registration fees collected (non-refundable)
    pub oracle_fees: Amount,
    /// Total credited to passenger balances
    pub credited: Amount,
    /// Payout in excess of premiums, drawn from the fee pool
    pub subsidy_paid: Amount,
    /// Total withdrawn by passengers
    pub withdrawn: Amount,
}

impl Treasury {
    /// Totals after collecting an airline fee.
    pub fn with_airline_fee(self, amount: Amount) -> Result<Self> {
        let airline_fees = self
            .airline_fees
            .checked_add(amount)
            .ok_or_else(|| SuretyError::overflow("collecting airline fee"))?;
        Ok(Self {
            airline_fees,
            ..self
        })
    }

    /// Totals after collecting an oracle registration fee.
    pub fn with_oracle_fee(self, amount: Amount) -> Result<Self> {
        let oracle_fees = self
            .oracle_fees
            .checked_add(amount)
            .ok_or_else(|| SuretyError::overflow("collecting oracle fee"))?;
        Ok(Self {
            oracle_fees,
            ..self
        })
    }

    /// Credited value not yet withdrawn.
    pub fn outstanding(&self) -> Amount {
        self.credited
            .checked_sub(self.withdrawn)
            .unwrap_or(Amount::ZERO)
    }
}

/// Policies and passenger balances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsuranceLedger {
    /// Policies grouped by flight, in purchase order
    policies: BTreeMap<FlightKey, IndexMap<AccountId, Policy>>,
    balances: BTreeMap<AccountId, Amount>,
    treasury: Treasury,
    max_premium: Amount,
    payout_ratio: PayoutRatio,
}

impl InsuranceLedger {
    /// Empty ledger enforcing `max_premium` and paying `payout_ratio` of the premium.
    pub fn new(max_premium: Amount, payout_ratio: PayoutRatio) -> Self {
        Self {
            policies: BTreeMap::new(),
            balances: BTreeMap::new(),
            treasury: Treasury::default(),
            max_premium,
            payout_ratio,
        }
    }

    /// Buy insurance on a registered flight, escrowing the premium.
    pub fn purchase(
        &mut self,
        flights: &FlightRegistry,
        passenger: AccountId,
        flight: &FlightKey,
        premium: Amount,
    ) -> Result<&Policy> {
        let registered = flights.require(flight)?;
        if registered.is_finalized() {
            return Err(SuretyError::FlightStatusFinalized {
                flight: flight.clone(),
            });
        }
        if premium.is_zero() {
            return Err(SuretyError::PremiumRequired);
        }
        if premium > self.max_premium {
            return Err(SuretyError::PremiumExceedsCap {
                premium,
                cap: self.max_premium,
            });
        }
        if self.is_insured(&passenger, flight) {
            return Err(SuretyError::AlreadyInsured {
                passenger,
                flight: flight.clone(),
            });
        }
        let escrowed = self
            .treasury
            .premiums_escrowed
            .checked_add(premium)
            .ok_or_else(|| SuretyError::overflow("escrowing premium"))?;

        self.treasury.premiums_escrowed = escrowed;
        let policy = Policy {
            passenger,
            flight: flight.clone(),
            premium,
            payout_credited: false,
        };
        Ok(self
            .policies
            .entry(flight.clone())
            .or_default()
            .entry(passenger)
            .or_insert(policy))
    }

    /// Credit every uncredited policy on `flight` with the payout multiple of its premium.
    ///
    /// Idempotent: policies already credited are skipped, so a second call returns an
    /// empty list and changes nothing.
    pub(crate) fn credit_payout(&mut self, flight: &FlightKey) -> Result<Vec<PayoutCredit>> {
        let Some(policies) = self.policies.get(flight) else {
            return Ok(Vec::new());
        };

        let mut credits = Vec::new();
        let mut new_balances = Vec::new();
        let mut credited_total = self.treasury.credited;
        let mut subsidy_total = self.treasury.subsidy_paid;
        for policy in policies.values().filter(|p| !p.payout_credited) {
            let amount = policy
                .premium
                .checked_mul_ratio(self.payout_ratio)
                .ok_or_else(|| SuretyError::overflow("computing payout"))?;
            let balance = self
                .balance_of(&policy.passenger)
                .checked_add(amount)
                .ok_or_else(|| SuretyError::overflow("crediting passenger balance"))?;
            credited_total = credited_total
                .checked_add(amount)
                .ok_or_else(|| SuretyError::overflow("totalling credits"))?;
            let subsidy = amount.checked_sub(policy.premium).unwrap_or(Amount::ZERO);
            subsidy_total = subsidy_total
                .checked_add(subsidy)
                .ok_or_else(|| SuretyError::overflow("totalling subsidy"))?;
            new_balances.push((policy.passenger, balance));
            credits.push(PayoutCredit {
                passenger: policy.passenger,
                flight: flight.clone(),
                amount,
            });
        }

        if let Some(policies) = self.policies.get_mut(flight) {
            for policy in policies.values_mut() {
                policy.payout_credited = true;
            }
        }
        self.balances.extend(new_balances);
        self.treasury.credited = credited_total;
        self.treasury.subsidy_paid = subsidy_total;
        Ok(credits)
    }

    /// Pay out and zero the passenger's entire balance.
    pub fn withdraw(&mut self, passenger: AccountId) -> Result<Amount> {
        let amount = self.balance_of(&passenger);
        if amount.is_zero() {
            return Err(SuretyError::NothingToWithdraw { passenger });
        }
        let withdrawn = self
            .treasury
            .withdrawn
            .checked_add(amount)
            .ok_or_else(|| SuretyError::overflow("recording withdrawal"))?;
        self.treasury.withdrawn = withdrawn;
        self.balances.remove(&passenger);
        Ok(amount)
    }

    /// Credited balance available to `passenger`.
    pub fn balance_of(&self, passenger: &AccountId) -> Amount {
        self.balances.get(passenger).copied().unwrap_or(Amount::ZERO)
    }

    /// Amount a `withdraw` would currently pay.
    pub fn pending_amount(&self, passenger: &AccountId) -> Amount {
        self.balance_of(passenger)
    }

    /// Whether `passenger` holds a policy on `flight`.
    pub fn is_insured(&self, passenger: &AccountId, flight: &FlightKey) -> bool {
        self.policy(passenger, flight).is_some()
    }

    /// The policy `passenger` holds on `flight`.
    pub fn policy(&self, passenger: &AccountId, flight: &FlightKey) -> Option<&Policy> {
        self.policies.get(flight).and_then(|p| p.get(passenger))
    }

    /// Policies on `flight`, in purchase order.
    pub fn policies_on(&self, flight: &FlightKey) -> Vec<&Policy> {
        self.policies
            .get(flight)
            .map(|p| p.values().collect())
            .unwrap_or_default()
    }

    /// Snapshot of the running totals.
    pub fn treasury(&self) -> Treasury {
        self.treasury
    }

    pub(crate) fn replace_treasury(&mut self, treasury: Treasury) {
        self.treasury = treasury;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::governance::AirlineRegistry;
    use assert_matches::assert_matches;
    use surety_core::FlightStatus;

    const HALF: Amount = Amount::from_base_units(500_000_000_000_000_000);
    const ONE_AND_HALF: Amount = Amount::from_base_units(1_500_000_000_000_000_000);

    fn passenger(n: u8) -> AccountId {
        AccountId::new([100 + n; 20])
    }

    fn setup() -> (FlightRegistry, FlightKey, InsuranceLedger) {
        let airline = AccountId::new([2u8; 20]);
        let mut gov = AirlineRegistry::with_founder(airline, "Airline", Amount::units(10), 4);
        gov.fund(airline, Amount::units(10)).unwrap();
        let mut flights = FlightRegistry::new();
        flights
            .register(&gov, airline, "5678", "CCC", "DDD", 1_000)
            .unwrap();
        let key = FlightKey::new(airline, "5678", 1_000);
        (
            flights,
            key,
            InsuranceLedger::new(Amount::units(1), PayoutRatio::default()),
        )
    }

    #[test]
    fn test_purchase_escrows_premium() {
        let (flights, key, mut ledger) = setup();
        let policy = ledger
            .purchase(&flights, passenger(1), &key, Amount::units(1))
            .unwrap();
        assert_eq!(policy.premium, Amount::units(1));
        assert!(!policy.payout_credited);
        assert!(ledger.is_insured(&passenger(1), &key));
        assert_eq!(ledger.treasury().premiums_escrowed, Amount::units(1));
    }

    #[test]
    fn test_purchase_rejections() {
        let (flights, key, mut ledger) = setup();
        let unknown = FlightKey::new(key.airline, "3333", 1_000);

        assert_matches!(
            ledger.purchase(&flights, passenger(1), &unknown, Amount::units(1)),
            Err(SuretyError::FlightNotRegistered { .. })
        );
        assert_matches!(
            ledger.purchase(&flights, passenger(1), &key, Amount::ZERO),
            Err(SuretyError::PremiumRequired)
        );
        let over = Amount::units(1)
            .checked_add(Amount::from_base_units(1))
            .unwrap();
        assert_matches!(
            ledger.purchase(&flights, passenger(1), &key, over),
            Err(SuretyError::PremiumExceedsCap { .. })
        );
        assert!(!ledger.is_insured(&passenger(1), &key));
        assert_eq!(ledger.treasury(), Treasury::default());
    }

    #[test]
    fn test_one_policy_per_passenger_and_flight() {
        let (flights, key, mut ledger) = setup();
        ledger
            .purchase(&flights, passenger(1), &key, Amount::units(1))
            .unwrap();
        assert_matches!(
            ledger.purchase(&flights, passenger(1), &key, HALF),
            Err(SuretyError::AlreadyInsured { .. })
        );
        ledger.purchase(&flights, passenger(2), &key, HALF).unwrap();
        assert_eq!(ledger.policies_on(&key).len(), 2);
    }

    #[test]
    fn test_purchase_after_finalization_rejected() {
        let (mut flights, key, mut ledger) = setup();
        flights.set_status(&key, FlightStatus::OnTime).unwrap();
        assert_matches!(
            ledger.purchase(&flights, passenger(1), &key, HALF),
            Err(SuretyError::FlightStatusFinalized { .. })
        );
    }

    #[test]
    fn test_credit_payout_is_idempotent() {
        let (flights, key, mut ledger) = setup();
        ledger
            .purchase(&flights, passenger(1), &key, Amount::units(1))
            .unwrap();
        ledger.purchase(&flights, passenger(2), &key, HALF).unwrap();

        let credits = ledger.credit_payout(&key).unwrap();
        assert_eq!(credits.len(), 2);
        assert_eq!(ledger.balance_of(&passenger(1)), ONE_AND_HALF);
        assert_eq!(
            ledger.balance_of(&passenger(2)),
            Amount::from_base_units(750_000_000_000_000_000)
        );

        // 1.5 + 0.75 credited against 1 + 0.5 escrowed
        let subsidy = Amount::from_base_units(750_000_000_000_000_000);
        assert_eq!(ledger.treasury().subsidy_paid, subsidy);

        let again = ledger.credit_payout(&key).unwrap();
        assert!(again.is_empty());
        assert_eq!(ledger.balance_of(&passenger(1)), ONE_AND_HALF);
        assert_eq!(ledger.treasury().subsidy_paid, subsidy);
        assert!(ledger.policy(&passenger(1), &key).unwrap().payout_credited);
    }

    #[test]
    fn test_credit_without_policies_is_empty() {
        let (_, key, mut ledger) = setup();
        assert!(ledger.credit_payout(&key).unwrap().is_empty());
    }

    #[test]
    fn test_withdraw_pays_full_balance() {
        let (flights, key, mut ledger) = setup();
        assert_matches!(
            ledger.withdraw(passenger(1)),
            Err(SuretyError::NothingToWithdraw { .. })
        );

        ledger
            .purchase(&flights, passenger(1), &key, Amount::units(1))
            .unwrap();
        ledger.credit_payout(&key).unwrap();
        assert_eq!(ledger.pending_amount(&passenger(1)), ONE_AND_HALF);

        assert_eq!(ledger.withdraw(passenger(1)).unwrap(), ONE_AND_HALF);
        assert_eq!(ledger.balance_of(&passenger(1)), Amount::ZERO);
        assert_matches!(
            ledger.withdraw(passenger(1)),
            Err(SuretyError::NothingToWithdraw { .. })
        );

        let treasury = ledger.treasury();
        assert_eq!(treasury.credited, ONE_AND_HALF);
        assert_eq!(treasury.withdrawn, ONE_AND_HALF);
        assert_eq!(treasury.outstanding(), Amount::ZERO);
    }

    #[test]
    fn test_credit_overflow_leaves_state_untouched() {
        let (flights, key, mut ledger) = setup();
        ledger
            .purchase(&flights, passenger(1), &key, Amount::units(1))
            .unwrap();
        ledger
            .balances
            .insert(passenger(1), Amount::from_base_units(u128::MAX));
        let before = ledger.clone();

        assert_matches!(
            ledger.credit_payout(&key),
            Err(SuretyError::AmountOverflow { .. })
        );
        assert_eq!(ledger, before);
    }
}
