//! # Payment Intake
//!
//! Cash counting for one open bill.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   open(due) ──► [ ] received = 0                                        │
//! │                  │                                                      │
//! │      add_denomination(100)          mark_exact()                        │
//! │                  │                       │                              │
//! │                  ▼                       ▼                              │
//! │        [100, 100, 20]             [EXACT] received = due                │
//! │        received = Σ                      │                              │
//! │                  │                       │ add_denomination resets      │
//! │                  │                       │ the stack first              │
//! │                  ▼                       ▼                              │
//! │   set_manual_received(x) ──► [ ] received = x                           │
//! │                                                                         │
//! │   change_due() = max(0, received − due)    (derived, never stored)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The intake lives for one payment only and is never persisted.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::validation::{validate_denomination, validate_non_negative};

/// Default note and coin values offered at the till, largest first.
pub const DEFAULT_DENOMINATIONS: [Money; 6] = [
    Money::from_major(1000),
    Money::from_major(500),
    Money::from_major(100),
    Money::from_major(50),
    Money::from_major(20),
    Money::from_major(10),
];

/// One entry on the contribution stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "amount")]
pub enum Contribution {
    /// A banknote or coin of this value.
    Denomination(Money),
    /// "Customer paid exactly the amount due."
    Exact,
}

/// How many of one denomination were counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DenominationCount {
    pub value: Money,
    pub count: u32,
}

/// Read-only view of an intake for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PaymentSnapshot {
    pub due: Money,
    pub received: Money,
    pub change: Money,
    pub exact: bool,
    pub denominations: Vec<DenominationCount>,
}

/// Scratch state while a bill is being paid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntake {
    contributions: Vec<Contribution>,
    received: Money,
    due: Money,
}

impl PaymentIntake {
    /// Opens an intake for `due` with nothing received yet.
    pub fn open(due: Money) -> Self {
        PaymentIntake {
            contributions: Vec::new(),
            received: Money::zero(),
            due,
        }
    }

    /// Counts one banknote or coin.
    ///
    /// An exact-amount entry is dropped first; the two ways of entering a
    /// payment never mix.
    ///
    /// ## Errors
    /// `InvalidAmount` if `amount` is not positive or the running total
    /// would overflow. The intake is unchanged.
    pub fn add_denomination(&mut self, amount: Money) -> CoreResult<Money> {
        let amount = validate_denomination(amount)?;
        let base = if self.is_exact() {
            Money::zero()
        } else {
            self.received
        };
        let received = base
            .checked_add(amount)
            .ok_or_else(|| CoreError::amount_overflow("received"))?;

        if self.is_exact() {
            self.contributions.clear();
        }
        self.contributions.push(Contribution::Denomination(amount));
        self.received = received;
        Ok(self.received)
    }

    /// Replaces everything counted so far with "exactly the amount due".
    pub fn mark_exact(&mut self) -> Money {
        self.contributions.clear();
        self.contributions.push(Contribution::Exact);
        self.received = self.due;
        self.received
    }

    /// Takes back the most recent contribution. No-op on an empty stack.
    pub fn undo_last(&mut self) -> Money {
        match self.contributions.pop() {
            Some(Contribution::Exact) => self.reset(),
            Some(Contribution::Denomination(amount)) => self.received -= amount,
            None => {}
        }
        self.received
    }

    pub fn reset(&mut self) {
        self.contributions.clear();
        self.received = Money::zero();
    }

    /// Overrides the received amount with a typed figure and drops the
    /// contribution stack.
    ///
    /// ## Errors
    /// `InvalidAmount` if `amount` is negative. The intake is unchanged.
    pub fn set_manual_received(&mut self, amount: Money) -> CoreResult<Money> {
        let amount = validate_non_negative("received", amount)?;
        self.contributions.clear();
        self.received = amount;
        Ok(self.received)
    }

    /// max(0, received − due).
    pub fn change_due(&self) -> Money {
        (self.received - self.due).clamp_non_negative()
    }

    pub fn received(&self) -> Money {
        self.received
    }

    pub fn due(&self) -> Money {
        self.due
    }

    pub fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }

    /// True while the stack holds only the exact-amount entry.
    pub fn is_exact(&self) -> bool {
        matches!(self.contributions.as_slice(), [Contribution::Exact])
    }

    /// Counted denominations grouped by value, highest first.
    pub fn denomination_counts(&self) -> Vec<DenominationCount> {
        let mut counts: Vec<DenominationCount> = Vec::new();
        for contribution in &self.contributions {
            if let Contribution::Denomination(value) = contribution {
                match counts.iter_mut().find(|c| c.value == *value) {
                    Some(c) => c.count += 1,
                    None => counts.push(DenominationCount {
                        value: *value,
                        count: 1,
                    }),
                }
            }
        }
        counts.sort_by(|a, b| b.value.cmp(&a.value));
        counts
    }

    pub fn snapshot(&self) -> PaymentSnapshot {
        PaymentSnapshot {
            due: self.due,
            received: self.received,
            change: self.change_due(),
            exact: self.is_exact(),
            denominations: self.denomination_counts(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denominations_accumulate_and_undo() {
        let mut intake = PaymentIntake::open(Money::from_major(150));

        intake.add_denomination(Money::from_major(100)).unwrap();
        intake.add_denomination(Money::from_major(100)).unwrap();
        assert_eq!(intake.received(), Money::from_major(200));
        assert_eq!(intake.change_due(), Money::from_major(50));

        intake.undo_last();
        assert_eq!(intake.received(), Money::from_major(100));
        assert_eq!(intake.change_due(), Money::zero());
    }

    #[test]
    fn test_denomination_overflow_rejected_without_change() {
        let mut intake = PaymentIntake::open(Money::from_major(150));
        intake
            .add_denomination(Money::from_cents(i64::MAX))
            .unwrap();
        let before = intake.clone();

        let err = intake.add_denomination(Money::from_cents(1)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidAmount { .. }));
        assert_eq!(intake, before);
        assert_eq!(
            intake.change_due(),
            Money::from_cents(i64::MAX) - Money::from_major(150)
        );
    }

    #[test]
    fn test_denomination_after_exact_starts_from_zero() {
        let mut intake = PaymentIntake::open(Money::from_major(150));
        intake.mark_exact();

        intake
            .add_denomination(Money::from_cents(i64::MAX))
            .unwrap();
        assert_eq!(intake.received(), Money::from_cents(i64::MAX));
        assert!(!intake.is_exact());
    }

    #[test]
    fn test_exact_then_undo_resets() {
        let due = Money::from_major_minor(237, 50);
        let mut intake = PaymentIntake::open(due);

        intake.mark_exact();
        assert_eq!(intake.received(), due);
        assert_eq!(intake.change_due(), Money::zero());
        assert!(intake.is_exact());

        intake.undo_last();
        assert_eq!(intake.received(), Money::zero());
        assert!(intake.contributions().is_empty());
    }

    #[test]
    fn test_denomination_after_exact_replaces_it() {
        let mut intake = PaymentIntake::open(Money::from_major(80));
        intake.mark_exact();

        intake.add_denomination(Money::from_major(100)).unwrap();

        assert!(!intake.is_exact());
        assert_eq!(intake.received(), Money::from_major(100));
        assert_eq!(intake.change_due(), Money::from_major(20));
    }

    #[test]
    fn test_exact_replaces_denominations() {
        let mut intake = PaymentIntake::open(Money::from_major(80));
        intake.add_denomination(Money::from_major(20)).unwrap();
        intake.mark_exact();

        assert_eq!(intake.contributions(), &[Contribution::Exact]);
        assert_eq!(intake.received(), Money::from_major(80));
    }

    #[test]
    fn test_manual_received_clears_stack() {
        let mut intake = PaymentIntake::open(Money::from_major(80));
        intake.add_denomination(Money::from_major(50)).unwrap();

        intake.set_manual_received(Money::from_major(90)).unwrap();

        assert!(intake.contributions().is_empty());
        assert_eq!(intake.received(), Money::from_major(90));
        assert_eq!(intake.change_due(), Money::from_major(10));
        // nothing left to undo
        assert_eq!(intake.undo_last(), Money::from_major(90));
    }

    #[test]
    fn test_invalid_amounts_leave_intake_unchanged() {
        let mut intake = PaymentIntake::open(Money::from_major(80));
        intake.add_denomination(Money::from_major(20)).unwrap();
        let before = intake.clone();

        assert!(matches!(
            intake.add_denomination(Money::zero()),
            Err(CoreError::InvalidAmount { .. })
        ));
        assert!(matches!(
            intake.set_manual_received(Money::from_cents(-1)),
            Err(CoreError::InvalidAmount { .. })
        ));
        assert_eq!(intake, before);
    }

    #[test]
    fn test_underpayment_clamps_change() {
        let mut intake = PaymentIntake::open(Money::from_major(500));
        intake.add_denomination(Money::from_major(100)).unwrap();
        assert_eq!(intake.change_due(), Money::zero());
    }

    #[test]
    fn test_undo_on_empty_is_noop() {
        let mut intake = PaymentIntake::open(Money::from_major(10));
        assert_eq!(intake.undo_last(), Money::zero());
    }

    #[test]
    fn test_denomination_counts_highest_first() {
        let mut intake = PaymentIntake::open(Money::from_major(700));
        for major in [100, 500, 100, 20] {
            intake.add_denomination(Money::from_major(major)).unwrap();
        }

        let counts = intake.denomination_counts();
        assert_eq!(
            counts,
            vec![
                DenominationCount { value: Money::from_major(500), count: 1 },
                DenominationCount { value: Money::from_major(100), count: 2 },
                DenominationCount { value: Money::from_major(20), count: 1 },
            ]
        );

        let snapshot = intake.snapshot();
        assert_eq!(snapshot.received, Money::from_major(720));
        assert_eq!(snapshot.change, Money::from_major(20));
        assert!(!snapshot.exact);
    }
}
