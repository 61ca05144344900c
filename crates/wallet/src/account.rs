use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{AccountId, LedgerError, LedgerResult, UserId};

/// Wallet account: one per user, opened with a zero balance.
///
/// Invariant: `balance` equals the sum of `signed_amount()` over all
/// *approved* transactions of this account. Nothing outside the settlement
/// commit may mutate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: AccountId,
    pub owner: UserId,
    /// Balance in smallest currency unit (e.g., cents).
    pub balance: i64,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Open a fresh account for `owner` with `balance = 0`.
    pub fn open(owner: UserId, at: DateTime<Utc>) -> Self {
        Self {
            account_id: AccountId::new(),
            owner,
            balance: 0,
            created_at: at,
        }
    }

    /// Add a signed delta to the balance.
    ///
    /// Only the settlement commit calls this, inside the atomic unit that
    /// also writes the authorizing transaction's terminal status. Fails
    /// without mutating when the result would overflow `i64`.
    pub fn apply_delta(&mut self, delta: i64) -> LedgerResult<()> {
        self.balance = self
            .balance
            .checked_add(delta)
            .ok_or_else(|| LedgerError::invalid_amount("balance overflow"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_with_zero_balance() {
        let account = Account::open(UserId::new(), Utc::now());
        assert_eq!(account.balance, 0);
    }

    #[test]
    fn delta_is_signed() {
        let mut account = Account::open(UserId::new(), Utc::now());
        account.apply_delta(100_000).unwrap();
        account.apply_delta(-25_000).unwrap();
        assert_eq!(account.balance, 75_000);
    }

    #[test]
    fn overflowing_delta_fails_without_mutating() {
        let mut account = Account::open(UserId::new(), Utc::now());
        account.apply_delta(i64::MAX).unwrap();

        let err = account.apply_delta(1).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)));
        assert_eq!(account.balance, i64::MAX);
    }
}
