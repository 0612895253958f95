use serde::{Deserialize, Serialize};

use crate::domain::types::{Currency, TypeConstraintError};

/// Per-branch billing defaults. Branches without a stored row fall back to
/// [`BranchSettings::defaults`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BranchSettings {
    pub branch_id: i32,
    pub default_tax_rate_bp: i32,
    pub default_currency: Currency,
    /// Days after the issue date before an un-dated invoice counts as
    /// overdue.
    pub overdue_after_days: i32,
}

impl BranchSettings {
    pub fn defaults(branch_id: i32) -> Self {
        Self {
            branch_id,
            default_tax_rate_bp: 1000,
            default_currency: Currency::Jpy,
            overdue_after_days: 30,
        }
    }
}

/// Payload for upserting branch settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateBranchSettings {
    pub default_tax_rate_bp: i32,
    pub default_currency: Currency,
    pub overdue_after_days: i32,
}

impl UpdateBranchSettings {
    pub fn new(
        default_tax_rate_bp: i32,
        default_currency: Currency,
        overdue_after_days: i32,
    ) -> Result<Self, TypeConstraintError> {
        if !(0..=10_000).contains(&default_tax_rate_bp) {
            return Err(TypeConstraintError::InvalidValue(format!(
                "tax rate out of range: {default_tax_rate_bp}bp"
            )));
        }
        if !(1..=365).contains(&overdue_after_days) {
            return Err(TypeConstraintError::InvalidValue(format!(
                "overdue window out of range: {overdue_after_days} days"
            )));
        }
        Ok(Self {
            default_tax_rate_bp,
            default_currency,
            overdue_after_days,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_jpy_ten_percent() {
        let settings = BranchSettings::defaults(4);
        assert_eq!(settings.branch_id, 4);
        assert_eq!(settings.default_tax_rate_bp, 1000);
        assert_eq!(settings.default_currency, Currency::Jpy);
        assert_eq!(settings.overdue_after_days, 30);
    }

    #[test]
    fn update_validates_ranges() {
        assert!(UpdateBranchSettings::new(800, Currency::Usd, 45).is_ok());
        assert!(UpdateBranchSettings::new(-1, Currency::Jpy, 30).is_err());
        assert!(UpdateBranchSettings::new(1000, Currency::Jpy, 0).is_err());
        assert!(UpdateBranchSettings::new(1000, Currency::Jpy, 400).is_err());
    }
}
