use diesel::prelude::*;

use crate::domain::settings::BranchSettings as DomainBranchSettings;
use crate::domain::types::TypeConstraintError;

#[derive(Debug, Clone, Queryable, Insertable, Identifiable, Selectable)]
#[diesel(table_name = crate::schema::branch_settings)]
#[diesel(primary_key(branch_id))]
pub struct BranchSettings {
    pub branch_id: i32,
    pub default_tax_rate_bp: i32,
    pub default_currency: String,
    pub overdue_after_days: i32,
}

impl TryFrom<BranchSettings> for DomainBranchSettings {
    type Error = TypeConstraintError;

    fn try_from(settings: BranchSettings) -> Result<Self, Self::Error> {
        Ok(Self {
            branch_id: settings.branch_id,
            default_tax_rate_bp: settings.default_tax_rate_bp,
            default_currency: settings.default_currency.parse()?,
            overdue_after_days: settings.overdue_after_days,
        })
    }
}

impl From<&DomainBranchSettings> for BranchSettings {
    fn from(settings: &DomainBranchSettings) -> Self {
        Self {
            branch_id: settings.branch_id,
            default_tax_rate_bp: settings.default_tax_rate_bp,
            default_currency: settings.default_currency.code().to_string(),
            overdue_after_days: settings.overdue_after_days,
        }
    }
}
