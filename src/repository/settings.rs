//! Repository implementation for branch settings.

use diesel::prelude::*;
use diesel::upsert::excluded;

use crate::domain::settings::BranchSettings;
use crate::models::settings::BranchSettings as DbBranchSettings;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, SettingsReader, SettingsWriter};

impl SettingsReader for DieselRepository {
    fn get_branch_settings(&self, branch_id: i32) -> RepositoryResult<BranchSettings> {
        use crate::schema::branch_settings;

        let mut conn = self.conn()?;
        let stored = branch_settings::table
            .find(branch_id)
            .first::<DbBranchSettings>(&mut conn)
            .optional()?;

        match stored {
            Some(row) => BranchSettings::try_from(row).map_err(RepositoryError::from),
            None => Ok(BranchSettings::defaults(branch_id)),
        }
    }
}

impl SettingsWriter for DieselRepository {
    fn upsert_branch_settings(
        &self,
        settings: &BranchSettings,
    ) -> RepositoryResult<BranchSettings> {
        use crate::schema::branch_settings;

        let mut conn = self.conn()?;
        let row = DbBranchSettings::from(settings);

        let stored = diesel::insert_into(branch_settings::table)
            .values(&row)
            .on_conflict(branch_settings::branch_id)
            .do_update()
            .set((
                branch_settings::default_tax_rate_bp
                    .eq(excluded(branch_settings::default_tax_rate_bp)),
                branch_settings::default_currency
                    .eq(excluded(branch_settings::default_currency)),
                branch_settings::overdue_after_days
                    .eq(excluded(branch_settings::overdue_after_days)),
            ))
            .get_result::<DbBranchSettings>(&mut conn)?;

        BranchSettings::try_from(stored).map_err(RepositoryError::from)
    }
}
