//! Repository implementation for sales inquiries.

use chrono::Utc;
use diesel::prelude::*;

use crate::domain::inquiry::{Inquiry, KanbanStage, NewInquiry, UpdateInquiry};
use crate::models::inquiry::{
    Inquiry as DbInquiry, NewInquiry as DbNewInquiry, UpdateInquiry as DbUpdateInquiry,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, InquiryReader, InquiryWriter};

impl InquiryReader for DieselRepository {
    fn get_inquiry_by_id(&self, id: i32, branch_id: i32) -> RepositoryResult<Option<Inquiry>> {
        use crate::schema::inquiries;

        let mut conn = self.conn()?;
        let inquiry = inquiries::table
            .find(id)
            .filter(inquiries::branch_id.eq(branch_id))
            .first::<DbInquiry>(&mut conn)
            .optional()?;

        inquiry
            .map(Inquiry::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_inquiries(&self, branch_id: i32) -> RepositoryResult<Vec<Inquiry>> {
        use crate::schema::inquiries;

        let mut conn = self.conn()?;
        inquiries::table
            .filter(inquiries::branch_id.eq(branch_id))
            .order(inquiries::updated_at.desc())
            .load::<DbInquiry>(&mut conn)?
            .into_iter()
            .map(Inquiry::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)
    }
}

impl InquiryWriter for DieselRepository {
    fn create_inquiry(&self, new_inquiry: &NewInquiry) -> RepositoryResult<Inquiry> {
        use crate::schema::inquiries;

        let mut conn = self.conn()?;
        let created = diesel::insert_into(inquiries::table)
            .values(DbNewInquiry::from(new_inquiry))
            .get_result::<DbInquiry>(&mut conn)?;

        Inquiry::try_from(created).map_err(RepositoryError::from)
    }

    fn update_inquiry(
        &self,
        inquiry_id: i32,
        updates: &UpdateInquiry,
    ) -> RepositoryResult<Inquiry> {
        use crate::schema::inquiries;

        let mut conn = self.conn()?;
        let db_updates = DbUpdateInquiry::new(updates, Utc::now().naive_utc());

        let updated = diesel::update(inquiries::table.find(inquiry_id))
            .set(&db_updates)
            .get_result::<DbInquiry>(&mut conn)?;

        Inquiry::try_from(updated).map_err(RepositoryError::from)
    }

    fn move_inquiry(
        &self,
        inquiry_id: i32,
        stage: KanbanStage,
        assign: Option<Option<i32>>,
    ) -> RepositoryResult<Inquiry> {
        use crate::schema::inquiries;

        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        let updated = match assign {
            Some(assigned_user_id) => diesel::update(inquiries::table.find(inquiry_id))
                .set((
                    inquiries::stage.eq(stage.as_str()),
                    inquiries::assigned_user_id.eq(assigned_user_id),
                    inquiries::updated_at.eq(now),
                ))
                .get_result::<DbInquiry>(&mut conn)?,
            None => diesel::update(inquiries::table.find(inquiry_id))
                .set((
                    inquiries::stage.eq(stage.as_str()),
                    inquiries::updated_at.eq(now),
                ))
                .get_result::<DbInquiry>(&mut conn)?,
        };

        Inquiry::try_from(updated).map_err(RepositoryError::from)
    }
}
