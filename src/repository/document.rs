//! Repository implementation for attached document links.

use diesel::prelude::*;

use crate::domain::document::{Document, NewDocument};
use crate::models::document::{Document as DbDocument, NewDocument as DbNewDocument};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, DocumentReader, DocumentWriter};

impl DocumentReader for DieselRepository {
    fn list_customer_documents(&self, customer_id: i32) -> RepositoryResult<Vec<Document>> {
        use crate::schema::documents;

        let mut conn = self.conn()?;
        let result = documents::table
            .filter(documents::customer_id.eq(customer_id))
            .order(documents::id.desc())
            .load::<DbDocument>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(result)
    }

    fn list_vehicle_documents(&self, vehicle_id: i32) -> RepositoryResult<Vec<Document>> {
        use crate::schema::documents;

        let mut conn = self.conn()?;
        let result = documents::table
            .filter(documents::vehicle_id.eq(vehicle_id))
            .order(documents::id.desc())
            .load::<DbDocument>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(result)
    }
}

impl DocumentWriter for DieselRepository {
    fn create_document(&self, new_document: &NewDocument) -> RepositoryResult<Document> {
        use crate::schema::documents;

        let mut conn = self.conn()?;
        let created = diesel::insert_into(documents::table)
            .values(DbNewDocument::from(new_document))
            .get_result::<DbDocument>(&mut conn)?;

        Ok(created.into())
    }

    fn delete_document(&self, document_id: i32, branch_id: i32) -> RepositoryResult<Document> {
        use crate::schema::documents;

        let mut conn = self.conn()?;
        let existing = documents::table
            .find(document_id)
            .filter(documents::branch_id.eq(branch_id))
            .first::<DbDocument>(&mut conn)
            .optional()?
            .ok_or(RepositoryError::NotFound)?;

        diesel::delete(documents::table.find(existing.id)).execute(&mut conn)?;

        Ok(existing.into())
    }
}
