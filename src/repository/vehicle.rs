//! Repository implementation for vehicles and their stage history.

use chrono::Utc;
use diesel::prelude::*;

use crate::domain::types::TypeConstraintError;
use crate::domain::user::User;
use crate::domain::vehicle::{
    NewVehicle, ShippingStage, StageEvent, UpdateVehicle, Vehicle,
};
use crate::models::user::User as DbUser;
use crate::models::vehicle::{
    NewStageEvent, NewVehicle as DbNewVehicle, StageEvent as DbStageEvent,
    UpdateVehicle as DbUpdateVehicle, Vehicle as DbVehicle,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, VehicleListQuery, VehicleReader, VehicleWriter};

impl VehicleReader for DieselRepository {
    fn get_vehicle_by_id(&self, id: i32, branch_id: i32) -> RepositoryResult<Option<Vehicle>> {
        use crate::schema::vehicles;

        let mut conn = self.conn()?;
        let vehicle = vehicles::table
            .find(id)
            .filter(vehicles::branch_id.eq(branch_id))
            .first::<DbVehicle>(&mut conn)
            .optional()?;

        vehicle
            .map(Vehicle::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_vehicles(&self, query: VehicleListQuery) -> RepositoryResult<(usize, Vec<Vehicle>)> {
        use crate::schema::vehicles;

        let mut conn = self.conn()?;

        let build_query = || {
            let mut q = vehicles::table
                .into_boxed()
                .filter(vehicles::branch_id.eq(query.branch_id));

            if let Some(stage) = query.stage {
                q = q.filter(vehicles::stage.eq(stage.as_str()));
            }

            if let Some(customer_id) = query.customer_id {
                q = q.filter(vehicles::customer_id.eq(customer_id));
            }

            if let Some(term) = &query.search {
                let pattern = format!("%{term}%");
                q = q.filter(
                    vehicles::vin
                        .like(pattern.clone())
                        .or(vehicles::make.like(pattern.clone()))
                        .or(vehicles::model.like(pattern)),
                );
            }

            q
        };

        let total: i64 = build_query().count().get_result(&mut conn)?;

        let mut page_query = build_query().order(vehicles::updated_at.desc());
        if let Some(pagination) = &query.pagination {
            let page = pagination.page.max(1);
            page_query = page_query
                .limit(pagination.per_page as i64)
                .offset(((page - 1) * pagination.per_page) as i64);
        }

        let items = page_query
            .load::<DbVehicle>(&mut conn)?
            .into_iter()
            .map(Vehicle::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)?;

        Ok((total as usize, items))
    }

    fn list_stage_events(&self, vehicle_id: i32) -> RepositoryResult<Vec<(StageEvent, User)>> {
        use crate::schema::{stage_events, users};

        let mut conn = self.conn()?;
        let rows = stage_events::table
            .inner_join(users::table)
            .filter(stage_events::vehicle_id.eq(vehicle_id))
            .order(stage_events::id.desc())
            .select((stage_events::all_columns, users::all_columns))
            .load::<(DbStageEvent, DbUser)>(&mut conn)?;

        rows.into_iter()
            .map(|(event, user)| Ok((StageEvent::try_from(event)?, user.into())))
            .collect::<Result<Vec<_>, TypeConstraintError>>()
            .map_err(RepositoryError::from)
    }
}

impl VehicleWriter for DieselRepository {
    fn create_vehicles(
        &self,
        new_vehicles: &[NewVehicle],
        created_by: i32,
    ) -> RepositoryResult<usize> {
        use crate::schema::{stage_events, vehicles};

        let mut conn = self.conn()?;

        conn.transaction::<usize, RepositoryError, _>(|conn| {
            let mut inserted = 0;
            for new_vehicle in new_vehicles {
                let created = diesel::insert_into(vehicles::table)
                    .values(DbNewVehicle::from(new_vehicle))
                    .get_result::<DbVehicle>(conn)?;

                diesel::insert_into(stage_events::table)
                    .values(NewStageEvent {
                        vehicle_id: created.id,
                        from_stage: None,
                        to_stage: ShippingStage::Purchase.as_str(),
                        changed_by: created_by,
                        note: None,
                    })
                    .execute(conn)?;

                inserted += 1;
            }
            Ok(inserted)
        })
    }

    fn update_vehicle(
        &self,
        vehicle_id: i32,
        updates: &UpdateVehicle,
    ) -> RepositoryResult<Vehicle> {
        use crate::schema::vehicles;

        let mut conn = self.conn()?;
        let db_updates = DbUpdateVehicle::new(updates, Utc::now().naive_utc());

        let updated = diesel::update(vehicles::table.find(vehicle_id))
            .set(&db_updates)
            .get_result::<DbVehicle>(&mut conn)?;

        Vehicle::try_from(updated).map_err(RepositoryError::from)
    }

    fn assign_vehicle_to_customer(
        &self,
        vehicle_id: i32,
        customer_id: Option<i32>,
    ) -> RepositoryResult<Vehicle> {
        use crate::schema::vehicles;

        let mut conn = self.conn()?;
        let updated = diesel::update(vehicles::table.find(vehicle_id))
            .set((
                vehicles::customer_id.eq(customer_id),
                vehicles::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<DbVehicle>(&mut conn)?;

        Vehicle::try_from(updated).map_err(RepositoryError::from)
    }

    fn transition_stage(
        &self,
        vehicle_id: i32,
        to: ShippingStage,
        changed_by: i32,
        note: Option<&str>,
    ) -> RepositoryResult<Vehicle> {
        use crate::schema::{stage_events, vehicles};

        let mut conn = self.conn()?;

        conn.transaction::<Vehicle, RepositoryError, _>(|conn| {
            let current = vehicles::table
                .find(vehicle_id)
                .first::<DbVehicle>(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?;
            let from: ShippingStage = current.stage.parse()?;

            diesel::insert_into(stage_events::table)
                .values(NewStageEvent {
                    vehicle_id,
                    from_stage: Some(from.as_str()),
                    to_stage: to.as_str(),
                    changed_by,
                    note,
                })
                .execute(conn)?;

            let updated = diesel::update(vehicles::table.find(vehicle_id))
                .set((
                    vehicles::stage.eq(to.as_str()),
                    vehicles::updated_at.eq(Utc::now().naive_utc()),
                ))
                .get_result::<DbVehicle>(conn)?;

            Vehicle::try_from(updated).map_err(RepositoryError::from)
        })
    }
}
