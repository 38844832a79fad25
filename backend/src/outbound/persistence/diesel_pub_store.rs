//! PostgreSQL-backed pub store.
//!
//! The tap list lives in `pubs.beers`. Capacity is not checked here; the
//! relationship service decides whether a beer may be added.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::Uuid as SqlUuid;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{EntityStore, StoreError};
use crate::domain::{EntityId, EntityKind, Pub, PubDraft, PubFilter, PubId, PubPatch, PubRelation};

use super::diesel_error_mapping::map_diesel_error;
use super::models::{NewPubRow, PubChangeset, PubRow};
use super::pool::DbPool;
use super::schema::pubs;

const KIND: EntityKind = EntityKind::Pub;

const PUSH_ON_TAP: &str =
    "UPDATE pubs SET beers = array_append(beers, $2) WHERE id = $1 RETURNING *";
const PULL_ON_TAP: &str =
    "UPDATE pubs SET beers = array_remove(beers, $2) WHERE id = $1 RETURNING *";

/// Diesel implementation of `EntityStore<Pub>`.
#[derive(Clone)]
pub struct DieselPubStore {
    pool: DbPool,
}

impl DieselPubStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn update_tap_list(
        &self,
        sql: &'static str,
        id: PubId,
        relation: PubRelation,
    ) -> Result<Option<Pub>, StoreError> {
        let PubRelation::OnTap(beer_id) = relation;
        let mut conn = self.pool.get().await?;
        let row = sql_query(sql)
            .bind::<SqlUuid, _>(*id.as_uuid())
            .bind::<SqlUuid, _>(*beer_id.as_uuid())
            .get_result::<PubRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error(KIND, "update tap list of"))?;
        row.map(Pub::try_from).transpose()
    }
}

#[async_trait]
impl EntityStore<Pub> for DieselPubStore {
    async fn get_by_id(&self, id: PubId) -> Result<Option<Pub>, StoreError> {
        let mut conn = self.pool.get().await?;
        let row = pubs::table
            .find(*id.as_uuid())
            .select(PubRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error(KIND, "get"))?;
        row.map(Pub::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<Pub>, StoreError> {
        let mut conn = self.pool.get().await?;
        let rows = pubs::table
            .select(PubRow::as_select())
            .order((pubs::created_at.asc(), pubs::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error(KIND, "list"))?;
        rows.into_iter().map(Pub::try_from).collect()
    }

    async fn create(&self, draft: PubDraft) -> Result<Pub, StoreError> {
        let row = NewPubRow::new(PubId::random(), &draft)?;
        let mut conn = self.pool.get().await?;
        let created = diesel::insert_into(pubs::table)
            .values(&row)
            .returning(PubRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error(KIND, "create"))?;
        Pub::try_from(created)
    }

    async fn update_by_id(&self, id: PubId, patch: PubPatch) -> Result<Option<Pub>, StoreError> {
        let changeset = PubChangeset::new(&patch)?;
        if changeset.is_empty() {
            return self.get_by_id(id).await;
        }
        let mut conn = self.pool.get().await?;
        let row = diesel::update(pubs::table.find(*id.as_uuid()))
            .set(&changeset)
            .returning(PubRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error(KIND, "update"))?;
        row.map(Pub::try_from).transpose()
    }

    async fn delete_by_id(&self, id: PubId) -> Result<Option<Pub>, StoreError> {
        let mut conn = self.pool.get().await?;
        let row = diesel::delete(pubs::table.find(*id.as_uuid()))
            .returning(PubRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error(KIND, "delete"))?;
        row.map(Pub::try_from).transpose()
    }

    async fn find_by(&self, filter: PubFilter) -> Result<Vec<Pub>, StoreError> {
        let query = pubs::table.select(PubRow::as_select()).into_boxed();
        let query = match filter {
            PubFilter::Name(name) => query.filter(pubs::name.eq(name)),
            PubFilter::Owner(owner) => query.filter(pubs::owner.eq(owner)),
            PubFilter::Serving(beer_id) => {
                query.filter(pubs::beers.contains(vec![*beer_id.as_uuid()]))
            }
        };
        let mut conn = self.pool.get().await?;
        let rows = query
            .order((pubs::created_at.asc(), pubs::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error(KIND, "find"))?;
        rows.into_iter().map(Pub::try_from).collect()
    }

    async fn push_relation(
        &self,
        id: PubId,
        relation: PubRelation,
    ) -> Result<Option<Pub>, StoreError> {
        self.update_tap_list(PUSH_ON_TAP, id, relation).await
    }

    async fn pull_relation(
        &self,
        id: PubId,
        relation: PubRelation,
    ) -> Result<Option<Pub>, StoreError> {
        self.update_tap_list(PULL_ON_TAP, id, relation).await
    }
}
