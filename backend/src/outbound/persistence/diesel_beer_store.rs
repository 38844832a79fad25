//! PostgreSQL-backed beer store.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::Uuid as SqlUuid;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{EntityStore, StoreError};
use crate::domain::{
    Beer, BeerDraft, BeerFilter, BeerId, BeerPatch, BeerRelation, EntityId, EntityKind,
};

use super::diesel_error_mapping::map_diesel_error;
use super::models::{BeerChangeset, BeerRow, NewBeerRow};
use super::pool::DbPool;
use super::schema::beers;

const KIND: EntityKind = EntityKind::Beer;

const PUSH_SERVED_AT: &str =
    "UPDATE beers SET pubs = array_append(pubs, $2) WHERE id = $1 RETURNING *";
const PULL_SERVED_AT: &str =
    "UPDATE beers SET pubs = array_remove(pubs, $2) WHERE id = $1 RETURNING *";
const PUSH_TASTED_BY: &str =
    "UPDATE beers SET tasted_by = array_append(tasted_by, $2) WHERE id = $1 RETURNING *";
const PULL_TASTED_BY: &str =
    "UPDATE beers SET tasted_by = array_remove(tasted_by, $2) WHERE id = $1 RETURNING *";

fn related_uuid(relation: BeerRelation) -> Uuid {
    match relation {
        BeerRelation::ServedAt(pub_id) => *pub_id.as_uuid(),
        BeerRelation::TastedBy(user_id) => *user_id.as_uuid(),
    }
}

fn into_beers(rows: Vec<BeerRow>) -> Result<Vec<Beer>, StoreError> {
    rows.into_iter().map(Beer::try_from).collect()
}

/// Diesel implementation of `EntityStore<Beer>`.
#[derive(Clone)]
pub struct DieselBeerStore {
    pool: DbPool,
}

impl DieselBeerStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn update_relation(
        &self,
        sql: &'static str,
        id: BeerId,
        relation: BeerRelation,
    ) -> Result<Option<Beer>, StoreError> {
        let mut conn = self.pool.get().await?;
        let row = sql_query(sql)
            .bind::<SqlUuid, _>(*id.as_uuid())
            .bind::<SqlUuid, _>(related_uuid(relation))
            .get_result::<BeerRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error(KIND, "update relation of"))?;
        row.map(Beer::try_from).transpose()
    }
}

#[async_trait]
impl EntityStore<Beer> for DieselBeerStore {
    async fn get_by_id(&self, id: BeerId) -> Result<Option<Beer>, StoreError> {
        let mut conn = self.pool.get().await?;
        let row = beers::table
            .find(*id.as_uuid())
            .select(BeerRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error(KIND, "get"))?;
        row.map(Beer::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<Beer>, StoreError> {
        let mut conn = self.pool.get().await?;
        let rows = beers::table
            .select(BeerRow::as_select())
            .order((beers::created_at.asc(), beers::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error(KIND, "list"))?;
        into_beers(rows)
    }

    async fn create(&self, draft: BeerDraft) -> Result<Beer, StoreError> {
        let row = NewBeerRow::new(BeerId::random(), &draft)?;
        let mut conn = self.pool.get().await?;
        let created = diesel::insert_into(beers::table)
            .values(&row)
            .returning(BeerRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error(KIND, "create"))?;
        Beer::try_from(created)
    }

    async fn update_by_id(&self, id: BeerId, patch: BeerPatch) -> Result<Option<Beer>, StoreError> {
        let changeset = BeerChangeset::new(&patch)?;
        if changeset.is_empty() {
            return self.get_by_id(id).await;
        }
        let mut conn = self.pool.get().await?;
        let row = diesel::update(beers::table.find(*id.as_uuid()))
            .set(&changeset)
            .returning(BeerRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error(KIND, "update"))?;
        row.map(Beer::try_from).transpose()
    }

    async fn delete_by_id(&self, id: BeerId) -> Result<Option<Beer>, StoreError> {
        let mut conn = self.pool.get().await?;
        let row = diesel::delete(beers::table.find(*id.as_uuid()))
            .returning(BeerRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error(KIND, "delete"))?;
        row.map(Beer::try_from).transpose()
    }

    async fn find_by(&self, filter: BeerFilter) -> Result<Vec<Beer>, StoreError> {
        let query = beers::table.select(BeerRow::as_select()).into_boxed();
        let query = match filter {
            BeerFilter::Name(name) => query.filter(beers::name.eq(name)),
            BeerFilter::Brewer(brewer) => query.filter(beers::brewer.eq(brewer)),
            BeerFilter::Style(style) => query.filter(beers::style.eq(style)),
            BeerFilter::Author(author) => query.filter(beers::author.eq(*author.as_uuid())),
            BeerFilter::ServedAt(pub_id) => {
                query.filter(beers::pubs.contains(vec![*pub_id.as_uuid()]))
            }
            BeerFilter::TastedBy(user_id) => {
                query.filter(beers::tasted_by.contains(vec![*user_id.as_uuid()]))
            }
        };
        let mut conn = self.pool.get().await?;
        let rows = query
            .order((beers::created_at.asc(), beers::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error(KIND, "find"))?;
        into_beers(rows)
    }

    async fn push_relation(
        &self,
        id: BeerId,
        relation: BeerRelation,
    ) -> Result<Option<Beer>, StoreError> {
        let sql = match relation {
            BeerRelation::ServedAt(_) => PUSH_SERVED_AT,
            BeerRelation::TastedBy(_) => PUSH_TASTED_BY,
        };
        self.update_relation(sql, id, relation).await
    }

    async fn pull_relation(
        &self,
        id: BeerId,
        relation: BeerRelation,
    ) -> Result<Option<Beer>, StoreError> {
        let sql = match relation {
            BeerRelation::ServedAt(_) => PULL_SERVED_AT,
            BeerRelation::TastedBy(_) => PULL_TASTED_BY,
        };
        self.update_relation(sql, id, relation).await
    }
}
