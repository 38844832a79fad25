//! PostgreSQL-backed user store.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::Uuid as SqlUuid;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{EntityStore, StoreError};
use crate::domain::{
    EntityId, EntityKind, User, UserDraft, UserFilter, UserId, UserPatch, UserRelation,
};

use super::diesel_error_mapping::map_diesel_error;
use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::DbPool;
use super::schema::users;

const KIND: EntityKind = EntityKind::User;

const PUSH_TASTED: &str =
    "UPDATE users SET tasted = array_append(tasted, $2) WHERE id = $1 RETURNING *";
const PULL_TASTED: &str =
    "UPDATE users SET tasted = array_remove(tasted, $2) WHERE id = $1 RETURNING *";
const PUSH_VISITED: &str =
    "UPDATE users SET visited = array_append(visited, $2) WHERE id = $1 RETURNING *";
const PULL_VISITED: &str =
    "UPDATE users SET visited = array_remove(visited, $2) WHERE id = $1 RETURNING *";

fn related_uuid(relation: UserRelation) -> Uuid {
    match relation {
        UserRelation::Tasted(beer_id) => *beer_id.as_uuid(),
        UserRelation::Visited(pub_id) => *pub_id.as_uuid(),
    }
}

/// Diesel implementation of `EntityStore<User>`.
///
/// Email and username uniqueness is enforced by unique indexes; violations
/// surface as [`StoreError::Conflict`].
#[derive(Clone)]
pub struct DieselUserStore {
    pool: DbPool,
}

impl DieselUserStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn update_history(
        &self,
        sql: &'static str,
        id: UserId,
        relation: UserRelation,
    ) -> Result<Option<User>, StoreError> {
        let mut conn = self.pool.get().await?;
        let row = sql_query(sql)
            .bind::<SqlUuid, _>(*id.as_uuid())
            .bind::<SqlUuid, _>(related_uuid(relation))
            .get_result::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error(KIND, "update history of"))?;
        row.map(User::try_from).transpose()
    }
}

#[async_trait]
impl EntityStore<User> for DieselUserStore {
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let mut conn = self.pool.get().await?;
        let row = users::table
            .find(*id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error(KIND, "get"))?;
        row.map(User::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let mut conn = self.pool.get().await?;
        let rows = users::table
            .select(UserRow::as_select())
            .order((users::created_at.asc(), users::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error(KIND, "list"))?;
        rows.into_iter().map(User::try_from).collect()
    }

    async fn create(&self, draft: UserDraft) -> Result<User, StoreError> {
        let row = NewUserRow::new(UserId::random(), &draft);
        let mut conn = self.pool.get().await?;
        let created = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error(KIND, "create"))?;
        User::try_from(created)
    }

    async fn update_by_id(&self, id: UserId, patch: UserPatch) -> Result<Option<User>, StoreError> {
        let changeset = UserChangeset::from(&patch);
        if changeset.is_empty() {
            return self.get_by_id(id).await;
        }
        let mut conn = self.pool.get().await?;
        let row = diesel::update(users::table.find(*id.as_uuid()))
            .set(&changeset)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error(KIND, "update"))?;
        row.map(User::try_from).transpose()
    }

    async fn delete_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let mut conn = self.pool.get().await?;
        let row = diesel::delete(users::table.find(*id.as_uuid()))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error(KIND, "delete"))?;
        row.map(User::try_from).transpose()
    }

    async fn find_by(&self, filter: UserFilter) -> Result<Vec<User>, StoreError> {
        let query = users::table.select(UserRow::as_select()).into_boxed();
        let query = match filter {
            UserFilter::Email(email) => query.filter(users::email.eq(email)),
            UserFilter::Username(username) => query.filter(users::username.eq(username)),
            UserFilter::Role(role) => query.filter(users::role.eq(role.as_str())),
            UserFilter::Tasted(beer_id) => {
                query.filter(users::tasted.contains(vec![*beer_id.as_uuid()]))
            }
            UserFilter::Visited(pub_id) => {
                query.filter(users::visited.contains(vec![*pub_id.as_uuid()]))
            }
        };
        let mut conn = self.pool.get().await?;
        let rows = query
            .order((users::created_at.asc(), users::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error(KIND, "find"))?;
        rows.into_iter().map(User::try_from).collect()
    }

    async fn push_relation(
        &self,
        id: UserId,
        relation: UserRelation,
    ) -> Result<Option<User>, StoreError> {
        let sql = match relation {
            UserRelation::Tasted(_) => PUSH_TASTED,
            UserRelation::Visited(_) => PUSH_VISITED,
        };
        self.update_history(sql, id, relation).await
    }

    async fn pull_relation(
        &self,
        id: UserId,
        relation: UserRelation,
    ) -> Result<Option<User>, StoreError> {
        let sql = match relation {
            UserRelation::Tasted(_) => PULL_TASTED,
            UserRelation::Visited(_) => PULL_VISITED,
        };
        self.update_history(sql, id, relation).await
    }
}
