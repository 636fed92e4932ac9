//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use agora_core::domain::{Level, Post, PostStatus, User};
use agora_core::error::RepoError;
use agora_core::ports::{BookmarkRepository, PostRepository, UserRepository};

use super::entity::bookmark::{self, Entity as BookmarkEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL bookmark repository.
pub type PostgresBookmarkRepository = PostgresBaseRepository<BookmarkEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_all(&self) -> Result<Vec<User>, RepoError> {
        let result = UserEntity::find()
            .order_by_asc(user::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_level(&self, level: Level) -> Result<Vec<User>, RepoError> {
        let raw: i16 = level.into();
        let result = UserEntity::find()
            .filter(user::Column::Level.eq(raw))
            .order_by_asc(user::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_handle(&self, handle: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Handle.eq(handle))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::UserId.eq(user_id))
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_feed(&self, viewer_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let visible = Condition::any()
            .add(post::Column::UserId.eq(viewer_id))
            .add(post::Column::StatusCode.eq(PostStatus::Published.code()));

        let result = PostEntity::find()
            .filter(visible)
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Post>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = PostEntity::find()
            .filter(post::Column::Id.is_in(ids.to_vec()))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_due_pending(&self, created_before: DateTime<Utc>) -> Result<Vec<Post>, RepoError> {
        let cutoff: DateTimeWithTimeZone = created_before.into();
        let result = PostEntity::find()
            .filter(post::Column::StatusCode.eq(PostStatus::Pending.code()))
            .filter(post::Column::CreatedAt.lte(cutoff))
            .order_by_asc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn compare_and_set_status(
        &self,
        id: Uuid,
        expected: PostStatus,
        new: PostStatus,
        now: DateTime<Utc>,
    ) -> Result<bool, RepoError> {
        let updated_at: DateTimeWithTimeZone = now.into();

        // A single conditional UPDATE: only the writer that still sees
        // `expected` gets a row back.
        let result = PostEntity::update_many()
            .col_expr(post::Column::StatusCode, Expr::value(new.code()))
            .col_expr(post::Column::UpdatedAt, Expr::value(updated_at))
            .filter(post::Column::Id.eq(id))
            .filter(post::Column::StatusCode.eq(expected.code()))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        tracing::debug!(
            post_id = %id,
            from = %expected,
            to = %new,
            applied = result.rows_affected == 1,
            "Compare-and-set on post status"
        );
        Ok(result.rows_affected == 1)
    }

    async fn update_if_status(&self, post: &Post, expected: PostStatus) -> Result<bool, RepoError> {
        let updated_at: DateTimeWithTimeZone = post.updated_at.into();

        let result = PostEntity::update_many()
            .col_expr(post::Column::Content, Expr::value(post.content.clone()))
            .col_expr(post::Column::StatusCode, Expr::value(post.status_code))
            .col_expr(post::Column::UpdatedAt, Expr::value(updated_at))
            .filter(post::Column::Id.eq(post.id))
            .filter(post::Column::StatusCode.eq(expected.code()))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected == 1)
    }
}

#[async_trait]
impl BookmarkRepository for PostgresBookmarkRepository {
    async fn toggle(&self, user_id: Uuid, post_id: Uuid, now: DateTime<Utc>) -> Result<bool, RepoError> {
        let removed = BookmarkEntity::delete_many()
            .filter(bookmark::Column::UserId.eq(user_id))
            .filter(bookmark::Column::PostId.eq(post_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if removed.rows_affected > 0 {
            return Ok(false);
        }

        let row = bookmark::ActiveModel {
            user_id: Set(user_id),
            post_id: Set(post_id),
            created_at: Set(now.into()),
        };
        BookmarkEntity::insert(row)
            .exec_without_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(true)
    }

    async fn list_post_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        let result = BookmarkEntity::find()
            .filter(bookmark::Column::UserId.eq(user_id))
            .order_by_desc(bookmark::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(|b| b.post_id).collect())
    }

    async fn is_bookmarked(&self, user_id: Uuid, post_id: Uuid) -> Result<bool, RepoError> {
        let found = BookmarkEntity::find_by_id((user_id, post_id))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(found.is_some())
    }

    async fn delete_for_post(&self, post_id: Uuid) -> Result<(), RepoError> {
        BookmarkEntity::delete_many()
            .filter(bookmark::Column::PostId.eq(post_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(())
    }

    async fn delete_for_user(&self, user_id: Uuid) -> Result<(), RepoError> {
        BookmarkEntity::delete_many()
            .filter(bookmark::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(())
    }
}

/// Mask an email for logging to avoid PII in logs.
fn mask_email(email: &str) -> String {
    match email.find('@') {
        Some(at_pos) => {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = match local.chars().next() {
                Some(first) if local.len() > 1 => format!("{first}***"),
                _ => "***".to_string(),
            };
            format!("{masked_local}{domain}")
        }
        None => "***".to_string(),
    }
}
