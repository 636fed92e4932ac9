use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Level, User, normalize_handle, privilege};
use crate::error::{DomainError, DomainResult, RepoError};
use crate::ports::{BookmarkRepository, PostRepository, UserRepository};

/// Accounts, profiles and level management.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    bookmarks: Arc<dyn BookmarkRepository>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        bookmarks: Arc<dyn BookmarkRepository>,
    ) -> Self {
        Self {
            users,
            posts,
            bookmarks,
        }
    }

    /// Register a new, unverified account. The password must already be
    /// hashed.
    pub async fn register(
        &self,
        email: String,
        password_hash: String,
        display_name: Option<String>,
    ) -> DomainResult<User> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::Validation("Invalid email address".to_string()));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(DomainError::Duplicate("Email already registered".to_string()));
        }

        let user = User::new(email, password_hash, normalize_name(display_name));
        let saved = self.users.save(user).await?;
        tracing::info!(user_id = %saved.id, "User registered");
        Ok(saved)
    }

    pub async fn profile(&self, id: Uuid) -> DomainResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", id))
    }

    pub async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        Ok(self.users.find_by_email(&email.trim().to_lowercase()).await?)
    }

    /// Resolve a login name: an `@handle` or an email address.
    pub async fn find_for_login(&self, login: &str) -> DomainResult<Option<User>> {
        let login = login.trim();
        if login.starts_with('@') {
            Ok(self.users.find_by_handle(&login.to_lowercase()).await?)
        } else {
            self.find_by_email(login).await
        }
    }

    /// Claim or change the caller's public handle.
    pub async fn set_handle(&self, actor: &User, handle: &str, now: DateTime<Utc>) -> DomainResult<User> {
        let handle = normalize_handle(handle)?;
        if let Some(holder) = self.users.find_by_handle(&handle).await? {
            if holder.id != actor.id {
                return Err(DomainError::Duplicate(format!("handle {handle} is taken")));
            }
        }

        let mut user = self.profile(actor.id).await?;
        user.set_handle(&handle, now)?;
        let saved = self.users.save(user).await?;
        tracing::info!(user_id = %saved.id, handle = %handle, "Handle set");
        Ok(saved)
    }

    /// Remove the caller's account together with every post they wrote, the
    /// bookmarks pointing at those posts and the bookmarks they held.
    pub async fn delete_account(&self, actor: &User) -> DomainResult<()> {
        let authored = self.posts.find_by_user_id(actor.id).await?;
        for post in &authored {
            self.bookmarks.delete_for_post(post.id).await?;
            match self.posts.delete(post.id).await {
                Ok(()) | Err(RepoError::NotFound) => {}
                Err(e) => return Err(e.into()),
            }
        }
        self.bookmarks.delete_for_user(actor.id).await?;

        match self.users.delete(actor.id).await {
            Ok(()) => {}
            Err(RepoError::NotFound) => {
                return Err(DomainError::not_found("User", actor.id));
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            user_id = %actor.id,
            posts_removed = authored.len(),
            "Account deleted"
        );
        Ok(())
    }

    pub async fn update_profile(
        &self,
        actor: &User,
        display_name: Option<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<User> {
        let mut user = self.profile(actor.id).await?;
        user.display_name = normalize_name(display_name);
        user.updated_at = now;
        Ok(self.users.save(user).await?)
    }

    /// The user directory, for level managers.
    pub async fn list_users(&self, actor: &User) -> DomainResult<Vec<User>> {
        if !privilege::can_view_user_directory(actor.level()?) {
            return Err(DomainError::forbidden(
                "the user directory requires level 6 or above",
            ));
        }
        Ok(self.users.list_all().await?)
    }

    /// Users at one level. Verifiers are listed for everyone so unverified
    /// accounts can pick one; other levels need directory access.
    pub async fn users_at_level(&self, actor: &User, level: Level) -> DomainResult<Vec<User>> {
        if level != Level::VERIFIER && !privilege::can_view_user_directory(actor.level()?) {
            return Err(DomainError::forbidden(
                "the user directory requires level 6 or above",
            ));
        }
        Ok(self.users.find_by_level(level).await?)
    }

    /// Users who can verify others.
    pub async fn verifiers(&self) -> DomainResult<Vec<User>> {
        Ok(self.users.find_by_level(Level::VERIFIER).await?)
    }

    /// Levels `actor` may hand out, as raw values for a picker.
    pub fn level_options(&self, actor: &User) -> DomainResult<Vec<i16>> {
        Ok(privilege::level_options(actor.level()?))
    }

    /// Change another user's level.
    ///
    /// Both the requested level and the target's current level must be in
    /// the actor's assignable set, so an administrator can neither promote
    /// into nor reach into a band outside their delegation.
    pub async fn set_level(
        &self,
        actor: &User,
        target_id: Uuid,
        new_level: i16,
        now: DateTime<Utc>,
    ) -> DomainResult<User> {
        let new_level = Level::new(new_level)?;
        let actor_level = actor.level()?;

        if !privilege::can_manage_user_levels(actor_level) {
            return Err(DomainError::forbidden("changing levels requires level 6 or above"));
        }
        if actor.id == target_id {
            return Err(DomainError::forbidden("you cannot change your own level"));
        }
        if !privilege::can_assign_level(actor_level, new_level) {
            return Err(DomainError::forbidden(format!(
                "level {actor_level} cannot assign level {new_level}"
            )));
        }

        let mut target = self.profile(target_id).await?;
        let current = target.level()?;
        if !privilege::can_assign_level(actor_level, current) {
            return Err(DomainError::forbidden(format!(
                "level {actor_level} cannot manage users at level {current}"
            )));
        }

        target.set_level(new_level, now);
        let saved = self.users.save(target).await?;

        tracing::info!(
            actor_id = %actor.id,
            target_id = %target_id,
            from = %current,
            to = %new_level,
            "User level changed"
        );
        Ok(saved)
    }
}

fn normalize_name(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}
