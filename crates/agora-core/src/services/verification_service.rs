//! Peer verification: an unverified user requests a code from one verifier,
//! shows it to them, and the verifier approves or rejects the account.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Uuid;

use crate::domain::{Level, User, VerificationCode, VerificationDecision, privilege};
use crate::error::{DomainError, DomainResult};
use crate::ports::{Cache, UserRepository};

const CODE_KEY_PREFIX: &str = "verification:code:";
const REQUESTER_KEY_PREFIX: &str = "verification:requester:";

/// Verification settings.
#[derive(Debug, Clone)]
pub struct VerificationConfig {
    /// How long an issued code stays valid.
    pub code_ttl: Duration,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            code_ttl: Duration::from_secs(15 * 60),
        }
    }
}

impl VerificationConfig {
    pub fn from_env() -> Self {
        Self {
            code_ttl: Duration::from_secs(
                std::env::var("VERIFICATION_CODE_TTL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(15 * 60),
            ),
        }
    }
}

/// Issues, checks and resolves verification codes.
#[derive(Clone)]
pub struct VerificationService {
    users: Arc<dyn UserRepository>,
    cache: Arc<dyn Cache>,
    config: VerificationConfig,
}

impl VerificationService {
    pub fn new(users: Arc<dyn UserRepository>, cache: Arc<dyn Cache>, config: VerificationConfig) -> Self {
        Self {
            users,
            cache,
            config,
        }
    }

    /// How long an issued code stays valid.
    pub fn code_ttl(&self) -> Duration {
        self.config.code_ttl
    }

    /// Drop expired codes from the cache.
    pub async fn purge_expired(&self) -> DomainResult<usize> {
        let purged = self.cache.purge_expired().await.map_err(cache_error)?;
        if purged > 0 {
            tracing::debug!(purged, "Expired verification codes purged");
        }
        Ok(purged)
    }

    /// Issue a code binding `requester` to the chosen verifier. A new
    /// request replaces any earlier code of the same requester.
    pub async fn request_code(
        &self,
        requester: &User,
        verifier_id: Uuid,
        now: DateTime<Utc>,
    ) -> DomainResult<VerificationCode> {
        if requester.level()? != Level::UNVERIFIED {
            return Err(DomainError::forbidden("account is already verified"));
        }

        let verifier = self.load_user(verifier_id).await?;
        if !privilege::can_verify_others(verifier.level()?) {
            return Err(DomainError::Validation(format!(
                "user {verifier_id} is not a verifier"
            )));
        }

        if let Some(previous) = self.pending_for(requester.id).await? {
            self.consume(&previous).await?;
        }

        let code = self.unused_code().await?;
        let issued = VerificationCode {
            code,
            requester_id: requester.id,
            verifier_id,
            issued_at: now,
        };

        let record = serde_json::to_string(&issued)
            .map_err(|e| DomainError::Internal(format!("encode verification code: {e}")))?;
        let ttl = self.config.code_ttl;
        self.cache
            .set(&code_key(&issued.code), &record, ttl)
            .await
            .map_err(cache_error)?;
        self.cache
            .set(&requester_key(requester.id), &issued.code, ttl)
            .await
            .map_err(cache_error)?;

        tracing::info!(
            requester_id = %requester.id,
            verifier_id = %verifier_id,
            "Verification code issued"
        );
        Ok(issued)
    }

    /// Look up the requester behind a code. Only the verifier the code was
    /// issued to may redeem it.
    pub async fn check_code(&self, verifier: &User, code: &str) -> DomainResult<User> {
        self.require_verifier(verifier)?;

        let issued = self
            .find_code(code.trim())
            .await?
            .ok_or_else(|| DomainError::Validation("invalid or expired verification code".to_string()))?;
        if issued.verifier_id != verifier.id {
            return Err(DomainError::forbidden("this code was issued to another verifier"));
        }

        self.load_user(issued.requester_id).await
    }

    /// Approve or reject a pending request addressed to `verifier`. Either
    /// way the code is consumed.
    pub async fn apply_decision(
        &self,
        verifier: &User,
        user_id: Uuid,
        decision: VerificationDecision,
        now: DateTime<Utc>,
    ) -> DomainResult<User> {
        self.require_verifier(verifier)?;

        let issued = self
            .pending_for(user_id)
            .await?
            .filter(|issued| issued.verifier_id == verifier.id)
            .ok_or_else(|| DomainError::not_found("VerificationRequest", user_id))?;

        let mut requester = self.load_user(user_id).await?;
        self.consume(&issued).await?;

        if decision == VerificationDecision::Approve {
            if requester.level()? != Level::UNVERIFIED {
                return Err(DomainError::forbidden("account is already verified"));
            }
            requester.set_level(Level::VERIFIED, now);
            requester = self.users.save(requester).await?;
        }

        tracing::info!(
            verifier_id = %verifier.id,
            user_id = %user_id,
            decision = ?decision,
            "Verification decision applied"
        );
        Ok(requester)
    }

    fn require_verifier(&self, verifier: &User) -> DomainResult<()> {
        if privilege::can_verify_others(verifier.level()?) {
            Ok(())
        } else {
            Err(DomainError::forbidden("only level 5 verifiers can verify users"))
        }
    }

    async fn load_user(&self, id: Uuid) -> DomainResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", id))
    }

    async fn find_code(&self, code: &str) -> DomainResult<Option<VerificationCode>> {
        let Some(raw) = self.cache.get(&code_key(code)).await.map_err(cache_error)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| DomainError::Internal(format!("decode verification code: {e}")))
    }

    async fn pending_for(&self, requester_id: Uuid) -> DomainResult<Option<VerificationCode>> {
        match self.cache.get(&requester_key(requester_id)).await.map_err(cache_error)? {
            Some(code) => self.find_code(&code).await,
            None => Ok(None),
        }
    }

    async fn consume(&self, issued: &VerificationCode) -> DomainResult<()> {
        self.cache.delete(&code_key(&issued.code)).await.map_err(cache_error)?;
        self.cache
            .delete(&requester_key(issued.requester_id))
            .await
            .map_err(cache_error)?;
        Ok(())
    }

    async fn unused_code(&self) -> DomainResult<String> {
        for _ in 0..8 {
            let code = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000));
            if !self.cache.exists(&code_key(&code)).await.map_err(cache_error)? {
                return Ok(code);
            }
        }
        Err(DomainError::Internal(
            "could not allocate an unused verification code".to_string(),
        ))
    }
}

fn code_key(code: &str) -> String {
    format!("{CODE_KEY_PREFIX}{code}")
}

fn requester_key(requester_id: Uuid) -> String {
    format!("{REQUESTER_KEY_PREFIX}{requester_id}")
}

fn cache_error(err: crate::ports::CacheError) -> DomainError {
    DomainError::Internal(err.to_string())
}
