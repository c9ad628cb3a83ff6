/// Account service - registration, login and account settings
use crate::db::Store;
use crate::error::{AppError, Result};
use crate::media::{MediaHost, MediaUpload, UploadOptions};
use crate::models::account::is_valid_username;
use crate::models::{
    Account, AccountSearchHit, AccountWithProfiles, LoginRequest, Profile, ProfileSummary,
    RegisterRequest, UpdateAccountRequest,
};
use chrono::Utc;
use crypto_core::{hash_password, verify_password, JwtKeys};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_PROFILE_NAME: &str = "Main Profile";

/// Authenticated account plus its freshly issued session token
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub account: Account,
    pub token: String,
}

pub struct AccountService {
    store: Arc<dyn Store>,
    media: Arc<dyn MediaHost>,
    jwt: Arc<JwtKeys>,
    default_avatar: String,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn Store>,
        media: Arc<dyn MediaHost>,
        jwt: Arc<JwtKeys>,
        default_avatar: impl Into<String>,
    ) -> Self {
        Self {
            store,
            media,
            jwt,
            default_avatar: default_avatar.into(),
        }
    }

    fn issue_token(&self, account_id: Uuid) -> Result<String> {
        self.jwt.issue(account_id).map_err(|e| {
            tracing::error!(%account_id, "token issue failed: {:#}", e);
            AppError::Internal("Failed to issue session token".to_string())
        })
    }

    /// Create an account and its default profile
    pub async fn register(&self, mut req: RegisterRequest) -> Result<AuthSession> {
        req.full_name = req.full_name.trim().to_string();
        req.username = req.username.trim().to_string();
        req.email = req.email.trim().to_lowercase();
        req.validate()?;

        if !is_valid_username(&req.username) {
            return Err(AppError::ValidationError(
                "Username can only contain letters, numbers and underscores".to_string(),
            ));
        }

        if self.store.find_account_by_email(&req.email).await?.is_some() {
            return Err(AppError::BadRequest("Email already registered".to_string()));
        }
        if self
            .store
            .find_account_by_username(&req.username)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest("Username already taken".to_string()));
        }

        let password_hash = hash_blocking(req.password).await?;
        let now = Utc::now();

        let account = Account {
            id: Uuid::new_v4(),
            full_name: req.full_name,
            username: req.username,
            email: req.email,
            password_hash,
            avatar: self.default_avatar.clone(),
            bio: String::new(),
            website: String::new(),
            created_at: now,
        };
        let default_profile = Profile {
            id: Uuid::new_v4(),
            account_id: account.id,
            name: DEFAULT_PROFILE_NAME.to_string(),
            avatar: self.default_avatar.clone(),
            bio: String::new(),
            is_default: true,
            interests: Vec::new(),
            created_at: now,
        };

        // The unique indexes still guard against a concurrent registration
        self.store
            .register_account(&account, &default_profile)
            .await?;

        tracing::info!(account_id = %account.id, username = %account.username, "account registered");

        let token = self.issue_token(account.id)?;
        Ok(AuthSession { account, token })
    }

    pub async fn login(&self, req: LoginRequest) -> Result<AuthSession> {
        let (email, password) = match (req.email, req.password) {
            (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
                (email.trim().to_lowercase(), password)
            }
            _ => {
                return Err(AppError::BadRequest(
                    "Please provide email and password".to_string(),
                ))
            }
        };

        let account = match self.store.find_account_by_email(&email).await? {
            Some(account) => account,
            None => return Err(AppError::Unauthorized("Invalid credentials".to_string())),
        };

        if !verify_blocking(password, account.password_hash.clone()).await? {
            tracing::warn!(account_id = %account.id, "login rejected: wrong password");
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        let token = self.issue_token(account.id)?;
        Ok(AuthSession { account, token })
    }

    async fn with_profiles(&self, account: Account) -> Result<AccountWithProfiles> {
        let profiles = self
            .store
            .profiles_for_account(account.id)
            .await?
            .iter()
            .map(ProfileSummary::from)
            .collect();

        Ok(AccountWithProfiles { account, profiles })
    }

    /// The requester's own account with profile summaries
    pub async fn current(&self, account_id: Uuid) -> Result<AccountWithProfiles> {
        let account = self
            .store
            .find_account(account_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User not found with id {}", account_id)))?;

        self.with_profiles(account).await
    }

    /// Public lookup by username
    pub async fn by_username(&self, username: &str) -> Result<AccountWithProfiles> {
        let account = self
            .store
            .find_account_by_username(username)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("User not found with username {}", username))
            })?;

        self.with_profiles(account).await
    }

    pub async fn update_settings(
        &self,
        account_id: Uuid,
        req: UpdateAccountRequest,
    ) -> Result<Account> {
        req.validate()?;

        let mut account = self
            .store
            .find_account(account_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User not found with id {}", account_id)))?;

        if let Some(full_name) = req.full_name.as_deref().map(str::trim) {
            if !full_name.is_empty() {
                account.full_name = full_name.to_string();
            }
        }

        if let Some(username) = req.username.as_deref().map(str::trim) {
            if !username.is_empty() && username != account.username {
                if !is_valid_username(username) {
                    return Err(AppError::ValidationError(
                        "Username can only contain letters, numbers and underscores".to_string(),
                    ));
                }
                if self.store.find_account_by_username(username).await?.is_some() {
                    return Err(AppError::BadRequest("Username already taken".to_string()));
                }
                account.username = username.to_string();
            }
        }

        if let Some(bio) = req.bio {
            account.bio = bio;
        }
        if let Some(website) = req.website {
            account.website = website.trim().to_string();
        }

        self.store.update_account(&account).await?;
        Ok(account)
    }

    pub async fn update_avatar(
        &self,
        account_id: Uuid,
        upload: Option<MediaUpload>,
    ) -> Result<Account> {
        let upload = upload
            .ok_or_else(|| AppError::BadRequest("Please upload an image file".to_string()))?;

        let mut account = self
            .store
            .find_account(account_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User not found with id {}", account_id)))?;

        let image = self
            .media
            .upload(upload, UploadOptions::ACCOUNT_AVATAR)
            .await
            .map_err(|e| AppError::media("Problem with image upload", e))?;

        account.avatar = image.url;
        self.store.update_account(&account).await?;
        Ok(account)
    }

    pub async fn search(&self, query: Option<&str>) -> Result<Vec<AccountSearchHit>> {
        let query = query.map(str::trim).filter(|q| !q.is_empty()).ok_or_else(|| {
            AppError::BadRequest("Please provide a search query".to_string())
        })?;

        let accounts = self.store.search_accounts(query).await?;
        Ok(accounts.iter().map(AccountSearchHit::from).collect())
    }
}

async fn hash_blocking(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("password hashing task failed: {}", e)))?
        .map_err(|e| AppError::Internal(e.to_string()))
}

async fn verify_blocking(password: String, password_hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
        .await
        .map_err(|e| AppError::Internal(format!("password verification task failed: {}", e)))?
        .map_err(|e| AppError::Internal(e.to_string()))
}
