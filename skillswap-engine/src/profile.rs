//! Profile Service: the active user, their persisted copy, and the theme.
//!
//! The profile is persisted under `skillswap_user`. Persistence is
//! best-effort: a write that fails (typically on the storage quota, e.g. a
//! large inline avatar) is logged and the in-memory update still applies.
//!
//! Every committed update resyncs the denormalized owner fields on the
//! user's listings before returning.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use skillswap_domain::{Theme, User};
use skillswap_store::{LocalStorage, Store, THEME_KEY, USER_KEY};

use crate::error::{EngineError, EngineResult};
use crate::listings::ListingService;

/// Outcome of a profile update.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    /// The user as now stored
    pub user: User,
    /// Number of listings whose owner fields were rewritten
    pub listings_synced: usize,
    /// Whether the durable copy was written
    pub persisted: bool,
}

/// Holds the single active user of this session.
pub struct ProfileService<S: Store, L: LocalStorage> {
    store: Arc<S>,
    storage: Arc<L>,
    listings: ListingService<S>,
    active: RwLock<Option<User>>,
}

impl<S: Store, L: LocalStorage> ProfileService<S, L> {
    /// Create a new profile service with no active user.
    pub fn new(store: Arc<S>, storage: Arc<L>) -> Self {
        Self {
            listings: ListingService::new(store.clone()),
            store,
            storage,
            active: RwLock::new(None),
        }
    }

    /// Reload the persisted user, if any, and make them active.
    ///
    /// A missing or unreadable value leaves the session signed out.
    pub async fn restore(&self) -> EngineResult<Option<User>> {
        let raw = match self.storage.get_item(USER_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!(error = %e, "Failed to read saved user");
                return Ok(None);
            },
        };

        let user: User = match serde_json::from_str(&raw) {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Failed to parse saved user");
                return Ok(None);
            },
        };

        self.store.users().save(&user).await?;
        self.listings.sync_owner_fields(&user).await?;
        *self.active.write().await = Some(user.clone());

        debug!(user_id = %user.id, "Restored saved user");
        Ok(Some(user))
    }

    /// Create an account from an email and make it active.
    pub async fn signup(&self, email: &str) -> EngineResult<User> {
        let user = User::from_email(email)?;

        if self.store.users().find_by_email(&user.email).await?.is_some() {
            return Err(EngineError::Validation(format!(
                "an account already exists for {}",
                user.email
            )));
        }

        self.store.users().save(&user).await?;
        self.persist_user(&user).await;
        *self.active.write().await = Some(user.clone());

        info!(user_id = %user.id, college = %user.college, "User signed up");
        Ok(user)
    }

    /// Reactivate a known account, or sign up a new one.
    pub async fn login(&self, email: &str) -> EngineResult<User> {
        match self.store.users().find_by_email(email).await? {
            Some(user) => {
                self.persist_user(&user).await;
                *self.active.write().await = Some(user.clone());
                info!(user_id = %user.id, "User logged in");
                Ok(user)
            },
            None => self.signup(email).await,
        }
    }

    /// Sign out and forget the persisted user.
    pub async fn logout(&self) -> EngineResult<()> {
        let previous = self.active.write().await.take();

        if let Err(e) = self.storage.remove_item(USER_KEY).await {
            warn!(error = %e, "Failed to remove saved user");
        }

        if let Some(user) = previous {
            info!(user_id = %user.id, "User logged out");
        }
        Ok(())
    }

    /// The active user.
    pub async fn current(&self) -> EngineResult<User> {
        self.active.read().await.clone().ok_or(EngineError::NoActiveUser)
    }

    /// Replace the active user's record and resync their listings.
    ///
    /// Only the active user may update their own profile.
    pub async fn update(&self, user: User) -> EngineResult<ProfileUpdate> {
        let active = self.current().await?;
        if active.id != user.id {
            return Err(EngineError::Unauthorized {
                user_id: active.id,
                target: format!("profile {}", user.id),
            });
        }

        if user.name.trim().is_empty() {
            return Err(EngineError::Validation("name must not be empty".to_string()));
        }

        if self.store.users().find_by_id(&user.id).await?.is_none() {
            return Err(EngineError::not_found("user", user.id.as_str()));
        }

        if let Some(holder) = self.store.users().find_by_email(&user.email).await? {
            if holder.id != user.id {
                return Err(EngineError::Validation(format!(
                    "email {} is already registered",
                    user.email
                )));
            }
        }

        self.store.users().save(&user).await?;
        *self.active.write().await = Some(user.clone());

        let persisted = self.persist_user(&user).await;
        let listings_synced = self.listings.sync_owner_fields(&user).await?;

        info!(
            user_id = %user.id,
            listings_synced,
            persisted,
            "Profile updated"
        );

        Ok(ProfileUpdate {
            user,
            listings_synced,
            persisted,
        })
    }

    /// Current theme; light when unset.
    pub async fn theme(&self) -> Theme {
        match self.storage.get_item(THEME_KEY).await {
            Ok(Some(value)) => Theme::parse_or_default(&value),
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!(error = %e, "Failed to read theme");
                Theme::default()
            },
        }
    }

    /// Flip between light and dark and persist the choice.
    pub async fn toggle_theme(&self) -> Theme {
        let theme = self.theme().await.toggled();
        if let Err(e) = self.storage.set_item(THEME_KEY, theme.as_str()).await {
            warn!(error = %e, "Failed to persist theme");
        }
        theme
    }

    /// Write the durable copy of the user; failures are logged, not returned.
    async fn persist_user(&self, user: &User) -> bool {
        let json = match serde_json::to_string(user) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, user_id = %user.id, "Failed to serialize user");
                return false;
            },
        };

        match self.storage.set_item(USER_KEY, &json).await {
            Ok(()) => true,
            Err(e) if e.is_quota_exceeded() => {
                warn!(
                    error = %e,
                    user_id = %user.id,
                    "Storage quota hit; profile update will not persist across restarts"
                );
                false
            },
            Err(e) => {
                warn!(error = %e, user_id = %user.id, "Failed to persist user");
                false
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillswap_domain::{Listing, ListingDraft, ListingType};
    use skillswap_store::{MemoryStorage, MemoryStore};

    fn service_with_quota(quota: usize) -> (Arc<MemoryStore>, Arc<MemoryStorage>, ProfileService<MemoryStore, MemoryStorage>) {
        let store = Arc::new(MemoryStore::new());
        let storage = Arc::new(MemoryStorage::with_quota(quota));
        let service = ProfileService::new(store.clone(), storage.clone());
        (store, storage, service)
    }

    #[tokio::test]
    async fn test_signup_persists_and_restores() {
        let (store, storage, service) = service_with_quota(64 * 1024);
        let user = service.signup("sarah@mit.edu").await.unwrap();
        assert!(storage.get_item(USER_KEY).await.unwrap().is_some());

        let fresh = ProfileService::new(store, storage);
        let restored = fresh.restore().await.unwrap().unwrap();
        assert_eq!(restored.id, user.id);
        assert_eq!(fresh.current().await.unwrap().email, "sarah@mit.edu");
    }

    #[tokio::test]
    async fn test_restore_ignores_corrupt_value() {
        let (_, storage, service) = service_with_quota(1024);
        storage.set_item(USER_KEY, "{not json").await.unwrap();

        assert!(service.restore().await.unwrap().is_none());
        assert!(matches!(service.current().await, Err(EngineError::NoActiveUser)));
    }

    #[tokio::test]
    async fn test_login_reuses_existing_account() {
        let (_, _, service) = service_with_quota(64 * 1024);
        let first = service.login("elena@berkeley.edu").await.unwrap();
        service.logout().await.unwrap();
        let second = service.login("Elena@Berkeley.edu").await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_update_applies_even_when_quota_exceeded() {
        let (store, _, service) = service_with_quota(64 * 1024);
        let user = service.signup("sarah@mit.edu").await.unwrap();

        let draft = ListingDraft::new(ListingType::Skill, "Calc Help", "Series", "Math");
        let listing = Listing::from_draft(draft, &user).unwrap();
        store.listings().create(&listing).await.unwrap();

        let mut edited = user.clone();
        edited.avatar = format!("data:image/png;base64,{}", "A".repeat(128 * 1024));

        let outcome = service.update(edited.clone()).await.unwrap();
        assert!(!outcome.persisted);
        assert_eq!(outcome.listings_synced, 1);
        assert_eq!(service.current().await.unwrap().avatar, edited.avatar);

        let synced = store.listings().find_by_id(&listing.id).await.unwrap().unwrap();
        assert_eq!(synced.user_avatar, edited.avatar);
    }

    #[tokio::test]
    async fn test_update_other_user_is_unauthorized() {
        let (_, _, service) = service_with_quota(64 * 1024);
        service.signup("sarah@mit.edu").await.unwrap();
        let stranger = User::from_email("david@stanford.edu").unwrap();

        let result = service.update(stranger).await;
        assert!(matches!(result, Err(EngineError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_update_rejects_email_of_another_account() {
        let (store, _, service) = service_with_quota(64 * 1024);
        let david = service.signup("david@stanford.edu").await.unwrap();
        service.logout().await.unwrap();
        let sarah = service.signup("sarah@mit.edu").await.unwrap();

        let mut edited = sarah.clone();
        edited.email = "David@Stanford.edu".to_string();
        let result = service.update(edited).await;
        assert!(matches!(result, Err(EngineError::Validation(_))));

        let stored = store.users().find_by_id(&sarah.id).await.unwrap().unwrap();
        assert_eq!(stored.email, "sarah@mit.edu");
        assert_eq!(service.login("david@stanford.edu").await.unwrap().id, david.id);
    }

    #[tokio::test]
    async fn test_logout_clears_saved_user() {
        let (_, storage, service) = service_with_quota(64 * 1024);
        service.signup("sarah@mit.edu").await.unwrap();
        service.logout().await.unwrap();

        assert!(storage.get_item(USER_KEY).await.unwrap().is_none());
        assert!(service.current().await.is_err());
    }

    #[tokio::test]
    async fn test_theme_toggle_persists() {
        let (_, storage, service) = service_with_quota(1024);
        assert_eq!(service.theme().await, Theme::Light);
        assert_eq!(service.toggle_theme().await, Theme::Dark);
        assert_eq!(storage.get_item(THEME_KEY).await.unwrap().as_deref(), Some("dark"));
        assert_eq!(service.toggle_theme().await, Theme::Light);
    }
}
