// Identity linker — maps a verified Vkontakte identity to a local account.
//
// Resolution order:
// 1. a logged-in session links the identity to the session's account;
// 2. a known provider id returns its linked account and refreshes tokens;
// 3. otherwise the account owning the (possibly synthesized) email is
//    merged into, or a new account is created.
//
// Each step is a sequence of independent store calls. The first failure
// aborts and is returned; earlier writes are not rolled back.

use std::sync::Arc;

use serde::Serialize;

use sso_vkontakte_core::error::{Result, SsoError, StoreError};
use sso_vkontakte_core::models::{AccountId, Association, NewUser, ProviderIdentity};

use crate::constants::{self, fields};
use crate::context::SsoContext;

/// Which resolution branch produced the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolutionKind {
    /// Linked to the already-authenticated session account.
    Linked,
    /// Provider id was already linked.
    Returning,
    /// Linked to an existing account found by email.
    Merged,
    /// A new account was created.
    Created,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinkOutcome {
    pub uid: AccountId,
    pub kind: ResolutionKind,
}

impl LinkOutcome {
    /// Whether the host must establish a login session for `uid`.
    /// A session link happens inside an existing session.
    pub fn needs_login(&self) -> bool {
        self.kind != ResolutionKind::Linked
    }
}

#[derive(Debug, Clone)]
pub struct IdentityLinker {
    ctx: Arc<SsoContext>,
}

impl IdentityLinker {
    pub fn new(ctx: Arc<SsoContext>) -> Self {
        Self { ctx }
    }

    /// Resolve `identity` to a local account.
    ///
    /// `session_uid` is the account of the current session, if any. Guest
    /// sessions (uid 0) count as no session.
    pub async fn resolve(
        &self,
        identity: &ProviderIdentity,
        session_uid: Option<AccountId>,
    ) -> Result<LinkOutcome> {
        if let Some(uid) = session_uid.filter(AccountId::is_registered) {
            self.link(uid, &identity.id).await?;
            tracing::info!(%uid, provider_id = %identity.id, "Linked Vkontakte account to session user");
            return Ok(LinkOutcome { uid, kind: ResolutionKind::Linked });
        }

        self.login(identity).await
    }

    async fn login(&self, identity: &ProviderIdentity) -> Result<LinkOutcome> {
        if let Some(uid) = self.uid_by_provider_id(&identity.id).await? {
            self.store_tokens(uid, &identity.access_token, identity.refresh_token.as_deref())
                .await?;
            return Ok(LinkOutcome { uid, kind: ResolutionKind::Returning });
        }

        let email = identity.resolved_email(constants::PROVIDER_ID);
        let (uid, kind) = match self.ctx.users.get_uid_by_email(&email).await? {
            Some(uid) => (uid, ResolutionKind::Merged),
            None => {
                let uid = self
                    .ctx
                    .users
                    .create_user(NewUser {
                        username: identity.display_name.clone(),
                        email: email.clone(),
                    })
                    .await?;
                (uid, ResolutionKind::Created)
            }
        };

        self.link(uid, &identity.id).await?;

        let settings = self.ctx.settings.get().await;
        let confirmed = if settings.autoconfirm { "1" } else { "0" };
        self.ctx
            .users
            .set_user_field(uid, fields::EMAIL_CONFIRMED, confirmed)
            .await?;

        if let Some(picture) = identity.picture.as_deref() {
            self.ctx
                .users
                .set_user_field(uid, fields::UPLOADED_PICTURE, picture)
                .await?;
            self.ctx.users.set_user_field(uid, fields::PICTURE, picture).await?;
        }

        self.store_tokens(uid, &identity.access_token, identity.refresh_token.as_deref())
            .await?;

        tracing::info!(%uid, provider_id = %identity.id, ?kind, "Vkontakte login resolved");
        Ok(LinkOutcome { uid, kind })
    }

    /// Write `vkontakteid` on the account and the reverse linkage entry.
    async fn link(&self, uid: AccountId, provider_id: &str) -> Result<()> {
        self.ctx
            .users
            .set_user_field(uid, fields::PROVIDER_UID, provider_id)
            .await?;
        self.ctx
            .objects
            .set_object_field(constants::LINKAGE_MAP, provider_id, &uid.to_string())
            .await?;
        Ok(())
    }

    /// The account linked to a provider id, if any.
    pub async fn uid_by_provider_id(&self, provider_id: &str) -> Result<Option<AccountId>> {
        let raw = self
            .ctx
            .objects
            .get_object_field(constants::LINKAGE_MAP, provider_id)
            .await?;
        match raw.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(None),
            Some(s) => s.parse::<AccountId>().map(Some).map_err(|_| {
                SsoError::from(StoreError::Serialization(format!(
                    "invalid uid {s:?} in {} for {provider_id}",
                    constants::LINKAGE_MAP
                )))
            }),
        }
    }

    /// Overwrite the stored provider tokens of `uid`.
    pub async fn store_tokens(
        &self,
        uid: AccountId,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<()> {
        self.ctx
            .users
            .set_user_field(uid, fields::ACCESS_TOKEN, access_token)
            .await?;
        self.ctx
            .users
            .set_user_field(uid, fields::REFRESH_TOKEN, refresh_token.unwrap_or_default())
            .await?;
        tracing::info!(%uid, "Stored Vkontakte tokens");
        Ok(())
    }

    /// Remove the linkage entry of an account being deleted.
    ///
    /// Accounts without a linked provider id succeed without writes.
    pub async fn purge(&self, uid: AccountId) -> Result<AccountId> {
        match self.unlink(uid).await {
            Ok(()) => Ok(uid),
            Err(source) => {
                tracing::error!(%uid, error = %source, "Could not remove OAuthId data for uid");
                Err(SsoError::PurgeFailed { uid, source })
            }
        }
    }

    async fn unlink(&self, uid: AccountId) -> std::result::Result<(), StoreError> {
        let provider_id = self
            .ctx
            .users
            .get_user_field(uid, fields::PROVIDER_UID)
            .await?;
        if let Some(provider_id) = provider_id.filter(|id| !id.is_empty()) {
            self.ctx
                .objects
                .delete_object_field(constants::LINKAGE_MAP, &provider_id)
                .await?;
            tracing::debug!(%uid, %provider_id, "Removed Vkontakte linkage");
        }
        Ok(())
    }

    /// Association status shown in the account's linked-services list.
    pub async fn association(&self, uid: AccountId) -> Result<Association> {
        let provider_id = self
            .ctx
            .users
            .get_user_field(uid, fields::PROVIDER_UID)
            .await?
            .filter(|id| !id.is_empty());

        let (associated, url) = match provider_id {
            Some(id) => (true, format!("{}{id}", constants::PROFILE_URL_PREFIX)),
            None => (false, self.ctx.options.url(constants::AUTH_PATH)),
        };

        Ok(Association {
            associated,
            url,
            name: constants::PROVIDER_NAME.to_string(),
            icon: constants::PROVIDER_ICON.to_string(),
        })
    }
}
