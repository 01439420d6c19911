//! Bulk user import into Keycloak
//!
//! People are processed one at a time, in input order. For each person the
//! user is provisioned (looked up or created), given a temporary password
//! equal to their national id, and has its required actions replaced.
//! The first failure aborts the whole batch.

use crate::config::ImportConfig;
use crate::domain::{ImportSummary, Person, ProvisionResult, UsernameField};
use crate::error::{AppError, Result};
use crate::keycloak::KeycloakClient;
use crate::repository::PersonRepository;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Admin operations the importer needs.
///
/// Using a trait here keeps unit tests fast and independent from HTTP mocking.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn provision_user(
        &self,
        username: &str,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> Result<ProvisionResult>;

    async fn set_temporary_password(&self, user_id: &str, password: &str) -> Result<()>;

    async fn add_required_actions(&self, user_id: &str, actions: &BTreeSet<String>)
        -> Result<()>;
}

#[async_trait]
impl AdminApi for KeycloakClient {
    async fn provision_user(
        &self,
        username: &str,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> Result<ProvisionResult> {
        KeycloakClient::provision_user(self, username, first_name, last_name, email).await
    }

    async fn set_temporary_password(&self, user_id: &str, password: &str) -> Result<()> {
        KeycloakClient::set_temporary_password(self, user_id, password).await
    }

    async fn add_required_actions(
        &self,
        user_id: &str,
        actions: &BTreeSet<String>,
    ) -> Result<()> {
        KeycloakClient::add_required_actions(self, user_id, actions).await
    }
}

/// Sequential, all-or-nothing bulk importer
pub struct BulkImportService {
    admin: Arc<dyn AdminApi>,
    username_field: UsernameField,
    required_actions: BTreeSet<String>,
    running: Mutex<()>,
}

impl BulkImportService {
    pub fn new(admin: Arc<dyn AdminApi>, config: &ImportConfig) -> Self {
        Self {
            admin,
            username_field: config.username_field,
            required_actions: config.required_actions.clone(),
            running: Mutex::new(()),
        }
    }

    /// Import everyone the repository lists
    pub async fn import_all(
        &self,
        people: &dyn PersonRepository,
        cancel: &CancellationToken,
    ) -> Result<ImportSummary> {
        let people = people.list().await?;
        self.bulk_import(&people, cancel).await
    }

    /// Import `people` in order.
    ///
    /// Blank usernames are skipped. Cancellation is checked before each
    /// person; a call already in flight is allowed to finish. Only one
    /// import may run at a time.
    pub async fn bulk_import(
        &self,
        people: &[Person],
        cancel: &CancellationToken,
    ) -> Result<ImportSummary> {
        let _running = self
            .running
            .try_lock()
            .map_err(|_| AppError::ImportInProgress)?;

        info!(
            count = people.len(),
            username_field = %self.username_field,
            "Starting bulk import"
        );

        let mut summary = ImportSummary::default();

        for (index, person) in people.iter().enumerate() {
            if cancel.is_cancelled() {
                warn!(index, imported = summary.imported, "Bulk import cancelled");
                return Err(AppError::Cancelled);
            }

            let Some(username) = person.username(self.username_field) else {
                debug!(index, name = %person.name, "Skipping person without username");
                summary.skipped += 1;
                continue;
            };

            if let Err(e) = self.import_one(username, person).await {
                error!(index, username, error = %e, "Bulk import aborted");
                return Err(e);
            }
            summary.imported += 1;
        }

        info!(
            imported = summary.imported,
            skipped = summary.skipped,
            "Bulk import finished"
        );
        Ok(summary)
    }

    async fn import_one(&self, username: &str, person: &Person) -> Result<()> {
        let provisioned = self
            .admin
            .provision_user(username, &person.name, &person.last_name, &person.email)
            .await?;

        self.admin
            .set_temporary_password(&provisioned.user_id, &person.national_id)
            .await?;

        self.admin
            .add_required_actions(&provisioned.user_id, &self.required_actions)
            .await?;

        info!(
            username,
            user_id = %provisioned.user_id,
            created = provisioned.created,
            "Imported user"
        );
        Ok(())
    }
}
