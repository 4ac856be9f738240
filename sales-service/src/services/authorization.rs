//! Injected authorization capability.
//!
//! Permission checks are an external policy lookup, not embedded logic:
//! every customer-scoped or mutating handler asks the `Authorizer` before
//! touching the store. By default the gateway trusts the upstream BFF that
//! already authenticated the user; a static policy is available for
//! direct-access deployments and tests.

use async_trait::async_trait;
use service_core::error::AppError;
use std::collections::HashSet;

/// Sales gateway capabilities.
pub mod capabilities {
    /// Submit drafted sales orders.
    pub const ORDER_SUBMIT: &str = "sales.order:submit";

    /// Read a customer's open sales orders.
    pub const ORDER_READ: &str = "sales.order:read";

    /// Read a customer's outstanding invoices.
    pub const INVOICE_READ: &str = "sales.invoice:read";

    /// Record payment entries.
    pub const PAYMENT_RECORD: &str = "sales.payment:record";

    /// Read a customer's ledger and balances.
    pub const LEDGER_READ: &str = "sales.ledger:read";

    /// Read the customer financial summary.
    pub const CUSTOMER_READ: &str = "sales.customer:read";
}

/// Grant scope covering every resource.
pub const ANY_RESOURCE: &str = "*";

#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Whether `user` holds `capability` on `resource`.
    async fn check(&self, user: &str, capability: &str, resource: &str)
        -> Result<bool, AppError>;

    /// Hard gate: rejected callers get a 403 before any side effect.
    async fn ensure(&self, user: &str, capability: &str, resource: &str) -> Result<(), AppError> {
        if self.check(user, capability, resource).await? {
            Ok(())
        } else {
            Err(AppError::Forbidden(anyhow::anyhow!(
                "User '{}' is not permitted '{}' on '{}'",
                user,
                capability,
                resource
            )))
        }
    }
}

/// BFF trust model: the upstream frontend already authorized the caller,
/// so enforcement here is disabled.
#[derive(Debug, Clone, Default)]
pub struct TrustUpstream;

#[async_trait]
impl Authorizer for TrustUpstream {
    async fn check(
        &self,
        _user: &str,
        _capability: &str,
        _resource: &str,
    ) -> Result<bool, AppError> {
        Ok(true)
    }
}

/// Explicit `(user, capability, resource)` grants. A `*` resource grants
/// the capability on everything.
#[derive(Debug, Clone, Default)]
pub struct StaticPolicy {
    grants: HashSet<(String, String, String)>,
}

impl StaticPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(mut self, user: &str, capability: &str, resource: &str) -> Self {
        self.grants.insert((
            user.to_string(),
            capability.to_string(),
            resource.to_string(),
        ));
        self
    }

    /// Grant every sales capability on every resource.
    pub fn grant_all(self, user: &str) -> Self {
        [
            capabilities::ORDER_SUBMIT,
            capabilities::ORDER_READ,
            capabilities::INVOICE_READ,
            capabilities::PAYMENT_RECORD,
            capabilities::LEDGER_READ,
            capabilities::CUSTOMER_READ,
        ]
        .iter()
        .fold(self, |policy, capability| {
            policy.grant(user, capability, ANY_RESOURCE)
        })
    }
}

#[async_trait]
impl Authorizer for StaticPolicy {
    async fn check(&self, user: &str, capability: &str, resource: &str)
        -> Result<bool, AppError> {
        let scoped = (user.to_string(), capability.to_string(), resource.to_string());
        let wildcard = (
            user.to_string(),
            capability.to_string(),
            ANY_RESOURCE.to_string(),
        );
        Ok(self.grants.contains(&scoped) || self.grants.contains(&wildcard))
    }
}
