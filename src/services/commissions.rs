//! Commission inheritance.
//!
//! Resolves the set of (customer, tier, base percentage) tuples a user is
//! entitled to, from their active customer links. This is the scoping input
//! for settlements and every read-side aggregation.

use bigdecimal::BigDecimal;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::MarginClass;
use crate::error::AppError;
use crate::stores::{DirectoryStore, MarginStore};

#[derive(Debug, Clone, Serialize)]
pub struct InheritedCommission {
    pub customer_id: Uuid,
    pub customer_name: String,
    pub category: MarginClass,
    pub commission_percent: BigDecimal,
}

pub struct CommissionResolver {
    directory: Arc<dyn DirectoryStore>,
    margins: Arc<dyn MarginStore>,
}

impl CommissionResolver {
    pub fn new(directory: Arc<dyn DirectoryStore>, margins: Arc<dyn MarginStore>) -> Self {
        Self { directory, margins }
    }

    /// Commissions the user inherits from their active links.
    ///
    /// SUPER_ADMIN inherits every active link at the OUTBANK tier regardless
    /// of the link's commission type. Everyone else inherits only links
    /// tagged with a commission type, at that tier. An empty result is
    /// ordinary; no links means no settlement data, not a failure.
    pub async fn inherited_commissions(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<InheritedCommission>, AppError> {
        let role = match self.directory.user_role(user_id).await? {
            Some(role) => role,
            None => return Ok(Vec::new()),
        };

        let links = self.directory.active_links(user_id).await?;
        let mut result = Vec::with_capacity(links.len());

        for link in links {
            let tier = if role.is_super_admin() {
                MarginClass::Outbank
            } else {
                match link.commission_type {
                    Some(ct) => ct.margin_class(),
                    None => continue,
                }
            };

            let config = self.margins.margin_config(link.customer_id).await?;
            let percent = config
                .and_then(|c| match tier {
                    MarginClass::Outbank => c.margin_outbank,
                    MarginClass::Executivo => c.margin_executivo,
                    MarginClass::Core => c.margin_core,
                    MarginClass::IsoOwn => None,
                })
                .unwrap_or_else(|| BigDecimal::from(0));

            result.push(InheritedCommission {
                customer_id: link.customer_id,
                customer_name: link.customer_name,
                category: tier,
                commission_percent: percent,
            });
        }

        Ok(result)
    }
}
