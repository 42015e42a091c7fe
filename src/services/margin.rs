//! Margin resolution.
//!
//! Given a transaction's (customer, brand, product, channel) and a margin
//! class, returns the applicable commission percentage. Two strategies:
//! the flat tiers (OUTBANK / EXECUTIVO / CORE) read a single field off the
//! customer's margin configuration; ISO-own stacks granular MDR margins
//! keyed by brand and modality×channel. Absent configuration is never an
//! error: the resolver degrades to 0% with source `default`.

use bigdecimal::BigDecimal;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Channel, MarginClass, MarginSource, ProductType};
use crate::error::AppError;
use crate::stores::MarginStore;

/// A resolved percentage plus where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMargin {
    pub percent: BigDecimal,
    pub source: MarginSource,
}

impl ResolvedMargin {
    fn default_zero() -> Self {
        Self {
            percent: BigDecimal::from(0),
            source: MarginSource::Default,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MarginKey {
    customer_id: Uuid,
    /// Lowercased brand for the granular strategy; omitted for flat tiers,
    /// which have no brand granularity.
    brand: Option<String>,
    product: ProductType,
    channel: Channel,
    class: MarginClass,
}

/// Call-scoped memoization of resolved margins.
///
/// One instance per batch/report invocation, exclusively owned by that
/// call's execution context. Never shared across concurrent calls and never
/// persisted. A fresh cache per call is what keeps one caller's resolved
/// margins out of another's lookups.
#[derive(Debug, Default)]
pub struct MarginCache {
    entries: HashMap<MarginKey, ResolvedMargin>,
    hits: u64,
    misses: u64,
}

impl MarginCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

pub struct MarginResolver {
    store: Arc<dyn MarginStore>,
}

impl MarginResolver {
    pub fn new(store: Arc<dyn MarginStore>) -> Self {
        Self { store }
    }

    /// Resolve the commission percentage for one transaction key.
    ///
    /// Inputs are raw labels; canonicalization happens here so the cache key
    /// is always normalized. At most one configuration lookup reaches the
    /// store per distinct key per cache lifetime.
    pub async fn resolve(
        &self,
        cache: &mut MarginCache,
        customer_id: Uuid,
        brand: &str,
        product_label: &str,
        channel_label: &str,
        class: MarginClass,
    ) -> Result<ResolvedMargin, AppError> {
        let product = ProductType::canonicalize(product_label);
        let channel = Channel::canonicalize(channel_label);
        let brand_key = match class {
            MarginClass::IsoOwn => Some(brand.to_lowercase()),
            _ => None,
        };

        let key = MarginKey {
            customer_id,
            brand: brand_key,
            product,
            channel,
            class,
        };

        if let Some(cached) = cache.entries.get(&key) {
            cache.hits += 1;
            return Ok(cached.clone());
        }
        cache.misses += 1;

        let resolved = match class {
            MarginClass::IsoOwn => {
                self.resolve_granular(customer_id, &key, product, channel).await?
            }
            tier => self.resolve_tiered(customer_id, tier).await?,
        };

        cache.entries.insert(key, resolved.clone());
        Ok(resolved)
    }

    async fn resolve_tiered(
        &self,
        customer_id: Uuid,
        class: MarginClass,
    ) -> Result<ResolvedMargin, AppError> {
        let config = self.store.margin_config(customer_id).await?;
        let value = config.and_then(|c| match class {
            MarginClass::Outbank => c.margin_outbank,
            MarginClass::Executivo => c.margin_executivo,
            MarginClass::Core => c.margin_core,
            MarginClass::IsoOwn => None,
        });

        Ok(match value {
            Some(percent) => ResolvedMargin {
                percent,
                source: MarginSource::Config,
            },
            None => ResolvedMargin::default_zero(),
        })
    }

    async fn resolve_granular(
        &self,
        customer_id: Uuid,
        key: &MarginKey,
        product: ProductType,
        channel: Channel,
    ) -> Result<ResolvedMargin, AppError> {
        let rows = self.store.validated_mdr_margins(customer_id).await?;
        let brand = key.brand.as_deref().unwrap_or("");

        let matched = rows.into_iter().find(|row| {
            row.brand.to_lowercase() == brand
                && row.modality == product.as_str()
                && row.channel == channel.as_str()
        });

        Ok(match matched {
            Some(row) => ResolvedMargin {
                percent: row.percent,
                source: MarginSource::Config,
            },
            None => ResolvedMargin::default_zero(),
        })
    }
}
