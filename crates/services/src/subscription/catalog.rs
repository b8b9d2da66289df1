//! Plan catalog: provider price id to plan name and resource limits.
//!
//! The catalog is built once at startup (either the built-in table or a JSON
//! document) and shared read-only. Legacy and current price ids for the same
//! plan are separate keys pointing at equal definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use super::ports::{PlanSummary, PlansOverview, ResourceLimits};

pub const BUILTIN_CATALOG_VERSION: &str = "2025-06";
pub const FREE_PLAN_NAME: &str = "Free";
pub const FREE_INVOICE_LIMIT: u64 = 2;
pub const FREE_CONTRACT_LIMIT: u64 = 0;

/// Plan name and limits billed for one or more price ids
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanDefinition {
    pub plan_name: String,
    pub invoice_limit: u64,
    pub contract_limit: u64,
}

impl PlanDefinition {
    pub fn free() -> Self {
        Self {
            plan_name: FREE_PLAN_NAME.to_string(),
            invoice_limit: FREE_INVOICE_LIMIT,
            contract_limit: FREE_CONTRACT_LIMIT,
        }
    }

    pub fn limits(&self) -> ResourceLimits {
        ResourceLimits {
            invoices: self.invoice_limit,
            contracts: self.contract_limit,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read plan catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid plan catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Plan catalog entry has an empty plan name")]
    EmptyPlanName,
    #[error("Price id {price_id} is assigned to both '{first}' and '{second}'")]
    ConflictingPriceId {
        price_id: String,
        first: String,
        second: String,
    },
}

/// On-disk shape of a catalog
#[derive(Debug, Deserialize)]
struct CatalogDocument {
    version: String,
    #[serde(default)]
    free: Option<PlanDefinition>,
    plans: Vec<PlanEntry>,
}

#[derive(Debug, Deserialize)]
struct PlanEntry {
    plan_name: String,
    invoice_limit: u64,
    contract_limit: u64,
    price_ids: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PlanCatalog {
    version: String,
    free: PlanDefinition,
    by_price_id: HashMap<String, PlanDefinition>,
}

impl PlanCatalog {
    /// The production price table
    pub fn builtin() -> Self {
        let expert = PlanDefinition {
            plan_name: "Expert Freelancer".to_string(),
            invoice_limit: 40,
            contract_limit: 8,
        };
        let seasoned = PlanDefinition {
            plan_name: "Seasoned Freelancer".to_string(),
            invoice_limit: 20,
            contract_limit: 4,
        };
        let new_freelancer = PlanDefinition {
            plan_name: "New Freelancer".to_string(),
            invoice_limit: 10,
            contract_limit: 2,
        };

        let by_price_id = [
            ("price_1RaQ0KDBPJVWy5Mhrf7REir7", &expert),
            ("price_1RaPzpDBPJVWy5Mh7TS53Heu", &seasoned),
            ("price_1RTCfJDBPJVWy5MhqB5gMwWZ", &new_freelancer),
            // Legacy
            ("price_1OqYLgDNtZHzJBITKyRoXhOD", &expert),
            ("price_1OqYLFDNtZHzJBITXVYfHbXt", &seasoned),
            ("price_1OqYKgDNtZHzJBITvDLbA6Vz", &new_freelancer),
        ]
        .into_iter()
        .map(|(price_id, plan)| (price_id.to_string(), plan.clone()))
        .collect();

        Self {
            version: BUILTIN_CATALOG_VERSION.to_string(),
            free: PlanDefinition::free(),
            by_price_id,
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDocument = serde_json::from_str(raw)?;

        let free = doc.free.unwrap_or_else(PlanDefinition::free);
        if free.plan_name.trim().is_empty() {
            return Err(CatalogError::EmptyPlanName);
        }

        let mut by_price_id: HashMap<String, PlanDefinition> = HashMap::new();
        for entry in doc.plans {
            if entry.plan_name.trim().is_empty() {
                return Err(CatalogError::EmptyPlanName);
            }
            let plan = PlanDefinition {
                plan_name: entry.plan_name,
                invoice_limit: entry.invoice_limit,
                contract_limit: entry.contract_limit,
            };
            for price_id in entry.price_ids {
                match by_price_id.get(&price_id) {
                    Some(existing) if existing != &plan => {
                        return Err(CatalogError::ConflictingPriceId {
                            price_id,
                            first: existing.plan_name.clone(),
                            second: plan.plan_name.clone(),
                        });
                    }
                    Some(_) => {}
                    None => {
                        by_price_id.insert(price_id, plan.clone());
                    }
                }
            }
        }

        Ok(Self {
            version: doc.version,
            free,
            by_price_id,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn free_plan(&self) -> &PlanDefinition {
        &self.free
    }

    /// Exact-match lookup. Unknown or absent ids fall back to the Free plan.
    pub fn lookup(&self, price_id: Option<&str>) -> &PlanDefinition {
        price_id
            .and_then(|id| self.by_price_id.get(id))
            .unwrap_or(&self.free)
    }

    /// Distinct paid plans with all their price ids, cheapest first
    pub fn plans(&self) -> Vec<PlanSummary> {
        let mut grouped: Vec<PlanSummary> = Vec::new();
        for (price_id, plan) in &self.by_price_id {
            match grouped.iter_mut().find(|s| {
                s.plan_name == plan.plan_name
                    && s.invoice_limit == plan.invoice_limit
                    && s.contract_limit == plan.contract_limit
            }) {
                Some(summary) => summary.price_ids.push(price_id.clone()),
                None => grouped.push(PlanSummary {
                    plan_name: plan.plan_name.clone(),
                    invoice_limit: plan.invoice_limit,
                    contract_limit: plan.contract_limit,
                    price_ids: vec![price_id.clone()],
                }),
            }
        }
        for summary in &mut grouped {
            summary.price_ids.sort();
        }
        grouped.sort_by(|a, b| {
            (a.invoice_limit, a.contract_limit, &a.plan_name).cmp(&(
                b.invoice_limit,
                b.contract_limit,
                &b.plan_name,
            ))
        });
        grouped
    }

    pub fn overview(&self) -> PlansOverview {
        PlansOverview {
            version: self.version.clone(),
            free: self.free.clone(),
            plans: self.plans(),
        }
    }
}

impl Default for PlanCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
