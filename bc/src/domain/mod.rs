//! Domain types for bizconsult
//!
//! Conversation messages, the recommendation document produced by the
//! advisory service, and the persisted report that wraps it.

mod message;
mod recommendation;
mod report;

pub use message::{Message, Role, Stage};
pub use recommendation::{
    Amount, BudgetBreakdown, HumanRole, ItemId, ItemKind, ItemState, ItemStatus, Phase, RecommendationDocument,
    Workflow,
};
pub use report::{Project, Report};

use serde::{Deserialize, Deserializer};

/// Deserialize `null` as the type's default instead of failing
///
/// Advisory output is generated text; absent and `null` fields are common.
pub(crate) fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
