//! Crafting catalog core: records, persistence, cost arithmetic, price-list
//! paging and the multi-turn dialog state machine.
//!
//! Nothing in here knows how messages arrive or how replies are drawn; the
//! [`crate::bot`] front-end feeds events in and renders what comes back.

pub mod cost;
pub mod errors;
pub mod pagination;
pub mod session;
pub mod storage;
pub mod types;

pub use cost::{compute_cost, CostLine, CostReport, LineCost};
pub use errors::CraftError;
pub use pagination::{Direction, Page, PaginationState, PriceEntry};
pub use session::{
    Choice, Input, Outcome, Payload, Routed, Session, SessionKey, SessionKind, SessionTable,
};
pub use storage::{CatalogStore, CatalogStoreBuilder};
pub use types::*;
