//! # Cluster status
//!
//! Read-only view of a k3s cluster for edge functions.
//!
//! ```text
//!   edgefaas serve              edgefaas authority            k3s
//!  ┌────────────────┐  GET    ┌───────────────────┐  kubectl  ┌─────┐
//!  │StatusAggregator├────────►│ /nodes  /pods     ├──────────►│ API │
//!  └────────────────┘         └───────────────────┘           └─────┘
//! ```
//!
//! The aggregator never talks to the cluster directly; the authority service
//! is the only component that needs kubectl credentials.

pub mod aggregator;
pub mod authority;
pub mod entity;

pub use aggregator::{
    render_section, AggregateError, AuthorityClient, HttpAuthorityClient, StatusAggregator,
};
pub use authority::{
    create_authority_router, AuthorityState, InventoryError, InventorySource, Kubectl,
};
pub use entity::{
    is_ready, parse_entities, ClusterEntity, Condition, EntityKind, ReadinessReport,
};

/// Default authority service port
pub const AUTHORITY_PORT: u16 = 8301;
