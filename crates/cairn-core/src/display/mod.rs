//! Display formatting for models, collections and operation results.
//!
//! Domain models implement [`std::fmt::Display`] directly (see [`models`]);
//! newtype wrappers add context-specific formatting for collections and for
//! the outcome of create, update and delete operations. Everything renders
//! as markdown, which the CLI passes through its terminal renderer.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  Domain Models  │    │ Collections &   │    │   Markdown      │
//! │ (Plan, Task...) │───▶│ Result Wrappers │───▶│    Output       │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`collections`]: `PlanSummaries`, `Tasks`, `Phases`
//! - [`results`]: `CreateResult`, `UpdateResult`, `DeleteResult`
//! - [`status`]: `OperationStatus` for bulk operations
//! - [`datetime`]: `LocalDateTime`
//! - [`models`]: Display implementations for domain models
//!
//! ```rust
//! use cairn_core::display::OperationStatus;
//!
//! let status = OperationStatus::success("Approved 2 phases");
//! assert_eq!(status.to_string(), "Success: Approved 2 phases\n");
//! ```

pub mod collections;
pub mod datetime;
pub mod models;
pub mod results;
pub mod status;

pub use collections::{Phases, PlanSummaries, Tasks};
pub use datetime::LocalDateTime;
pub use results::{CreateResult, DeleteResult, Resource, UpdateResult};
pub use status::OperationStatus;
