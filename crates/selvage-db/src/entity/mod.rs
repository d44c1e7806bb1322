//! database entity models for sea-orm.
//!
//! these entities map to database tables and convert to/from the domain
//! types in `selvage-types`.

pub mod license;
pub mod model;
pub mod review;
pub mod sync_record;
pub mod usage_event;
