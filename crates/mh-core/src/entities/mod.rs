//! Entity structs for the construction-tracking domain.
//!
//! Each entity maps to one table in the libSQL database. Mutators take
//! validated value objects from [`crate::values`], so an entity can only be
//! moved into a state that passed validation.

mod audit;
mod house;
mod house_post;
mod post;
mod week_info;
mod week_mark;

pub use audit::{AuditEntry, AuditRecord};
pub use house::House;
pub use house_post::HousePost;
pub use post::Post;
pub use week_info::HouseWeekInfo;
pub use week_mark::WeekMark;
