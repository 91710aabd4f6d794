//! In-memory cache-aside layer shared by the API handlers
//!
//! Each endpoint owns one [`CacheSlot`] holding the last successfully fetched
//! payload. Slots are never evicted; expired entries are still returned so a
//! handler can serve stale data when the upstream is unavailable.

mod aside;
mod clock;
mod manager;
mod policy;

pub use aside::{resolve, Resolution};
pub use clock::{Clock, ManualClock, SystemClock};
pub use manager::{CacheEntry, CacheSlot};
pub use policy::CachePolicy;
