//! Ephemeral stories subsystem.
//!
//! # Data Flow
//! ```text
//! composer.rs (current draft + staged stack, capacity check)
//!     → finalize → Vec<StoryDraft>
//!     → store.rs append_batch (shared timestamp, rank, cap, persist)
//!
//! store.rs load_active (TTL filter, rewrite when pruned)
//!     → playback.rs (Closed ⇄ Viewing(i), tick-driven progress)
//! ```
//!
//! # Design Decisions
//! - Stories from one batch share a timestamp and are ordered by rank
//! - Expiry is applied lazily on every load; there is no sweeper
//! - The cap evicts oldest first and is enforced on every append

pub mod composer;
pub mod playback;
pub mod store;
pub mod types;

pub use composer::StoryComposer;
pub use playback::{Playback, PlaybackState};
pub use store::{stories_key, EphemeralStore};
pub use types::{StoryAuthor, StoryDraft, StoryEntry, StoryError};
