//! Networked play over a shared document store.

mod driver;
mod memory;
mod mirror;
mod record;
mod session;
mod store;

pub use driver::{RemoteCommand, RemoteEvent, RemoteGame};
pub use memory::InMemoryStore;
pub use mirror::{Mirror, reconcile, reconcile_deleted};
pub use record::{GameRecord, RecordPatch, RecordStatus, open_games_query};
pub use session::{RemoteSession, generate_game_id, generate_identity};
pub use store::{Change, Document, DocumentId, DocumentStore, Query, Subscription, SubscriptionId};
