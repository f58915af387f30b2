//! Local and solo play.

mod driver;
mod session;

pub use driver::{GameClosed, LocalCommand, LocalEvent, LocalGame};
pub use session::{COMPUTER, HUMAN, LocalSession, Phase};
