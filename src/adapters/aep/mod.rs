//! AEP streaming endpoint integration
//!
//! [`AepSender`] makes one delivery attempt per payload. [`create_sender`] picks the live HTTP
//! implementation or the mock from `aep.mock_mode`.

pub mod live;
pub mod mock;
pub mod sender;

pub use live::LiveSender;
pub use mock::MockSender;
pub use sender::{create_sender, AepSender, SendOutcome};
