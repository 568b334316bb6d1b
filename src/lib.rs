pub mod draw;
pub mod logging;
pub mod session;
pub mod settings;
pub mod solve;
pub mod typeset;

pub use session::{Notice, NoticeLevel, Session};
pub use settings::Settings;
