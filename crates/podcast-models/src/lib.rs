pub mod podcast;
pub mod result_set;
pub mod session;
pub mod listen_log;

pub use podcast::{PlatformLinks, Podcast};
pub use result_set::{DataSource, ResultSet};
pub use session::Session;
pub use listen_log::{ListenLogEntry, ListenStats};
