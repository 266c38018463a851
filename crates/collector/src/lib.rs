pub mod bugs;
pub mod enums;
pub mod inspect;
pub mod metrics;
pub mod service;
pub mod users;

pub use bugs::download_bugs;
pub use enums::scrape_enums;
pub use service::{Collector, DownloadReport};
pub use users::download_users;
