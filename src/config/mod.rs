//! Configuration module

mod site;

pub use site::ApiConfig;
pub use site::LabelsConfig;
pub use site::SiteConfig;
pub use site::{PrismicEnv, ENV_PREFIX};
