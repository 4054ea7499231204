pub mod contexts;
pub mod external;

pub use contexts::Origin;
pub use external::{NavigationPath, NavigationReport, Navigator, NavigatorOptions};
