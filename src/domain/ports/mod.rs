mod country_database;
mod hostname_resolver;

pub use country_database::CountryDatabase;
pub use hostname_resolver::{HostnameResolver, LookupError};
