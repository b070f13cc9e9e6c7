mod hickory_hostname_resolver;
mod maxmind_country_database;

pub use hickory_hostname_resolver::HickoryHostnameResolver;
pub use maxmind_country_database::MaxMindCountryDatabase;
