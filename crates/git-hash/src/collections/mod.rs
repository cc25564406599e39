mod oid_map;

pub use oid_map::OidMap;
