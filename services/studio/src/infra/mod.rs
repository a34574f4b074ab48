pub mod db;
pub mod provider;
pub mod rate_limit;
pub mod storage;
