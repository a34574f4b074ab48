pub mod credits;
pub mod files;
pub mod health;
pub mod generation;
pub mod job;
pub mod webhook;
