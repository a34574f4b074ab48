pub mod credits;
pub mod files;
pub mod materialize;
pub mod reaper;
pub mod settle;
pub mod status;
pub mod submit;
pub mod webhook;
