pub mod cache;
pub mod cleanup;
pub mod doctor;
pub mod info;
pub mod install;
pub mod list;
pub mod outdated;
pub mod search;
pub mod shellenv;
pub mod uninstall;
pub mod upgrade;
