pub mod identity_store;
pub mod path_utils;
