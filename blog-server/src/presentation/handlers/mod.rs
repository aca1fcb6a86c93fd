pub(crate) mod auth;
pub(crate) mod pages;
pub(crate) mod posts;
