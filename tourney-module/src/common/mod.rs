pub(crate) mod config;
pub(crate) mod context;
pub(crate) mod output;
pub(crate) mod search;

#[cfg(test)]
pub(crate) mod fixtures;
