pub(crate) mod bootstrap;
mod gameplay;
