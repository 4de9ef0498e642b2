pub(crate) mod correspondence;
