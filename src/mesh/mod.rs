pub(crate) mod triangulate;
