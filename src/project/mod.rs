/// JSON morph job description.
pub(crate) mod file;
