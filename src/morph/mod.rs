pub(crate) mod barycentric;
pub(crate) mod interpolate;
pub(crate) mod rasterize;
