pub mod annotate;
pub mod contour_finder;
pub mod filters;
pub mod marker;
pub mod morphology;
pub mod utils;
pub mod zoom;
