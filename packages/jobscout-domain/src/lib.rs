pub mod alerts;
pub mod filters;
pub mod ranking;
pub mod similarity;
pub mod suggest;
pub mod terms;
