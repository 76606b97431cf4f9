mod common;
mod filters;
mod review;
