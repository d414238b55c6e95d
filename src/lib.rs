pub mod cli;
pub mod kmersim;
