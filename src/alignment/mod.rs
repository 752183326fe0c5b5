pub mod normalization;
pub mod pairwise;
pub mod positional;
pub mod progressive;
pub mod report;
pub mod similarity;
pub mod tokenization;
