//! End-to-end pipeline scenarios against on-disk corpora.

mod build_tests;
mod expand_tests;
mod membership_tests;
mod validation_tests;
