//! Engine slot cache tests

mod helpers;
