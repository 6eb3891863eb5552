//! End-to-end import tests over whole documents.

mod import;
mod round_trip;
