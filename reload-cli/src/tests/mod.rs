//! Shared test harness modules for the reload CLI.

mod helpers;
