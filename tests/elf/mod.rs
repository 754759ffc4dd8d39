//! End-to-end ELF parsing tests.

mod loader;
