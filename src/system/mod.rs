//! # System Interaction Layer
//!
//! The boundary between the launcher's logic and the outside world.
//!
//! ## Modules
//!
//! - **`executor`**: runs `git`, `docker` and `docker-compose` as parameterized
//!   argument vectors, either attached to the terminal or with captured stdout.
//! - **`prompt`**: yes/no, free-text and choice questions, backed by `dialoguer`.

pub mod executor;
pub mod prompt;

#[cfg(test)]
pub(crate) mod testing;
