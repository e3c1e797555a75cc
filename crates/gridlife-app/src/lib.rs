//! Frontend plumbing for the GridLife binary.

use anyhow::Result;
use gridlife_core::Session;

pub mod input;
pub mod terminal;

/// A frontend owns the event loop and drives one session to completion.
pub trait Frontend {
    /// Stable identifier describing the frontend implementation (e.g., "terminal").
    fn name(&self) -> &'static str;

    /// Launch the frontend; blocks until the session ends.
    fn run(&self, session: Session) -> Result<()>;
}
