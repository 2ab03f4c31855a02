// src/core/fsm/outcome.rs

//! The shared vocabulary every action handler reports back to the engine
//! tick. A handler never mutates `host.action` itself on completion or
//! failure — only the engine does that, keeping "who clears the action
//! slot" a single rule instead of one per handler.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// Still running; stay on the current action next tick.
    InProgress,
    /// Finished successfully; the engine clears the action and returns the
    /// host to `Stage::Idle`.
    Complete,
    /// Finished unsuccessfully; the engine clears the action, returns to
    /// `Stage::Idle`, and records the reason in `host.task`.
    Failed(String),
}
