//! Run Orchestrator
//!
//! Tracks the provisioning run through its fixed sequence of states:
//!
//! `NotChecked -> PlatformChecked -> PlatformInstalled -> ImageChecked ->
//! ImageInstalled -> AvdCreated -> [HardwareProfileApplied] -> EnvironmentExported`
//!
//! Transitions are strictly forward and a run cannot be resumed: any failure
//! aborts the whole step.

use tracing::debug;

use crate::error::{Result, StepError};

/// Provisioning run state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Nothing inspected yet
    NotChecked,
    /// Platform presence is known
    PlatformChecked,
    /// Platform is present (found or installed by this run)
    PlatformInstalled,
    /// System image presence is known
    ImageChecked,
    /// System image is present (found or installed by this run)
    ImageInstalled,
    /// AVD was created
    AvdCreated,
    /// Custom hardware profile was written into the AVD
    HardwareProfileApplied,
    /// Emulator name handed to downstream steps
    EnvironmentExported,
}

impl RunState {
    /// States reachable in one step from `self`
    pub fn successors(&self) -> &'static [RunState] {
        use RunState::*;
        match self {
            NotChecked => &[PlatformChecked],
            PlatformChecked => &[PlatformInstalled],
            PlatformInstalled => &[ImageChecked],
            ImageChecked => &[ImageInstalled],
            ImageInstalled => &[AvdCreated],
            AvdCreated => &[HardwareProfileApplied, EnvironmentExported],
            HardwareProfileApplied => &[EnvironmentExported],
            EnvironmentExported => &[],
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.successors().is_empty()
    }
}

/// Sequential state tracker for one provisioning run
#[derive(Debug, Clone)]
pub struct Orchestrator {
    state: RunState,
    history: Vec<RunState>,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self {
            state: RunState::NotChecked,
            history: vec![RunState::NotChecked],
        }
    }

    /// Get current run state
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Every state visited so far, in order
    pub fn history(&self) -> &[RunState] {
        &self.history
    }

    /// Move to `next`; only the successors of the current state are allowed
    pub fn advance(&mut self, next: RunState) -> Result<()> {
        if !self.state.successors().contains(&next) {
            return Err(StepError::InvalidState(format!(
                "cannot move from {:?} to {:?}",
                self.state, next
            )));
        }

        debug!("State transition: {:?} -> {:?}", self.state, next);
        self.state = next;
        self.history.push(next);
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.state.is_terminal()
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_lifecycle() {
        let mut orchestrator = Orchestrator::default();
        assert_eq!(orchestrator.state(), RunState::NotChecked);

        for next in [
            RunState::PlatformChecked,
            RunState::PlatformInstalled,
            RunState::ImageChecked,
            RunState::ImageInstalled,
            RunState::AvdCreated,
            RunState::EnvironmentExported,
        ] {
            orchestrator.advance(next).unwrap();
        }

        assert!(orchestrator.is_complete());
        assert_eq!(orchestrator.history().len(), 7);
    }

    #[test]
    fn test_hardware_profile_is_optional_detour() {
        let mut orchestrator = Orchestrator::new();
        orchestrator.advance(RunState::PlatformChecked).unwrap();
        orchestrator.advance(RunState::PlatformInstalled).unwrap();
        orchestrator.advance(RunState::ImageChecked).unwrap();
        orchestrator.advance(RunState::ImageInstalled).unwrap();
        orchestrator.advance(RunState::AvdCreated).unwrap();
        orchestrator.advance(RunState::HardwareProfileApplied).unwrap();
        orchestrator.advance(RunState::EnvironmentExported).unwrap();
        assert!(orchestrator.is_complete());
    }

    #[test]
    fn test_skipping_states_is_rejected() {
        let mut orchestrator = Orchestrator::new();
        let err = orchestrator.advance(RunState::AvdCreated).unwrap_err();
        assert!(matches!(err, StepError::InvalidState(_)));
        assert_eq!(orchestrator.state(), RunState::NotChecked);

        orchestrator.advance(RunState::PlatformChecked).unwrap();
        assert!(orchestrator.advance(RunState::PlatformChecked).is_err());
        assert!(orchestrator.advance(RunState::NotChecked).is_err());
    }
}
