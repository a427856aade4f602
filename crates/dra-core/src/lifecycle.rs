use crate::association::{Association, Lifecycle};

/// Which observed lifecycles count as done and which as terminally broken.
///
/// Anything in neither set means "still transitioning, keep polling".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecyclePolicy {
    pub available: &'static [Lifecycle],
    pub failed: &'static [Lifecycle],
}

impl LifecyclePolicy {
    /// After create only the nominal available state is success; a
    /// misconfigured association is a failed create.
    pub const CREATE: Self = Self {
        available: &[Lifecycle::Available],
        failed: &[Lifecycle::Misconfigured, Lifecycle::Failed],
    };

    /// After an update a misconfigured association (waiting on a re-sync) is
    /// an acceptable end state.
    pub const UPDATE: Self = Self {
        available: &[Lifecycle::Available, Lifecycle::Misconfigured],
        failed: &[Lifecycle::Failed],
    };

    /// Classify the observed association. `None` (absent, ambiguous or
    /// unrecognized) is never a failure here: it keeps the poller waiting.
    pub fn classify(&self, observed: Option<&Association>) -> Stabilization {
        let Some(association) = observed else {
            return Stabilization::Pending;
        };
        if self.available.contains(&association.lifecycle) {
            Stabilization::Stable
        } else if self.failed.contains(&association.lifecycle) {
            Stabilization::Failed {
                lifecycle: association.lifecycle.clone(),
                failure_details: association.failure_details.clone(),
            }
        } else {
            Stabilization::Pending
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stabilization {
    Stable,
    Pending,
    Failed {
        lifecycle: Lifecycle,
        failure_details: Option<String>,
    },
}

impl Stabilization {
    pub fn is_stable(&self) -> bool {
        matches!(self, Self::Stable)
    }
}
