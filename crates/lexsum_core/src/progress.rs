#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepStatus {
    #[default]
    Pending,
    Active,
    Completed,
}

impl StepStatus {
    /// Maps a backend status label onto the three step states.
    ///
    /// Unrecognised labels are treated as pending.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        const ACTIVE: &[&str] = &["active", "in_progress", "running", "processing"];
        const COMPLETED: &[&str] = &["completed", "complete", "done"];
        if COMPLETED.iter().any(|c| c.eq_ignore_ascii_case(label)) {
            StepStatus::Completed
        } else if ACTIVE.iter().any(|a| a.eq_ignore_ascii_case(label)) {
            StepStatus::Active
        } else {
            StepStatus::Pending
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::Active => "active",
            StepStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StepTiming {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressStep {
    pub name: String,
    pub status: StepStatus,
    pub percentage: Option<f64>,
    pub timing: StepTiming,
    pub details: Option<String>,
}

impl ProgressStep {
    pub fn new(name: impl Into<String>, status: StepStatus) -> Self {
        Self {
            name: name.into(),
            status,
            percentage: None,
            timing: StepTiming::default(),
            details: None,
        }
    }
}

/// Point-in-time view of backend processing. Each poll replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressSnapshot {
    pub percentage: f64,
    pub message: String,
    pub completed: bool,
    pub status: Option<String>,
    /// Explicit lifecycle field; newer backends report `"completed"` here.
    pub phase: Option<String>,
    pub steps: Vec<ProgressStep>,
}

impl ProgressSnapshot {
    pub fn zeroed() -> Self {
        Self::default()
    }

    pub fn step(&self, name: &str) -> Option<&ProgressStep> {
        self.steps.iter().find(|step| step.name == name)
    }

    /// First step currently marked active, if any.
    pub fn active_step(&self) -> Option<&ProgressStep> {
        self.steps
            .iter()
            .find(|step| step.status == StepStatus::Active)
    }

    pub fn completed_steps(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| step.status == StepStatus::Completed)
            .count()
    }

    /// Percentage rounded and clamped for display.
    pub fn display_percentage(&self) -> u8 {
        if !self.percentage.is_finite() {
            return 0;
        }
        self.percentage.round().clamp(0.0, 100.0) as u8
    }
}

