use indicatif::{ProgressBar, ProgressStyle};
use sitepoi_pipeline::{PipelinePhase, PipelineProgress};
use std::time::Duration;

/// Create a spinner for indeterminate progress
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Create a progress bar for determinate progress
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg}\n[{bar:40.cyan/blue}] {pos}/{len} ({percent}%) ETA: {eta}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░ "),
    );
    pb.set_message(message.to_string());
    pb
}

/// Finish a progress bar with success message
pub fn finish_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✓ {}", message));
}

fn phase_label(phase: PipelinePhase) -> &'static str {
    match phase {
        PipelinePhase::Cleaning => "Cleaned sites",
        PipelinePhase::Clustering => "Clustered sites",
        PipelinePhase::FetchingPois => "Fetched POIs",
        PipelinePhase::Normalizing => "Normalized POIs",
        PipelinePhase::ComputingProximity => "Computed proximity edges",
        PipelinePhase::Aggregating => "Aggregated features",
    }
}

/// Progress display for a pipeline run: a spinner per stage and a bar for the fetch
pub struct RunProgress {
    enabled: bool,
    current: Option<(PipelinePhase, ProgressBar)>,
}

impl RunProgress {
    pub fn new(enabled: bool) -> Self {
        Self { enabled, current: None }
    }

    pub fn update(&mut self, event: PipelineProgress) {
        if !self.enabled {
            return;
        }

        if let Some((phase, pb)) = &self.current {
            if *phase == event.phase {
                if event.phase == PipelinePhase::FetchingPois {
                    pb.set_position(event.current as u64);
                }
                return;
            }
        }

        self.finish();
        let pb = match event.phase {
            PipelinePhase::FetchingPois => create_progress_bar(event.total as u64, &event.message),
            _ => create_spinner(&event.message),
        };
        self.current = Some((event.phase, pb));
    }

    pub fn finish(&mut self) {
        if let Some((phase, pb)) = self.current.take() {
            finish_success(&pb, phase_label(phase));
        }
    }
}
