//! Progress bar display for distribution

use indicatif::{ProgressBar, ProgressStyle};

/// Progress display while copying bundles into the dist directory
pub struct ProgressDisplay {
    /// One tick per distributed file
    file_pb: ProgressBar,
}

impl ProgressDisplay {
    /// Create a new progress display with the total file count
    ///
    /// Nothing is drawn when stderr is not a terminal.
    pub fn new(total_files: u64) -> Self {
        let style = ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");

        let file_pb = ProgressBar::new(total_files);
        file_pb.set_style(style);
        Self { file_pb }
    }

    /// Show the file being copied and advance
    pub fn update_file(&self, file_path: &str) {
        // Truncate long paths for display
        let length = file_path.chars().count();
        let display_path = if length > 50 {
            let tail: String = file_path.chars().skip(length - 47).collect();
            format!("...{tail}")
        } else {
            file_path.to_string()
        };
        self.file_pb.set_message(display_path);
        self.file_pb.inc(1);
    }

    pub fn finish(&self) {
        self.file_pb.finish_and_clear();
    }

    /// Abandon on error
    pub fn abandon(&self) {
        self.file_pb.abandon();
    }
}
