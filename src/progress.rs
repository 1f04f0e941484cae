//! Terminal progress reporting for the walk and training phases.
use std::time::Duration;

use indicatif::{ProgressBar,ProgressDrawTarget,ProgressStyle};

pub struct CLProgressBar {
    pb: Option<ProgressBar>
}

impl CLProgressBar {
    pub fn new(work: u64, enabled: bool) -> Self {
        let pb = if enabled {
            let pb = ProgressBar::with_draw_target(Some(work), ProgressDrawTarget::stdout());
            let style = ProgressStyle::default_bar()
                .template("[{msg}] {wide_bar} ({per_sec}) {pos:>7}/{len:7} - Elapsed: {elapsed_precise}, Remaining: {eta_precise}")
                .expect("Shouldn't fail!");

            pb.set_style(style);

            // Update in separate thread
            pb.enable_steady_tick(Duration::from_millis(200));
            Some(pb)
        } else {
            None
        };

        CLProgressBar { pb }
    }

    pub fn update_message<F>(&self, update_message: F)
    where
        F: FnOnce() -> String
    {
        if let Some(pb) = &self.pb {
            pb.set_message(update_message());
        }
    }

    pub fn set_position(&self, pos: u64) {
        if let Some(pb) = &self.pb {
            pb.set_position(pos);
        }
    }

    pub fn inc(&self, amt: u64) {
        if let Some(pb) = &self.pb {
            pb.inc(amt);
        }
    }

    pub fn finish(&self) {
        if let Some(pb) = &self.pb {
            pb.finish();
        }
    }
}
