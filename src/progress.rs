use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Columns used by the bar itself.
pub const BAR_WIDTH: usize = 50;

/// Read size when draining subprocess output.
pub const CHUNK_SIZE: usize = 1024;

/// Fraction of the bar to fill, or `None` when there is no usable total
/// (chunked responses carry no Content-Length).
pub fn fill_fraction(bytes_read: u64, total: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some((bytes_read as f64 / total as f64).min(1.0))
}

/// Progress display fed by bytes of script output.
///
/// The total is the Content-Length of the script download, so the bar is only
/// a rough proxy: it compares output produced against source size. It never
/// decides whether an install succeeded.
#[derive(Clone)]
pub struct OutputProgress {
    bar: ProgressBar,
    total: Option<u64>,
    read: Arc<AtomicU64>,
}

impl OutputProgress {
    pub fn new(total: Option<u64>) -> Self {
        let total = total.filter(|t| *t > 0);
        let bar = match total {
            Some(len) => ProgressBar::new(len),
            None => ProgressBar::new_spinner(),
        };
        Self::with_bar(bar, total)
    }

    /// Same bookkeeping, nothing drawn.
    #[cfg(test)]
    pub fn hidden(total: Option<u64>) -> Self {
        Self::with_bar(ProgressBar::hidden(), total.filter(|t| *t > 0))
    }

    fn with_bar(bar: ProgressBar, total: Option<u64>) -> Self {
        match total {
            Some(len) => {
                bar.set_length(len);
                bar.set_style(
                    ProgressStyle::default_bar()
                        .template(&format!(
                            "[{{bar:{}.cyan/blue}}] {{percent:>3}}% {{msg}}",
                            BAR_WIDTH
                        ))
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("= "),
                );
            }
            None => {
                // Without a total we can only show that output is still arriving.
                bar.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner:.cyan} {bytes} of output {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                bar.enable_steady_tick(Duration::from_millis(120));
            }
        }
        Self {
            bar,
            total,
            read: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn is_determinate(&self) -> bool {
        self.total.is_some()
    }

    pub fn bytes_read(&self) -> u64 {
        self.read.load(Ordering::Relaxed)
    }

    /// Current fill fraction, `None` while indeterminate.
    pub fn fraction(&self) -> Option<f64> {
        self.total
            .and_then(|total| fill_fraction(self.bytes_read(), total))
    }

    /// Echoes a chunk of output to the terminal and advances the display.
    pub fn observe(&self, chunk: &[u8]) {
        self.bar.suspend(|| {
            let mut out = std::io::stdout().lock();
            let _ = out.write_all(chunk);
            let _ = out.flush();
        });

        let read = self.read.fetch_add(chunk.len() as u64, Ordering::Relaxed) + chunk.len() as u64;
        match self.total {
            Some(total) => self.bar.set_position(read.min(total)),
            None => self.bar.set_position(read),
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
        match self.fraction() {
            Some(f) => debug!("output progress ended at {:.1}%", f * 100.0),
            None => debug!("output progress ended after {} bytes", self.bytes_read()),
        }
    }
}
