use std::io::Write;
use std::sync::Arc;

use crate::board::ProgressBoard;

/// Rounds a raw completion percentage up to the next multiple of ten, capped at 100.
pub fn quantize(percent: f64) -> u8 {
    let step = (percent / 10.0).ceil() * 10.0;
    if step.is_nan() || step <= 0.0 {
        0
    } else if step >= 100.0 {
        100
    } else {
        step as u8
    }
}

/// Per-transfer byte counter that reports into one line of the board.
///
/// Only quantized step changes reach the board, so a transfer triggers at most
/// eleven redraws no matter how many chunks it receives.
pub struct TransferMonitor<W: Write + Send> {
    index: usize,
    filename: String,
    total_size: Option<u64>,
    received: u64,
    last_percent: Option<u8>,
    board: Arc<ProgressBoard<W>>,
}

impl<W: Write + Send> TransferMonitor<W> {
    pub fn new(
        index: usize,
        filename: String,
        total_size: Option<u64>,
        board: Arc<ProgressBoard<W>>,
    ) -> Self {
        Self {
            index,
            filename,
            // A declared length of zero carries no information.
            total_size: total_size.filter(|size| *size > 0),
            received: 0,
            last_percent: None,
            board,
        }
    }

    pub fn observe(&mut self, chunk: &[u8]) {
        self.received += chunk.len() as u64;

        match self.total_size {
            Some(total) => {
                let raw = self.received.saturating_mul(100) as f64 / total as f64;
                self.report(quantize(raw));
            }
            None => {
                if self.last_percent.is_none() && self.received > 0 {
                    self.last_percent = Some(0);
                    self.board.set_line(
                        self.index,
                        format!("Downloading {}... size unknown", self.filename),
                    );
                }
            }
        }
    }

    /// Called once the stream has been fully copied.
    pub fn finish(&mut self) {
        if self.total_size.is_none() {
            self.report(100);
        }
    }

    #[cfg(test)]
    pub fn last_percent(&self) -> Option<u8> {
        self.last_percent
    }

    fn report(&mut self, percent: u8) {
        if self.last_percent == Some(percent) {
            return;
        }
        self.last_percent = Some(percent);
        self.board.set_line(
            self.index,
            format!("Downloading {}... {}% complete", self.filename, percent),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tests::{parse_frames, RecordingSink};

    fn monitor(total: Option<u64>) -> (TransferMonitor<RecordingSink>, RecordingSink) {
        let sink = RecordingSink::default();
        let board = Arc::new(ProgressBoard::new(sink.clone()));
        board.initialize(1);
        (TransferMonitor::new(0, "a.bin".to_string(), total, board), sink)
    }

    #[test]
    fn test_quantize_table() {
        assert_eq!(quantize(0.0), 0);
        assert_eq!(quantize(0.1), 10);
        assert_eq!(quantize(10.0), 10);
        assert_eq!(quantize(25.0), 30);
        assert_eq!(quantize(50.0), 50);
        assert_eq!(quantize(75.0), 80);
        assert_eq!(quantize(99.9), 100);
        assert_eq!(quantize(100.0), 100);
        assert_eq!(quantize(150.0), 100);
    }

    #[test]
    fn test_quantize_matches_ceiling_formula() {
        for tenths in 0..=1000 {
            let r = tenths as f64 / 10.0;
            let expected = ((r / 10.0).ceil() * 10.0).min(100.0) as u8;
            let q = quantize(r);
            assert_eq!(q, expected, "ratio {}", r);
            assert_eq!(q % 10, 0);
        }
    }

    #[test]
    fn test_quantize_degenerate_input() {
        assert_eq!(quantize(f64::NAN), 0);
        assert_eq!(quantize(-5.0), 0);
        assert_eq!(quantize(f64::INFINITY), 100);
    }

    #[test]
    fn test_monitor_reports_only_step_changes() {
        let (mut monitor, sink) = monitor(Some(1000));
        for _ in 0..100 {
            monitor.observe(&[0u8; 10]);
        }

        let frames = parse_frames(&sink.output(), 1);
        let reported: Vec<String> = frames.iter().map(|f| f[0].clone()).collect();
        let expected: Vec<String> = (1..=10)
            .map(|step| format!("Downloading a.bin... {}% complete", step * 10))
            .collect();
        assert_eq!(reported, expected);
        assert_eq!(monitor.last_percent(), Some(100));
    }

    #[test]
    fn test_monitor_no_consecutive_duplicates_with_uneven_chunks() {
        let (mut monitor, sink) = monitor(Some(997));
        for size in [1usize, 3, 50, 7, 200, 1, 1, 300, 434] {
            monitor.observe(&vec![0u8; size]);
        }

        let frames = parse_frames(&sink.output(), 1);
        let percents: Vec<u8> = frames
            .iter()
            .map(|f| percent_of(&f[0]))
            .collect();
        assert!(percents.windows(2).all(|w| w[0] < w[1]), "{:?}", percents);
        assert_eq!(percents.last(), Some(&100));
    }

    #[test]
    fn test_monitor_exact_tenths_do_not_overshoot() {
        let (mut monitor, _sink) = monitor(Some(10));
        monitor.observe(&[0u8; 3]);
        assert_eq!(monitor.last_percent(), Some(30));
    }

    #[test]
    fn test_monitor_overrun_caps_at_100() {
        let (mut monitor, sink) = monitor(Some(100));
        monitor.observe(&[0u8; 100]);
        monitor.observe(&[0u8; 50]);
        assert_eq!(monitor.last_percent(), Some(100));
        assert_eq!(parse_frames(&sink.output(), 1).len(), 1);
    }

    #[test]
    fn test_monitor_unknown_size_shows_marker_then_completes() {
        let (mut monitor, sink) = monitor(None);
        monitor.observe(&[0u8; 64]);
        monitor.observe(&[0u8; 64]);
        monitor.finish();

        let frames = parse_frames(&sink.output(), 1);
        assert_eq!(
            frames,
            vec![
                vec!["Downloading a.bin... size unknown".to_string()],
                vec!["Downloading a.bin... 100% complete".to_string()],
            ]
        );
    }

    #[test]
    fn test_monitor_zero_declared_size_is_unknown() {
        let (mut monitor, _sink) = monitor(Some(0));
        monitor.observe(&[0u8; 8]);
        assert_eq!(monitor.last_percent(), Some(0));
        monitor.finish();
        assert_eq!(monitor.last_percent(), Some(100));
    }

    fn percent_of(line: &str) -> u8 {
        line.rsplit("... ")
            .next()
            .and_then(|rest| rest.strip_suffix("% complete"))
            .and_then(|n| n.parse().ok())
            .unwrap_or_else(|| panic!("not a progress line: {}", line))
    }
}
