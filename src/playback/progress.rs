/// Playback position against the track length, both in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Progress {
    pub position: f64,
    pub duration: f64,
}

impl Progress {
    /// The duration, when the engine has reported a usable one.
    pub fn known_duration(&self) -> Option<f64> {
        (self.duration.is_finite() && self.duration > 0.0).then_some(self.duration)
    }

    pub fn percent(&self) -> f64 {
        match self.known_duration() {
            Some(duration) if self.position.is_finite() => {
                (self.position / duration * 100.0).clamp(0.0, 100.0)
            }
            _ => 0.0,
        }
    }

    /// Target time for a click or drag at `fraction` of the playbar width.
    pub fn seek_from_fraction(&self, fraction: f64) -> Option<f64> {
        let duration = self.known_duration()?;
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        Some(fraction * duration)
    }

    /// Target time for a skip of `delta` seconds. Without a known duration
    /// only backward skips have a bound to stop at.
    pub fn seek_relative(&self, delta: f64) -> Option<f64> {
        if !delta.is_finite() || !self.position.is_finite() {
            return None;
        }
        match self.known_duration() {
            Some(duration) => Some((self.position + delta).clamp(0.0, duration)),
            None if delta < 0.0 => Some((self.position + delta).max(0.0)),
            None => None,
        }
    }

    pub fn elapsed_label(&self) -> String {
        format_time(self.position)
    }

    pub fn duration_label(&self) -> String {
        format_time(self.duration)
    }

    /// Fixed-width text bar, e.g. `[#####-----]`.
    pub fn bar(&self, width: usize) -> String {
        let filled = ((self.percent() / 100.0) * width as f64).round() as usize;
        let filled = filled.min(width);
        format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
    }
}

pub fn format_time(secs: f64) -> String {
    if !secs.is_finite() || secs < 0.0 {
        return "0:00".to_string();
    }
    let mins = (secs / 60.0) as u64;
    let secs = (secs % 60.0) as u64;
    format!("{}:{:02}", mins, secs)
}
