use ms_audio::mel::hz_to_mel;

/// A tick mark: `frac` ∈ [0, 1] along the axis from its origin.
#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
    pub frac: f64,
    pub label: String,
}

const TIME_STEPS: [f64; 14] = [
    0.05, 0.1, 0.2, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 15.0, 30.0, 60.0, 120.0, 300.0,
];
const MAX_TIME_TICKS: f64 = 8.0;

/// Evenly stepped time ticks over `[0, duration]` seconds.
///
/// # Example
/// ```
/// use ms_render::axis::time_ticks;
/// let ticks = time_ticks(2.0);
/// let labels: Vec<_> = ticks.iter().map(|t| t.label.as_str()).collect();
/// assert_eq!(labels, ["0.00", "0.25", "0.50", "0.75", "1.00", "1.25", "1.50", "1.75", "2.00"]);
/// ```
#[must_use]
pub fn time_ticks(duration: f64) -> Vec<Tick> {
    if duration <= 0.0 || !duration.is_finite() {
        return vec![Tick {
            frac: 0.0,
            label: "0".into(),
        }];
    }
    let step = TIME_STEPS
        .iter()
        .copied()
        .find(|s| duration / s <= MAX_TIME_TICKS)
        .unwrap_or_else(|| (duration / MAX_TIME_TICKS / 60.0).ceil() * 60.0);

    let count = (duration / step + 1e-9).floor() as usize;
    (0..=count)
        .map(|k| {
            let t = k as f64 * step;
            Tick {
                frac: t / duration,
                label: format_time(t, step, duration),
            }
        })
        .collect()
}

fn format_time(t: f64, step: f64, duration: f64) -> String {
    if duration >= 60.0 && step >= 1.0 {
        let secs = t.round() as u64;
        return format!("{}:{:02}", secs / 60, secs % 60);
    }
    let decimals = if step.fract() == 0.0 {
        0
    } else if (step * 10.0).fract() == 0.0 {
        1
    } else {
        2
    };
    format!("{t:.decimals$}")
}

const MEL_TICK_HZ: [f64; 11] = [
    0.0, 64.0, 128.0, 256.0, 512.0, 1024.0, 2048.0, 4096.0, 8192.0, 16384.0, 32768.0,
];

/// Octave-spaced Hz ticks placed on a mel-warped axis spanning `[fmin, fmax]`.
///
/// # Example
/// ```
/// use ms_render::axis::mel_ticks;
/// let ticks = mel_ticks(0.0, 11025.0);
/// assert_eq!(ticks.first().map(|t| t.label.as_str()), Some("0"));
/// assert_eq!(ticks.last().map(|t| t.label.as_str()), Some("8192"));
/// ```
#[must_use]
pub fn mel_ticks(fmin: f32, fmax: f32) -> Vec<Tick> {
    let (fmin, fmax) = (f64::from(fmin), f64::from(fmax));
    let lo = hz_to_mel(fmin);
    let span = hz_to_mel(fmax) - lo;
    if span <= 0.0 {
        return Vec::new();
    }
    MEL_TICK_HZ
        .iter()
        .filter(|&&hz| hz >= fmin && hz <= fmax)
        .map(|&hz| Tick {
            frac: (hz_to_mel(hz) - lo) / span,
            label: format!("{hz:.0}"),
        })
        .collect()
}

const DB_STEPS: [f64; 6] = [1.0, 2.0, 5.0, 10.0, 20.0, 40.0];

/// Colorbar ticks over `[vmin, vmax]`, labelled like `%+2.0f dB`.
///
/// # Example
/// ```
/// use ms_render::axis::db_ticks;
/// let ticks = db_ticks(-80.0, 0.0);
/// assert_eq!(ticks.len(), 9);
/// assert_eq!(ticks[0].label, "-80 dB");
/// assert_eq!(ticks[8].label, "+0 dB");
/// ```
#[must_use]
pub fn db_ticks(vmin: f64, vmax: f64) -> Vec<Tick> {
    let range = vmax - vmin;
    if range <= 0.0 || !range.is_finite() {
        return vec![Tick {
            frac: 0.5,
            label: format_db(vmax),
        }];
    }
    let step = DB_STEPS
        .iter()
        .copied()
        .find(|s| range / s <= 9.0)
        .unwrap_or(range / 8.0);
    let first = (vmin / step).ceil() as i64;
    let last = (vmax / step).floor() as i64;
    (first..=last)
        .map(|k| {
            let v = k as f64 * step;
            Tick {
                frac: (v - vmin) / range,
                label: format_db(v),
            }
        })
        .collect()
}

/// `%+2.0f dB`.
#[must_use]
pub fn format_db(v: f64) -> String {
    let v = v.round();
    // avoid "-0 dB"
    let v = if v == 0.0 { 0.0 } else { v };
    format!("{v:+.0} dB")
}

/// Drop ticks closer than `min_gap` pixels to the previously kept one.
#[must_use]
pub fn thin_ticks(ticks: Vec<Tick>, axis_len: u32, min_gap: u32) -> Vec<Tick> {
    let mut kept: Vec<Tick> = Vec::with_capacity(ticks.len());
    for tick in ticks {
        let px = tick.frac * f64::from(axis_len);
        if kept
            .last()
            .is_none_or(|prev| px - prev.frac * f64::from(axis_len) >= f64::from(min_gap))
        {
            kept.push(tick);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_durations_use_minutes() {
        let ticks = time_ticks(600.0);
        assert_eq!(ticks[1].label, "2:00");
        assert!(ticks.len() <= 9);
        assert!(ticks.iter().all(|t| (0.0..=1.0).contains(&t.frac)));
    }

    #[test]
    fn mel_ticks_are_increasing_and_within_axis() {
        let ticks = mel_ticks(0.0, 22050.0);
        assert!(ticks.windows(2).all(|w| w[1].frac > w[0].frac));
        assert!(ticks.iter().all(|t| (0.0..=1.0).contains(&t.frac)));
        assert_eq!(ticks.last().map(|t| t.label.as_str()), Some("16384"));
    }

    #[test]
    fn flat_range_yields_single_db_tick() {
        let ticks = db_ticks(0.0, 0.0);
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks[0].label, "+0 dB");
    }

    #[test]
    fn thinning_keeps_first_and_spaced_ticks() {
        let ticks = mel_ticks(0.0, 11025.0);
        let thinned = thin_ticks(ticks, 900, 40);
        assert_eq!(thinned[0].label, "0");
        assert!(!thinned.iter().any(|t| t.label == "64"));
        assert!(thinned.iter().any(|t| t.label == "8192"));
    }
}
