use std::f64::consts::PI;

/// Sample-at-a-time IIR filter. `reset` must be called before feeding a
/// run of samples that is not contiguous with the previous one.
pub trait SignalFilter {
    fn filter(&mut self, input: f64) -> f64;
    fn reset(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FilterKind {
    Notch { freq_hz: f64 },
    Highpass { cutoff_hz: f64 },
    Lowpass { cutoff_hz: f64 },
    Bandpass { low_hz: f64, high_hz: f64 },
}

/// Single-pole exponential smoother.
#[derive(Clone, Copy, Debug)]
pub struct LowPassFilter {
    alpha: f64,
    previous_output: f64,
}

impl LowPassFilter {
    pub fn new(cutoff_hz: f64, sampling_time_secs: f64) -> Self {
        // A zero cutoff gives an infinite time constant, so the output stays at 0.
        let alpha = if cutoff_hz.is_nan() || cutoff_hz < 0.0 {
            1.0
        } else {
            let tau = time_constant(cutoff_hz);
            sampling_time_secs / (tau + sampling_time_secs)
        };
        Self {
            alpha,
            previous_output: 0.0,
        }
    }
}

impl SignalFilter for LowPassFilter {
    fn filter(&mut self, input: f64) -> f64 {
        self.previous_output += self.alpha * (input - self.previous_output);
        self.previous_output
    }

    fn reset(&mut self) {
        self.previous_output = 0.0;
    }
}

/// Complement of [`LowPassFilter`]: passes changes, bleeds off the DC level.
#[derive(Clone, Copy, Debug)]
pub struct HighPassFilter {
    alpha: f64,
    previous_input: f64,
    previous_output: f64,
}

impl HighPassFilter {
    pub fn new(cutoff_hz: f64, sampling_time_secs: f64) -> Self {
        let alpha = if cutoff_hz.is_nan() || cutoff_hz <= 0.0 {
            1.0
        } else {
            let tau = time_constant(cutoff_hz);
            tau / (tau + sampling_time_secs)
        };
        Self {
            alpha,
            previous_input: 0.0,
            previous_output: 0.0,
        }
    }
}

impl SignalFilter for HighPassFilter {
    fn filter(&mut self, input: f64) -> f64 {
        self.previous_output = self.alpha * (self.previous_output + input - self.previous_input);
        self.previous_input = input;
        self.previous_output
    }

    fn reset(&mut self) {
        self.previous_input = 0.0;
        self.previous_output = 0.0;
    }
}

/// High-pass at the lower edge followed by low-pass at the upper edge.
#[derive(Clone, Copy, Debug)]
pub struct BandPassFilter {
    highpass: HighPassFilter,
    lowpass: LowPassFilter,
}

impl BandPassFilter {
    pub fn new(low_hz: f64, high_hz: f64, sampling_time_secs: f64) -> Self {
        Self {
            highpass: HighPassFilter::new(low_hz, sampling_time_secs),
            lowpass: LowPassFilter::new(high_hz, sampling_time_secs),
        }
    }
}

impl SignalFilter for BandPassFilter {
    fn filter(&mut self, input: f64) -> f64 {
        self.lowpass.filter(self.highpass.filter(input))
    }

    fn reset(&mut self) {
        self.highpass.reset();
        self.lowpass.reset();
    }
}

#[derive(Clone, Copy, Debug)]
struct BiquadCoeffs {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

#[derive(Clone, Copy, Debug, Default)]
struct BiquadState {
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

/// Second-order notch for mains interference.
#[derive(Clone, Copy, Debug)]
pub struct NotchFilter {
    coeffs: BiquadCoeffs,
    state: BiquadState,
}

impl NotchFilter {
    pub fn new(notch_hz: f64, sampling_time_secs: f64) -> Self {
        // Above Nyquist the notch lands on the first alias instead.
        let notch_hz = if notch_hz * sampling_time_secs > 0.5 {
            1.0 / sampling_time_secs - notch_hz
        } else {
            notch_hz
        };
        let theta = 2.0 * PI * notch_hz * sampling_time_secs;
        let d = (-PI * sampling_time_secs).exp();
        let d2 = d * d;
        let b0 = (1.0 + d2) / 2.0;
        let coeffs = BiquadCoeffs {
            b0,
            b1: -2.0 * b0 * theta.cos(),
            b2: b0,
            a1: (1.0 + d2) * theta.cos(),
            a2: -d2,
        };
        Self {
            coeffs,
            state: BiquadState::default(),
        }
    }
}

impl SignalFilter for NotchFilter {
    fn filter(&mut self, input: f64) -> f64 {
        let c = &self.coeffs;
        let s = &mut self.state;
        // Direct form I
        let y = c.a1 * s.y1 + c.a2 * s.y2 + c.b0 * input + c.b1 * s.x1 + c.b2 * s.x2;
        s.x2 = s.x1;
        s.x1 = input;
        s.y2 = s.y1;
        s.y1 = y;
        y
    }

    fn reset(&mut self) {
        self.state = BiquadState::default();
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Filter {
    Notch(NotchFilter),
    Highpass(HighPassFilter),
    Lowpass(LowPassFilter),
    Bandpass(BandPassFilter),
}

impl Filter {
    pub fn design(kind: FilterKind, sampling_time_secs: f64) -> Self {
        match kind {
            FilterKind::Notch { freq_hz } => {
                Filter::Notch(NotchFilter::new(freq_hz, sampling_time_secs))
            }
            FilterKind::Highpass { cutoff_hz } => {
                Filter::Highpass(HighPassFilter::new(cutoff_hz, sampling_time_secs))
            }
            FilterKind::Lowpass { cutoff_hz } => {
                Filter::Lowpass(LowPassFilter::new(cutoff_hz, sampling_time_secs))
            }
            FilterKind::Bandpass { low_hz, high_hz } => {
                Filter::Bandpass(BandPassFilter::new(low_hz, high_hz, sampling_time_secs))
            }
        }
    }
}

impl SignalFilter for Filter {
    fn filter(&mut self, input: f64) -> f64 {
        match self {
            Filter::Notch(f) => f.filter(input),
            Filter::Highpass(f) => f.filter(input),
            Filter::Lowpass(f) => f.filter(input),
            Filter::Bandpass(f) => f.filter(input),
        }
    }

    fn reset(&mut self) {
        match self {
            Filter::Notch(f) => f.reset(),
            Filter::Highpass(f) => f.reset(),
            Filter::Lowpass(f) => f.reset(),
            Filter::Bandpass(f) => f.reset(),
        }
    }
}

/// Ordered list of filters applied in sequence to each sample.
#[derive(Default, Debug)]
pub struct FilterChain {
    stages: Vec<Filter>,
}

impl FilterChain {
    pub fn empty() -> Self {
        Self { stages: vec![] }
    }

    pub fn from_kinds(sampling_time_secs: f64, kinds: &[FilterKind]) -> Self {
        let stages = kinds
            .iter()
            .map(|kind| Filter::design(*kind, sampling_time_secs))
            .collect();
        Self { stages }
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn process_sample(&mut self, mut value: f64) -> f64 {
        for stage in &mut self.stages {
            value = stage.filter(value);
        }
        value
    }

    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }
}

fn time_constant(cutoff_hz: f64) -> f64 {
    1.0 / (2.0 * PI * cutoff_hz)
}
