use chrono::{Datelike, Duration, NaiveDate, Weekday};

const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

pub const DEFAULT_TICK_COUNT: usize = 10;

/// Continuous numeric scale: maps `domain` linearly onto `range`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d0 == d1 {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    /// Extend the domain outward to round tick boundaries
    pub fn nice(mut self, count: usize) -> Self {
        let (mut start, mut stop) = self.domain;
        let reversed = stop < start;
        if reversed {
            std::mem::swap(&mut start, &mut stop);
        }
        if start == stop || !start.is_finite() || !stop.is_finite() {
            return self;
        }

        let mut prestep = None;
        for _ in 0..10 {
            let step = tick_increment(start, stop, count);
            if prestep == Some(step) {
                break;
            }
            if step > 0.0 {
                start = (start / step).floor() * step;
                stop = (stop / step).ceil() * step;
            } else if step < 0.0 {
                start = (start * step).ceil() / step;
                stop = (stop * step).floor() / step;
            } else {
                break;
            }
            prestep = Some(step);
        }

        self.domain = if reversed { (stop, start) } else { (start, stop) };
        self
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        ticks(self.domain.0, self.domain.1, count)
    }

    /// Labels for `ticks(count)`, formatted at the precision of the tick step
    pub fn tick_labels(&self, count: usize) -> Vec<(f64, String)> {
        let (start, stop) = self.domain;
        let step = tick_step(start.min(stop), start.max(stop), count);
        let decimals = if step > 0.0 && step < 1.0 {
            (-step.log10().floor()).max(0.0) as usize
        } else {
            0
        };
        self.ticks(count)
            .into_iter()
            .map(|v| (v, format_number(v, decimals)))
            .collect()
    }
}

/// Signed tick increment: positive values are the step itself, negative
/// values are the reciprocal of a fractional step.
pub fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    let step = (stop - start) / count.max(1) as f64;
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };
    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -(10f64.powf(-power)) / factor
    }
}

fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    if start == stop {
        return 0.0;
    }
    let inc = tick_increment(start, stop, count);
    if inc < 0.0 {
        -1.0 / inc
    } else {
        inc
    }
}

/// Evenly spaced round values within `[start, stop]`
pub fn ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if start == stop && count > 0 {
        return vec![start];
    }
    let reversed = stop < start;
    let (lo, hi) = if reversed { (stop, start) } else { (start, stop) };

    let step = tick_increment(lo, hi, count);
    if step == 0.0 || !step.is_finite() {
        return Vec::new();
    }

    let mut out = Vec::new();
    if step > 0.0 {
        let mut r0 = (lo / step).round();
        let mut r1 = (hi / step).round();
        if r0 * step < lo {
            r0 += 1.0;
        }
        if r1 * step > hi {
            r1 -= 1.0;
        }
        let mut r = r0;
        while r <= r1 {
            out.push(r * step);
            r += 1.0;
        }
    } else {
        let inv = -step;
        let mut r0 = (lo * inv).round();
        let mut r1 = (hi * inv).round();
        if r0 / inv < lo {
            r0 += 1.0;
        }
        if r1 / inv > hi {
            r1 -= 1.0;
        }
        let mut r = r0;
        while r <= r1 {
            out.push(r / inv);
            r += 1.0;
        }
    }

    if reversed {
        out.reverse();
    }
    out
}

/// Format with thousands separators, e.g. `1,250` or `0.25`
pub fn format_number(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (formatted.clone(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let negative = value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(f) = frac_part {
        out.push('.');
        out.push_str(&f);
    }
    out
}

/// Discrete scale that divides a continuous range into uniform bands
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    pub domain: Vec<String>,
    pub range: (f64, f64),
    pub padding_inner: f64,
    pub padding_outer: f64,
    pub align: f64,
}

impl BandScale {
    pub fn new(domain: Vec<String>, range: (f64, f64)) -> Self {
        Self {
            domain,
            range,
            padding_inner: 0.0,
            padding_outer: 0.0,
            align: 0.5,
        }
    }

    /// Set inner and outer padding together
    pub fn padding(mut self, padding: f64) -> Self {
        let p = padding.clamp(0.0, 1.0);
        self.padding_inner = p;
        self.padding_outer = p;
        self
    }

    pub fn step(&self) -> f64 {
        let n = self.domain.len() as f64;
        let (r0, r1) = self.range;
        (r1 - r0) / (n - self.padding_inner + self.padding_outer * 2.0).max(1.0)
    }

    pub fn bandwidth(&self) -> f64 {
        self.step() * (1.0 - self.padding_inner)
    }

    fn start(&self) -> f64 {
        let n = self.domain.len() as f64;
        let (r0, r1) = self.range;
        r0 + (r1 - r0 - self.step() * (n - self.padding_inner)) * self.align
    }

    /// Left edge of the band for `key`
    pub fn position(&self, key: &str) -> Option<f64> {
        let idx = self.domain.iter().position(|d| d == key)?;
        Some(self.start() + self.step() * idx as f64)
    }

    /// Centre of each band, paired with its label
    pub fn tick_positions(&self) -> Vec<(f64, String)> {
        let half = self.bandwidth() / 2.0;
        self.domain
            .iter()
            .filter_map(|d| self.position(d).map(|p| (p + half, d.clone())))
            .collect()
    }
}

/// Calendar-date scale backed by a linear mapping of day numbers
#[derive(Debug, Clone, PartialEq)]
pub struct TimeScale {
    pub domain: (NaiveDate, NaiveDate),
    pub range: (f64, f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeInterval {
    Days(u32),
    Week,
    Months(u32),
    Years(i32),
}

impl TimeInterval {
    fn approx_days(self) -> f64 {
        match self {
            TimeInterval::Days(k) => k as f64,
            TimeInterval::Week => 7.0,
            TimeInterval::Months(k) => 30.0 * k as f64,
            TimeInterval::Years(k) => 365.0 * k as f64,
        }
    }

    fn contains(self, date: NaiveDate) -> bool {
        match self {
            TimeInterval::Days(k) => (date.day() - 1) % k == 0,
            TimeInterval::Week => date.weekday() == Weekday::Sun,
            TimeInterval::Months(k) => date.day() == 1 && date.month0() % k == 0,
            TimeInterval::Years(k) => date.ordinal() == 1 && date.year().rem_euclid(k) == 0,
        }
    }
}

const TIME_INTERVALS: [TimeInterval; 6] = [
    TimeInterval::Days(1),
    TimeInterval::Days(2),
    TimeInterval::Week,
    TimeInterval::Months(1),
    TimeInterval::Months(3),
    TimeInterval::Years(1),
];

impl TimeScale {
    pub fn new(domain: (NaiveDate, NaiveDate), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    fn linear(&self) -> LinearScale {
        LinearScale::new(
            (day_number(self.domain.0), day_number(self.domain.1)),
            self.range,
        )
    }

    pub fn apply(&self, date: NaiveDate) -> f64 {
        self.linear().apply(day_number(date))
    }

    /// Calendar-aligned tick dates within the domain
    pub fn ticks(&self, count: usize) -> Vec<NaiveDate> {
        let (lo, hi) = if self.domain.0 <= self.domain.1 {
            self.domain
        } else {
            (self.domain.1, self.domain.0)
        };
        let span = (hi - lo).num_days() as f64;
        if span == 0.0 {
            return vec![lo];
        }

        let target = span / count.max(1) as f64;
        let interval = TIME_INTERVALS
            .iter()
            .copied()
            .find(|i| i.approx_days() >= target)
            .unwrap_or_else(|| TimeInterval::Years(year_step(lo, hi, count)));

        let mut out = Vec::new();
        let mut day = lo;
        while day <= hi {
            if interval.contains(day) {
                out.push(day);
            }
            day += Duration::days(1);
        }
        out
    }

    pub fn tick_labels(&self, count: usize) -> Vec<(f64, String)> {
        self.ticks(count)
            .into_iter()
            .map(|d| (self.apply(d), format_date_tick(d)))
            .collect()
    }
}

/// Multi-year tick step, a round number of years
fn year_step(lo: NaiveDate, hi: NaiveDate, count: usize) -> i32 {
    let step = tick_increment(lo.year() as f64, hi.year() as f64, count);
    if step >= 1.0 {
        step as i32
    } else {
        1
    }
}

fn day_number(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// Multi-scale date label: year on Jan 1, month name on the 1st,
/// `Mar 03` on Sundays, `Tue 05` otherwise
pub fn format_date_tick(date: NaiveDate) -> String {
    let fmt = if date.day() == 1 {
        if date.month() == 1 {
            "%Y"
        } else {
            "%B"
        }
    } else if date.weekday() == Weekday::Sun {
        "%b %d"
    } else {
        "%a %d"
    };
    date.format(fmt).to_string()
}

/// Maps categories to output values, cycling through `range`
#[derive(Debug, Clone, PartialEq)]
pub struct OrdinalScale<T> {
    pub domain: Vec<String>,
    pub range: Vec<T>,
}

impl<T> OrdinalScale<T> {
    pub fn new(domain: Vec<String>, range: Vec<T>) -> Self {
        Self { domain, range }
    }

    pub fn apply(&self, key: &str) -> Option<&T> {
        if self.range.is_empty() {
            return None;
        }
        let idx = self.domain.iter().position(|d| d == key)?;
        self.range.get(idx % self.range.len())
    }
}
