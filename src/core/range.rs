use super::types::Scale;

/// One bounded numeric domain, linear or logarithmic.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Domain {
    pub scale: Scale,
    pub min: f64,
    pub max: f64,
}

impl Domain {
    pub fn linear(min: f64, max: f64) -> Self {
        Self {
            scale: Scale::Linear,
            min,
            max,
        }
    }

    pub fn logarithmic(min: f64, max: f64) -> Self {
        Self {
            scale: Scale::Logarithmic,
            min,
            max,
        }
    }
}

// linear interpolation
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

// geometric interpolation
fn gerp(a: f64, b: f64, t: f64) -> f64 {
    a * (b / a).powf(t)
}

/// Maps `x` from the source domain into the target domain by its fractional
/// position `t` between the source bounds (after log-transforming logarithmic
/// sides). Logarithmic sources require strictly positive `min`, `max`, and
/// `x`; the result is unspecified otherwise.
///
/// No clamping happens here. When `x` lies outside the source bounds, `t`
/// falls outside `[0, 1]` and the result lies outside the target bounds,
/// which callers use to let logical values exceed a control's window.
pub fn transform_range(source: Domain, x: f64, target: Domain) -> f64 {
    let (min, max, x) = match source.scale {
        Scale::Linear => (source.min, source.max, x),
        Scale::Logarithmic => (source.min.ln(), source.max.ln(), x.ln()),
    };
    let t = (x - min) / (max - min);
    match target.scale {
        Scale::Linear => lerp(target.min, target.max, t),
        Scale::Logarithmic => gerp(target.min, target.max, t),
    }
}
