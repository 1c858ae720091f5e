//! Scalar interpolation and easing curves.
//!
//! `clamp` and `mix` follow the GLSL builtins of the same name so the
//! point-size math matches the vertex shader.

#[inline]
pub fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi)
}

/// Linear blend: `a` at `t = 0`, `b` at `t = 1`.
#[inline]
pub fn mix(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

/// `1 - (1 - t)^3`; fast start, slow finish.
#[inline]
pub fn cubic_ease_out(t: f64) -> f64 {
    let u = 1.0 - t;
    1.0 - u * u * u
}

/// `t^2`; slow start, fast finish.
#[inline]
pub fn quadratic_ease_in(t: f64) -> f64 {
    t * t
}

#[cfg(test)]
mod tests {
    use super::{clamp, cubic_ease_out, mix, quadratic_ease_in};

    #[test]
    fn mix_endpoints() {
        assert_eq!(mix(1.0, 2.0, 0.0), 1.0);
        assert_eq!(mix(1.0, 2.0, 1.0), 2.0);
        assert_eq!(mix(1.0, 2.0, 0.5), 1.5);
    }

    #[test]
    fn easing_curves_hit_endpoints() {
        assert_eq!(cubic_ease_out(0.0), 0.0);
        assert_eq!(cubic_ease_out(1.0), 1.0);
        assert_eq!(cubic_ease_out(0.5), 0.875);
        assert_eq!(quadratic_ease_in(0.5), 0.25);
    }

    #[test]
    fn clamp_bounds() {
        assert_eq!(clamp(5.0, 0.0, 1.0), 1.0);
        assert_eq!(clamp(-5.0, 0.0, 1.0), 0.0);
    }
}
