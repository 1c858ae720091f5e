//! Colormaps for normalised expression values.

use foundation::Rgb8;

const GREEN: Rgb8 = Rgb8::new(0, 255, 0);
const MAGENTA: Rgb8 = Rgb8::new(255, 0, 255);

/// Blue -> white -> red over `[0, 1]`. NaN renders white.
pub fn coolwarm(v: f64) -> Rgb8 {
    if v.is_nan() {
        return Rgb8::WHITE;
    }
    if v < 0.5 {
        let c = channel((255.0 * v * 2.0).floor());
        Rgb8::new(c, c, 255)
    } else if v == 0.5 {
        Rgb8::WHITE
    } else {
        let c = channel((255.0 - 255.0 * (v - 0.5) * 2.0).floor());
        Rgb8::new(255, c, c)
    }
}

/// Two-gene blend: the second gene fades green to white, the first fades
/// magenta to white, and the two are averaged.
pub fn dual_gene(p1: f64, p2: f64) -> Rgb8 {
    let g = toward_white(GREEN, p2);
    let m = toward_white(MAGENTA, p1);
    Rgb8::new(
        channel(((g[0] + m[0]) / 2.0).round()),
        channel(((g[1] + m[1]) / 2.0).round()),
        channel(((g[2] + m[2]) / 2.0).round()),
    )
}

fn toward_white(color: Rgb8, t: f64) -> [f64; 3] {
    if t.is_nan() {
        return [255.0; 3];
    }
    let lerp = |c: u8| {
        let c = c as f64;
        (c + (255.0 - c) * t).round().clamp(0.0, 255.0)
    };
    [lerp(color.r), lerp(color.g), lerp(color.b)]
}

// `as` saturates, which also maps -inf to 0 and +inf to 255.
fn channel(v: f64) -> u8 {
    v as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn coolwarm_anchor_points() {
        assert_eq!(coolwarm(0.0), Rgb8::new(0, 0, 255));
        assert_eq!(coolwarm(0.5), Rgb8::WHITE);
        assert_eq!(coolwarm(1.0), Rgb8::new(255, 0, 0));
        assert_eq!(coolwarm(f64::NAN), Rgb8::WHITE);
    }

    #[test]
    fn coolwarm_floors_channels() {
        // 255 * 0.25 * 2 = 127.5
        assert_eq!(coolwarm(0.25), Rgb8::new(127, 127, 255));
        // 255 - 255 * 0.25 * 2 = 127.5
        assert_eq!(coolwarm(0.75), Rgb8::new(255, 127, 127));
    }

    #[test]
    fn coolwarm_below_zero_saturates_to_blue() {
        assert_eq!(coolwarm(-0.4), Rgb8::new(0, 0, 255));
    }

    #[test]
    fn dual_gene_extremes() {
        // No expression in either gene: average of green and magenta.
        assert_eq!(dual_gene(0.0, 0.0), Rgb8::new(128, 128, 128));
        assert_eq!(dual_gene(1.0, 1.0), Rgb8::WHITE);
        // Only the first gene saturated: magenta side is white.
        assert_eq!(dual_gene(1.0, 0.0), Rgb8::new(128, 255, 128));
        assert_eq!(dual_gene(0.0, 1.0), Rgb8::new(255, 128, 255));
    }

    #[test]
    fn dual_gene_rounds_each_step() {
        // green -> white at 0.5: (128, 255, 128); magenta at 0.25: (255, 64, 255)
        // averages: 191.5, 159.5, 191.5 -> rounded up.
        assert_eq!(dual_gene(0.25, 0.5), Rgb8::new(192, 160, 192));
    }

    #[test]
    fn dual_gene_nan_contributes_white() {
        assert_eq!(dual_gene(f64::NAN, 0.0), Rgb8::new(128, 255, 128));
    }
}
