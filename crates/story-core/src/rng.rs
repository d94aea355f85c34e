//! Seeded randomness for the generated datasets.
//!
//! Everything here is integer arithmetic on a 32-bit state until the final
//! conversion to `f64`, so a seed produces the same stream on every platform.

use std::f64::consts::PI;

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;
const MULBERRY_INCREMENT: u32 = 0x6D2B_79F5;

/// Mulberry32 stream over a single `u32` state.
#[derive(Clone, Debug)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        // mulberry32
        self.state = self.state.wrapping_add(MULBERRY_INCREMENT);
        let s = self.state;
        let mut t = (s ^ (s >> 15)).wrapping_mul(1 | s);
        t = t.wrapping_add((t ^ (t >> 7)).wrapping_mul(61 | t)) ^ t;
        t ^ (t >> 14)
    }

    /// Uniform draw in [0, 1). Division by 2^32 is exact in `f64`.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u32() as f64) / 4_294_967_296.0
    }

    /// One standard normal variate from two uniform draws.
    ///
    /// Only the cosine branch of Box–Muller is used; the sine partner is
    /// discarded, so every call consumes exactly two draws.
    pub fn next_normal(&mut self) -> f64 {
        let u1 = self.next_f64().max(f64::from_bits(1));
        let u2 = self.next_f64();
        let r = (-2.0 * u1.ln()).sqrt();
        let theta = 2.0 * PI * u2;
        r * theta.cos()
    }

    /// Uniform draw scaled into `[lo, lo + span)`.
    pub fn next_in(&mut self, lo: f64, span: f64) -> f64 {
        lo + self.next_f64() * span
    }
}

/// FNV-1a over the UTF-16 code units of `text`.
///
/// For ASCII input this is the plain byte-wise FNV-1a hash.
pub fn hash_seed(text: &str) -> u32 {
    text.encode_utf16().fold(FNV_OFFSET_BASIS, |h, unit| {
        (h ^ unit as u32).wrapping_mul(FNV_PRIME)
    })
}

/// Seed for a scatter step: `"{title}|{correlation}"`.
pub fn scatter_seed(title: &str, correlation: f64) -> u32 {
    hash_seed(&format!("{}|{}", title, correlation_key(correlation)))
}

/// Seed for a bubble step: the title alone.
pub fn bubble_seed(title: &str) -> u32 {
    hash_seed(title)
}

// Number-to-string as a browser prints it: shortest round-trip digits,
// exponent form below 1e-6 and from 1e21 up, negative zero as "0".
fn correlation_key(correlation: f64) -> String {
    if correlation == 0.0 {
        return "0".to_string();
    }
    if correlation.is_nan() {
        return "NaN".to_string();
    }
    if correlation.is_infinite() {
        return if correlation > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let magnitude = correlation.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return format!("{}", correlation);
    }
    let exp = format!("{:e}", correlation);
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
        _ => exp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mulberry_matches_reference_stream() {
        let mut rng = Mulberry32::new(42);
        assert_eq!(rng.next_f64(), 0.6011037519201636);
        assert_eq!(rng.next_f64(), 0.44829055899754167);
        assert_eq!(rng.next_f64(), 0.8524657934904099);
    }

    #[test]
    fn zero_seed_is_a_valid_stream() {
        let mut rng = Mulberry32::new(0);
        assert_eq!(rng.next_f64(), 0.26642920868471265);
        assert_eq!(rng.next_f64(), 0.0003297457005828619);
    }

    #[test]
    fn hash_seed_regression_literals() {
        assert_eq!(hash_seed("The Reality: Poverty Matters|-0.55"), 3_153_053_522);
        assert_eq!(hash_seed("Opportunity Bargains Exist"), 1_516_200_090);
        assert_eq!(hash_seed(""), FNV_OFFSET_BASIS);
        assert_eq!(hash_seed("a"), 3_826_002_220);
    }

    #[test]
    fn scatter_seed_formats_correlation_like_the_title_key() {
        assert_eq!(
            scatter_seed("The Reality: Poverty Matters", -0.55),
            hash_seed("The Reality: Poverty Matters|-0.55")
        );
        assert_eq!(scatter_seed("x", 0.0), hash_seed("x|0"));
        assert_eq!(scatter_seed("x", -0.0), hash_seed("x|0"));
        assert_eq!(scatter_seed("x", 0.5), hash_seed("x|0.5"));
        assert_eq!(scatter_seed("x", 1.0), hash_seed("x|1"));
    }

    #[test]
    fn tiny_and_huge_correlations_use_exponent_keys() {
        assert_eq!(scatter_seed("t", 1e-7), 306_688_807);
        assert_eq!(scatter_seed("t", 1e-7), hash_seed("t|1e-7"));
        assert_eq!(correlation_key(1e-7), "1e-7");
        assert_eq!(correlation_key(-2.5e-8), "-2.5e-8");
        assert_eq!(correlation_key(1e-6), "0.000001");
        assert_eq!(correlation_key(0.05), "0.05");
        assert_eq!(correlation_key(1e21), "1e+21");
        assert_eq!(correlation_key(f64::NAN), "NaN");
        assert_eq!(correlation_key(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn normal_draw_consumes_two_uniforms() {
        let mut a = Mulberry32::new(7);
        let mut b = Mulberry32::new(7);
        a.next_normal();
        b.next_u32();
        b.next_u32();
        assert_eq!(a.next_u32(), b.next_u32());
    }

    #[test]
    fn normal_draws_are_roughly_standard() {
        let mut rng = Mulberry32::new(2024);
        let n = 20_000;
        let draws: Vec<f64> = (0..n).map(|_| rng.next_normal()).collect();
        let mean = draws.iter().sum::<f64>() / n as f64;
        let var = draws.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.05, "mean {mean}");
        assert!((var - 1.0).abs() < 0.05, "var {var}");
    }
}
