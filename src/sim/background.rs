//! Slowly cross-fading background color

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Seconds between the starts of consecutive fades
pub const CYCLE_INTERVAL: f32 = 3.0;
/// Length of one cross-fade
pub const FADE_DURATION: f32 = 1.0;

const SATURATION: (f32, f32) = (0.25, 0.75);
const VALUE: (f32, f32) = (0.25, 0.60);

/// HSV (all components in [0, 1]) to linear RGB
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    let h = h.rem_euclid(1.0) * 6.0;
    let c = v * s;
    let x = c * (1.0 - ((h % 2.0) - 1.0).abs());
    let m = v - c;
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    [r + m, g + m, b + m]
}

/// Random hue, muted saturation and brightness
pub fn random_dark_color<R: Rng + ?Sized>(rng: &mut R) -> [f32; 3] {
    let h = rng.random::<f32>();
    let s = rng.random_range(SATURATION.0..SATURATION.1);
    let v = rng.random_range(VALUE.0..VALUE.1);
    hsv_to_rgb(h, s, v)
}

fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Background color cycler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackgroundCycler {
    pub enabled: bool,
    pub color: [f32; 3],
    from: [f32; 3],
    to: [f32; 3],
    /// Seconds into the current cycle
    timer: f32,
}

impl BackgroundCycler {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let color = random_dark_color(rng);
        Self {
            enabled: true,
            color,
            from: color,
            to: color,
            timer: 0.0,
        }
    }

    /// Advance by unscaled frame time
    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        if !self.enabled {
            return;
        }
        let wait = (CYCLE_INTERVAL - FADE_DURATION).max(0.0);
        let before = self.timer;
        self.timer += dt;

        if before < wait && self.timer >= wait {
            self.from = self.color;
            self.to = random_dark_color(rng);
        }
        if self.timer >= wait {
            let t = smoothstep((self.timer - wait) / FADE_DURATION);
            for i in 0..3 {
                self.color[i] = self.from[i] + (self.to[i] - self.from[i]) * t;
            }
        }
        if self.timer >= wait + FADE_DURATION {
            self.color = self.to;
            self.timer = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_hsv_primaries() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), [1.0, 0.0, 0.0]);
        let g = hsv_to_rgb(1.0 / 3.0, 1.0, 1.0);
        assert!(g[0].abs() < 1e-5 && (g[1] - 1.0).abs() < 1e-5 && g[2].abs() < 1e-5);
        assert_eq!(hsv_to_rgb(0.5, 0.0, 0.5), [0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_random_colors_stay_dark() {
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..200 {
            let c = random_dark_color(&mut rng);
            assert!(c.iter().all(|&ch| (0.0..=0.6).contains(&ch)));
        }
    }

    #[test]
    fn test_cycle_reaches_new_color() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut bg = BackgroundCycler::new(&mut rng);
        let start = bg.color;
        for _ in 0..(CYCLE_INTERVAL * 60.0) as usize + 1 {
            bg.update(1.0 / 60.0, &mut rng);
        }
        assert_ne!(bg.color, start);
    }

    #[test]
    fn test_disabled_holds_color() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut bg = BackgroundCycler::new(&mut rng);
        bg.enabled = false;
        let start = bg.color;
        bg.update(10.0, &mut rng);
        assert_eq!(bg.color, start);
    }
}
