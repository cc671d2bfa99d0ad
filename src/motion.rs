// ionblade — Motion Sample & Magnitude Pair
//
// One raw six-axis MPU6050 reading per control cycle, reduced to the two
// scalars the gesture bands are compared against: total acceleration and
// total angular rate.

use crate::config::AXIS_SCALE_DIV;

// ---------------------------------------------------------------------------
// Raw sample (signed 16-bit, straight off the sensor registers)
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, Default)]
pub struct MotionSample {
    pub ax: i16,
    pub ay: i16,
    pub az: i16,
    pub gx: i16,
    pub gy: i16,
    pub gz: i16,
}

// ---------------------------------------------------------------------------
// Magnitude pair
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Magnitudes {
    /// Combined acceleration magnitude (scaled units).
    pub acc: u16,
    /// Combined angular-rate magnitude (scaled units).
    pub gyr: u16,
}

impl Magnitudes {
    /// Reduce a raw sample: scale each axis down, drop the sign, combine via
    /// the Euclidean norm. Recomputed from scratch every cycle.
    pub fn from_sample(sample: &MotionSample) -> Self {
        Self {
            acc: magnitude(sample.ax, sample.ay, sample.az),
            gyr: magnitude(sample.gx, sample.gy, sample.gz),
        }
    }
}

/// Scaled-axis Euclidean norm, rounded to the nearest integer.
///
/// The sum of squares is carried in i32: a full-scale axis is ±32768/100 =
/// ±327 after scaling, so the worst case of 3 · 327² stays well inside i32.
fn magnitude(x: i16, y: i16, z: i16) -> u16 {
    let (x, y, z) = (scale_axis(x), scale_axis(y), scale_axis(z));
    let sum_sq = x * x + y * y + z * z;
    f64::from(sum_sq).sqrt().round() as u16
}

fn scale_axis(v: i16) -> i32 {
    (i32::from(v) / AXIS_SCALE_DIV).abs()
}
