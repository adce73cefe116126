/// Rod tilt and deflection from a 3-axis acceleration vector, both in
/// degrees.
///
/// `theta` is the tilt in the x/y plane; the `ay == 0` limit keeps the
/// sign of `ax` (`+90` / `-90`, `0` for a zero vector). `phi` is the
/// deflection from the z axis; an all-zero vector yields `0` instead of
/// a NaN from `acos(0/0)`. Comparisons are exact: callers pass raw
/// parsed floats and no epsilon is applied at this layer.
pub fn estimate(ax: f64, ay: f64, az: f64) -> (f64, f64) {
    let theta = if ay != 0.0 {
        (ax / ay).atan().to_degrees()
    } else if ax > 0.0 {
        90.0
    } else if ax < 0.0 {
        -90.0
    } else {
        0.0
    };

    let scalar = (ax * ax + ay * ay + az * az).sqrt();
    let phi = if scalar != 0.0 {
        (az / scalar).acos().to_degrees()
    } else {
        0.0
    };

    (theta, phi)
}
