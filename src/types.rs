use rand::Rng;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub fn new(x: f64, y: f64) -> Self {
        Vector2D { x, y }
    }

    pub fn scale(&self, scalar: f64) -> Self {
        Vector2D::new(self.x * scalar, self.y * scalar)
    }

    pub fn add(&self, other: Vector2D) -> Self {
        Vector2D::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(&self, other: Vector2D) -> Self {
        Vector2D::new(self.x - other.x, self.y - other.y)
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance_to(&self, other: Vector2D) -> f64 {
        self.sub(other).length()
    }

    /// Rotates by `degrees`. With y pointing down, positive angles turn clockwise on screen.
    pub fn rotate(&self, degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Vector2D::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Component sum. The ship's speed cap compares against this, not the length.
    pub fn component_sum(&self) -> f64 {
        self.x + self.y
    }
}

pub fn wrap_coordinate(value: f64, max: f64) -> f64 {
    let wrapped = value.rem_euclid(max);
    // rem_euclid can round up to `max` for tiny negative inputs
    if wrapped >= max { 0.0 } else { wrapped }
}

pub fn wrap_position(position: Vector2D, width: f64, height: f64) -> Vector2D {
    Vector2D::new(wrap_coordinate(position.x, width), wrap_coordinate(position.y, height))
}

/// A whole-unit position anywhere inside the screen rectangle.
pub fn random_position(rng: &mut impl Rng, width: f64, height: f64) -> Vector2D {
    Vector2D::new(
        rng.gen_range(0..width as u32) as f64,
        rng.gen_range(0..height as u32) as f64,
    )
}

/// Speed in tenths between `min_speed` and `max_speed` inclusive, heading in whole degrees.
pub fn random_velocity(rng: &mut impl Rng, min_speed: u32, max_speed: u32) -> Vector2D {
    let speed = rng.gen_range(min_speed * 10..=max_speed * 10) as f64 * 0.1;
    let angle = rng.gen_range(0..360) as f64;
    Vector2D::new(speed, 0.0).rotate(angle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn wrap_keeps_positions_on_screen() {
        let samples = [
            (-0.0, -0.0),
            (-1e-18, 5.0),
            (800.0, 600.0),
            (-801.5, 1250.25),
            (12345.6, -98765.4),
            (799.999, 599.999),
        ];
        for (x, y) in samples {
            let p = wrap_position(Vector2D::new(x, y), 800.0, 600.0);
            assert!((0.0..800.0).contains(&p.x), "x {} wrapped to {}", x, p.x);
            assert!((0.0..600.0).contains(&p.y), "y {} wrapped to {}", y, p.y);
        }
    }

    #[test]
    fn wrap_is_identity_inside_the_screen() {
        let p = wrap_position(Vector2D::new(10.5, 599.0), 800.0, 600.0);
        assert_eq!(p, Vector2D::new(10.5, 599.0));
        assert_eq!(wrap_coordinate(-10.0, 800.0), 790.0);
    }

    #[test]
    fn rotate_turns_clockwise_on_screen() {
        let up = Vector2D::new(0.0, -1.0);
        let right = up.rotate(90.0);
        assert!((right.x - 1.0).abs() < 1e-9);
        assert!(right.y.abs() < 1e-9);
    }

    #[test]
    fn random_velocity_respects_speed_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let v = random_velocity(&mut rng, 1, 2);
            assert!(v.length() >= 1.0 - 1e-9 && v.length() <= 2.0 + 1e-9);
        }
    }

    #[test]
    fn random_position_is_on_screen() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let p = random_position(&mut rng, 800.0, 600.0);
            assert!((0.0..800.0).contains(&p.x) && (0.0..600.0).contains(&p.y));
            assert_eq!(p.x.fract(), 0.0);
        }
    }
}
