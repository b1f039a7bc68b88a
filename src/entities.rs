use std::time::Instant;

use log::debug;
use rand::Rng;

use crate::constants::*;
use crate::rendering::GameGrid;
use crate::rules;
use crate::types::{Vector2D, random_velocity, wrap_position};

/// Screen-space "up"; ships spawn facing it.
pub const UP: Vector2D = Vector2D { x: 0.0, y: -1.0 };

// --- Shared motion and collision state ---
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub radius: f64,
}

impl Body {
    pub fn new(position: Vector2D, velocity: Vector2D, radius: f64) -> Self {
        Body { position, velocity, radius }
    }

    /// Circle test: centres closer than the sum of the radii.
    pub fn collides_with(&self, other: &Body) -> bool {
        self.position.distance_to(other.position) < self.radius + other.radius
    }

    fn drift_wrapped(&mut self, width: f64, height: f64) {
        self.position = wrap_position(self.position.add(self.velocity), width, height);
    }
}

// --- Ship ---
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShipTuning {
    pub maneuverability: f64,
    pub acceleration: f64,
    pub brake_force: f64,
    pub bullet_speed: f64,
    pub max_speed: f64,
    pub friction: f64,
}

impl Default for ShipTuning {
    fn default() -> Self {
        ShipTuning {
            maneuverability: SHIP_MANEUVERABILITY,
            acceleration: SHIP_ACCELERATION,
            brake_force: SHIP_BRAKE_FORCE,
            bullet_speed: SHIP_BULLET_SPEED,
            max_speed: SHIP_MAX_SPEED,
            friction: SPACE_FRICTION,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Thrust {
    Forward,
    Reverse,
    Brake,
    /// Ambient friction, applied every frame.
    Drift,
}

#[derive(Clone, Debug)]
pub struct Ship {
    pub body: Body,
    pub direction: Vector2D,
    pub tuning: ShipTuning,
}

impl Ship {
    pub fn new(position: Vector2D) -> Self {
        Ship {
            body: Body::new(position, Vector2D::default(), SHIP_RADIUS),
            direction: UP,
            tuning: ShipTuning::default(),
        }
    }

    pub fn rotate(&mut self, clockwise: bool) {
        let sign = if clockwise { 1.0 } else { -1.0 };
        self.direction = self.direction.rotate(self.tuning.maneuverability * sign);
    }

    /// Applies one tick of `mode`. Forward thrust returns an exhaust particle for the caller to own.
    pub fn accelerate(&mut self, mode: Thrust, rng: &mut impl Rng, now: Instant) -> Option<Dust> {
        let velocity = self.body.velocity;
        if velocity.component_sum() > self.tuning.max_speed {
            self.body.velocity = velocity.scale(self.tuning.friction);
            return None;
        }
        match mode {
            Thrust::Brake => self.body.velocity = velocity.scale(self.tuning.brake_force),
            Thrust::Reverse => {
                self.body.velocity = velocity.sub(self.direction.scale(self.tuning.acceleration / 3.0))
            }
            Thrust::Drift => self.body.velocity = velocity.scale(self.tuning.friction),
            Thrust::Forward => {
                self.body.velocity = velocity.add(self.direction.scale(self.tuning.acceleration));
                let v = self.body.velocity;
                let jittered = Vector2D::new(v.x + rng.gen_range(-1.0..1.0), v.y + rng.gen_range(-1.0..1.0));
                let exhaust = jittered.scale(-rng.gen_range(0.7..1.8));
                return Some(Dust::new(self.body.position, exhaust, THRUST_DUST_LIFETIME, rng, now));
            }
        }
        None
    }

    pub fn shoot(&self) -> Bullet {
        let velocity = self.direction.scale(self.tuning.bullet_speed).add(self.body.velocity);
        Bullet::new(self.body.position, velocity)
    }

    pub fn update(&mut self, width: f64, height: f64) {
        self.body.drift_wrapped(width, height);
    }

    pub fn draw(&self, game_grid: &mut GameGrid) {
        let nose = self.body.position.add(self.direction.scale(self.body.radius));
        game_grid.plot(self.body.position, Ship::heading_char(self.direction));
        game_grid.plot(nose, '*');
    }

    /// Glyph for the octant the ship is facing.
    pub fn heading_char(direction: Vector2D) -> char {
        let angle = direction.y.atan2(direction.x).to_degrees().rem_euclid(360.0);
        let octant = ((angle + 22.5) / 45.0).floor() as u8 % 8;
        match octant {
            0 => '>',
            1 => '\\',
            2 => 'v',
            3 => '/',
            4 => '<',
            5 => '\\',
            6 => '^',
            _ => '/',
        }
    }
}

// --- Asteroids ---
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AsteroidSize {
    Large,
    Medium,
    Small,
}

impl AsteroidSize {
    /// 3 for the largest rock, 1 for the smallest.
    pub fn number(self) -> u8 {
        match self {
            AsteroidSize::Large => 3,
            AsteroidSize::Medium => 2,
            AsteroidSize::Small => 1,
        }
    }

    pub fn smaller(self) -> Option<AsteroidSize> {
        match self {
            AsteroidSize::Large => Some(AsteroidSize::Medium),
            AsteroidSize::Medium => Some(AsteroidSize::Small),
            AsteroidSize::Small => None,
        }
    }

    fn sprite_scale(self) -> f64 {
        match self {
            AsteroidSize::Large => 1.1,
            AsteroidSize::Medium => 0.6,
            AsteroidSize::Small => 0.3,
        }
    }

    pub fn radius(self) -> f64 {
        ASTEROID_SPRITE_WIDTH * self.sprite_scale() / 2.0
    }

    fn display_char(self) -> char {
        match self {
            AsteroidSize::Large => '@',
            AsteroidSize::Medium => 'O',
            AsteroidSize::Small => 'o',
        }
    }
}

/// Everything left behind when an asteroid is shot.
#[derive(Debug, Default)]
pub struct Debris {
    pub asteroids: Vec<Asteroid>,
    pub dust: Vec<Dust>,
    pub gem: Option<Gem>,
}

#[derive(Clone, Debug)]
pub struct Asteroid {
    pub body: Body,
    pub size: AsteroidSize,
}

impl Asteroid {
    pub fn new(position: Vector2D, size: AsteroidSize, rng: &mut impl Rng) -> Self {
        let velocity = random_velocity(rng, ASTEROID_MIN_SPEED, ASTEROID_MAX_SPEED);
        Asteroid { body: Body::new(position, velocity, size.radius()), size }
    }

    pub fn split(&self, rng: &mut impl Rng, now: Instant) -> Debris {
        let n = self.size.number() as u32;
        let position = self.body.position;

        let dust = (0..rng.gen_range(30..=45) * n)
            .map(|_| {
                let velocity = random_velocity(rng, 2, 4).scale(n as f64);
                Dust::new(position, velocity, EXPLOSION_DUST_LIFETIME, rng, now)
            })
            .collect();

        let asteroids = match self.size.smaller() {
            Some(smaller) => (0..2).map(|_| Asteroid::new(position, smaller, rng)).collect(),
            None => Vec::new(),
        };

        let gem = rules::drops_gem(self.size, rng).then(|| Gem::new(position, self.size, rng));
        debug!("Asteroid split: {:?} -> {} fragments, gem: {}", self.size, asteroids.len(), gem.is_some());

        Debris { asteroids, dust, gem }
    }

    pub fn update(&mut self, width: f64, height: f64) {
        self.body.drift_wrapped(width, height);
    }

    pub fn draw(&self, game_grid: &mut GameGrid) {
        game_grid.fill_circle(self.body.position, self.body.radius, self.size.display_char());
    }
}

// --- Bullet ---
#[derive(Clone, Debug)]
pub struct Bullet {
    pub body: Body,
    pub friction: f64,
}

impl Bullet {
    pub fn new(position: Vector2D, velocity: Vector2D) -> Self {
        Bullet {
            body: Body::new(position, velocity, BULLET_RADIUS),
            friction: BULLET_FRICTION,
        }
    }

    /// Bullets never wrap; the owner culls them once they leave the screen.
    pub fn update(&mut self) {
        self.body.position = self.body.position.add(self.body.velocity);
        self.body.velocity = self.body.velocity.scale(self.friction);
    }

    pub fn is_on_screen(&self, width: f64, height: f64) -> bool {
        let p = self.body.position;
        (0.0..width).contains(&p.x) && (0.0..height).contains(&p.y)
    }

    pub fn draw(&self, game_grid: &mut GameGrid) {
        game_grid.plot(self.body.position, '*');
    }
}

// --- Dust ---
#[derive(Clone, Debug)]
pub struct Dust {
    pub body: Body,
    pub friction: f64,
    pub born: Instant,
    /// Seconds.
    pub lifetime: f64,
    pub size: f64,
    pub shrink: f64,
}

impl Dust {
    pub fn new(position: Vector2D, velocity: Vector2D, base_lifetime: f64, rng: &mut impl Rng, now: Instant) -> Self {
        let lifetime = base_lifetime + rng.gen_range(-1.0..1.0);
        Dust {
            body: Body::new(position, velocity, DUST_RADIUS),
            friction: DUST_FRICTION,
            born: now,
            lifetime,
            size: DUST_START_SIZE,
            shrink: lifetime / 6.0,
        }
    }

    /// Moves and shrinks the particle. Returns `false` once it has shrunk away or outlived its lifetime.
    pub fn update(&mut self, now: Instant) -> bool {
        self.size -= self.shrink;
        if self.size <= 0.0 {
            return false;
        }
        self.body.position = self.body.position.add(self.body.velocity.scale(self.friction));
        self.body.velocity = self.body.velocity.scale(self.friction);
        now.saturating_duration_since(self.born).as_secs_f64() <= self.lifetime
    }

    pub fn draw(&self, game_grid: &mut GameGrid) {
        let c = if self.size > DUST_START_SIZE * 2.0 / 3.0 {
            '*'
        } else if self.size > DUST_START_SIZE / 3.0 {
            '+'
        } else {
            '.'
        };
        game_grid.plot(self.body.position, c);
    }
}

// --- Gem ---
#[derive(Clone, Debug)]
pub struct Gem {
    pub body: Body,
    pub worth: u64,
}

impl Gem {
    pub fn new(position: Vector2D, size: AsteroidSize, rng: &mut impl Rng) -> Self {
        Gem {
            body: Body::new(position, Vector2D::default(), size.number() as f64 * 10.0),
            worth: rules::gem_worth(size, rng),
        }
    }

    pub fn update(&mut self, width: f64, height: f64) {
        self.body.drift_wrapped(width, height);
    }

    pub fn draw(&self, game_grid: &mut GameGrid) {
        game_grid.plot(self.body.position, '$');
    }
}

// --- Heart ---
#[derive(Clone, Debug)]
pub struct Heart {
    pub body: Body,
    pub anchor: Vector2D,
    bob_down: bool,
}

impl Heart {
    pub fn new(anchor: Vector2D) -> Self {
        Heart {
            body: Body::new(anchor, Vector2D::default(), HEART_RADIUS),
            anchor,
            bob_down: true,
        }
    }

    /// The row of life indicators in the top-left corner.
    pub fn row(lives: u32) -> Vec<Heart> {
        (1..=lives)
            .map(|n| Heart::new(Vector2D::new(n as f64 * 50.0 - 20.0, 30.0)))
            .collect()
    }

    pub fn update(&mut self, ticks: u64) {
        if ticks % HEART_BOB_PERIOD != 0 {
            return;
        }
        let offset = Vector2D::new(0.0, HEART_BOB_OFFSET);
        if self.bob_down {
            self.body.position = self.body.position.add(offset);
        } else {
            self.body.position = self.anchor.sub(offset);
        }
        self.bob_down = !self.bob_down;
    }

    pub fn draw(&self, game_grid: &mut GameGrid) {
        game_grid.plot(self.body.position, '♥');
    }
}

/// Borrowed view over every drawable variant.
#[derive(Clone, Copy, Debug)]
pub enum Sprite<'a> {
    Ship(&'a Ship),
    Asteroid(&'a Asteroid),
    Bullet(&'a Bullet),
    Dust(&'a Dust),
    Gem(&'a Gem),
    Heart(&'a Heart),
}

impl Sprite<'_> {
    pub fn draw(&self, game_grid: &mut GameGrid) {
        match self {
            Sprite::Ship(s) => s.draw(game_grid),
            Sprite::Asteroid(a) => a.draw(game_grid),
            Sprite::Bullet(b) => b.draw(game_grid),
            Sprite::Dust(d) => d.draw(game_grid),
            Sprite::Gem(g) => g.draw(game_grid),
            Sprite::Heart(h) => h.draw(game_grid),
        }
    }
}
