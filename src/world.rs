//! Wave and life bookkeeping. `World` owns every entity collection, the score,
//! the lives and the tick counter; the game loop only drives it.

use std::mem;
use std::time::Instant;

use log::{debug, info};
use rand::rngs::StdRng;

use crate::audio::Cue;
use crate::constants::*;
use crate::entities::{Asteroid, AsteroidSize, Bullet, Dust, Gem, Heart, Ship, Sprite, Thrust};
use crate::rules;
use crate::types::{Vector2D, random_position};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Asteroids remain and the ship is alive.
    Active,
    /// Field is empty; counting down to the next wave.
    Cleared { remaining: u32 },
    /// Out of lives.
    Dead,
}

/// What the loop has to do once a frame is finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    None,
    WaveReady,
    GameOver,
}

/// Ship orders coming from the input layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    RotateClockwise,
    RotateCounterClockwise,
    Thrust,
    Reverse,
    Brake,
    Shoot,
}

pub struct World {
    pub width: f64,
    pub height: f64,
    pub rng: StdRng,
    pub ship: Option<Ship>,
    pub asteroids: Vec<Asteroid>,
    pub bullets: Vec<Bullet>,
    pub dust: Vec<Dust>,
    pub gems: Vec<Gem>,
    pub hearts: Vec<Heart>,
    pub score: u64,
    pub lives: u32,
    pub wave: u32,
    pub ticks: u64,
    pub invulnerable: bool,
    pub phase: Phase,
    pub message: String,
    cues: Vec<Cue>,
}

impl World {
    pub fn new(rng: StdRng) -> Self {
        let mut world = World {
            width: WORLD_WIDTH,
            height: WORLD_HEIGHT,
            rng,
            ship: None,
            asteroids: Vec::new(),
            bullets: Vec::new(),
            dust: Vec::new(),
            gems: Vec::new(),
            hearts: Heart::row(MAX_LIVES),
            score: 0,
            lives: MAX_LIVES,
            wave: 1,
            ticks: 0,
            invulnerable: true,
            phase: Phase::Active,
            message: String::new(),
            cues: Vec::new(),
        };
        world.start_wave();
        world
    }

    /// Resets the field for the current wave: fresh ship, fresh asteroids, spawn protection on.
    pub fn start_wave(&mut self) {
        self.message.clear();
        self.bullets.clear();
        self.dust.clear();
        self.gems.clear();
        self.asteroids.clear();
        self.ticks = 0;
        self.invulnerable = true;
        self.phase = Phase::Active;

        let spawn = Vector2D::new(SHIP_SPAWN_X, SHIP_SPAWN_Y);
        self.ship = Some(Ship::new(spawn));

        let count = rules::asteroids_in_wave(self.wave);
        for _ in 0..count {
            let position = self.asteroid_spawn_point(spawn);
            let asteroid = Asteroid::new(position, AsteroidSize::Large, &mut self.rng);
            self.asteroids.push(asteroid);
        }
        info!("Wave {} started with {} asteroids.", self.wave, count);
    }

    pub fn next_wave(&mut self) {
        self.wave += 1;
        self.start_wave();
    }

    fn asteroid_spawn_point(&mut self, ship_position: Vector2D) -> Vector2D {
        loop {
            let candidate = random_position(&mut self.rng, self.width, self.height);
            if candidate.distance_to(ship_position) > MIN_ASTEROID_DIST {
                return candidate;
            }
        }
    }

    /// Applies one ship order. Ignored while there is no ship.
    pub fn command(&mut self, command: Command, now: Instant) {
        let Some(ship) = self.ship.as_mut() else {
            return;
        };
        let exhaust = match command {
            Command::RotateClockwise => {
                ship.rotate(true);
                None
            }
            Command::RotateCounterClockwise => {
                ship.rotate(false);
                None
            }
            Command::Thrust => ship.accelerate(Thrust::Forward, &mut self.rng, now),
            Command::Reverse => ship.accelerate(Thrust::Reverse, &mut self.rng, now),
            Command::Brake => ship.accelerate(Thrust::Brake, &mut self.rng, now),
            Command::Shoot => {
                self.bullets.push(ship.shoot());
                self.cues.push(Cue::Laser);
                None
            }
        };
        self.dust.extend(exhaust);
    }

    /// One logic step: ambient friction, motion, collisions, culling and phase checks.
    pub fn update(&mut self, now: Instant) {
        if let Some(ship) = self.ship.as_mut() {
            ship.accelerate(Thrust::Drift, &mut self.rng, now);
        }
        self.move_objects(now);
        self.resolve_ship_collisions();
        self.resolve_bullet_hits(now);

        let (width, height) = (self.width, self.height);
        self.bullets.retain(|bullet| bullet.is_on_screen(width, height));

        if self.phase == Phase::Active && self.ship.is_some() && self.asteroids.is_empty() {
            self.message = format!("You beat wave {}! :D", self.wave);
            self.phase = Phase::Cleared { remaining: WAVE_CLEAR_DELAY_TICKS };
            info!("Wave {} cleared with score {}.", self.wave, self.score);
        }
        if self.invulnerable && self.ticks > INVULNERABILITY_TICKS {
            self.invulnerable = false;
            debug!("Invulnerability expired at tick {}.", self.ticks);
        }
    }

    fn move_objects(&mut self, now: Instant) {
        let (width, height) = (self.width, self.height);
        self.dust.retain_mut(|dust| dust.update(now));
        for gem in &mut self.gems {
            gem.update(width, height);
        }
        for asteroid in &mut self.asteroids {
            asteroid.update(width, height);
        }
        for bullet in &mut self.bullets {
            bullet.update();
        }
        for heart in &mut self.hearts {
            heart.update(self.ticks);
        }
        if let Some(ship) = self.ship.as_mut() {
            ship.update(width, height);
        }
    }

    fn resolve_ship_collisions(&mut self) {
        let Some(ship_body) = self.ship.as_ref().map(|ship| ship.body) else {
            return;
        };

        let mut collected = 0;
        self.gems.retain(|gem| {
            if gem.body.collides_with(&ship_body) {
                self.score += gem.worth;
                collected += 1;
                info!("Gem worth {} collected. Score: {}", gem.worth, self.score);
                false
            } else {
                true
            }
        });
        self.cues.extend((0..collected).map(|_| Cue::Reward));

        if !self.invulnerable && self.asteroids.iter().any(|a| a.body.collides_with(&ship_body)) {
            self.take_hit();
        }
    }

    fn take_hit(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        self.hearts.pop();
        self.ticks = 0;
        self.invulnerable = true;
        info!("Ship hit by asteroid. Lives: {}", self.lives);

        if self.lives == 0 {
            self.ship = None;
            self.phase = Phase::Dead;
            self.message = format!("You died at {} points, at wave {}. :(", self.score, self.wave);
            info!("Out of lives at wave {} with score {}.", self.wave, self.score);
        }
    }

    /// Each bullet takes out at most one asteroid. Fragments join the field after the scan.
    fn resolve_bullet_hits(&mut self, now: Instant) {
        let mut fragments = Vec::new();
        let mut i = 0;
        while i < self.bullets.len() {
            let bullet = &self.bullets[i].body;
            let Some(hit) = self.asteroids.iter().position(|a| a.body.collides_with(bullet)) else {
                i += 1;
                continue;
            };
            self.bullets.remove(i);
            let asteroid = self.asteroids.remove(hit);

            let debris = asteroid.split(&mut self.rng, now);
            fragments.extend(debris.asteroids);
            self.dust.extend(debris.dust);
            self.gems.extend(debris.gem);
            self.cues.push(Cue::Explosion);

            let bonus = rules::asteroid_bonus(asteroid.size, self.wave, &mut self.rng);
            self.score += bonus;
            info!("Asteroid {:?} destroyed for {}. Score: {}", asteroid.size, bonus, self.score);
        }
        self.asteroids.extend(fragments);
    }

    /// Closes the frame: advances the tick counter and the wave-clear countdown.
    pub fn end_frame(&mut self) -> Transition {
        self.ticks += 1;
        match self.phase {
            Phase::Active => Transition::None,
            Phase::Dead => Transition::GameOver,
            Phase::Cleared { remaining: 0 } => Transition::WaveReady,
            Phase::Cleared { remaining } => {
                self.phase = Phase::Cleared { remaining: remaining - 1 };
                Transition::None
            }
        }
    }

    pub fn take_cues(&mut self) -> Vec<Cue> {
        mem::take(&mut self.cues)
    }

    /// Every drawable object, back to front.
    pub fn sprites(&self) -> Vec<Sprite<'_>> {
        let mut sprites = Vec::with_capacity(
            self.dust.len() + self.gems.len() + self.asteroids.len() + self.bullets.len() + self.hearts.len() + 1,
        );
        sprites.extend(self.dust.iter().map(Sprite::Dust));
        sprites.extend(self.gems.iter().map(Sprite::Gem));
        sprites.extend(self.asteroids.iter().map(Sprite::Asteroid));
        sprites.extend(self.bullets.iter().map(Sprite::Bullet));
        sprites.extend(self.hearts.iter().map(Sprite::Heart));
        sprites.extend(self.ship.iter().map(Sprite::Ship));
        sprites
    }
}
