// --- World ---
pub const WORLD_WIDTH: f64 = 800.0;
pub const WORLD_HEIGHT: f64 = 600.0;
pub const FRAME_RATE: u32 = 60;

// --- Ship ---
pub const SHIP_SPAWN_X: f64 = 400.0;
pub const SHIP_SPAWN_Y: f64 = 300.0;
pub const SHIP_RADIUS: f64 = 20.0;
pub const SHIP_MANEUVERABILITY: f64 = 5.0; // Degrees per input tick
pub const SHIP_ACCELERATION: f64 = 0.06;
pub const SHIP_BRAKE_FORCE: f64 = 0.7;
pub const SHIP_BULLET_SPEED: f64 = 3.0;
pub const SHIP_MAX_SPEED: f64 = 5.0;
pub const SPACE_FRICTION: f64 = 0.985;

// --- Bullets ---
pub const BULLET_RADIUS: f64 = 4.0;
pub const BULLET_FRICTION: f64 = 0.998;

// --- Asteroids ---
pub const ASTEROID_SPRITE_WIDTH: f64 = 100.0;
pub const MIN_ASTEROID_DIST: f64 = 200.0;
pub const ASTEROID_MIN_SPEED: u32 = 1;
pub const ASTEROID_MAX_SPEED: u32 = 2;

// --- Dust ---
pub const DUST_RADIUS: f64 = 6.0;
pub const DUST_FRICTION: f64 = 0.97;
pub const DUST_START_SIZE: f64 = 14.0;
pub const THRUST_DUST_LIFETIME: f64 = 2.0; // Seconds, before jitter
pub const EXPLOSION_DUST_LIFETIME: f64 = 1.0;

// --- Gems ---
pub const GEM_BASE_WORTH: f64 = 4500.0;

// --- Hearts ---
pub const MAX_LIVES: u32 = 3;
pub const HEART_RADIUS: f64 = 25.0;
pub const HEART_BOB_PERIOD: u64 = 30;
pub const HEART_BOB_OFFSET: f64 = 5.0;

// --- Waves and lives ---
pub const INVULNERABILITY_TICKS: u64 = 300;
pub const WAVE_CLEAR_DELAY_TICKS: u32 = 600;

// --- High scores ---
pub const HIGHSCORE_THRESHOLD: u64 = 20_000;
pub const HIGHSCORE_DISPLAY_COUNT: usize = 10;
pub const DEFAULT_HIGHSCORE_FILE: &str = "highscores.txt";
pub const DEFAULT_LOG_FILE: &str = "space-rocks.log";

// --- Input ---
pub const KEY_REPEAT_FRAMES: u64 = 3; // How long an auto-repeat keeps a key down when releases aren't reported
