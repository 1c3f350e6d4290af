/// Vectors whose squared length is below this are treated as zero when normalizing.
pub const NORMALIZE_EPS_SQ: f32 = 1.0e-12;

/// Tolerance used when comparing a forward speed against a gait speed cap (m/s).
///
/// The lateral clamp produces magnitudes that land on the cap up to float error, so the
/// gait buckets compare with this slack.
pub const SPEED_EPS: f32 = 1.0e-3;

/// Separation kept between the character capsule and the world (meters).
pub const DEFAULT_SKIN: f32 = 0.02;

/// Distance below the lower capsule hemisphere swept when looking for a ground normal (meters).
pub const GROUND_PROBE_DISTANCE: f32 = 0.3;

/// Max dt (seconds) accepted by a single controller tick.
///
/// Larger steps are clamped to avoid tunneling after stalls.
pub const MAX_DT_S: f32 = 0.10;

/// Default fixed tick rate used by hosts that do not specify one (Hz).
pub const DEFAULT_TICK_HZ: u32 = 60;
