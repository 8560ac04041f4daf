//! RNG oracle for deterministic random number generation.
//!
//! Combat resolution draws several independent random values per strike
//! (hit roll, critical roll, cooldown jitter, projectile aim scatter). All
//! of them flow through this trait so a fixed world seed replays the same
//! fight tick for tick.

/// RNG oracle for deterministic random number generation.
///
/// Implementations must be deterministic and produce the same values
/// given the same seed.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Draw a uniform value in `[0, 1)`.
    ///
    /// This is the primitive the hit and critical rolls are made with.
    fn unit(&self, seed: u64) -> f32 {
        // 2^32 as f64 keeps the full u32 range representable before the
        // narrowing cast; the result is strictly below 1.0.
        (f64::from(self.next_u32(seed)) / 4_294_967_296.0) as f32
    }

    /// Draw a uniform value in `[lo, hi)`.
    ///
    /// Used for cooldown jitter (`base × uniform(1−v, 1+v)`).
    fn range(&self, seed: u64, lo: f32, hi: f32) -> f32 {
        if lo >= hi {
            return lo;
        }
        lo + self.unit(seed) * (hi - lo)
    }
}

/// PCG random number generator (Permuted Congruential Generator).
///
/// PCG is a family of simple, fast, space-efficient RNGs with excellent
/// statistical quality. This implementation uses PCG-XSH-RR, which produces
/// 32-bit output from 64-bit state.
///
/// # Properties
///
/// - **Deterministic**: Same seed always produces same output
/// - **Fast**: Single multiply + xorshift + rotate
/// - **Small state**: Only 64 bits
///
/// # References
///
/// - PCG paper: <https://www.pcg-random.org/>
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    /// PCG multiplier constant.
    const MULTIPLIER: u64 = 6364136223846793005;

    /// PCG increment constant.
    const INCREMENT: u64 = 1442695040888963407;

    /// Advance the PCG state by one step.
    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// PCG output function using XSH-RR (xorshift high, random rotate).
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        let state = Self::pcg_step(seed);
        Self::pcg_output(state)
    }
}

/// Roll contexts, so one strike can draw several independent values.
pub mod roll {
    /// Melee hit check.
    pub const HIT: u32 = 0;
    /// Critical strike check.
    pub const CRIT: u32 = 1;
    /// Cooldown jitter after a strike.
    pub const COOLDOWN: u32 = 2;
    /// Projectile aim scatter, lateral axis.
    pub const AIM_X: u32 = 3;
    /// Projectile aim scatter, depth axis.
    pub const AIM_Z: u32 = 4;
}

/// Compute a deterministic seed from world state components.
///
/// Combines multiple entropy sources so every random event in a session
/// draws from its own stream:
///
/// * `world_seed` - base seed fixed at session start (replay anchor)
/// * `nonce` - resolution sequence number (increments per attack attempt)
/// * `agent_id` - entity the roll is made for
/// * `context` - one of the [`roll`] constants
pub fn compute_seed(world_seed: u64, nonce: u64, agent_id: u32, context: u32) -> u64 {
    // Mix all inputs using simple hash combiners
    // These constants are based on SplitMix64 and FxHash multipliers
    let mut hash = world_seed;

    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= u64::from(agent_id).wrapping_mul(0x517cc1b727220a95);
    hash ^= u64::from(context).wrapping_mul(0x85ebca6b);

    // Final avalanche step
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}
