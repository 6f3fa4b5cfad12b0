//! Reward shaping

/// Highest reward, given only for an exact match
pub const MAX_REWARD: u8 = 10;

/// Default illumination target in lux
pub const DEFAULT_TARGET_LUX: u32 = 4500;

/// Reward for a measured illumination against a target, `0..=10`.
///
/// Falls off linearly with the distance to the target and never goes
/// negative: a gap larger than the target is worth nothing. The result is
/// truncated, so 10 is reached only on an exact match.
#[allow(clippy::cast_lossless, clippy::cast_possible_truncation)]
pub const fn compute_reward(measured_lux: u32, target_lux: u32) -> u8 {
    if target_lux == 0 {
        return if measured_lux == 0 { MAX_REWARD } else { 0 };
    }

    let gap = measured_lux.abs_diff(target_lux);
    if gap > target_lux {
        return 0;
    }

    (MAX_REWARD as u64 * (target_lux - gap) as u64 / target_lux as u64) as u8
}
