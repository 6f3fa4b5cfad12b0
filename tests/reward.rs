mod tests {
    use rlic::compute_reward;
    use rlic::reward::{DEFAULT_TARGET_LUX, MAX_REWARD};

    #[test]
    fn test_exact_match_earns_max_reward() {
        assert_eq!(compute_reward(4500, DEFAULT_TARGET_LUX), MAX_REWARD);
        assert_eq!(compute_reward(120, 120), MAX_REWARD);
    }

    #[test]
    fn test_reward_bounds() {
        assert_eq!(compute_reward(0, 4500), 0);
        assert_eq!(compute_reward(9000, 4500), 0);
        assert_eq!(compute_reward(9001, 4500), 0);
        assert_eq!(compute_reward(u32::MAX, 4500), 0);
    }

    #[test]
    fn test_reward_falls_off_linearly() {
        assert_eq!(compute_reward(4050, 4500), 9);
        assert_eq!(compute_reward(4950, 4500), 9);
        assert_eq!(compute_reward(5400, 4500), 8);
        assert_eq!(compute_reward(2250, 4500), 5);
        assert_eq!(compute_reward(4499, 4500), 9);
    }

    #[test]
    fn test_reward_never_increases_with_gap() {
        let mut previous = MAX_REWARD;
        for lux in 4500..=9500 {
            let reward = compute_reward(lux, 4500);
            assert!(reward <= previous, "lux {lux}");
            previous = reward;
        }
    }

    #[test]
    fn test_zero_target() {
        assert_eq!(compute_reward(0, 0), MAX_REWARD);
        assert_eq!(compute_reward(1, 0), 0);
    }
}
