// Integration tests for imitation and reproduction of demonstrations

#[cfg(test)]
mod tests {
    use dmp_rs::{BasisSet, DynamicMovementPrimitive, Obstacle, ObstacleAvoidance, Trajectory, Weights, min_jerk};

    fn linspace(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64 / (n - 1) as f64).collect()
    }

    fn prepare(ng: usize, stabilize: bool, n: usize) -> (DynamicMovementPrimitive, Vec<f64>, Vec<f64>, BasisSet) {
        let dmp = DynamicMovementPrimitive::new(25.0, ng, stabilize).unwrap();
        let time = linspace(n);
        let s = dmp.phase(&time).unwrap();
        let basis = dmp.distributions(&s, 1.0).unwrap();
        (dmp, time, s, basis)
    }

    fn max_deviation(a: &Trajectory, b: &Trajectory) -> f64 {
        a.position
            .iter()
            .flatten()
            .zip(b.position.iter().flatten())
            .map(|(p, q)| (p - q).abs())
            .fold(0.0, f64::max)
    }

    #[test]
    fn test_reproduces_minimum_jerk_demonstration() {
        let (dmp, time, s, basis) = prepare(10, true, 100);
        let demo = min_jerk(&[0.0], &[1.0], &time).unwrap();
        let learned = dmp.imitate(&demo, &time, &s, &basis).unwrap();
        assert_eq!(learned.weights.count(), 10);
        assert_eq!(learned.forcing.len(), 100);

        let replay = dmp.generate(&learned.weights, &[0.0], &[1.0], &time, &s, &basis, &[]).unwrap();
        // ten bases over an exponential phase leave a small residual at the goal
        assert!((replay.goal()[0] - 1.0).abs() < 0.02);
        assert!(max_deviation(&demo, &replay) < 0.2);
    }

    #[test]
    fn test_more_bases_track_the_demonstration_closer() {
        let mut deviations = Vec::new();
        for ng in [10, 30] {
            let (dmp, time, s, basis) = prepare(ng, true, 100);
            let demo = min_jerk(&[0.0], &[1.0], &time).unwrap();
            let learned = dmp.imitate(&demo, &time, &s, &basis).unwrap();
            let replay = dmp.generate(&learned.weights, &[0.0], &[1.0], &time, &s, &basis, &[]).unwrap();
            deviations.push(max_deviation(&demo, &replay));
        }
        assert!(deviations[1] < deviations[0]);
    }

    #[test]
    fn test_retargets_to_new_goals() {
        let (dmp, time, s, basis) = prepare(10, true, 100);
        let demo = min_jerk(&[0.0], &[1.0], &time).unwrap();
        let learned = dmp.imitate(&demo, &time, &s, &basis).unwrap();

        let far = dmp.generate(&learned.weights, &[0.0], &[2.0], &time, &s, &basis, &[]).unwrap();
        assert!((far.goal()[0] - 2.0).abs() < 0.05);

        let reversed = dmp.generate(&learned.weights, &[0.5], &[-1.0], &time, &s, &basis, &[]).unwrap();
        assert!((reversed.goal()[0] + 1.0).abs() < 0.05);
    }

    #[test]
    fn test_round_trip_recovers_weights() {
        let (dmp, time, s, basis) = prepare(10, false, 1000);
        let known = Weights::from_vec(vec![50.0; 10]);
        let rollout = dmp.generate(&known, &[0.0], &[1.0], &time, &s, &basis, &[]).unwrap();
        let learned = dmp.imitate(&rollout, &time, &s, &basis).unwrap();
        for j in 0..10 {
            assert!((learned.weights.get(j, 0) - 50.0).abs() < 0.15 * 50.0);
        }

        let replay = dmp.generate(&learned.weights, &[0.0], &[1.0], &time, &s, &basis, &[]).unwrap();
        assert!(max_deviation(&rollout, &replay) < 0.01);
    }

    #[test]
    fn test_stabilized_round_trip_offsets_weights_by_twice_b() {
        // the stabilization term enters both the forcing target and the
        // transformation system with the same sign
        let (dmp, time, s, basis) = prepare(10, true, 1000);
        let known = Weights::from_vec(vec![50.0; 10]);
        let rollout = dmp.generate(&known, &[0.0], &[1.0], &time, &s, &basis, &[]).unwrap();
        let learned = dmp.imitate(&rollout, &time, &s, &basis).unwrap();
        let mean_offset = (0..10).map(|j| learned.weights.get(j, 0) - 50.0).sum::<f64>() / 10.0;
        assert!((mean_offset - 2.0 * dmp.b()).abs() < 2.5);
    }

    #[test]
    fn test_dimensions_are_independent() {
        let (dmp, time, s, basis) = prepare(8, true, 100);
        let single = min_jerk(&[0.0], &[1.0], &time).unwrap();
        let planar = min_jerk(&[0.0, 2.0], &[1.0, -1.0], &time).unwrap();

        let w1 = dmp.imitate(&single, &time, &s, &basis).unwrap().weights;
        let w2 = dmp.imitate(&planar, &time, &s, &basis).unwrap().weights;
        assert_eq!(w2.dims(), 2);
        for j in 0..8 {
            assert!((w1.get(j, 0) - w2.get(j, 0)).abs() < 1e-9);
        }

        let r1 = dmp.generate(&w1, &[0.0], &[1.0], &time, &s, &basis, &[]).unwrap();
        let r2 = dmp.generate(&w2, &[0.0, 2.0], &[1.0, -1.0], &time, &s, &basis, &[]).unwrap();
        for i in 0..time.len() {
            assert!((r1.position[i][0] - r2.position[i][0]).abs() < 1e-9);
        }
        assert!((r2.goal()[1] + 1.0).abs() < 0.05);
    }

    #[test]
    fn test_position_only_demonstration() {
        let (dmp, time, s, basis) = prepare(10, true, 200);
        let demo = min_jerk(&[0.0], &[1.0], &time).unwrap();
        let rebuilt = Trajectory::from_positions(&time, demo.position.clone()).unwrap();
        let exact = dmp.imitate(&demo, &time, &s, &basis).unwrap();
        let approx = dmp.imitate(&rebuilt, &time, &s, &basis).unwrap();
        let r_exact = dmp.generate(&exact.weights, &[0.0], &[1.0], &time, &s, &basis, &[]).unwrap();
        let r_approx = dmp.generate(&approx.weights, &[0.0], &[1.0], &time, &s, &basis, &[]).unwrap();
        assert!(max_deviation(&r_exact, &r_approx) < 0.05);
    }

    #[test]
    fn test_obstacle_beyond_goal_leaves_rollout_unchanged() {
        let (dmp, time, s, basis) = prepare(10, true, 100);
        let dmp = dmp.with_obstacle_avoidance(ObstacleAvoidance::default());
        let demo = min_jerk(&[0.0, 0.0], &[1.0, 1.0], &time).unwrap();
        let learned = dmp.imitate(&demo, &time, &s, &basis).unwrap();

        let free = dmp.generate(&learned.weights, &[0.0, 0.0], &[1.0, 1.0], &time, &s, &basis, &[]).unwrap();
        let distant = [Obstacle::new(5.0, 5.0, 0.0)];
        let blocked = dmp
            .generate(&learned.weights, &[0.0, 0.0], &[1.0, 1.0], &time, &s, &basis, &distant)
            .unwrap();
        assert_eq!(free, blocked);

        let near = [Obstacle::new(0.5, 0.3, 0.0)];
        let bent = dmp
            .generate(&learned.weights, &[0.0, 0.0], &[1.0, 1.0], &time, &s, &basis, &near)
            .unwrap();
        assert!(max_deviation(&free, &bent) > 1e-6);
    }
}
