use minegen_core::levelgen::audit_level;
use minegen_core::{Cell, GenConfig, generate_level};
use proptest::{
    arbitrary::any,
    test_runner::{Config as ProptestConfig, TestCaseError, TestRunner},
};

fn check_seed(config: &GenConfig) -> Result<(), TestCaseError> {
    let generated = generate_level(config)
        .map_err(|err| TestCaseError::fail(format!("seed {}: {err}", config.seed)))?;
    let level = &generated.level;

    let findings = audit_level(level, config);
    if !findings.is_empty() {
        let listed: Vec<String> = findings.iter().map(ToString::to_string).collect();
        return Err(TestCaseError::fail(format!(
            "seed {} failed audit:\n{}\n{}",
            config.seed,
            listed.join("\n"),
            level.render_ascii()
        )));
    }

    if level.cell(level.gen_start) != Cell::GenStart {
        return Err(TestCaseError::fail("origin cell was overwritten"));
    }
    if level.drop_points.len() > 3 {
        return Err(TestCaseError::fail("more than three drop points"));
    }
    for doorway in &level.doorways {
        if doorway.connections.is_empty() {
            let message = format!("doorway {:?} has no connections", doorway.cell);
            return Err(TestCaseError::fail(message));
        }
    }
    Ok(())
}

#[test]
fn generated_levels_pass_the_structural_audit() {
    let mut runner = TestRunner::new(ProptestConfig { cases: 32, ..ProptestConfig::default() });
    runner
        .run(&(1_u64..u64::MAX), |seed| check_seed(&GenConfig::with_seed(seed)))
        .expect("every seed should produce a sound level");
}

#[test]
fn audit_holds_across_parameter_variations() {
    let mut runner = TestRunner::new(ProptestConfig { cases: 24, ..ProptestConfig::default() });
    let strategy = (1_u64..u64::MAX, 0_usize..8, any::<bool>(), 1_usize..=3);
    runner
        .run(&strategy, |(seed, storage_room_count, only_in_hallways, max_room_doors)| {
            let config = GenConfig {
                seed,
                storage_room_count,
                storage_rooms_only_in_hallways: only_in_hallways,
                max_room_doors,
                ..GenConfig::default()
            };
            check_seed(&config)
        })
        .expect("parameter variations should keep levels sound");
}
