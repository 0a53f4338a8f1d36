use panelqc_remedy::{ApplyOptions, apply};
use panelqc_types::{
    BraceKind, FixCategory, Opening, OpeningType, PanelData, Severity, Stud, Violation,
    ViolationType,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn window(id: &str, position_mm: f64, is_corner: bool) -> Opening {
    Opening {
        opening_id: id.to_string(),
        opening_type: OpeningType::Window,
        position_mm,
        width_mm: 700.0,
        height_mm: 1200.0,
        has_jack_studs: false,
        has_header: false,
        is_corner,
    }
}

fn panel(seismic_zone: u32) -> PanelData {
    PanelData {
        panel_id: "P-204".to_string(),
        name: "Stair wall".to_string(),
        width_mm: 3660.0,
        height_mm: 2440.0,
        studs: vec![],
        openings: vec![],
        ducts: vec![],
        seismic_zone,
    }
}

fn violation(id: &str, t: ViolationType) -> Violation {
    Violation::new(id, "R", "E", t, Severity::High, "r")
}

#[test]
fn corner_window_in_high_seismic_zone_is_braced_without_a_violation() {
    let mut p = panel(4);
    p.openings = vec![window("W1", 1400.0, true)];

    let out = apply(&p, &[], &ApplyOptions::default());
    assert_eq!(out.bracing.len(), 1);
    assert_eq!(out.bracing[0].kind, BraceKind::DiagonalBrace);
    assert_eq!(out.bracing[0].opening_id, "W1");
    assert_eq!(out.bracing[0].position_mm, 1400.0);
    assert_eq!(out.applied, vec![FixCategory::Bracing]);
    assert_eq!(out.panel.openings, p.openings);
}

#[test]
fn low_seismic_zone_needs_a_flagged_violation() {
    let mut p = panel(2);
    p.openings = vec![window("W1", 100.0, false)];

    assert!(apply(&p, &[], &ApplyOptions::default()).bracing.is_empty());
    let out = apply(
        &p,
        &[violation("LLM_1", ViolationType::Bracing)],
        &ApplyOptions::default(),
    );
    assert_eq!(out.bracing.len(), 1);
}

#[test]
fn window_fix_covers_every_window_and_skips_doors() {
    let mut p = panel(1);
    p.openings = vec![
        window("W1", 1000.0, false),
        window("W2", 2000.0, false),
        Opening {
            opening_type: OpeningType::Door,
            ..window("D1", 2800.0, false)
        },
    ];

    let out = apply(
        &p,
        &[violation("WINDOW_W1", ViolationType::Support)],
        &ApplyOptions::default(),
    );
    let flags: Vec<_> = out
        .panel
        .openings
        .iter()
        .map(|o| (o.opening_id.as_str(), o.has_jack_studs, o.has_header))
        .collect();
    assert_eq!(
        flags,
        vec![("W1", true, true), ("W2", true, true), ("D1", false, false)]
    );
}

#[test]
fn legacy_reason_matching_is_opt_in() {
    let mut p = panel(1);
    p.openings = vec![window("W1", 1000.0, false)];
    let vague = Violation::new(
        "LLM_9",
        "",
        "W1",
        ViolationType::Unknown,
        Severity::High,
        "W1 is missing a jack stud on the left",
    );

    let strict = apply(&p, std::slice::from_ref(&vague), &ApplyOptions::default());
    assert!(!strict.panel.openings[0].has_jack_studs);

    let legacy = ApplyOptions {
        legacy_reason_matching: true,
        ..ApplyOptions::default()
    };
    let loose = apply(&p, &[vague], &legacy);
    assert!(loose.panel.openings[0].has_jack_studs);
}

fn arb_panel() -> impl Strategy<Value = PanelData> {
    (
        1000.0f64..6000.0,
        prop::collection::vec(0.0f64..1.0, 0..10),
        prop::collection::vec((0.0f64..1.0, any::<bool>(), any::<bool>(), any::<bool>()), 0..4),
        1u32..6,
    )
        .prop_map(|(width_mm, stud_fracs, openings, seismic_zone)| {
            let mut p = panel(seismic_zone);
            p.width_mm = width_mm;
            p.studs = stud_fracs
                .iter()
                .enumerate()
                .map(|(i, f)| Stud {
                    stud_id: format!("S{i}"),
                    position_mm: f * width_mm,
                    width_mm: 38.0,
                    depth_mm: 89.0,
                })
                .collect();
            p.openings = openings
                .iter()
                .enumerate()
                .map(|(i, &(f, jacks, header, corner))| Opening {
                    has_jack_studs: jacks,
                    has_header: header,
                    ..window(&format!("W{i}"), f * width_mm, corner)
                })
                .collect();
            p
        })
}

fn arb_violations() -> impl Strategy<Value = Vec<Violation>> {
    prop::collection::vec(
        prop_oneof![
            Just(ViolationType::Support),
            Just(ViolationType::Spacing),
            Just(ViolationType::Bracing),
            Just(ViolationType::Clearance),
        ],
        0..4,
    )
    .prop_map(|types| {
        types
            .into_iter()
            .enumerate()
            .map(|(i, t)| violation(&format!("V{i}"), t))
            .collect()
    })
}

proptest! {
    #[test]
    fn applying_twice_is_a_fixed_point(p in arb_panel(), vs in arb_violations()) {
        let opts = ApplyOptions::default();
        let once = apply(&p, &vs, &opts);
        let twice = apply(&once.panel, &vs, &opts);
        prop_assert_eq!(&twice.panel, &once.panel);
        prop_assert_eq!(&twice.bracing, &once.bracing);
    }

    #[test]
    fn two_studs_always_land_on_the_edges(width in 500.0f64..8000.0, a in 0.0f64..1.0, b in 0.0f64..1.0) {
        let mut p = panel(1);
        p.width_mm = width;
        p.studs = [a, b]
            .iter()
            .enumerate()
            .map(|(i, f)| Stud {
                stud_id: format!("S{i}"),
                position_mm: f * width,
                width_mm: 38.0,
                depth_mm: 89.0,
            })
            .collect();

        let out = apply(&p, &[violation("V", ViolationType::Spacing)], &ApplyOptions::default());
        let positions: Vec<f64> = out.panel.studs.iter().map(|s| s.position_mm).collect();
        prop_assert_eq!(positions, vec![0.0, width]);
    }
}
