use crate::{run_on, Cli, Method};
use fp_types::{has_overlap, Layout, Rect};
use itertools::Itertools;

/// A small hard-macro design in the style of the MCNC benchmarks.
const FIXTURE: &str = r#"
MODULE cc_1;
  TYPE GENERAL;
  DIMENSIONS 0 0 0 100 120 100 120 0;
  IOLIST;
    P1 B 0 50 1 METAL2;
  ENDIOLIST;
ENDMODULE;

MODULE cc_2;
  TYPE GENERAL;
  DIMENSIONS 0 0 0 80 90 80 90 0;
  IOLIST;
    P1 B 0 40 1 METAL2;
  ENDIOLIST;
ENDMODULE;

MODULE cc_3;
  TYPE GENERAL;
  DIMENSIONS 0 0 0 60 150 60 150 0;
  IOLIST;
    P1 B 0 30 1 METAL1;
  ENDIOLIST;
ENDMODULE;

MODULE cc_4;
  TYPE GENERAL;
  DIMENSIONS -20 -20 -20 50 90 50 90 -20;
  IOLIST;
    P1 B 0 0 1 POLY;
  ENDIOLIST;
ENDMODULE;

MODULE cc_5;
  TYPE GENERAL;
  DIMENSIONS 0 0 0 40 40 40 40 0;
  IOLIST;
    P1 B 20 0 1 METAL1;
  ENDIOLIST;
ENDMODULE;

MODULE top;
  TYPE PARENT;
  IOLIST;
    IN PI 0 0 1 METAL1;
  ENDIOLIST;
  NETWORK;
    u0 cc_1 N1 N2 VDD;
    u1 cc_2 N1 N3 VDD;
    u2 cc_3 N2 N3 N4;
    u3 cc_4 N4 N5 GND;
    u4 cc_5 N5 N1 GND;
    u5 cc_2 N2 N5;
    u6 cc_5 N3 N4;
  ENDNETWORK;
ENDMODULE;
"#;

fn cli(method: Method) -> Cli {
    Cli {
        input: None,
        output: None,
        method,
        rounds: 2,
        option: None,
        alpha: 1.0,
        seed: 42,
        verbose: 0,
    }
}

fn parse_placement(text: &str) -> Layout {
    let mut layout = Layout::default();
    for line in text.lines() {
        let (x, y, w, h) = line
            .split_whitespace()
            .map(|t| t.parse::<i32>().unwrap())
            .collect_tuple()
            .unwrap();
        layout.push(w, h);
        let k = layout.len() - 1;
        layout.set_position(k, x, y);
    }
    layout
}

#[test]
fn cli_test() {
    <Cli as clap::CommandFactory>::command().debug_assert();
}

#[test]
fn every_method_places_every_instance() {
    for method in [Method::Polish, Method::PolishCurve, Method::Lcs, Method::Dag] {
        let out = run_on(FIXTURE, &cli(method)).unwrap();
        let layout = parse_placement(&out);
        assert_eq!(layout.len(), 7, "{method:?}");
        assert!(!has_overlap(&layout), "{method:?}");
        // Instance u0 is a 120x100 macro in either orientation.
        let r = layout.rect(0);
        assert!(
            (r.width, r.height) == (120, 100) || (r.width, r.height) == (100, 120),
            "{method:?}: {r}"
        );
    }
}

/// Two runs with the same seed, input, and options must be bitwise
/// identical, for every method.
#[test]
fn equal_seeds_reproduce_the_placement() {
    for method in [Method::Polish, Method::PolishCurve, Method::Lcs, Method::Dag] {
        let a = run_on(FIXTURE, &cli(method)).unwrap();
        let b = run_on(FIXTURE, &cli(method)).unwrap();
        assert_eq!(a, b, "{method:?}");
    }
}

#[test]
fn wirelength_tradeoff_is_accepted() {
    let mut cli = cli(Method::Dag);
    cli.alpha = 0.5;
    let out = run_on(FIXTURE, &cli).unwrap();
    assert!(!has_overlap(&parse_placement(&out)));

    cli.alpha = 1.5;
    let err = run_on(FIXTURE, &cli).unwrap_err();
    assert!(err.to_string().contains("alpha"));
}

#[test]
fn parse_errors_propagate() {
    assert!(run_on("MODULE broken", &cli(Method::Polish)).is_err());
    assert!(run_on("", &cli(Method::Polish)).is_err());
}

#[test]
fn placement_covers_total_module_area() {
    let out = run_on(FIXTURE, &cli(Method::PolishCurve)).unwrap();
    let layout = parse_placement(&out);
    let total: i64 = layout.sum_component_areas();
    let (w, h) = layout.bounding_box();
    assert!(w as i64 * h as i64 >= total);
    // All rectangles sit inside the bounding box at non-negative offsets.
    for k in 0..layout.len() {
        let r: Rect = layout.rect(k);
        assert!(r.x >= 0 && r.y >= 0);
        assert!(r.right() <= w && r.top() <= h);
    }
}
