use std::collections::BTreeMap;

use indoc::indoc;
use insta::assert_snapshot;
use netlist::NetlistDocument;
use netlistsvg::{
    artifact_path, build_net_color_map, colorize, inject_styles, pin_bits, stylesheet, ColorRule,
    PinMatcher,
};

const MAINS: &str = indoc! {r#"
    {
      "modules": {
        "mains": {
          "ports": {},
          "cells": {
            "U1": {
              "type": "GFCI_RCD",
              "connections": { "L_IN": [ 5 ], "L_OUT": [ 6 ], "N_IN": [ 7 ] }
            },
            "F_MAIN": {
              "type": "Fuse",
              "connections": { "1": [ 6 ], "2": [ 8 ] }
            },
            "U2": {
              "type": "PSU_5V3A",
              "connections": { "L": [ 8 ], "+5V_OUT": [ 9, "0" ] }
            }
          }
        }
      }
    }
"#};

fn mains() -> NetlistDocument {
    NetlistDocument::from_json(MAINS).unwrap()
}

#[test]
fn rule_covers_all_its_pins() {
    // Scenario B.
    let rules = vec![ColorRule::new(
        "#FF0000",
        vec![PinMatcher::new("U1", "L_IN"), PinMatcher::new("U1", "L_OUT")],
    )];
    let colors = build_net_color_map(&mains(), &rules);
    assert_eq!(
        colors,
        BTreeMap::from([(5, "#FF0000".to_string()), (6, "#FF0000".to_string())])
    );
}

#[test]
fn first_matching_rule_wins() {
    let rules = vec![
        ColorRule::new("#CC0000", vec![PinMatcher::new("U1", "L_OUT")]),
        ColorRule::new("#444444", vec![PinMatcher::any_pin("F_MAIN")]),
    ];
    let colors = build_net_color_map(&mains(), &rules);
    // Bit 6 is on both U1.L_OUT and F_MAIN.1.
    assert_eq!(colors[&6], "#CC0000");
    assert_eq!(colors[&8], "#444444");

    let reversed: Vec<_> = rules.into_iter().rev().collect();
    let colors = build_net_color_map(&mains(), &reversed);
    assert_eq!(colors[&6], "#444444");
}

#[test]
fn substring_matches_and_unmatched_nets() {
    // "L" is a substring of "L_IN" and "L_OUT" too, but only on U2 here.
    let rules = vec![ColorRule::new("#FF7700", vec![PinMatcher::new("U2", "L")])];
    let colors = build_net_color_map(&mains(), &rules);
    assert_eq!(colors.keys().copied().collect::<Vec<_>>(), vec![8]);

    let rules = vec![ColorRule::new("#FF7700", vec![PinMatcher::new("U1", "_")])];
    let colors = build_net_color_map(&mains(), &rules);
    assert_eq!(colors.keys().copied().collect::<Vec<_>>(), vec![5, 6, 7]);
}

#[test]
fn constant_bits_are_ignored() {
    let pins = pin_bits(&mains());
    let rail = &pins[&("U2".to_string(), "+5V_OUT".to_string())];
    assert_eq!(rail.iter().copied().collect::<Vec<_>>(), vec![9]);
}

#[test]
fn rules_from_toml() {
    #[derive(serde::Deserialize)]
    struct Config {
        colors: Vec<ColorRule>,
    }

    let config: Config = toml::from_str(indoc! {r##"
        [[colors]]
        name = "AC live"
        color = "#CC0000"
        pins = [["U1", "L_IN"], ["F_MAIN", "*"]]
    "##})
    .unwrap();

    let rule = &config.colors[0];
    assert_eq!(rule.name.as_deref(), Some("AC live"));
    assert_eq!(
        rule.pins,
        vec![PinMatcher::new("U1", "L_IN"), PinMatcher::any_pin("F_MAIN")]
    );
    assert_eq!(
        serde_json::to_string(&rule.pins).unwrap(),
        r#"[["U1","L_IN"],["F_MAIN","*"]]"#
    );
}

#[test]
fn stylesheet_groups_nets_by_color() {
    let colors = BTreeMap::from([
        (2, "#CC0000".to_string()),
        (10, "#CC0000".to_string()),
        (3, "#0055DD".to_string()),
        (9, "#CC0000".to_string()),
    ]);
    assert_eq!(
        stylesheet(&colors),
        [
            "  line.net_3, path.net_3 { stroke: #0055DD; stroke-width: 2px; }",
            "  line.net_2, path.net_2, line.net_9, path.net_9, line.net_10, path.net_10 \
             { stroke: #CC0000; stroke-width: 2px; }",
        ]
        .join("\n")
    );
}

#[test]
fn styles_follow_first_style_block() {
    let svg = indoc! {r#"
        <svg>
        <style>
        svg { stroke: #000; }
        </style>
        <line class="net_2"/>
        </svg>
    "#};
    let css = stylesheet(&BTreeMap::from([(2, "#CC0000".to_string())]));
    assert_snapshot!(inject_styles(svg, &css).unwrap().trim_end(), @r###"
    <svg>
    <style>
    svg { stroke: #000; }
    </style>
      <style id='net-colors'>
      line.net_2, path.net_2 { stroke: #CC0000; stroke-width: 2px; }
      </style>
    <line class="net_2"/>
    </svg>
    "###);
}

#[test]
fn colorize_writes_color_svg() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("mains");
    std::fs::write(artifact_path(&base, "_clean.json"), MAINS).unwrap();
    std::fs::write(
        artifact_path(&base, ".svg"),
        "<svg><style>text {}</style><line class=\"net_5\"/></svg>",
    )
    .unwrap();

    let rules = vec![ColorRule::new("#CC0000", vec![PinMatcher::new("U1", "L_IN")])];
    let colorized = colorize(&base, &rules).unwrap();

    assert_eq!(colorized.path, dir.path().join("mains_color.svg"));
    assert_eq!(colorized.nets, 1);
    let svg = std::fs::read_to_string(&colorized.path).unwrap();
    assert!(svg.contains("line.net_5, path.net_5 { stroke: #CC0000; stroke-width: 2px; }"));
    assert!(svg.ends_with("<line class=\"net_5\"/></svg>"));
}

#[test]
fn colorize_without_render_fails() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("mains");
    std::fs::write(artifact_path(&base, "_clean.json"), MAINS).unwrap();
    assert!(colorize(&base, &[]).is_err());
}
