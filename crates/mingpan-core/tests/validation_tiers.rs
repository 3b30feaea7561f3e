//! # Validation Tier Tests (T0-T3)
//!
//! If ANY tier fails, the rule engine is INVALID.
//!
//! ## Tiers
//! - T0: Rule Table Integrity
//! - T1: Relation Totality
//! - T2: Ten-God Table (all 100 stem pairs)
//! - T3: End-to-End Chart Annotation

use mingpan_core::{
    Branch, Chart, Element, MingpanError, Pillar, RuleTables, Stem, TenGod, TwelveStage,
};
use serde_json::{Value, json};

fn pillar(s: &str) -> Pillar {
    s.parse().expect("pillar")
}

fn reference_record() -> Value {
    json!({
        "year_pillar": "戊寅",
        "month_pillar": "丁巳",
        "day_pillar": "丙子",
        "hour_pillar": "庚寅",
        "day_master": "丙",
        "five_elements_count": {"木": 2, "火": 3, "土": 1, "金": 1, "水": 1},
        "body_strength": "强"
    })
}

// =============================================================================
// TIER T0: RULE TABLE INTEGRITY
// =============================================================================

mod t0_table_integrity {
    use super::*;

    /// T0.1: The shipped table covers every expected key.
    #[test]
    fn builtin_table_is_complete() {
        let summary = RuleTables::builtin().summary();
        assert_eq!(summary.hidden_stems, 12);
        assert_eq!(summary.nayin, 60);
        assert_eq!(summary.void_branches, 60);
        assert_eq!(summary.twelve_stages, 10);
        assert_eq!(summary.stem_elements, 10);
        assert_eq!(summary.stem_polarities, 10);
        assert!(summary.cycles_complete);
    }

    /// T0.2: Every stem has the conventional element and polarity.
    #[test]
    fn stem_attributes() {
        let tables = RuleTables::builtin();
        let expected = [
            Element::Wood,
            Element::Fire,
            Element::Earth,
            Element::Metal,
            Element::Water,
        ];
        for stem in Stem::ALL {
            assert_eq!(tables.element_of(stem), Some(expected[stem.index() / 2]));
        }
        assert_eq!(
            tables.polarity_of(Stem::Jia).map(|p| p.label()),
            Some("阳")
        );
        assert_eq!(tables.polarity_of(Stem::Gui).map(|p| p.label()), Some("阴"));
    }

    /// T0.3: Every day pillar's void branches are the two the ten-day cycle
    /// leaves out.
    #[test]
    fn void_branches_complete_the_decade() {
        let tables = RuleTables::builtin();
        for day in Pillar::sexagenary() {
            let voids = tables.void_branches(day);
            assert_eq!(voids.len(), 2, "{}", day);

            // The decade starts at the 甲 of this pillar's 旬
            let start = (day.branch.index() + 12 - day.stem.index()) % 12;
            let expected = [Branch::from_index(start + 10), Branch::from_index(start + 11)];
            assert_eq!(voids, &expected, "{}", day);
        }
    }

    /// T0.4: Twelve-stage sequences place each stem at its conventional 长生.
    #[test]
    fn birth_branches() {
        let tables = RuleTables::builtin();
        let births = [
            (Stem::Jia, Branch::Hai),
            (Stem::Bing, Branch::Yin),
            (Stem::Wu, Branch::Yin),
            (Stem::Geng, Branch::Si),
            (Stem::Ren, Branch::Shen),
            (Stem::Yi, Branch::Wu),
            (Stem::Gui, Branch::Mao),
        ];
        for (stem, branch) in births {
            assert_eq!(tables.twelve_stage(stem, branch), TwelveStage::Birth);
        }
    }

    /// T0.5: A strict load of a truncated document reports every gap at once.
    #[test]
    fn strict_load_aggregates_problems() {
        let result = RuleTables::from_json_str(r#"{"藏干": {"子": ["癸"]}}"#);
        // 11 branches + 60 NaYin + 60 void + 10 sequences + ten-god section
        assert!(matches!(
            &result,
            Err(MingpanError::RuleTableIncomplete(problems)) if problems.len() == 11 + 60 + 60 + 10 + 1
        ));
    }

    /// T0.6: Malformed JSON is a deserialization error.
    #[test]
    fn strict_load_rejects_malformed_json() {
        assert!(matches!(
            RuleTables::from_json_str("[1, 2"),
            Err(MingpanError::DeserializationError(_))
        ));
    }
}

// =============================================================================
// TIER T1: RELATION TOTALITY
// =============================================================================

mod t1_relation_totality {
    use super::*;
    use mingpan_core::{ElementCycles, Relation};

    /// T1.1: Every ordered element pair has exactly one known relation.
    #[test]
    fn no_pair_is_unknown() {
        let cycles = RuleTables::builtin().cycles();
        for day in Element::ALL {
            for target in Element::ALL {
                assert_ne!(cycles.classify(day, target), Relation::Unknown);
            }
        }
    }

    /// T1.2: Each non-same relation occurs exactly once per day element.
    #[test]
    fn relations_partition_the_grid() {
        let cycles = ElementCycles::standard();
        for day in Element::ALL {
            let mut relations: Vec<Relation> = Element::ALL
                .iter()
                .map(|&target| cycles.classify(day, target))
                .collect();
            relations.sort();
            assert_eq!(
                relations,
                vec![
                    Relation::Same,
                    Relation::GeneratedBy,
                    Relation::Generates,
                    Relation::Overcomes,
                    Relation::OvercomeBy
                ]
            );
        }
    }
}

// =============================================================================
// TIER T2: TEN-GOD TABLE
// =============================================================================

mod t2_ten_god_table {
    use super::*;
    use mingpan_core::ten_god::resolve;

    /// Rows: Day Master; columns: target stem 甲..癸.
    const TABLE: [(&str, [&str; 10]); 10] = [
        ("甲", ["比肩", "劫财", "食神", "伤官", "偏财", "正财", "七杀", "正官", "偏印", "正印"]),
        ("乙", ["劫财", "比肩", "伤官", "食神", "正财", "偏财", "正官", "七杀", "正印", "偏印"]),
        ("丙", ["偏印", "正印", "比肩", "劫财", "食神", "伤官", "偏财", "正财", "七杀", "正官"]),
        ("丁", ["正印", "偏印", "劫财", "比肩", "伤官", "食神", "正财", "偏财", "正官", "七杀"]),
        ("戊", ["七杀", "正官", "偏印", "正印", "比肩", "劫财", "食神", "伤官", "偏财", "正财"]),
        ("己", ["正官", "七杀", "正印", "偏印", "劫财", "比肩", "伤官", "食神", "正财", "偏财"]),
        ("庚", ["偏财", "正财", "七杀", "正官", "偏印", "正印", "比肩", "劫财", "食神", "伤官"]),
        ("辛", ["正财", "偏财", "正官", "七杀", "正印", "偏印", "劫财", "比肩", "伤官", "食神"]),
        ("壬", ["食神", "伤官", "偏财", "正财", "七杀", "正官", "偏印", "正印", "比肩", "劫财"]),
        ("癸", ["伤官", "食神", "正财", "偏财", "正官", "七杀", "正印", "偏印", "劫财", "比肩"]),
    ];

    /// T2.1: All 100 pairs reproduce the literal table.
    #[test]
    fn all_pairs_match_table() {
        let tables = RuleTables::builtin();
        for (day_label, row) in TABLE {
            let day: Stem = day_label.parse().expect("stem");
            for (target, expected) in Stem::ALL.into_iter().zip(row) {
                assert_eq!(
                    resolve(tables, day, target).label(),
                    expected,
                    "{} -> {}",
                    day,
                    target
                );
            }
        }
    }

    /// T2.2: Same-element pairs are 比肩 or 劫财 by polarity alone.
    #[test]
    fn same_element_depends_only_on_polarity() {
        let tables = RuleTables::builtin();
        for day in Stem::ALL {
            for target in Stem::ALL {
                if tables.element_of(day) != tables.element_of(target) {
                    continue;
                }
                let expected = if tables.polarity_of(day) == tables.polarity_of(target) {
                    TenGod::Rival
                } else {
                    TenGod::RobWealth
                };
                assert_eq!(resolve(tables, day, target), expected);
            }
        }
    }

    /// T2.3: Every Day Master sees each of the ten roles exactly once.
    #[test]
    fn each_day_master_sees_every_role_once() {
        let tables = RuleTables::builtin();
        for day in Stem::ALL {
            let mut roles: Vec<TenGod> = Stem::ALL
                .into_iter()
                .map(|target| resolve(tables, day, target))
                .collect();
            roles.sort();
            assert_eq!(roles, TenGod::ROLES, "{}", day);
        }
    }

    /// T2.4: Reference samples for a 丙 Day Master.
    #[test]
    fn bing_samples() {
        let tables = RuleTables::builtin();
        assert_eq!(resolve(tables, Stem::Bing, Stem::Geng), TenGod::IndirectWealth);
        assert_eq!(resolve(tables, Stem::Bing, Stem::Jia), TenGod::IndirectSeal);
        assert_eq!(resolve(tables, Stem::Bing, Stem::Bing), TenGod::Rival);
        assert_eq!(resolve(tables, Stem::Bing, Stem::Gui), TenGod::DirectOfficer);
    }
}

// =============================================================================
// TIER T3: END-TO-END
// =============================================================================

mod t3_end_to_end {
    use super::*;
    use mingpan_core::{enhance_document, hour_pillar};

    fn annotated() -> Value {
        enhance_document(RuleTables::builtin(), reference_record())
    }

    /// T3.1: The reference chart annotates to the known values.
    #[test]
    fn reference_chart() {
        let out = annotated();
        let pillars = &out["enhanced_analysis"]["四柱详析"];

        assert_eq!(pillars[0]["柱序"], "年柱");
        assert_eq!(pillars[0]["主星"], "食神");
        assert_eq!(pillars[0]["纳音"], "城头土");
        assert_eq!(pillars[0]["空亡"], json!(["申", "酉"]));
        assert_eq!(pillars[0]["星运（十二长生）"], "长生");
        assert_eq!(
            pillars[0]["藏干十神"],
            json!([
                {"藏干": "甲", "十神": "偏印"},
                {"藏干": "丙", "十神": "比肩"},
                {"藏干": "戊", "十神": "食神"}
            ])
        );

        assert_eq!(pillars[1]["主星"], "劫财");
        assert_eq!(pillars[1]["纳音"], "沙中土");
        assert_eq!(pillars[1]["星运（十二长生）"], "临官");

        assert_eq!(pillars[2]["主星"], "比肩");
        assert_eq!(pillars[2]["纳音"], "涧下水");
        assert_eq!(pillars[2]["星运（十二长生）"], "胎");

        assert_eq!(pillars[3]["主星"], "偏财");
        assert_eq!(pillars[3]["纳音"], "松柏木");

        // Void branches are the day pillar's for every position
        for i in 0..4 {
            assert_eq!(pillars[i]["空亡"], json!(["申", "酉"]));
        }

        assert_eq!(
            out["enhanced_analysis"]["十神统计"],
            json!({"比肩": 4, "劫财": 1, "偏印": 2, "食神": 4, "偏财": 2, "正官": 1})
        );
        assert_eq!(out["body_strength"], "强");
    }

    /// T3.2: Annotation is byte-identical across runs.
    #[test]
    fn idempotent() {
        let first = serde_json::to_string(&annotated()).expect("serialize");
        let second = serde_json::to_string(&annotated()).expect("serialize");
        assert_eq!(first, second);
    }

    /// T3.3: An incomplete chart yields exactly one error object.
    #[test]
    fn incomplete_chart_is_single_error() {
        let mut record = reference_record();
        if let Some(map) = record.as_object_mut() {
            map.remove("hour_pillar");
        }
        let out = enhance_document(RuleTables::builtin(), record);
        assert_eq!(out, json!({"error": "八字信息不完整"}));
    }

    /// T3.4: An empty store still yields a full report with unknown labels.
    #[test]
    fn empty_store_degrades() {
        let out = enhance_document(&RuleTables::empty(), reference_record());
        let pillars = &out["enhanced_analysis"]["四柱详析"];
        assert_eq!(pillars.as_array().map(Vec::len), Some(4));
        assert_eq!(pillars[0]["主星"], "未知");
        assert_eq!(pillars[0]["纳音"], "未知");
        assert_eq!(pillars[0]["藏干"], json!([]));
        assert_eq!(out["enhanced_analysis"]["十神统计"], json!({"未知": 4}));
    }

    /// T3.5: A derived hour pillar flows into the chart.
    #[test]
    fn derived_hour_pillar() {
        let hour = hour_pillar(Stem::Bing, 4).expect("hour");
        assert_eq!(hour, pillar("庚寅"));

        let chart = Chart::from_pillars(pillar("戊寅"), pillar("丁巳"), pillar("丙子"), hour);
        let record = mingpan_core::basic_record(RuleTables::builtin(), &chart);
        assert_eq!(record["body_strength"], "强");
        assert_eq!(record["five_elements_count"], reference_record()["five_elements_count"]);
    }
}
