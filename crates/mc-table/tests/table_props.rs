use mc_core::linspace;
use mc_table::{TimeSeriesTable, filter_lowpass, from_sto_str, interpolate, to_sto_string};
use proptest::prelude::*;

fn table_from(values: &[f64]) -> TimeSeriesTable {
    let times = linspace(values.len(), 0.0, 1.0);
    let rows: Vec<Vec<f64>> = values.iter().map(|v| vec![*v]).collect();
    TimeSeriesTable::from_rows(times, vec!["q".into()], &rows).unwrap()
}

proptest! {
    #[test]
    fn interpolate_hits_samples(values in prop::collection::vec(-100.0f64..100.0, 2..30)) {
        let x = linspace(values.len(), 0.0, 1.0);
        let out = interpolate(&x, &values, &x, false);
        for (a, b) in out.iter().zip(&values) {
            prop_assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn sample_stays_within_column_range(
        values in prop::collection::vec(-100.0f64..100.0, 2..30),
        t in -0.5f64..1.5,
    ) {
        let table = table_from(&values);
        let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let v = table.sample(0, t);
        prop_assert!(v >= lo - 1e-9 && v <= hi + 1e-9);
    }

    #[test]
    fn lowpass_keeps_constants(level in -10.0f64..10.0, cutoff in 0.5f64..20.0) {
        let table = table_from(&vec![level; 101]);
        let out = filter_lowpass(&table, cutoff, true).unwrap();
        for v in out.data().iter() {
            prop_assert!((v - level).abs() < 1e-8);
        }
    }
}

#[test]
fn sto_text_survives_rewrite() {
    let mut table = table_from(&[0.25, -1.5, 3.0]);
    table.set_metadata("name", "reference");
    let text = to_sto_string(&table);
    assert!(text.starts_with("reference\nversion=1\nnRows=3\nnColumns=2\ninDegrees=no\n"));
    let parsed = from_sto_str(&text).unwrap();
    assert_eq!(parsed.column("q").unwrap().as_slice(), &[0.25, -1.5, 3.0]);
}

#[test]
fn json_file_round_trip() {
    let dir = std::env::temp_dir().join("mc_table_json_test");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("table.json");

    let table = table_from(&[1.0, 2.0]);
    mc_table::write_json(&path, &table).unwrap();
    assert_eq!(mc_table::read_json(&path).unwrap(), table);
}
