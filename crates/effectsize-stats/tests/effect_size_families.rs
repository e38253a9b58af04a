use effectsize_core::{Column, DataTable};
use effectsize_stats::{
    EffectMagnitude, StatsError, compute_d, correlations, effect_sizes_for_groups, eta_squared,
    partial_eta_squared, pearson,
};

fn species_table() -> DataTable {
    let mut species = Vec::new();
    let mut length = Vec::new();
    let mut width = Vec::new();
    let mut mass = Vec::new();
    for (offset, label) in [(5.0, "A"), (5.6, "B"), (6.5, "C")] {
        for i in 0..10 {
            let wobble = (i as f64 * 0.73 + offset).sin();
            species.push(label);
            length.push(offset + wobble);
            width.push(offset * 0.5 - wobble * 0.3);
            mass.push((i as f64 * 1.9).cos() * 2.0 + 10.0);
        }
    }
    DataTable::new(vec![
        Column::categorical("species", species),
        Column::numeric("length", length),
        Column::numeric("width (cm)", width),
        Column::numeric("mass/unit", mass),
    ])
    .expect("build species table")
}

#[test]
fn three_groups_give_three_pairs() {
    let table = species_table();
    let rows = effect_sizes_for_groups(&table, "species", &["length"]).expect("cohen's d");

    let pairs: Vec<_> = rows.iter().map(|row| row.pair.as_str()).collect();
    assert_eq!(pairs, vec!["A vs B", "A vs C", "B vs C"]);
    for row in &rows {
        assert_eq!(row.column, "length");
        assert!(row.cohens_d.is_finite());
        assert!(matches!(
            row.interpretation,
            EffectMagnitude::Small
                | EffectMagnitude::Medium
                | EffectMagnitude::Large
                | EffectMagnitude::VeryLarge
        ));
        assert_eq!(row.explanation, row.interpretation.explanation());
    }
}

#[test]
fn effect_size_rows_cover_every_metric_pair() {
    let table = species_table();
    let rows = effect_sizes_for_groups(&table, "species", &["length", "width (cm)", "mass/unit"])
        .expect("cohen's d");
    assert_eq!(rows.len(), 3 * 3);
}

#[test]
fn cohen_d_swaps_sign_with_group_order() {
    let table = species_table();
    let groups = table.numeric_by_level("length", "species").unwrap();
    let forward = compute_d(&groups[0].values, &groups[2].values);
    let backward = compute_d(&groups[2].values, &groups[0].values);
    assert_eq!(forward, -backward);
}

#[test]
fn correlation_row_count_is_n_choose_two() {
    let table = DataTable::new(vec![
        Column::numeric("a", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
        Column::numeric("b", vec![2.0, 1.0, 4.0, 3.0, 6.0]),
        Column::numeric("c", vec![9.0, 7.0, 8.0, 3.0, 1.0]),
        Column::numeric("d", vec![1.0, 1.5, 1.2, 1.9, 2.2]),
    ])
    .unwrap();
    let metrics = ["a", "b", "c", "d"];
    let rows = correlations(&table, &metrics).expect("correlations");
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0].variable_1, "a");
    assert_eq!(rows[0].variable_2, "b");
    assert_eq!(rows[5].variable_1, "c");
    assert_eq!(rows[5].variable_2, "d");

    for row in &rows {
        let x = table.numeric(&row.variable_1).unwrap();
        let y = table.numeric(&row.variable_2).unwrap();
        let swapped = pearson(y, x).unwrap();
        assert_eq!(row.pearson_r, swapped.r);
        assert_eq!(row.p_value, swapped.p_value);
    }
}

#[test]
fn correlating_a_categorical_column_fails() {
    let table = species_table();
    let err = correlations(&table, &["length", "species"]).unwrap_err();
    assert!(matches!(err, StatsError::Table(_)));
}

#[test]
fn partial_eta_values_do_not_depend_on_listing_order() {
    let mut table = species_table();
    let batch: Vec<&str> = (0..30).map(|i| if i % 2 == 0 { "even" } else { "odd" }).collect();
    let mut columns = table.columns().to_vec();
    columns.push(Column::categorical("batch", batch));
    table = DataTable::new(columns).unwrap();

    let forward = partial_eta_squared(&table, &["length", "mass/unit"], &["species", "batch"])
        .expect("forward");
    let reversed = partial_eta_squared(&table, &["mass/unit", "length"], &["batch", "species"])
        .expect("reversed");

    assert_eq!(forward.len(), 4);
    assert_eq!(reversed.len(), 4);
    for row in &forward {
        let twin = reversed
            .iter()
            .find(|other| other.variable == row.variable && other.factor == row.factor)
            .expect("matching row");
        assert_eq!(row.partial_eta_squared, twin.partial_eta_squared);
        assert_eq!(row.interpretation, twin.interpretation);
    }
}

#[test]
fn one_way_partial_eta_matches_eta_squared() {
    let table = species_table();
    let partial = partial_eta_squared(&table, &["width (cm)"], &["species"]).unwrap();
    let anova = eta_squared(&table, &["width (cm)"], "species").unwrap();
    let eta = anova[0].eta_squared.expect("between-group eta");
    assert!((partial[0].partial_eta_squared - eta).abs() < 1e-12);
}

#[test]
fn eta_squared_keeps_original_metric_names() {
    let table = species_table();
    let rows = eta_squared(&table, &["width (cm)", "mass/unit"], "species").unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].metric, "width (cm)");
    assert_eq!(rows[0].source, "C(species)");
    assert_eq!(rows[0].df, 2.0);
    assert_eq!(rows[1].df, 27.0);
    assert_eq!(rows[2].metric, "mass/unit");
    assert!(rows.iter().filter(|row| row.eta_squared.is_some()).count() == 2);
}

#[test]
fn missing_column_aborts_the_batch() {
    let table = species_table();
    let err = eta_squared(&table, &["length", "height"], "species").unwrap_err();
    assert!(matches!(
        err,
        StatsError::Table(effectsize_core::Error::MissingColumn(name)) if name == "height"
    ));
}
