//! The shared feature-transformation pipeline.
//!
//! One function, applied byte-for-byte identically before training and before
//! evaluation. The steps, in order:
//!
//! 1. Drop identifier columns (`id`, `_id`).
//! 2. Map `Gender` to binary (`Female` = 0, `Male` = 1).
//! 3. Keep numeric columns as-is, in original column order.
//! 4. One-hot expand every remaining (categorical) column: categories sorted
//!    lexicographically, first sorted category dropped, dummies appended
//!    after the numeric block in original column order.
//! 5. Rename the vehicle-age dummies that would otherwise carry `<`/`>` in
//!    their names.
//!
//! Any change to these steps must bump [`TRANSFORM_VERSION`]; stored models
//! record the version they were trained against so the evaluator can refuse
//! a mismatched pairing instead of producing a meaningless metric.

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::SchemaError;
use crate::table::Table;

/// Version of the pipeline below. Bump on any behavioral change.
pub const TRANSFORM_VERSION: u32 = 1;

/// Identifier columns removed before encoding.
const ID_COLUMNS: &[&str] = &["id", "_id"];

/// Dummy-name rewrites applied after one-hot expansion.
const RENAMES: &[(&str, &str)] = &[
    ("Vehicle_Age_< 1 Year", "Vehicle_Age_lt_1_Year"),
    ("Vehicle_Age_> 2 Years", "Vehicle_Age_gt_2_Years"),
];

// ---------------------------------------------------------------------------
// Feature matrix
// ---------------------------------------------------------------------------

/// Dense numeric features: named columns, row-major values.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub feature_names: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    /// Reproject this matrix onto `names`, in that order.
    ///
    /// A requested name absent from `self` becomes an all-zero column — the
    /// drop-first dummy encoding already means "none of the listed
    /// categories" is a valid all-zero row, so an unseen category at
    /// evaluation time degrades the same way. Columns of `self` not listed
    /// in `names` are dropped.
    pub fn align(&self, names: &[String]) -> FeatureMatrix {
        let indices: Vec<Option<usize>> = names
            .iter()
            .map(|n| self.feature_names.iter().position(|f| f == n))
            .collect();

        let rows = self
            .rows
            .iter()
            .map(|row| {
                indices
                    .iter()
                    .map(|idx| idx.map(|i| row[i]).unwrap_or(0.0))
                    .collect()
            })
            .collect();

        FeatureMatrix {
            feature_names: names.to_vec(),
            rows,
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Apply the shared pipeline to a feature table (target already split off).
pub fn transform_features(table: &Table) -> Result<FeatureMatrix, SchemaError> {
    if table.rows.is_empty() {
        return Err(SchemaError::Empty);
    }

    // Column classification pass. Kept columns are either numeric (parse as
    // f64 in every row, after the Gender mapping) or categorical.
    let mut numeric: Vec<(String, Vec<f64>)> = Vec::new();
    let mut categorical: Vec<(String, Vec<String>)> = Vec::new();

    for (col_idx, name) in table.columns.iter().enumerate() {
        if ID_COLUMNS.contains(&name.as_str()) {
            continue;
        }

        let cells: Vec<&str> = table.rows.iter().map(|r| r[col_idx].as_str()).collect();

        if name == "Gender" {
            numeric.push((name.clone(), map_gender(&cells)?));
            continue;
        }

        match parse_numeric(&cells) {
            Some(values) => numeric.push((name.clone(), values)),
            None => categorical.push((
                name.clone(),
                cells.iter().map(|c| c.to_string()).collect(),
            )),
        }
    }

    // Assemble: numeric block first, then sorted drop-first dummies.
    let n_rows = table.rows.len();
    let mut feature_names: Vec<String> = Vec::new();
    let mut columns: Vec<Vec<f64>> = Vec::new();

    for (name, values) in numeric {
        feature_names.push(name);
        columns.push(values);
    }

    for (name, cells) in &categorical {
        let categories: BTreeSet<&str> = cells.iter().map(|c| c.as_str()).collect();
        for category in categories.iter().skip(1) {
            feature_names.push(rename_feature(&format!("{name}_{category}")));
            columns.push(
                cells
                    .iter()
                    .map(|c| if c == category { 1.0 } else { 0.0 })
                    .collect(),
            );
        }
    }

    let rows: Vec<Vec<f64>> = (0..n_rows)
        .map(|r| columns.iter().map(|col| col[r]).collect())
        .collect();

    debug!(
        in_cols = table.columns.len(),
        out_cols = feature_names.len(),
        version = TRANSFORM_VERSION,
        "transformed features"
    );

    Ok(FeatureMatrix {
        feature_names,
        rows,
    })
}

fn map_gender(cells: &[&str]) -> Result<Vec<f64>, SchemaError> {
    cells
        .iter()
        .enumerate()
        .map(|(row, c)| match *c {
            "Female" => Ok(0.0),
            "Male" => Ok(1.0),
            raw => Err(SchemaError::BadCell {
                row: row + 1,
                column: "Gender".to_string(),
                raw: raw.to_string(),
            }),
        })
        .collect()
}

/// All-cells-parse-or-nothing numeric detection. Empty cells disqualify the
/// column so they surface as unexpected categories rather than silent zeros.
fn parse_numeric(cells: &[&str]) -> Option<Vec<f64>> {
    cells.iter().map(|c| c.parse::<f64>().ok()).collect()
}

fn rename_feature(name: &str) -> String {
    for (from, to) in RENAMES {
        if name == *from {
            return (*to).to_string();
        }
    }
    name.to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn insurance_table() -> Table {
        Table::from_csv_str(
            "\
id,Gender,Age,Vehicle_Age,Vehicle_Damage,Annual_Premium
1,Male,44,> 2 Years,Yes,40454.0
2,Female,76,1-2 Year,No,33536.0
3,Male,23,< 1 Year,Yes,23367.0
",
        )
        .unwrap()
    }

    #[test]
    fn drops_id_maps_gender_and_one_hot_expands() {
        let m = transform_features(&insurance_table()).unwrap();
        assert_eq!(
            m.feature_names,
            vec![
                "Gender",
                "Age",
                "Annual_Premium",
                // "1-2 Year" sorts first and is dropped.
                "Vehicle_Age_lt_1_Year",
                "Vehicle_Age_gt_2_Years",
                "Vehicle_Damage_Yes",
            ]
        );
        // Row 1: Male, 44, premium, Vehicle_Age "> 2 Years", Damage Yes.
        assert_eq!(m.rows[0], vec![1.0, 44.0, 40454.0, 0.0, 1.0, 1.0]);
        // Row 2: Female, 76, premium, "1-2 Year" (all-zero dummies), Damage No.
        assert_eq!(m.rows[1], vec![0.0, 76.0, 33536.0, 0.0, 0.0, 0.0]);
        // Row 3: Male, 23, premium, "< 1 Year", Damage Yes.
        assert_eq!(m.rows[2], vec![1.0, 23.0, 23367.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn transform_is_deterministic() {
        let a = transform_features(&insurance_table()).unwrap();
        let b = transform_features(&insurance_table()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_gender_value_is_a_bad_cell() {
        let t = Table::from_csv_str("Gender\nOther\n").unwrap();
        match transform_features(&t) {
            Err(SchemaError::BadCell { column, raw, .. }) => {
                assert_eq!((column.as_str(), raw.as_str()), ("Gender", "Other"));
            }
            other => panic!("expected BadCell, got {other:?}"),
        }
    }

    #[test]
    fn empty_table_is_rejected() {
        let t = Table::from_csv_str("Age\n").unwrap();
        assert!(matches!(transform_features(&t), Err(SchemaError::Empty)));
    }

    #[test]
    fn align_fills_missing_dummies_with_zeros_and_reorders() {
        let m = FeatureMatrix {
            feature_names: vec!["b".to_string(), "a".to_string()],
            rows: vec![vec![2.0, 1.0]],
        };
        let trained_order = vec!["a".to_string(), "b".to_string(), "c_Yes".to_string()];
        let aligned = m.align(&trained_order);
        assert_eq!(aligned.feature_names, trained_order);
        assert_eq!(aligned.rows, vec![vec![1.0, 2.0, 0.0]]);
    }

    #[test]
    fn dummy_categories_drop_first_sorted() {
        // Categories sort as: Blue, Green, Red — Blue is dropped.
        let t = Table::from_csv_str("Color\nRed\nGreen\nBlue\n").unwrap();
        let m = transform_features(&t).unwrap();
        assert_eq!(m.feature_names, vec!["Color_Green", "Color_Red"]);
        assert_eq!(m.rows, vec![
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![0.0, 0.0],
        ]);
    }
}
