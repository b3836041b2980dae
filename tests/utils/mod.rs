// Shared fixtures for CLI integration tests
//
// Every test writes its own snapshot to a temp file so tests stay independent
// and can run in parallel.
#![allow(dead_code)]

use anyhow::Result;
use serde_json::{json, Value};
use std::io::Write;
use tempfile::NamedTempFile;

/// Four mice, five genes, three phenotype attributes
///
/// Against ENSMUSG01 (1, 2, 3 on m1..m3):
/// - ENSMUSG02 is 2x on m1..m3 plus an outlier on m4 (no ENSMUSG01 there)
/// - ENSMUSG03 is a perfect inverse
/// - ENSMUSG04 is only on m1 (single overlap)
/// - ENSMUSG05 is only on m4 (no overlap)
pub fn cohort() -> Value {
    json!({
        "mice": [
            {
                "mouse_id": "m1", "group": "B6", "diet_desc": "chow",
                "factors": {"sex": "F"},
                "expression_data": {"ENSMUSG01": 1.0, "ENSMUSG02": 2.0, "ENSMUSG03": 3.0, "ENSMUSG04": 7.0},
                "phenotypes": {"clinical": {"weight": 20.0, "coat": "black"}}
            },
            {
                "mouse_id": "m2", "group": "B6", "diet_desc": "high fat",
                "factors": {"sex": "M"},
                "expression_data": {"ENSMUSG01": 2.0, "ENSMUSG02": 4.0, "ENSMUSG03": 2.0},
                "phenotypes": {"clinical": {"weight": 22.0}}
            },
            {
                "mouse_id": "m3", "group": "DBA",
                "factors": {"sex": "F"},
                "expression_data": {"ENSMUSG01": 3.0, "ENSMUSG02": 6.0, "ENSMUSG03": 1.0},
                "phenotypes": {"clinical": {"weight": 24.0, "coat": "agouti"}}
            },
            {
                "mouse_id": "m4", "group": "DBA",
                "expression_data": {"ENSMUSG02": 99.0, "ENSMUSG05": 5.0}
            }
        ],
        "genes": [
            {"ensembl_gene_id": "ENSMUSG01", "gene_symbol": "Ins2", "chrom": "7", "gene_start": 142678656, "gene_end": 142679726},
            {"ensembl_gene_id": "ENSMUSG02", "gene_symbol": "Lep", "chrom": "6"},
            {"ensembl_gene_id": "ENSMUSG03", "gene_symbol": "Lepr", "chrom": "4"},
            {"ensembl_gene_id": "ENSMUSG04", "gene_symbol": "Gcg", "chrom": "2"},
            {"ensembl_gene_id": "ENSMUSG05", "gene_symbol": "Pomc", "chrom": "12"}
        ],
        "attributes": [
            {"sub_key": "clinical", "key_id": "weight", "type": "FLOAT", "key_id_desc": "Body weight"},
            {"sub_key": "clinical", "key_id": "coat", "type": "STRING", "key_id_desc": "Coat color"}
        ]
    })
}

pub fn write_json(value: &Value) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    serde_json::to_writer(&mut file, value)?;
    file.flush()?;
    Ok(file)
}

pub fn write_cohort() -> Result<NamedTempFile> {
    write_json(&cohort())
}

pub fn write_toml(body: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    write!(file, "{}", body)?;
    file.flush()?;
    Ok(file)
}

/// Parse a command's stdout as a single JSON document
pub fn stdout_json(output: &std::process::Output) -> Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).unwrap()
}
