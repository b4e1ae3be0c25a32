use anyhow::{bail, Context, Result};
use arrow::array::Array;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::{env, fs::File, path::Path, process::exit};

fn main() {
    // Expect exactly one CLI argument: path to an exported view.
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <VIEW_PARQUET>", args[0]);
        exit(1);
    }
    if let Err(e) = inspect_export(Path::new(&args[1])) {
        eprintln!("Error: {:#}", e);
        exit(1);
    }
}

/// Print schema, row count and per-column null counts of an exported view.
fn inspect_export(path: &Path) -> Result<()> {
    let file = File::open(path).with_context(|| format!("failed to open `{}`", path.display()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .with_context(|| format!("`{}` is not a Parquet file", path.display()))?;

    let file_meta = builder.metadata().file_metadata();
    let schema = builder.schema().clone();
    let expected = zomato_eda::schema::arrow::display_schema();
    if schema.fields().len() != expected.fields().len() {
        bail!(
            "expected {} columns, found {}",
            expected.fields().len(),
            schema.fields().len()
        );
    }

    println!("=== Exported view: {} ===", path.display());
    println!(
        "Created by:           {}",
        file_meta.created_by().unwrap_or("<unknown>")
    );
    println!("Total rows:           {}", file_meta.num_rows());
    println!(
        "File-size on disk:    {} bytes",
        std::fs::metadata(path)?.len()
    );
    println!();

    println!("=== Columns ===");
    let mut nulls = vec![0usize; schema.fields().len()];
    for batch in builder.build()? {
        let batch = batch.context("reading RecordBatch")?;
        for (i, col) in batch.columns().iter().enumerate() {
            nulls[i] += col.null_count();
        }
    }
    for (field, nulls) in schema.fields().iter().zip(nulls) {
        println!(
            "- {:<12} | {:<8} | nulls: {}",
            field.name(),
            format!("{:?}", field.data_type()),
            nulls
        );
    }
    Ok(())
}
