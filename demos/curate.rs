/// Curation Example
///
/// This example demonstrates:
/// - Uploading CSV files with inconsistent headers
/// - Canonical columns and grade backfill
/// - Searching, filtering and sorting a dataset
/// - Exporting the filtered view as CSV
///
/// Pass a directory to also load every `*.csv` inside it into the Skills view:
/// `cargo run --example curate -- ./data`

use ngss_toolkit::{CsvFile, FilterSpec, Session, SortOrder, ViewKind, CODE, DOMAIN, GRADE, TITLE};
use std::path::PathBuf;

fn print_table(table: &ngss_toolkit::Table) {
    println!("      {}", table.column_names().join(" | "));
    for row in table.iter_rows() {
        println!("      {}", row.join(" | "));
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== NGSS Curation Example ===\n");

    let mut session = Session::new();

    // 1. Upload two files that spell their headers differently
    println!("1. Uploading standards files...");
    let files = vec![
        CsvFile::new(
            "middle_school.csv",
            "PE Code,Performance Expectation,Topic,Grade\n\
             MS-PS3-3,Apply scientific principles to minimize energy transfer,Physical Science,\n\
             MS-LS1-6,Construct an explanation for photosynthesis,Life Science,7th\n\
             MS-PS4-2,Model how waves are reflected,Physical Science,8th\n",
        ),
        CsvFile::new(
            "elementary.csv",
            "NGSS,Statement,Domain,Grade,Comment\n\
             4-PS3-2,\"Make observations: energy, sound, light\",Physical Science,4th,\"uses \"\"energy\"\" loosely\"\n\
             K-ESS2-1,Use observations of local weather,Earth and Space,K,\n",
        ),
        CsvFile::new("broken.csv", "Code,Title\nMS-PS1-1,Atoms,stray,cells\n"),
    ];

    let report = session.add_uploads(ViewKind::Standards, &files, "6th");
    for file in &report.files {
        println!("   Loaded {} rows from {}", file.rows, file.file);
    }
    for warning in &report.warnings {
        println!("   {}", warning);
    }
    println!("   Dataset now has {} rows\n", session.dataset(ViewKind::Standards).len());

    // 2. Canonical columns
    println!("2. Canonical columns:");
    print_table(session.dataset(ViewKind::Standards).table());
    println!();

    // 3. Search for "energy", physical science only, sorted by grade
    println!("3. Physical science rows mentioning energy...");
    let spec = FilterSpec::new()
        .with_search("energy")
        .with_column_filter(DOMAIN, "physical")
        .sorted_by(ViewKind::Standards.sort_key(GRADE, SortOrder::Ascending))
        .with_columns([GRADE, CODE, TITLE]);
    let view = session.render(ViewKind::Standards, &spec)?;
    println!("   {} of {} rows match", view.len(), session.dataset(ViewKind::Standards).len());
    print_table(&view);
    println!();

    // 4. Export the same view
    println!("4. Exporting...");
    let export = session.export(ViewKind::Standards, &spec)?;
    println!("   {} ({} bytes):", export.file_name, export.bytes.len());
    for line in export.as_str().lines() {
        println!("      {}", line);
    }
    println!();

    // 5. Optional directory load into the Skills view
    if let Some(dir) = std::env::args().nth(1).map(PathBuf::from) {
        println!("5. Loading skills from {}...", dir.display());
        let report = session.load_directory(ViewKind::Skills, &dir, "")?;
        println!("   Loaded {} rows, skipped {} files", report.rows(), report.warnings.len());
        println!("   Grades: {:?}", session.grade_options(ViewKind::Skills));

        let ranked = FilterSpec::new().sorted_by(ViewKind::Skills.sort_key(GRADE, SortOrder::Ascending));
        print_table(&session.render(ViewKind::Skills, &ranked)?);
        println!();
    }

    println!("=== Example Complete ===");
    Ok(())
}
