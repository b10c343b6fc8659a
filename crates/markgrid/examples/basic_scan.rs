use image::ImageReader;
use markgrid::{SheetLayout, SheetScanner};
use std::error::Error;
use std::path::Path;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <page.png> [layout.json] [out.json]", args[0]);
        std::process::exit(2);
    }

    let scanner = match args.get(2) {
        Some(layout_path) => SheetScanner::from_layout_json_file(Path::new(layout_path))?,
        None => SheetScanner::new(SheetLayout::default()),
    };

    let image = ImageReader::open(&args[1])?.decode()?.to_luma8();
    let result = scanner.scan(&image);

    println!(
        "identifier: {}  group: {}  answers: {}",
        result.identifier,
        result.group,
        result.answers.len()
    );
    for entry in &result.answers {
        println!("  {}: {}", entry.question_number, entry.answer);
    }

    if let Some(out_path) = args.get(3) {
        let json = serde_json::to_string_pretty(&result)?;
        std::fs::write(out_path, json)?;
        println!("Wrote {out_path}");
    }
    Ok(())
}
